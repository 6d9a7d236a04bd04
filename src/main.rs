use std::io::Write;
use std::process::ExitCode;

use tracing::error;

use secret_crawler::api::crawl_api::crawl_secret;
use secret_crawler::api::simple::init_tracing;
use secret_crawler::config::CrawlerConfig;
use secret_crawler::error::CrawlError;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = CrawlerConfig::default();
    match crawl_secret(&config).await {
        Ok(secret) => {
            let mut out = std::io::stdout().lock();
            if let Err(e) = write!(out, "{}", secret).and_then(|_| out.flush()) {
                error!("failed to write output: {}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            let stage = e
                .downcast_ref::<CrawlError>()
                .map(CrawlError::stage)
                .unwrap_or("setup");
            error!("{} stage failed: {:#}", stage, e);
            eprintln!("error ({}): {:#}", stage, e);
            ExitCode::FAILURE
        }
    }
}
