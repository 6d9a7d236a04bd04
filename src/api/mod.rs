pub mod crawl_api;
pub mod simple;
