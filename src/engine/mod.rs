// Crawl engine — traversal, result aggregation, and ordered reconstruction.

pub mod aggregation;
pub mod crawler;
pub mod reconstruct;
pub mod session;
pub mod stats;
