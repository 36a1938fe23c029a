pub mod crawl;
pub mod stats;

// Re-export command functions for convenience
pub use crawl::crawl;
pub use stats::stats;
