//! End-to-end tests for the crawl → store → publish flow

pub mod crawl_test;
pub mod publish_test;
pub mod race_test;
