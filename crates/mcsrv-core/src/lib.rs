pub mod config;
pub mod error;
pub mod logging;

// Resolve → fetch → launch pipeline
pub mod catalog;
pub mod checksum;
pub mod fetcher;
pub mod http;
pub mod provision;
pub mod resolver;
pub mod supervisor;

#[cfg(test)]
pub(crate) mod testing;
