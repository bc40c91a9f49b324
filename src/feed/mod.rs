pub mod cache;
pub mod category;
pub mod envelope;
pub mod fetcher;
pub mod indicators;
pub mod retry;
pub mod source;
