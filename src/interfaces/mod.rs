pub mod fetch;

pub use fetch::TextFetcher;
