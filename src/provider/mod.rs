pub mod client;
pub mod parse;
#[cfg(test)]
pub mod stub;

pub use client::YahooClient;
