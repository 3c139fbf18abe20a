pub mod price_series;
pub mod ticker;

// Re-export the series types for convenient access (e.g. `use crate::market_data::PriceSeries`).
pub use price_series::{PricePoint, PriceSeries};
pub use ticker::{ChartData, Dividend, NewsItem, TickerMeta};
