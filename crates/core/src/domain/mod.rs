pub mod analysis;
pub mod contract;
pub mod financials;
pub mod news;
pub mod profile;
pub mod recommendation;
pub mod warning;
