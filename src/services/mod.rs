pub mod data_fetcher;
pub mod lookups;
pub mod odds_fetcher;
pub mod pipeline;
pub mod predictor;
pub mod team_names;

pub use data_fetcher::*;
pub use odds_fetcher::*;
pub use pipeline::*;
pub use predictor::*;
pub use team_names::*;
