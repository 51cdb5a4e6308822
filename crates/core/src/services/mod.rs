pub mod history;
pub mod metrics;
pub mod season;
pub mod trading;
pub mod valuation;
