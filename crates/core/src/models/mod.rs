pub mod activity;
pub mod group;
pub mod holding;
pub mod member;
pub mod metrics;
pub mod season;
pub mod settings;
pub mod snapshot;
