//! HTTP feature modules

pub mod clubs;
pub mod dashboard;
pub mod health;
pub mod metrics;
pub mod players;
