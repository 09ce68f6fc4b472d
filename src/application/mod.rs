//! Application layer: use cases over the domain repositories, with cache
//! invalidation on every mutation.

pub mod services;

pub use services::{ClubService, DashboardService, DashboardStats, PlayerService};
