//! Club aggregate

pub mod model;
pub mod repository;

pub use model::{Club, ClubChanges, ClubFilter, ClubSortField, NewClub};
pub use repository::{ClubListQuery, ClubRepository};
