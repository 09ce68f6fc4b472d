//! Player aggregate

pub mod model;
pub mod repository;

pub use model::{NewPlayer, Player, PlayerChanges, PlayerFilter, PlayerSortField, PlayerStatus};
pub use repository::{PlayerListQuery, PlayerRepository};
