//! Domain layer: back-office entities and the repository ports the
//! infrastructure layer implements.

pub mod club;
pub mod listing;
pub mod player;

pub use club::{Club, ClubChanges, ClubFilter, ClubRepository, ClubSortField, NewClub};
pub use listing::ListQuery;
pub use player::{
    NewPlayer, Player, PlayerChanges, PlayerFilter, PlayerRepository, PlayerSortField,
    PlayerStatus,
};
