//! Database repository implementations

pub mod club_repository;
pub mod player_repository;

pub use club_repository::SeaOrmClubRepository;
pub use player_repository::SeaOrmPlayerRepository;
