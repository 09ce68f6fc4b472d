//! Database entities module

pub mod club;
pub mod player;

pub use club::Entity as Club;
pub use player::Entity as Player;
