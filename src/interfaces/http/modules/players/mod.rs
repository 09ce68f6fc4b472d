//! Players module: roster CRUD with cached reads

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
