pub mod errors;
pub mod identity;
pub mod pagination;

pub use errors::*;
pub use identity::*;
pub use pagination::*;
