//! Shared HTTP building blocks: response envelope, error mapping and
//! request extractors.

pub mod error;
pub mod response;
pub mod validated_json;

pub use response::ApiResponse;
pub use validated_json::{ValidatedJson, ValidatedJsonRejection};
