//! Cross-cutting HTTP middleware

pub mod metrics;
pub mod rate_limit;
pub mod request_id;

pub use self::metrics::http_metrics_middleware;
pub use rate_limit::{rate_limit_middleware, RateLimitState};
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
