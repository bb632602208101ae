pub mod auth;
pub mod correlation;
pub mod error_envelope;
pub mod rate_limit;
pub mod response;

pub use auth::{auth_middleware, AuthUser};
pub use correlation::{correlation_id_middleware, CorrelationId, CORRELATION_ID_HEADER};
pub use error_envelope::{error_envelope_middleware, panic_response};
pub use rate_limit::{rate_limit_middleware, RateLimiter};
pub use response::{ApiResponse, ApiResult};
