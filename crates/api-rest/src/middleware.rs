//! HTTP middleware components.
//!
//! This module provides middleware for request/response processing including:
//! - Request logging
//! - Error bodies stamped with the request ID
//! - Rate limiting
//! - Request ID generation

pub mod error_handler;
pub mod logging;
pub mod rate_limit;
pub mod request_id;

pub use error_handler::render_error;
pub use logging::logging_middleware;
pub use rate_limit::{RateLimitLayer, SlidingWindowLimiter};
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
