/// Middleware module
///
/// Access-token authorization for protected routes, and request logging.

mod auth_guard;
mod request_logger;

pub use auth_guard::{extract_access_token, AuthGuard, AuthGuardMiddleware};
pub use request_logger::{current_request_id, RequestLogger, REQUEST_ID_HEADER};
