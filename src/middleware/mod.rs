/// Middleware module
///
/// Custom middleware for authentication and file-server hit counting.

mod hit_counter;
mod jwt_middleware;

pub use hit_counter::{FileserverHits, HitCounterMiddleware};
pub use jwt_middleware::JwtMiddleware;
