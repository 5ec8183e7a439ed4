/// Custom middleware: request authorization, rate limiting, request logging.
mod auth_gate;
mod rate_limit;
mod request_logger;

pub use auth_gate::AuthGate;
pub use rate_limit::RateLimiter;
pub use request_logger::RequestLogger;
