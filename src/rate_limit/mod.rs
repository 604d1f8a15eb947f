mod client_ip;
mod limit;
mod limiter;
mod store;

pub use client_ip::{ClientIpResolver, ForwardedFor, UNKNOWN_CLIENT};
pub use limit::Limit;
pub use limiter::RateLimiter;
pub use store::{InMemoryStore, RateLimitInfo, RateLimitResult, RateLimitStore};
