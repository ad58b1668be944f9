pub mod fixed_window;
pub mod middleware;
pub mod redis_store;
pub mod store;
pub mod sweeper;

pub use fixed_window::{now_millis, FixedWindowLimiter, RateLimitDecision, RateLimitPolicy};
pub use middleware::{enforce, extract_client_ip, RouteLimit};
pub use redis_store::RedisWindowStore;
pub use store::{InMemoryWindowStore, WindowEntry, WindowStore};
pub use sweeper::Sweeper;
