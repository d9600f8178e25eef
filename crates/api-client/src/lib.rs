pub mod client;
pub mod retry;

pub use client::{ApiClient, ApiStatusError};
pub use daybook_api;
pub use retry::RetryConfig;
