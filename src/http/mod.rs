pub mod client;

pub use client::{HttpError, RateLimitedHttpClient};
