pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::UpstreamClient;
pub use error::UpstreamError;
pub use normalize::{normalize_product, sanitize_description};
pub use types::{LoginRequest, LoginResponse, RawProduct};
