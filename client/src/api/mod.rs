pub mod client;
pub mod error;

pub use self::client::ApiClient;
pub use self::error::ApiError;
