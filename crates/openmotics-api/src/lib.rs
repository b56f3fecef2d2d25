// openmotics-api: Async Rust client for the OpenMotics API (Cloud + Local Gateway)

pub mod auth;
pub mod cloud;
pub mod error;
pub mod local;
pub mod retry;
pub mod transport;

pub use auth::{ClientCredentials, LocalCredentials, StaticToken, TokenProvider};
pub use cloud::{CLOUD_BASE_URL, CloudClient, OpenMoticsCloud, OpenMoticsCloudBuilder};
pub use error::Error;
pub use local::{LocalGateway, LocalGatewayBuilder};
pub use retry::RetryPolicy;
pub use transport::{ApiResponse, ParamValue, RequestOptions, TlsMode, TransportConfig};
