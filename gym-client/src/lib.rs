//! Gym Client - HTTP client for the members API
//!
//! Provides network-based calls to the collaborator that stores member
//! records, exposed to the front desk through [`shared::MemberGateway`].

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
