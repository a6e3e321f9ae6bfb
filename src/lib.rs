pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod gateway;
pub mod models;
pub mod prompts;
pub mod schema;

pub use config::Config;
pub use error::GatewayError;
pub use gateway::GenerationGateway;
pub use models::*;
