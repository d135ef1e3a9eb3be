mod api;
mod provider;


pub use api::{ApiConfig, EmbeddingApiClient};
pub use provider::EmbeddingProvider;
