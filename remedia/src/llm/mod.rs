mod api;
mod provider;
pub mod seed;

pub use api::LlmApiClient;
pub use provider::{CompletionOptions, LlmBackend, LlmProvider, ResponseSchema};
pub use seed::{ClassifierSeed, SeedExchange};
