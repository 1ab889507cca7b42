use reqwest::Client;

use crate::config::Config;
use crate::llm_client::{build_generator, ApiKey, TextGenerator};
use crate::models::catalog::ProviderId;

/// Shared application state injected into all route handlers via Axum extractors.
/// Read-only: nothing here changes between requests.
#[derive(Clone)]
pub struct AppState {
    /// Pooled outbound client shared by every provider call.
    pub http: Client,
    pub config: Config,
}

impl AppState {
    /// A generator for one request, bound to that request's credential.
    pub fn generator(&self, provider: ProviderId, api_key: ApiKey) -> Box<dyn TextGenerator> {
        build_generator(provider, self.http.clone(), &self.config, api_key)
    }
}
