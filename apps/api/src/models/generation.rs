use std::ops::RangeInclusive;

use serde::Serialize;
use thiserror::Error;

use crate::models::catalog::{ModelInfo, ProviderId};

pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const MAX_TOKENS_RANGE: RangeInclusive<u32> = 1000..=4000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 4000;
/// Suggested increment for clients rendering a max-tokens control.
pub const MAX_TOKENS_STEP: u32 = 500;

/// The requirement analysis always runs with these settings, whatever the user picked.
pub const ANALYSIS_TEMPERATURE: f32 = 0.3;
pub const ANALYSIS_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("temperature {0} is outside the allowed range 0.0..=1.0")]
    TemperatureOutOfRange(f32),

    #[error("max_tokens {0} is outside the allowed range 1000..=4000")]
    MaxTokensOutOfRange(u32),

    #[error("model '{model}' is not offered by {provider}")]
    UnknownModel { provider: ProviderId, model: String },
}

/// Settings for one generation call. Only constructible through [`GenerationConfig::new`],
/// so every value that reaches a provider has been range-checked.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    provider: ProviderId,
    model: &'static ModelInfo,
    temperature: f32,
    max_tokens: u32,
}

/// What the user asked for, echoed back for confirmation.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigEcho {
    pub provider: ProviderId,
    pub model: &'static str,
    pub model_name: &'static str,
    pub model_description: &'static str,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationConfig {
    /// Validates and builds a config. `model = None` selects the provider's default model.
    /// Out-of-range values are rejected, never clamped.
    pub fn new(
        provider: ProviderId,
        model: Option<&str>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Self, ConfigError> {
        // NaN fails `contains`, so it is rejected here too.
        if !TEMPERATURE_RANGE.contains(&temperature) {
            return Err(ConfigError::TemperatureOutOfRange(temperature));
        }
        if !MAX_TOKENS_RANGE.contains(&max_tokens) {
            return Err(ConfigError::MaxTokensOutOfRange(max_tokens));
        }

        let model = match model {
            Some(id) => provider
                .find_model(id)
                .ok_or_else(|| ConfigError::UnknownModel {
                    provider,
                    model: id.to_string(),
                })?,
            None => provider.default_model(),
        };

        Ok(Self {
            provider,
            model,
            temperature,
            max_tokens,
        })
    }

    /// Same provider and model, fixed analysis temperature and length.
    pub fn for_analysis(&self) -> Self {
        Self {
            temperature: ANALYSIS_TEMPERATURE,
            max_tokens: ANALYSIS_MAX_TOKENS,
            ..self.clone()
        }
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn model(&self) -> &'static ModelInfo {
        self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn echo(&self) -> ConfigEcho {
        ConfigEcho {
            provider: self.provider,
            model: self.model.id,
            model_name: self.model.name,
            model_description: self.model.description,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}
