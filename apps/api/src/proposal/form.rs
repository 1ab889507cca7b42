//! Multipart form → immutable [`ProposalRequest`].
//!
//! Check order matters: credential first, then settings, then profile fields, and only
//! then the (comparatively expensive) PDF extraction. Nothing here touches the network.

use axum::extract::Multipart;
use bytes::Bytes;
use chrono::NaiveDate;
use tracing::debug;

use crate::errors::AppError;
use crate::extraction::{extract_announcement_blocking, AnnouncementText};
use crate::llm_client::ApiKey;
use crate::models::catalog::ProviderId;
use crate::models::generation::{GenerationConfig, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::models::profile::CompanyProfile;

pub const ANNOUNCEMENT_FIELD: &str = "announcement";

/// Everything one "generate" action needs, built once and passed by reference.
#[derive(Debug, Clone)]
pub struct ProposalRequest {
    pub announcement: AnnouncementText,
    pub profile: CompanyProfile,
    pub config: GenerationConfig,
    pub credential: ApiKey,
}

/// Raw form values as submitted. Empty strings count as absent.
#[derive(Debug, Default)]
pub struct ProposalForm {
    pub announcement: Option<Bytes>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub temperature: Option<String>,
    pub max_tokens: Option<String>,
    pub company_name: Option<String>,
    pub business_number: Option<String>,
    pub ceo_name: Option<String>,
    pub establishment_date: Option<String>,
    pub employee_count: Option<String>,
    pub annual_revenue: Option<String>,
    pub main_business: Option<String>,
    pub company_address: Option<String>,
}

impl ProposalForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = ProposalForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::from_multipart("Invalid multipart body", e))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == ANNOUNCEMENT_FIELD {
                let data = field.bytes().await.map_err(|e| {
                    AppError::from_multipart("Failed to read announcement upload", e)
                })?;
                form.announcement = Some(data).filter(|d| !d.is_empty());
                continue;
            }

            let value = field.text().await.map_err(|e| {
                AppError::from_multipart(&format!("Failed to read field '{name}'"), e)
            })?;
            if !form.set_text(&name, value) {
                debug!("Ignoring unknown form field '{name}'");
            }
        }

        Ok(form)
    }

    /// Stores a text field; returns false for names the form does not know.
    pub fn set_text(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "provider" => &mut self.provider,
            "model" => &mut self.model,
            "api_key" => &mut self.api_key,
            "temperature" => &mut self.temperature,
            "max_tokens" => &mut self.max_tokens,
            "company_name" => &mut self.company_name,
            "business_number" => &mut self.business_number,
            "ceo_name" => &mut self.ceo_name,
            "establishment_date" => &mut self.establishment_date,
            "employee_count" => &mut self.employee_count,
            "annual_revenue" => &mut self.annual_revenue,
            "main_business" => &mut self.main_business,
            "company_address" => &mut self.company_address,
            _ => return false,
        };
        *slot = Some(value.trim().to_string()).filter(|v| !v.is_empty());
        true
    }

    /// Provider selection; defaults to Claude when omitted.
    pub fn provider(&self) -> Result<ProviderId, AppError> {
        match self.provider.as_deref() {
            Some(raw) => raw.parse().map_err(AppError::Validation),
            None => Ok(ProviderId::Claude),
        }
    }

    pub fn credential(&self, provider: ProviderId) -> Result<ApiKey, AppError> {
        self.api_key
            .clone()
            .and_then(ApiKey::new)
            .ok_or_else(|| AppError::Credential(format!("{provider} API key is required")))
    }

    pub fn generation_config(&self, provider: ProviderId) -> Result<GenerationConfig, AppError> {
        let temperature = parse_number("temperature", self.temperature.as_deref())?
            .unwrap_or(DEFAULT_TEMPERATURE);
        let max_tokens =
            parse_number("max_tokens", self.max_tokens.as_deref())?.unwrap_or(DEFAULT_MAX_TOKENS);
        Ok(GenerationConfig::new(
            provider,
            self.model.as_deref(),
            temperature,
            max_tokens,
        )?)
    }

    /// Builds the profile. Required text fields must be present; the date and the
    /// counters fall back to the form defaults (today, 1 employee, 0 revenue).
    pub fn profile(&self, today: NaiveDate) -> Result<CompanyProfile, AppError> {
        let mut missing: Vec<&str> = Vec::new();
        if self.announcement.is_none() {
            missing.push(ANNOUNCEMENT_FIELD);
        }
        for (name, value) in [
            ("company_name", &self.company_name),
            ("business_number", &self.business_number),
            ("ceo_name", &self.ceo_name),
            ("main_business", &self.main_business),
        ] {
            if value.is_none() {
                missing.push(name);
            }
        }
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let establishment_date = match self.establishment_date.as_deref() {
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                AppError::Validation(format!(
                    "establishment_date '{raw}' must be a date in YYYY-MM-DD format"
                ))
            })?,
            None => today,
        };

        let employee_count: u32 =
            parse_number("employee_count", self.employee_count.as_deref())?.unwrap_or(1);
        if employee_count < 1 {
            return Err(AppError::Validation(
                "employee_count must be at least 1".to_string(),
            ));
        }
        let annual_revenue: u64 =
            parse_number("annual_revenue", self.annual_revenue.as_deref())?.unwrap_or(0);

        Ok(CompanyProfile {
            company_name: self.company_name.clone().unwrap_or_default(),
            business_number: self.business_number.clone().unwrap_or_default(),
            ceo_name: self.ceo_name.clone().unwrap_or_default(),
            establishment_date,
            employee_count,
            annual_revenue,
            main_business: self.main_business.clone().unwrap_or_default(),
            company_address: self.company_address.clone().unwrap_or_default(),
        })
    }

    /// Runs every check in order and extracts the announcement last.
    pub async fn into_request(self, today: NaiveDate) -> Result<ProposalRequest, AppError> {
        let provider = self.provider()?;
        let credential = self.credential(provider)?;
        let config = self.generation_config(provider)?;
        let profile = self.profile(today)?;

        let bytes = self
            .announcement
            .ok_or_else(|| AppError::Validation("announcement PDF is required".to_string()))?;
        let announcement = extract_announcement_blocking(bytes).await?;
        if announcement.is_blank() {
            return Err(AppError::Validation(
                "No text could be extracted from the announcement PDF".to_string(),
            ));
        }

        Ok(ProposalRequest {
            announcement,
            profile,
            config,
            credential,
        })
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, raw: Option<&str>) -> Result<Option<T>, AppError> {
    raw.map(|value| {
        value
            .parse::<T>()
            .map_err(|_| AppError::Validation(format!("{field} '{value}' is not a valid number")))
    })
    .transpose()
}
