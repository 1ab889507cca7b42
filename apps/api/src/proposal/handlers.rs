//! Axum route handlers for the Proposal API.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::extract_announcement_blocking;
use crate::llm_client::{ProviderError, ProviderErrorKind};
use crate::models::catalog::{ModelInfo, ProviderId};
use crate::models::generation::{
    ConfigEcho, ANALYSIS_MAX_TOKENS, ANALYSIS_TEMPERATURE, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE, MAX_TOKENS_RANGE, MAX_TOKENS_STEP, TEMPERATURE_RANGE,
};
use crate::proposal::export::{proposal_artifacts, Artifact, ExportFormat};
use crate::proposal::form::{ProposalForm, ANNOUNCEMENT_FIELD};
use crate::proposal::orchestrator::run_proposal;
use crate::proposal::prompts::{ANALYSIS_CATEGORIES, PROPOSAL_SECTIONS};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ProviderCatalogEntry {
    pub id: ProviderId,
    pub name: &'static str,
    pub summary: &'static str,
    pub default_model: &'static str,
    pub models: Vec<&'static ModelInfo>,
}

#[derive(Debug, Serialize)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
    pub default: T,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub providers: Vec<ProviderCatalogEntry>,
    pub temperature: Bounds<f32>,
    pub max_tokens: Bounds<u32>,
    pub max_tokens_step: u32,
    /// Headings the proposal is asked to follow.
    pub proposal_sections: &'static [&'static str],
    pub analysis: AnalysisSettings,
}

#[derive(Debug, Serialize)]
pub struct AnalysisSettings {
    pub temperature: f32,
    pub max_tokens: u32,
    pub categories: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub pages: usize,
    pub characters: usize,
    pub text: String,
}

/// The analysis either succeeded or failed on its own; the proposal already succeeded.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisSlot {
    Ok {
        text: String,
    },
    Failed {
        kind: ProviderErrorKind,
        code: &'static str,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        hint: Option<&'static str>,
    },
}

impl From<Result<String, ProviderError>> for AnalysisSlot {
    fn from(result: Result<String, ProviderError>) -> Self {
        match result {
            Ok(text) => AnalysisSlot::Ok { text },
            Err(e) => AnalysisSlot::Failed {
                kind: e.kind,
                code: e.kind.code(),
                hint: e.hint(),
                message: e.message,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProposalResponse {
    pub request_id: Uuid,
    pub proposal: String,
    pub analysis: AnalysisSlot,
    pub config: ConfigEcho,
    pub announcement_pages: usize,
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub company_name: String,
    pub content: String,
    pub format: ExportFormat,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/providers
///
/// Providers, their models in display order, and the accepted setting ranges.
pub async fn handle_catalog() -> Json<CatalogResponse> {
    let providers = ProviderId::ALL
        .iter()
        .map(|&provider| ProviderCatalogEntry {
            id: provider,
            name: provider.display_name(),
            summary: provider.summary(),
            default_model: provider.default_model().id,
            models: provider.models(),
        })
        .collect();

    Json(CatalogResponse {
        providers,
        temperature: Bounds {
            min: *TEMPERATURE_RANGE.start(),
            max: *TEMPERATURE_RANGE.end(),
            default: DEFAULT_TEMPERATURE,
        },
        max_tokens: Bounds {
            min: *MAX_TOKENS_RANGE.start(),
            max: *MAX_TOKENS_RANGE.end(),
            default: DEFAULT_MAX_TOKENS,
        },
        max_tokens_step: MAX_TOKENS_STEP,
        proposal_sections: &PROPOSAL_SECTIONS,
        analysis: AnalysisSettings {
            temperature: ANALYSIS_TEMPERATURE,
            max_tokens: ANALYSIS_MAX_TOKENS,
            categories: &ANALYSIS_CATEGORIES,
        },
    })
}

/// POST /api/v1/announcements/extract
///
/// Extracts the announcement text so the user can preview it before generating.
pub async fn handle_extract(mut multipart: Multipart) -> Result<Json<ExtractResponse>, AppError> {
    let mut upload: Option<Bytes> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::from_multipart("Invalid multipart body", e))?
    {
        if field.name() == Some(ANNOUNCEMENT_FIELD) {
            upload = Some(field.bytes().await.map_err(|e| {
                AppError::from_multipart("Failed to read announcement upload", e)
            })?);
        }
    }

    let bytes = upload
        .filter(|b| !b.is_empty())
        .ok_or_else(|| AppError::Validation("announcement PDF is required".to_string()))?;
    let announcement = extract_announcement_blocking(bytes).await?;

    Ok(Json(ExtractResponse {
        pages: announcement.page_count(),
        characters: announcement.as_str().chars().count(),
        text: announcement.as_str().to_string(),
    }))
}

/// POST /api/v1/proposals
///
/// Full pipeline: validate form → extract PDF → build prompts → generate proposal and
/// analysis → return both with the config echo and download artifacts.
pub async fn handle_generate_proposal(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ProposalResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let form = ProposalForm::from_multipart(multipart).await?;
    let today = chrono::Local::now().date_naive();
    let request = form.into_request(today).await?;

    info!(
        "Proposal request {request_id}: provider={} model={}",
        request.config.provider(),
        request.config.model().id
    );

    let generator = state.generator(request.config.provider(), request.credential.clone());
    let outcome = run_proposal(generator.as_ref(), &request).await?;

    let artifacts = proposal_artifacts(&request.profile.company_name, &outcome.proposal);

    Ok(Json(ProposalResponse {
        request_id,
        config: request.config.echo(),
        announcement_pages: request.announcement.page_count(),
        analysis: outcome.analysis.into(),
        proposal: outcome.proposal,
        artifacts,
    }))
}

/// POST /api/v1/proposals/export
///
/// Returns proposal text as a `.txt` or `.md` attachment named after the company.
pub async fn handle_export(
    Json(request): Json<ExportRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.company_name.trim().is_empty() {
        return Err(AppError::Validation(
            "company_name cannot be empty".to_string(),
        ));
    }

    let artifact = Artifact::new(&request.company_name, request.format, &request.content);
    let disposition = artifact.content_disposition();

    Ok((
        [
            (header::CONTENT_TYPE, artifact.mime_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.content,
    ))
}
