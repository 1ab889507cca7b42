//! Generation Orchestrator: dispatches rendered prompts to a provider.
//!
//! Flow per user action: build proposal + analysis prompts → run both generations
//! concurrently → join. The proposal decides success; the analysis is display-only,
//! so its failure is reported alongside a successful proposal instead of failing it.

use std::time::Instant;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{GenerationResult, TextGenerator};
use crate::models::generation::GenerationConfig;
use crate::proposal::builder::{build_prompt, PromptTemplate};
use crate::proposal::form::ProposalRequest;

/// Result of one proposal action.
#[derive(Debug)]
pub struct ProposalOutcome {
    pub proposal: String,
    pub analysis: GenerationResult,
}

/// One generation call: `(prompt, config) → GenerationResult`. No retry.
pub async fn generate(
    generator: &dyn TextGenerator,
    prompt: &str,
    config: &GenerationConfig,
) -> GenerationResult {
    let started = Instant::now();
    info!(
        "Dispatching to {} model={} max_tokens={} temperature={} prompt_chars={}",
        generator.provider(),
        config.model().id,
        config.max_tokens(),
        config.temperature(),
        prompt.chars().count()
    );

    match generator.generate(prompt, config).await {
        Ok(text) => {
            info!(
                "{} returned {} chars in {}ms",
                generator.provider(),
                text.chars().count(),
                started.elapsed().as_millis()
            );
            Ok(text)
        }
        Err(e) => {
            warn!(
                "Generation failed after {}ms (status {:?}): {e}",
                started.elapsed().as_millis(),
                e.status
            );
            Err(e)
        }
    }
}

/// Generates the proposal (user settings) and the requirement analysis (fixed settings).
pub async fn run_proposal(
    generator: &dyn TextGenerator,
    request: &ProposalRequest,
) -> Result<ProposalOutcome, AppError> {
    let proposal_prompt = build_prompt(
        PromptTemplate::Proposal,
        &request.announcement,
        &request.profile,
    )?;
    let analysis_prompt = build_prompt(
        PromptTemplate::Analysis,
        &request.announcement,
        &request.profile,
    )?;
    let analysis_config = request.config.for_analysis();

    info!(
        "Generating proposal for '{}' ({} announcement pages)",
        request.profile.company_name,
        request.announcement.page_count()
    );

    let (proposal, analysis) = tokio::join!(
        generate(generator, &proposal_prompt, &request.config),
        generate(generator, &analysis_prompt, &analysis_config),
    );

    let proposal = proposal?;
    if let Err(e) = &analysis {
        warn!("Analysis failed, returning proposal without it: {e}");
    }

    Ok(ProposalOutcome { proposal, analysis })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::extraction::AnnouncementText;
    use crate::llm_client::{ApiKey, ProviderError, ProviderErrorKind};
    use crate::models::catalog::ProviderId;
    use crate::models::generation::{ANALYSIS_MAX_TOKENS, ANALYSIS_TEMPERATURE};
    use crate::models::profile::tests::sample_profile;
    use crate::proposal::prompts::ANALYSIS_CATEGORIES;

    /// Records every call and answers by prompt kind.
    struct ScriptedGenerator {
        calls: Mutex<Vec<(String, f32, u32)>>,
        proposal: GenerationResult,
        analysis: GenerationResult,
    }

    impl ScriptedGenerator {
        fn new(proposal: GenerationResult, analysis: GenerationResult) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                proposal,
                analysis,
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        fn provider(&self) -> ProviderId {
            ProviderId::Claude
        }

        async fn generate(&self, prompt: &str, config: &GenerationConfig) -> GenerationResult {
            self.calls.lock().unwrap().push((
                prompt.to_string(),
                config.temperature(),
                config.max_tokens(),
            ));
            if prompt.contains(ANALYSIS_CATEGORIES[0]) && !prompt.contains("회사 정보") {
                self.analysis.clone()
            } else {
                self.proposal.clone()
            }
        }
    }

    fn request(temperature: f32, max_tokens: u32) -> ProposalRequest {
        ProposalRequest {
            announcement: AnnouncementText::from_pages(["공고 내용"]),
            profile: sample_profile(),
            config: GenerationConfig::new(ProviderId::Claude, None, temperature, max_tokens)
                .unwrap(),
            credential: ApiKey::new("sk-ant-test").unwrap(),
        }
    }

    fn failure(kind: ProviderErrorKind) -> ProviderError {
        ProviderError::new(kind, ProviderId::Claude, Some(400), "boom")
    }

    #[tokio::test]
    async fn test_runs_proposal_and_analysis_with_their_own_settings() {
        let generator =
            ScriptedGenerator::new(Ok("proposal".to_string()), Ok("analysis".to_string()));
        let outcome = run_proposal(&generator, &request(0.9, 3000)).await.unwrap();

        assert_eq!(outcome.proposal, "proposal");
        assert_eq!(outcome.analysis.unwrap(), "analysis");

        let calls = generator.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        let proposal_call = calls.iter().find(|c| c.0.contains("회사 정보")).unwrap();
        assert_eq!((proposal_call.1, proposal_call.2), (0.9, 3000));
        assert!(proposal_call.0.contains("테크스타"));
        let analysis_call = calls.iter().find(|c| !c.0.contains("회사 정보")).unwrap();
        assert_eq!(
            (analysis_call.1, analysis_call.2),
            (ANALYSIS_TEMPERATURE, ANALYSIS_MAX_TOKENS)
        );
        assert!(!analysis_call.0.contains("테크스타"));
    }

    #[tokio::test]
    async fn test_proposal_failure_fails_the_action() {
        let generator = ScriptedGenerator::new(
            Err(failure(ProviderErrorKind::ModelUnavailable)),
            Ok("analysis".to_string()),
        );
        let err = run_proposal(&generator, &request(0.7, 4000)).await.unwrap_err();
        match err {
            AppError::Provider(e) => {
                assert_eq!(e.kind, ProviderErrorKind::ModelUnavailable);
                assert!(e.hint().is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // The analysis is dispatched regardless of how the proposal ends.
        assert_eq!(generator.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_analysis_failure_keeps_proposal() {
        let generator = ScriptedGenerator::new(
            Ok("proposal".to_string()),
            Err(failure(ProviderErrorKind::Quota)),
        );
        let outcome = run_proposal(&generator, &request(0.7, 4000)).await.unwrap();
        assert_eq!(outcome.proposal, "proposal");
        assert_eq!(outcome.analysis.unwrap_err().kind, ProviderErrorKind::Quota);
    }

    #[tokio::test]
    async fn test_generate_passes_errors_through_unchanged() {
        let generator = ScriptedGenerator::new(
            Err(failure(ProviderErrorKind::Authentication)),
            Ok(String::new()),
        );
        let config = GenerationConfig::new(ProviderId::Claude, None, 0.7, 4000).unwrap();
        let err = generate(&generator, "회사 정보", &config).await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Authentication);
        assert_eq!(err.message, "boom");
    }
}
