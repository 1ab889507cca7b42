//! Prompt Builder: renders the proposal and analysis prompts.
//!
//! Pure and deterministic: the same announcement and profile always render the same
//! bytes. The announcement is embedded whole; context limits are the provider's problem.

use crate::errors::AppError;
use crate::extraction::AnnouncementText;
use crate::models::profile::CompanyProfile;
use crate::proposal::prompts::{ANALYSIS_PROMPT_TEMPLATE, PROPOSAL_PROMPT_TEMPLATE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTemplate {
    Proposal,
    Analysis,
}

/// Renders `template`. The analysis template never reads `profile`.
pub fn build_prompt(
    template: PromptTemplate,
    announcement: &AnnouncementText,
    profile: &CompanyProfile,
) -> Result<String, AppError> {
    match template {
        PromptTemplate::Proposal => proposal_prompt(announcement, profile),
        PromptTemplate::Analysis => Ok(analysis_prompt(announcement)),
    }
}

pub fn proposal_prompt(
    announcement: &AnnouncementText,
    profile: &CompanyProfile,
) -> Result<String, AppError> {
    let company_info = profile
        .to_prompt_json()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize profile: {e}")))?;

    Ok(render(
        PROPOSAL_PROMPT_TEMPLATE,
        &[
            ("announcement_text", announcement.as_str()),
            ("company_info", &company_info),
        ],
    ))
}

pub fn analysis_prompt(announcement: &AnnouncementText) -> String {
    render(
        ANALYSIS_PROMPT_TEMPLATE,
        &[("announcement_text", announcement.as_str())],
    )
}

/// Single-pass `{key}` substitution. Substituted text is never scanned again, so an
/// announcement that happens to contain `{company_info}` stays literal.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after_brace = &rest[start + 1..];

        let hit = values.iter().find_map(|&(key, value)| {
            after_brace
                .strip_prefix(key)
                .and_then(|tail| tail.strip_prefix('}'))
                .map(|tail| (value, tail))
        });

        match hit {
            Some((value, tail)) => {
                out.push_str(value);
                rest = tail;
            }
            None => {
                out.push('{');
                rest = after_brace;
            }
        }
    }

    out.push_str(rest);
    out
}
