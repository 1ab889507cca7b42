//! Download artifacts for a generated proposal: the same text as `.txt` and `.md`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

const FILE_STEM_SUFFIX: &str = "_사업계획서";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Txt,
    Md,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Txt, ExportFormat::Md];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Md => "md",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "text/plain; charset=utf-8",
            ExportFormat::Md => "text/markdown; charset=utf-8",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub format: ExportFormat,
    pub file_name: String,
    pub mime_type: &'static str,
    pub content: String,
}

impl Artifact {
    pub fn new(company_name: &str, format: ExportFormat, content: &str) -> Self {
        Self {
            format,
            file_name: file_name(company_name, format),
            mime_type: format.mime_type(),
            content: content.to_string(),
        }
    }

    /// `Content-Disposition` value with an ASCII fallback and an RFC 5987 UTF-8 name.
    pub fn content_disposition(&self) -> String {
        let fallback: String = self
            .file_name
            .chars()
            .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
            .collect();
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            utf8_percent_encode(&self.file_name, ATTR_CHAR_ESCAPES)
        )
    }
}

/// Both artifacts for one proposal; their contents are identical.
pub fn proposal_artifacts(company_name: &str, proposal: &str) -> Vec<Artifact> {
    ExportFormat::ALL
        .iter()
        .map(|&format| Artifact::new(company_name, format, proposal))
        .collect()
}

/// `{company}_사업계획서.{ext}`, with path separators and control characters replaced.
pub fn file_name(company_name: &str, format: ExportFormat) -> String {
    let stem: String = company_name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{stem}{FILE_STEM_SUFFIX}.{}", format.extension())
}

/// RFC 5987 `attr-char`: alphanumerics plus `!#$&+-.^_`|~` pass through unencoded.
const ATTR_CHAR_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');
