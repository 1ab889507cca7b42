//! Provider and model catalog.
//!
//! Claude models carry a fixed display rank; Groq models are shown in declaration order.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Claude,
    Groq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub max_tokens: u32,
    /// Display rank, 1 = strongest. `None` for unranked providers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u8>,
}

const CLAUDE_MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "claude-3-opus-20240229",
        name: "Claude 3 Opus",
        description: "가장 강력한 성능, 복잡한 작업에 적합",
        max_tokens: 4000,
        rank: Some(1),
    },
    ModelInfo {
        id: "claude-3-sonnet-20240229",
        name: "Claude 3 Sonnet",
        description: "균형 잡힌 성능과 속도",
        max_tokens: 4000,
        rank: Some(3),
    },
    ModelInfo {
        id: "claude-3-haiku-20240229",
        name: "Claude 3 Haiku",
        description: "빠른 속도, 간단한 작업에 적합",
        max_tokens: 4000,
        rank: Some(4),
    },
    ModelInfo {
        id: "claude-3.5-sonnet",
        name: "Claude 3.5 Sonnet",
        description: "향상된 성능의 Sonnet 모델, 복잡한 작업도 빠르게 처리",
        max_tokens: 4000,
        rank: Some(2),
    },
];

const GROQ_MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "mixtral-8x7b-32768",
        name: "Mixtral 8x7B",
        description: "최신 오픈소스 모델, 다양한 작업에 적합",
        max_tokens: 4000,
        rank: None,
    },
    ModelInfo {
        id: "llama2-70b-4096",
        name: "LLaMA 2 70B",
        description: "안정적인 성능의 대형 모델",
        max_tokens: 4000,
        rank: None,
    },
    ModelInfo {
        id: "deepseek-r1-distill-qwen-32b",
        name: "DeepSeek R1 Distill QWAN",
        description: "고성능 압축 모델, 빠른 응답 속도",
        max_tokens: 4000,
        rank: None,
    },
    ModelInfo {
        id: "qwan-2.5-coder-32b",
        name: "QWAN 2.5 Coder",
        description: "코딩 특화 모델, 기술 문서 작성에 강점",
        max_tokens: 4000,
        rank: None,
    },
];

impl ProviderId {
    pub const ALL: [ProviderId; 2] = [ProviderId::Claude, ProviderId::Groq];

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::Claude => "Claude",
            ProviderId::Groq => "Groq",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            ProviderId::Claude => "높은 품질의 텍스트 생성",
            ProviderId::Groq => "빠른 처리 속도",
        }
    }

    /// Models in display order: ranked models first by rank, unranked ones as declared.
    pub fn models(&self) -> Vec<&'static ModelInfo> {
        let declared = match self {
            ProviderId::Claude => CLAUDE_MODELS,
            ProviderId::Groq => GROQ_MODELS,
        };
        let mut models: Vec<&'static ModelInfo> = declared.iter().collect();
        models.sort_by_key(|m| m.rank.unwrap_or(u8::MAX));
        models
    }

    pub fn default_model(&self) -> &'static ModelInfo {
        // Both tables are non-empty constants.
        self.models()[0]
    }

    pub fn find_model(&self, id: &str) -> Option<&'static ModelInfo> {
        self.models().into_iter().find(|m| m.id == id)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "claude" | "anthropic" => Ok(ProviderId::Claude),
            "groq" => Ok(ProviderId::Groq),
            other => Err(format!(
                "Unknown provider '{other}'. Supported providers: claude, groq"
            )),
        }
    }
}
