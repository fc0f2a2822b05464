use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::services::{check_status, ServiceError};

/// Language codes offered by the translation panel, with their native names.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("ko", "한국어"),
    ("en", "English"),
    ("ja", "日本語"),
    ("zh", "中文"),
    ("es", "Español"),
    ("fr", "Français"),
    ("de", "Deutsch"),
    ("it", "Italiano"),
    ("pt", "Português"),
    ("ru", "Русский"),
];

/// Common résumé vocabulary used when the Korean-to-English service is unreachable.
const KO_EN_FALLBACK: &[(&str, &str)] = &[
    ("안녕하세요", "Hello"),
    ("감사합니다", "Thank you"),
    ("이력서", "Resume"),
    ("경력", "Experience"),
    ("교육", "Education"),
    ("프로젝트", "Project"),
    ("스킬", "Skills"),
    ("언어", "Languages"),
    ("자기소개", "Self Introduction"),
    ("연락처", "Contact"),
    ("주소", "Address"),
    ("전화번호", "Phone Number"),
    ("이메일", "Email"),
    ("GitHub", "GitHub"),
    ("LinkedIn", "LinkedIn"),
];

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: &str, target: &str)
        -> Result<String, ServiceError>;
}

#[derive(Debug, Serialize)]
struct LibreTranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
}

#[derive(Debug, Deserialize)]
struct LibreTranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

/// Client for a LibreTranslate-compatible `/translate` endpoint.
pub struct LibreTranslateClient {
    client: Client,
    url: String,
}

impl LibreTranslateClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Translator for LibreTranslateClient {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(&self.url)
            .json(&LibreTranslateRequest {
                q: text,
                source,
                target,
            })
            .send()
            .await?;
        let body: LibreTranslateResponse = check_status(response).await?.json().await?;
        body.translated_text
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::Parse("response has no translatedText".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationOutcome {
    pub translated_text: String,
    pub success: bool,
    /// Set on failure, and as a notice when the local dictionary was used.
    pub error: Option<String>,
}

fn fallback_translation(text: &str) -> String {
    KO_EN_FALLBACK
        .iter()
        .find(|(ko, _)| *ko == text.trim())
        .map(|(_, en)| en.to_string())
        .unwrap_or_else(|| text.to_string())
}

/// Translates `text`, degrading instead of failing.
///
/// On service failure ko→en requests fall back to the local dictionary (reported as
/// success with a notice); every other pair returns the input unchanged with `success: false`.
pub async fn translate(
    translator: &dyn Translator,
    text: &str,
    source: &str,
    target: &str,
) -> TranslationOutcome {
    match translator.translate(text, source, target).await {
        Ok(translated_text) => {
            debug!("Translated {} chars {source}->{target}", text.chars().count());
            TranslationOutcome {
                translated_text,
                success: true,
                error: None,
            }
        }
        Err(e) => {
            warn!("Translation service failed ({source}->{target}): {e}");
            if source == "ko" && target == "en" {
                TranslationOutcome {
                    translated_text: fallback_translation(text),
                    success: true,
                    error: Some(
                        "Translation service unavailable; used the built-in dictionary."
                            .to_string(),
                    ),
                }
            } else {
                TranslationOutcome {
                    translated_text: text.to_string(),
                    success: false,
                    error: Some("Translation failed. Check the translation service.".to_string()),
                }
            }
        }
    }
}

pub fn is_supported_language(code: &str) -> bool {
    SUPPORTED_LANGUAGES.iter().any(|(c, _)| *c == code)
}
