use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::models::ResumeType;
use crate::storage::drafts::{DEFAULT_MAX_DRAFTS, DEFAULT_QUOTA_BYTES};
use crate::templates::get_template;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub storage_dir: PathBuf,
    pub autosave_interval: Duration,
    pub max_drafts: usize,
    pub storage_quota_bytes: u64,
    pub default_template: ResumeType,
    pub reset_after_export: bool,
    pub translate_url: String,
    pub reverse_geocode_url: String,
    pub ip_lookup_url: String,
    pub http_timeout: Duration,
    /// TrueType font for PDF text outside Latin-1 (e.g. NanumGothic.ttf).
    pub pdf_font_path: Option<PathBuf>,
    pub pdf_bold_font_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let default_template = std::env::var("DEFAULT_TEMPLATE")
            .map(ResumeType::new)
            .unwrap_or(ResumeType::CASCADE);
        get_template(&default_template).context("DEFAULT_TEMPLATE must name a known template")?;

        Ok(Config {
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            storage_dir: PathBuf::from(env_or("STORAGE_DIR", "./data")),
            autosave_interval: Duration::from_secs(
                parse_env("AUTOSAVE_INTERVAL_SECS", 30u64)
                    .context("AUTOSAVE_INTERVAL_SECS must be a number of seconds")?
                    .max(1),
            ),
            max_drafts: parse_env("MAX_DRAFTS", DEFAULT_MAX_DRAFTS)
                .context("MAX_DRAFTS must be a positive integer")?
                .max(1),
            storage_quota_bytes: parse_env("STORAGE_QUOTA_BYTES", DEFAULT_QUOTA_BYTES)
                .context("STORAGE_QUOTA_BYTES must be a byte count")?,
            default_template,
            reset_after_export: parse_env("RESET_AFTER_EXPORT", true)
                .context("RESET_AFTER_EXPORT must be true or false")?,
            translate_url: env_or("TRANSLATE_URL", "https://libretranslate.de/translate"),
            reverse_geocode_url: env_or(
                "REVERSE_GEOCODE_URL",
                "https://nominatim.openstreetmap.org/reverse",
            ),
            ip_lookup_url: env_or("IP_LOOKUP_URL", "https://ipapi.co/json/"),
            http_timeout: Duration::from_secs(
                parse_env("HTTP_TIMEOUT_SECS", 10u64)
                    .context("HTTP_TIMEOUT_SECS must be a number of seconds")?,
            ),
            pdf_font_path: optional_path("PDF_FONT_PATH"),
            pdf_bold_font_path: optional_path("PDF_BOLD_FONT_PATH"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn optional_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value '{raw}' for environment variable '{key}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_default_and_error() {
        assert_eq!(parse_env("CV_BUILDER_TEST_UNSET_VAR", 42u16).unwrap(), 42);
        std::env::set_var("CV_BUILDER_TEST_BAD_PORT", "eighty");
        assert!(parse_env::<u16>("CV_BUILDER_TEST_BAD_PORT", 8080).is_err());
        std::env::set_var("CV_BUILDER_TEST_FLAG", " false ");
        assert!(!parse_env("CV_BUILDER_TEST_FLAG", true).unwrap());
    }

    #[test]
    fn test_optional_path_ignores_blank() {
        assert_eq!(optional_path("CV_BUILDER_TEST_UNSET_FONT"), None);
        std::env::set_var("CV_BUILDER_TEST_BLANK_FONT", "  ");
        assert_eq!(optional_path("CV_BUILDER_TEST_BLANK_FONT"), None);
        std::env::set_var("CV_BUILDER_TEST_FONT", "/fonts/NanumGothic.ttf");
        assert_eq!(
            optional_path("CV_BUILDER_TEST_FONT"),
            Some(PathBuf::from("/fonts/NanumGothic.ttf"))
        );
    }
}
