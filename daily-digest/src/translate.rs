use crate::config::TranslateConfig;
use crate::rss_utils::text;
use crate::types::{DigestError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Best-effort text translation.
///
/// Implementations never fail: on any problem they hand back the input.
#[async_trait]
pub trait Translator: Send + Sync {
    fn translator_name(&self) -> String;

    async fn translate(&self, text: &str) -> String;
}

/// Leaves text untouched. Used when translation is disabled and in tests.
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    fn translator_name(&self) -> String {
        "passthrough".to_string()
    }

    async fn translate(&self, text: &str) -> String {
        text.to_string()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    response_status: serde_json::Value,
    response_data: Option<MyMemoryData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryData {
    translated_text: Option<String>,
}

/// Client for the free MyMemory translation API.
pub struct MyMemoryTranslator {
    client: Client,
    api_url: String,
    target: String,
    max_chars: usize,
}

impl MyMemoryTranslator {
    pub fn new(config: &TranslateConfig, target: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            target,
            max_chars: config.max_chars,
        })
    }

    /// GET URL for one translation request; the query is cut to the
    /// configured length.
    pub fn request_url(&self, text: &str) -> Result<Url> {
        let query = text::truncate_chars(text, self.max_chars);
        let langpair = format!("en|{}", self.target);
        let url = Url::parse_with_params(&self.api_url, &[("q", query.as_str()), ("langpair", langpair.as_str())])?;
        Ok(url)
    }

    async fn request(&self, text: &str) -> Result<String> {
        let url = self.request_url(text)?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DigestError::HttpStatus {
                status: status.as_u16(),
                url: self.api_url.clone(),
            });
        }

        let body: MyMemoryResponse = response.json().await?;
        let ok = body.response_status == 200 || body.response_status == "200";
        match (ok, body.response_data.and_then(|d| d.translated_text)) {
            (true, Some(translated)) if !translated.is_empty() => Ok(translated),
            _ => Err(DigestError::General(format!(
                "translation rejected with status {}",
                body.response_status
            ))),
        }
    }
}

#[async_trait]
impl Translator for MyMemoryTranslator {
    fn translator_name(&self) -> String {
        format!("MyMemory (en|{})", self.target)
    }

    async fn translate(&self, text: &str) -> String {
        if text.chars().count() < 2 || text::is_mostly_chinese(text) {
            return text.to_string();
        }

        match self.request(text).await {
            Ok(translated) => {
                debug!("Translated {} chars", text.len());
                translated
            }
            Err(e) => {
                warn!("Translation failed, keeping original text: {}", e);
                text.to_string()
            }
        }
    }
}

/// Translator selected by configuration.
pub fn from_config(config: &TranslateConfig) -> Result<Box<dyn Translator>> {
    match config.target.clone() {
        Some(target) => Ok(Box::new(MyMemoryTranslator::new(config, target)?)),
        None => Ok(Box::new(PassthroughTranslator)),
    }
}
