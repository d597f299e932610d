// Client for the hosted language model, plus the prompts we send it.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::characters::Character;
use crate::error::LlmError;
use crate::metrics;

pub const SYSTEM_PROMPT: &str = "أنت مساعد باسم \"LUKU AI\"، مختص بالكامل في الألعاب، الألغاز، الأسئلة المنطقية.
إذا سُئلت عن شيء خارج هذا المجال، اكتب: \"عذرًا أنا مساعد LUKU AI مختص في الألعاب والألغاز فقط.\"
كن مرحًا وابتكر ألغاز وأسئلة ذكاء ممتعة، استخدم الإيموجيات بشكل مناسب.
قدم الألغاز بناءً على المجال ومستوى الصعوبة المحدد.";

pub const PROBE_PROMPT: &str = "قل 'مرحبًا من LUKU AI' بالعربية فقط بدون أي شرح إضافي";

/// Anything that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<String, LlmError>;

    /// Whether the generator has what it needs to make requests.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Prompt for a free-form chat turn.
pub fn chat_prompt(message: &str, category: &str, level: &str, character: &Character) -> String {
    format!(
        "{SYSTEM_PROMPT}\n\n\
         الشخصية: {} {} - {}\n\
         المجال: {category}\n\
         مستوى الصعوبة: {level}\n\n\
         رسالة المستخدم: {message}\n\n\
         قم بالرد بلغة العربية وبشكل مرح وجذاب مع الإيموجيات المناسبة:",
        character.emoji, character.name, character.style
    )
}

/// Prompt asking the model for a single new puzzle.
pub fn puzzle_prompt(category: &str, level: &str, character: &Character) -> String {
    format!(
        "{SYSTEM_PROMPT}\n\n\
         ابتكر لغزًا واحدًا جديدًا وأصليًا.\n\
         المجال: {category}\n\
         مستوى الصعوبة: {level}\n\
         أسلوب الشخصية: {}\n\n\
         اكتب اللغز فقط بدون الحل، وبالعربية، مع إيموجي مناسب.",
        character.style
    )
}

// ── Gemini REST client ───────────────────────────────────────────────

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Calls the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.is_empty()),
            model: model.into(),
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    async fn call(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let resp = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = resp.json().await?;
        parsed.text().ok_or(LlmError::EmptyResponse)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        let started = Instant::now();
        let result = self.call(prompt).await;
        metrics::LLM_REQUEST_DURATION_SECONDS.observe(started.elapsed().as_secs_f64());

        let outcome = match &result {
            Ok(_) => "ok",
            Err(LlmError::MissingApiKey) => "unconfigured",
            Err(_) => "error",
        };
        metrics::LLM_REQUESTS_TOTAL
            .with_label_values(&[outcome])
            .inc();
        if let Err(e) = &result {
            tracing::error!(model = %self.model, "Gemini request failed: {e}");
        }
        result
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, if non-blank.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characters;

    #[test]
    fn test_chat_prompt_contains_context() {
        let prompt = chat_prompt("أعطني لغزًا", "رياضة", "صعب", characters::resolve("wizard"));
        assert!(prompt.starts_with(SYSTEM_PROMPT));
        assert!(prompt.contains("المجال: رياضة"));
        assert!(prompt.contains("مستوى الصعوبة: صعب"));
        assert!(prompt.contains("أعطني لغزًا"));
        assert!(prompt.contains(characters::resolve("wizard").style));
    }

    #[test]
    fn test_puzzle_prompt() {
        let prompt = puzzle_prompt("فلك", "سهل", characters::resolve("luku"));
        assert!(prompt.contains("المجال: فلك"));
        assert!(prompt.contains("مستوى الصعوبة: سهل"));
    }

    #[test]
    fn test_parse_response_text() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"  لغز "},{"text":"رائع"}]}}]}"#;
        let resp: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.text().as_deref(), Some("لغز رائع"));
    }

    #[test]
    fn test_parse_response_without_candidates() {
        let resp: GenerateResponse = serde_json::from_str(r#"{"promptFeedback":{}}"#).unwrap();
        assert!(resp.text().is_none());

        let resp: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(resp.text().is_none());
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new(
            Some("k".into()),
            "gemini-1.5-flash",
            "https://example.test/v1beta/",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert!(client.is_configured());
    }

    #[tokio::test]
    async fn test_transport_error_hides_api_key() {
        let key = "SECRET_KEY_123";
        let client = GeminiClient::new(
            Some(key.into()),
            DEFAULT_MODEL,
            "http://127.0.0.1:1/v1beta",
            Duration::from_secs(2),
        )
        .unwrap();
        let err = client.generate_text("hi").await.unwrap_err();
        assert!(matches!(err, LlmError::Http(_)));
        assert!(!format!("{err}").contains(key));
        assert!(!format!("{err:?}").contains(key));
        assert!(!format!("{err}").contains("127.0.0.1"));
    }

    #[tokio::test]
    async fn test_missing_key_fails_fast() {
        let client =
            GeminiClient::new(Some(String::new()), DEFAULT_MODEL, DEFAULT_BASE_URL, Duration::from_secs(1))
                .unwrap();
        assert!(!client.is_configured());
        let err = client.generate_text("hi").await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }
}
