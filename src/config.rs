// Application configuration, loaded from environment variables and CLI flags.

use std::path::PathBuf;
use std::time::Duration;

use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// API key for the hosted model. Without it the external tier is skipped.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    /// Upper bound on a single model request.
    pub llm_timeout: Duration,
    /// HTML page served at `/`.
    pub index_file: PathBuf,
    /// Directory of extra static assets, served as a fallback.
    pub static_dir: Option<PathBuf>,
    /// JSON file replacing the built-in puzzle templates.
    pub templates_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_base_url: DEFAULT_BASE_URL.to_string(),
            llm_timeout: Duration::from_secs(20),
            index_file: PathBuf::from("LUKU-AI.html"),
            static_dir: None,
            templates_file: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `GEMINI_API_KEY` - hosted model API key
    /// - `GEMINI_MODEL` - model name (default: `gemini-1.5-flash`)
    /// - `GEMINI_BASE_URL` - API base URL
    /// - `LLM_TIMEOUT_SECS` - model request timeout (default: 20)
    /// - `INDEX_FILE` - page served at `/` (default: `LUKU-AI.html`)
    /// - `STATIC_DIR` - directory of static assets
    /// - `TEMPLATES_FILE` - JSON puzzle template table
    ///
    /// CLI flags:
    /// - `--port <PORT>` - Override the port
    /// - `--templates <PATH>` - Override the template file
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    fn from_sources(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        // Port: CLI flag --port takes precedence, then env var, then default
        let port = Self::parse_cli_value(args, "--port")
            .and_then(|v| v.parse().ok())
            .or_else(|| env("PORT").and_then(|v| v.parse().ok()))
            .unwrap_or(defaults.port);

        let gemini_api_key = env("GEMINI_API_KEY").filter(|k| !k.trim().is_empty());

        let llm_timeout = env("LLM_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .filter(|secs: &u64| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.llm_timeout);

        let templates_file = Self::parse_cli_value(args, "--templates")
            .or_else(|| env("TEMPLATES_FILE"))
            .map(PathBuf::from);

        Config {
            port,
            gemini_api_key,
            gemini_model: env("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: env("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            llm_timeout,
            index_file: env("INDEX_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.index_file),
            static_dir: env("STATIC_DIR").map(PathBuf::from),
            templates_file,
        }
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}
