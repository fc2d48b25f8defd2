//! Minimal French Wiktionary lookup client.
//!
//! This crate answers one question: does a page exist for this word on
//! fr.wiktionary.org? It talks to the MediaWiki query API and reports
//! missing pages as a normal (non-error) result.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

const API_BASE: &str = "https://fr.wiktionary.org/w/api.php";
const WIKI_BASE: &str = "https://fr.wiktionary.org/wiki";
const USER_AGENT: &str = concat!("chiffres-lettres/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur when querying Wiktionary.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Cannot look up an empty word")]
    EmptyWord,
}

/// Wiktionary API client.
#[derive(Debug, Clone)]
pub struct Wiktionary {
    client: reqwest::Client,
    api_base: String,
}

impl Wiktionary {
    /// Create a client pointed at the public French Wiktionary.
    pub fn new() -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: API_BASE.to_string(),
        })
    }

    /// Create a client, honoring `WIKTIONARY_API_URL` if it is set.
    pub fn from_env() -> Result<Self, Error> {
        let client = Self::new()?;
        match std::env::var("WIKTIONARY_API_URL") {
            Ok(url) if !url.trim().is_empty() => Ok(client.with_api_base(url)),
            _ => Ok(client),
        }
    }

    /// Override the API endpoint (mirrors, test servers).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Look up a word and report whether a page exists for it.
    #[instrument(skip(self))]
    pub async fn check_word(&self, word: &str) -> Result<WordLookup, Error> {
        let title = normalize_word(word)?;

        let response = self
            .client
            .get(&self.api_base)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("titles", title.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let exists = parse_query_response(&body, &title)?;
        debug!(word = %title, exists, "Wiktionary lookup finished");

        Ok(WordLookup {
            url: page_url(&title),
            word: title,
            exists,
        })
    }
}

// ============================================================================
// Public types
// ============================================================================

/// Outcome of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordLookup {
    /// The word as it was queried (lowercased, trimmed).
    pub word: String,
    /// Whether Wiktionary has a page for the word.
    pub exists: bool,
    /// Link to the word's page.
    pub url: String,
}

/// Link to the Wiktionary page for a word.
pub fn page_url(word: &str) -> String {
    format!("{WIKI_BASE}/{}", word.trim().to_lowercase())
}

fn normalize_word(word: &str) -> Result<String, Error> {
    let word = word.trim().to_lowercase();
    if word.is_empty() {
        return Err(Error::EmptyWord);
    }
    Ok(word)
}

// ============================================================================
// API types (internal)
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiResponse {
    query: Option<ApiQuery>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiQuery {
    #[serde(default)]
    pages: Vec<ApiPage>,
}

#[derive(Debug, Deserialize)]
struct ApiPage {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    info: String,
}

/// Decide from a `formatversion=2` query reply whether `title` exists.
fn parse_query_response(body: &str, title: &str) -> Result<bool, Error> {
    let reply: ApiResponse =
        serde_json::from_str(body).map_err(|e| Error::Parse(e.to_string()))?;

    if let Some(error) = reply.error {
        return Err(Error::Api {
            status: 200,
            message: format!("{}: {}", error.code, error.info),
        });
    }

    let query = reply
        .query
        .ok_or_else(|| Error::Parse("reply has no query section".to_string()))?;

    let page = query
        .pages
        .iter()
        .find(|p| p.title.to_lowercase() == title)
        .or_else(|| query.pages.first())
        .ok_or_else(|| Error::Parse("reply has no pages".to_string()))?;

    Ok(!page.missing && !page.invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = Wiktionary::new().unwrap();
        assert_eq!(client.api_base, API_BASE);
    }

    #[test]
    fn test_client_with_api_base() {
        let client = Wiktionary::new()
            .unwrap()
            .with_api_base("http://localhost:8080/api.php");
        assert_eq!(client.api_base, "http://localhost:8080/api.php");
    }

    #[test]
    fn test_page_url() {
        assert_eq!(page_url("MAISON"), "https://fr.wiktionary.org/wiki/maison");
        assert_eq!(page_url(" Arbre "), "https://fr.wiktionary.org/wiki/arbre");
    }

    #[test]
    fn test_parse_existing_page() {
        let body = r#"{"batchcomplete":true,"query":{"pages":[{"pageid":1234,"ns":0,"title":"maison"}]}}"#;
        assert!(parse_query_response(body, "maison").unwrap());
    }

    #[test]
    fn test_parse_missing_page() {
        let body = r#"{"batchcomplete":true,"query":{"pages":[{"ns":0,"title":"xqzt","missing":true}]}}"#;
        assert!(!parse_query_response(body, "xqzt").unwrap());
    }

    #[test]
    fn test_parse_invalid_title() {
        let body = r#"{"query":{"pages":[{"title":"a|b","invalidreason":"bad","invalid":true}]}}"#;
        assert!(!parse_query_response(body, "a|b").unwrap());
    }

    #[test]
    fn test_parse_api_error() {
        let body = r#"{"error":{"code":"badvalue","info":"Unrecognized value"}}"#;
        let err = parse_query_response(body, "maison").unwrap_err();
        assert!(matches!(err, Error::Api { .. }));
        assert!(err.to_string().contains("badvalue"));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_query_response("<html>", "maison"),
            Err(Error::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_word_rejected() {
        let client = Wiktionary::new().unwrap();
        let result = client.check_word("   ").await;
        assert!(matches!(result, Err(Error::EmptyWord)));
    }
}
