use crate::config::Config;
use crate::oracle::{SpellCheckClient, SpellCheckError, Suggestion};
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Client for the Bing Spell Check v7 endpoint.
///
/// Endpoint and credential both come from configuration; the pipeline never
/// carries either.
pub struct BingSpellClient {
    http: Client,
    url: String,
    api_key: String,
}

impl BingSpellClient {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.api_key.clone().context(
            "no API key configured; set api_key in the config file or SPELLSWEEP_API_KEY",
        )?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            url: config.api_url.clone(),
            api_key,
        })
    }
}

impl SpellCheckClient for BingSpellClient {
    fn check(&self, word: &str) -> Result<Suggestion, SpellCheckError> {
        let response = self
            .http
            .post(&self.url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .form(&[("text", word)])
            .send()?;

        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(SpellCheckError::RequestFailed {
                status: status.as_u16(),
                message: body,
            });
        }

        decode_body(word, &body)
    }
}

#[derive(Debug, Deserialize)]
struct SpellResponse {
    #[serde(rename = "flaggedTokens", default)]
    flagged_tokens: Vec<FlaggedToken>,
}

#[derive(Debug, Deserialize)]
struct FlaggedToken {
    #[serde(default)]
    suggestions: Vec<TokenSuggestion>,
}

#[derive(Debug, Deserialize)]
struct TokenSuggestion {
    suggestion: String,
}

/// Decode an oracle body into a suggestion. A word with no flagged tokens is
/// correct; otherwise the first suggestion of the first flagged token wins.
fn decode_body(word: &str, body: &str) -> Result<Suggestion, SpellCheckError> {
    let response: SpellResponse =
        serde_json::from_str(body).map_err(|e| SpellCheckError::MalformedResponse(e.to_string()))?;

    let proposed = response
        .flagged_tokens
        .first()
        .and_then(|token| token.suggestions.first())
        .map(|s| s.suggestion.clone())
        .unwrap_or_else(|| word.to_string());

    Ok(Suggestion(proposed))
}
