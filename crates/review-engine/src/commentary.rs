//! Optional natural-language commentary from an OpenAI-compatible chat
//! endpoint. Auxiliary output only: failures degrade to `None` and the
//! numeric review never depends on it.

use reqwest::Client;
use serde_json::{json, Value};
use tracing::warn;

use crate::config::CommentaryConfig;

const PROMPT_TEMPLATE: &str = "You are tasked with reviewing a chess game in PGN format: {pgn}. \
Please provide the analysis in JSON format with the following structure:\n\
{\n\
  \"summary\": \"Brief game summary\",\n\
  \"move_reviews\": [\n\
    {\"move\": \"e4\", \"evaluation\": \"Good\", \"commentary\": \"Solid central control\"}\n\
  ],\n\
  \"biggest_blunders\": {\"white\": \"Qxb7\", \"black\": \"None\"},\n\
  \"recommendations\": {\"white\": \"...\", \"black\": \"...\"}\n\
}\n\
Make sure the JSON is well-formatted and does not contain any invalid content.";

pub struct CommentaryClient {
    client: Client,
    config: CommentaryConfig,
}

impl CommentaryClient {
    pub fn new(config: CommentaryConfig) -> Self {
        let client = Client::builder()
            .user_agent("review-engine/0.1")
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap();
        Self { client, config }
    }

    /// Ask the model for a structured review of the PGN. Any failure is
    /// reported as `None` so the numeric review still stands alone.
    pub async fn review_pgn(&self, pgn: &str) -> Option<Value> {
        match self.request(pgn).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "Commentary request failed");
                None
            }
        }
    }

    async fn request(&self, pgn: &str) -> Result<Value, String> {
        let prompt = PROMPT_TEMPLATE.replace("{pgn}", pgn);
        let body = json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 1,
            "max_tokens": 4096,
        });

        let resp = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("request error: {e}"))?;

        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| format!("JSON parse error: {e}"))?;

        let content = data["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| "missing message content".to_string())?;

        extract_json(content).ok_or_else(|| "no JSON object in reply".to_string())
    }
}

/// Pull the first JSON object out of a chat reply, tolerating code fences
/// and prose around it.
fn extract_json(reply: &str) -> Option<Value> {
    let cleaned = reply.replace("```json", "").replace("```", "");
    let start = cleaned.find('{')?;
    serde_json::Deserializer::from_str(&cleaned[start..])
        .into_iter::<Value>()
        .next()?
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_json() {
        let v = extract_json(r#"{"summary": "solid game"}"#).unwrap();
        assert_eq!(v["summary"], "solid game");
    }

    #[test]
    fn test_extract_fenced_json_with_prose() {
        let reply = "Here is the review:\n```json\n{\"summary\": \"wild game\"}\n```\nEnjoy!";
        let v = extract_json(reply).unwrap();
        assert_eq!(v["summary"], "wild game");
    }

    #[test]
    fn test_extract_rejects_braceless_reply() {
        assert!(extract_json("no structured data here").is_none());
    }
}
