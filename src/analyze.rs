//! Best-effort packet explanation over an external text-generation service.
//!
//! A formatted prompt goes out, free-form prose comes back. This boundary has
//! no bearing on capture correctness: every failure is an ordinary error the
//! caller may ignore.

use std::time::Duration;

use serde_json::{json, Value};

use crate::models::packet::DecodedPacket;
use crate::utils::error::{AppError, AppResult};

const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";
const API_KEY_ENV: &str = "GEMINI_API_KEY";
const MAX_OUTPUT_TOKENS: u32 = 500;

/// Build the explanation prompt from one decoded packet's fields.
pub fn build_prompt(packet: &DecodedPacket) -> String {
    let hex_start: String = packet.hex_dump.chars().take(50).collect();
    format!(
        "Analyze this network packet and explain it to a network administrator:\n\
         Protocol: {}\nSource: {}\nDestination: {}\n\
         Size: {} bytes\nRisk Score: {:.1}\nHex Start: {}",
        packet.protocol,
        packet.source_endpoint(),
        packet.destination_endpoint(),
        packet.length,
        packet.risk_score,
        hex_start,
    )
}

/// HTTP client for the explanation service.
pub struct ExplainClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl ExplainClient {
    /// Reads the API key from the environment; absent key is an error the
    /// caller surfaces as status text, never a panic.
    pub fn from_env() -> AppResult<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| AppError::Explain(format!("{} is not set", API_KEY_ENV)))?;
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key,
        })
    }

    pub async fn explain(&self, prompt: &str) -> AppResult<String> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "maxOutputTokens": MAX_OUTPUT_TOKENS },
        });

        let response = self
            .http
            .post(format!("{}?key={}", self.endpoint, self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Explain(format!(
                "API error: {}",
                response.status()
            )));
        }

        let value: Value = response.json().await?;
        extract_text(&value)
            .ok_or_else(|| AppError::Explain("response carried no text".to_string()))
    }
}

fn extract_text(value: &Value) -> Option<String> {
    value
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::packet::{PacketDetail, UNKNOWN};
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn prompt_contains_packet_fields() {
        let packet = DecodedPacket {
            seq: 7,
            timestamp: Utc::now(),
            monotonic_ms: 0,
            delta_ms: 0,
            src_mac: UNKNOWN.into(),
            dst_mac: UNKNOWN.into(),
            src_addr: "10.0.0.1".into(),
            dst_addr: "10.0.0.2".into(),
            src_port: 51000,
            dst_port: 443,
            protocol: "HTTPS".into(),
            length: 1500,
            risk_score: 0.1,
            hex_dump: "AA BB CC".into(),
            ascii_dump: "...".into(),
            detail: Some(PacketDetail::default()),
            raw_data: Vec::new(),
        };
        let prompt = build_prompt(&packet);
        assert!(prompt.contains("Protocol: HTTPS"));
        assert!(prompt.contains("Source: 10.0.0.1:51000"));
        assert!(prompt.contains("Destination: 10.0.0.2:443"));
        assert!(prompt.contains("Size: 1500 bytes"));
        assert!(prompt.contains("Hex Start: AA BB CC"));
    }

    #[test]
    fn extract_text_walks_the_candidate_shape() {
        let value = json!({
            "candidates": [
                { "content": { "parts": [ { "text": "a TLS handshake" } ] } }
            ]
        });
        assert_eq!(extract_text(&value).as_deref(), Some("a TLS handshake"));
        assert_eq!(extract_text(&json!({})), None);
    }
}
