use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};

use super::session::AnalysisSession;
use crate::config::Config;

const SYSTEM_PROMPT: &str = "You are a concise dataset assistant. Answer briefly using only the provided context. Do NOT hallucinate missing info.";
const MAX_TOKENS: u32 = 300;
const DISTRIBUTION_CONTEXT_LIMIT: usize = 5;

/// Client for the Fireworks chat completions API. Built once at startup and
/// shared; the underlying reqwest client pools connections.
pub struct LlmGateway {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
}

impl LlmGateway {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.fireworks_url.clone(),
            api_key: config.fireworks_api_key.clone(),
            model: config.fireworks_model.clone(),
        }
    }

    /// Answer a question about an analyzed dataset. Model failures degrade
    /// to a plain-text notice instead of an error, the report itself is
    /// still useful without the model.
    pub async fn answer_about_dataset(&self, session: &AnalysisSession, question: &str) -> String {
        match self.ask(session, question).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!("model call failed: {:#}", e);
                format!(
                    "[MODEL ERROR] {}. You can still inspect correlations, summary stats, and distributions in the EDA report.",
                    e
                )
            }
        }
    }

    async fn ask(&self, session: &AnalysisSession, question: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("FIREWORKS_API_KEY is not configured"))?;

        let context = minimal_context(session);
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {
                    "role": "user",
                    "content": format!("Context:\n{}\n\nQuestion: {}", context, question),
                },
            ],
            "temperature": 0.0,
            "max_tokens": MAX_TOKENS,
            "stream": false,
        });

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .context("request to model endpoint failed")?
            .error_for_status()
            .context("model endpoint returned an error status")?;

        let payload: Value = response
            .json()
            .await
            .context("model response was not valid JSON")?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| anyhow!("model response had no message content"))
    }
}

/// Compact report slice sent as chat context. Keeping it small holds the
/// prompt well under the model's context window even for wide datasets.
fn minimal_context(session: &AnalysisSession) -> String {
    let report = &session.report;
    let context = json!({
        "dataset_name": session.dataset_name,
        "summary": report.summary,
        "top_correlations": report.correlation_top,
        "distribution": report
            .distribution_summary
            .iter()
            .take(DISTRIBUTION_CONTEXT_LIMIT)
            .collect::<Vec<_>>(),
        "quality_flags": report.quality_flags,
        "ml_recommendations": report.ml_recommendations,
    });
    serde_json::to_string(&context).unwrap_or_default()
}
