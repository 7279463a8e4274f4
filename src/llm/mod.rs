use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::filter::SearchFilter;

const SYSTEM_PROMPT: &str = r#"You are a JSON parser that extracts search parameters.
ONLY return a JSON object, no explanations.
NEVER include any text before or after the JSON.

Rules for parsing:
1. searchByName is true ONLY when searching for a specific person's name/username
2. General queries about "builders" should NOT be treated as name searches
3. If query contains score criteria, extract the number after ">" or "greater than"
4. If query contains a wallet (0x...) or passport ID, set searchById to true

The JSON must have these exact fields:
- searchByName (boolean)
- name (string)
- minScore (number | null)
- searchById (boolean)
- id (string)"#;

const WORKED_EXAMPLES: &str = r#"Parse this query into JSON. Examples:
"find thescoho" -> {"searchByName":true,"name":"thescoho","minScore":null,"searchById":false,"id":""}
"who is sailesh" -> {"searchByName":true,"name":"sailesh","minScore":null,"searchById":false,"id":""}
"find the best builders with score > 50" -> {"searchByName":false,"name":"","minScore":50,"searchById":false,"id":""}
"show me all builders" -> {"searchByName":false,"name":"","minScore":null,"searchById":false,"id":""}
"show wallet 0x09928cebb4c977c5e5db237a2a2ce5cd10497cb8" -> {"searchByName":false,"name":"","minScore":null,"searchById":true,"id":"0x09928cebb4c977c5e5db237a2a2ce5cd10497cb8"}"#;

/// Outcome of query interpretation. A failed interpretation degrades to the
/// zero-valued filter instead of erroring, so a broken or unreachable model
/// turns the request into an unfiltered listing rather than a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    Parsed(SearchFilter),
    Degraded(SearchFilter),
}

impl Interpretation {
    fn degraded() -> Self {
        Self::Degraded(SearchFilter::default())
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    pub fn into_filter(self) -> SearchFilter {
        match self {
            Self::Parsed(filter) | Self::Degraded(filter) => filter,
        }
    }
}

#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f64,
}

impl LlmClient {
    pub fn new(
        endpoint: &str,
        api_key: &str,
        model: &str,
        temperature: f64,
        timeout: Duration,
    ) -> Result<Self> {
        assert!(!endpoint.is_empty(), "LLM endpoint must be provided");
        assert!(!model.is_empty(), "LLM model must be provided");
        assert!(
            (0.0..=2.0).contains(&temperature),
            "Temperature outside sampling bounds"
        );
        assert!(
            timeout >= Duration::from_millis(100),
            "Timeout below 100ms is unsafe"
        );

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build LLM client")?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature,
        })
    }

    /// Translate a free-text query into a `SearchFilter`. Never fails: any
    /// transport or parse problem is logged and degrades to the zero filter.
    pub async fn interpret(&self, query: &str) -> Interpretation {
        match self.request_filter(query).await {
            Ok(filter) => {
                debug!(?filter, "Interpreted query");
                Interpretation::Parsed(filter)
            }
            Err(err) => {
                warn!("Query interpretation degraded to unfiltered listing: {err:#}");
                Interpretation::degraded()
            }
        }
    }

    async fn request_filter(&self, query: &str) -> Result<SearchFilter> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": format!("{WORKED_EXAMPLES}\nQuery: \"{query}\"") }
            ],
            "temperature": self.temperature,
            "response_format": { "type": "json_object" }
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Completion request failed")?;
        let json: Value = response
            .error_for_status()
            .context("Completion endpoint returned error status")?
            .json()
            .await
            .context("Completion response is not JSON")?;

        parse_filter_response(&json)
    }
}

/// Extract the model's message content and parse it as a filter. The content
/// is untrusted text; parsing can fail independently of the HTTP call.
fn parse_filter_response(response: &Value) -> Result<SearchFilter> {
    let content = response
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("Completion response is missing message content"))?;

    let parsed: Value =
        serde_json::from_str(content).context("Completion content is not valid JSON")?;
    Ok(coerce_filter(&parsed))
}

/// Field-by-field defensive coercion. The model is biased toward the right
/// types by the prompt but is not trusted to honor them.
fn coerce_filter(value: &Value) -> SearchFilter {
    SearchFilter {
        search_by_name: coerce_bool(value.get("searchByName")),
        name: coerce_string(value.get("name")),
        min_score: coerce_score(value.get("minScore")),
        search_by_id: coerce_bool(value.get("searchById")),
        id: coerce_string(value.get("id")),
    }
}

fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => text.eq_ignore_ascii_case("true"),
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

fn coerce_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    }
}

fn coerce_score(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion(content: &str) -> Value {
        serde_json::json!({
            "choices": [ { "message": { "content": content } } ]
        })
    }

    #[test]
    fn parses_name_search() {
        let response = completion(
            r#"{"searchByName":true,"name":"thescoho","minScore":null,"searchById":false,"id":""}"#,
        );
        let filter = parse_filter_response(&response).expect("filter parses");
        assert!(filter.search_by_name);
        assert_eq!(filter.name, "thescoho");
        assert_eq!(filter.min_score, None);
        assert!(!filter.wants_direct_lookup());
    }

    #[test]
    fn parses_wallet_search() {
        let response = completion(
            r#"{"searchByName":false,"name":"","minScore":null,"searchById":true,"id":"0x09928cebb4c977c5e5db237a2a2ce5cd10497cb8"}"#,
        );
        let filter = parse_filter_response(&response).expect("filter parses");
        assert!(filter.wants_direct_lookup());
        assert_eq!(filter.id, "0x09928cebb4c977c5e5db237a2a2ce5cd10497cb8");
    }

    #[test]
    fn coerces_stringly_typed_fields() {
        let response = completion(
            r#"{"searchByName":"true","name":"sailesh","minScore":"50","searchById":"false","id":""}"#,
        );
        let filter = parse_filter_response(&response).expect("filter parses");
        assert!(filter.search_by_name);
        assert!(!filter.search_by_id);
        assert_eq!(filter.min_score, Some(50.0));
    }

    #[test]
    fn missing_fields_coerce_to_zero_values() {
        let response = completion("{}");
        let filter = parse_filter_response(&response).expect("filter parses");
        assert_eq!(filter, SearchFilter::default());
    }

    #[test]
    fn rejects_non_json_content() {
        let response = completion("Here is your answer: searchByName=false");
        assert!(parse_filter_response(&response).is_err());
    }

    #[test]
    fn rejects_missing_choices() {
        let response = serde_json::json!({ "error": "overloaded" });
        assert!(parse_filter_response(&response).is_err());
    }

    #[tokio::test]
    async fn unreachable_endpoint_degrades() {
        // Bind then drop a listener so the port is known-refused.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind probe listener");
        let addr = listener.local_addr().expect("probe addr");
        drop(listener);

        let client = LlmClient::new(
            &format!("http://{addr}/v1/chat/completions"),
            "test-key",
            "llama3.1:70b",
            0.1,
            Duration::from_secs(1),
        )
        .expect("client builds");

        let interpretation = client.interpret("show me all builders").await;
        assert!(interpretation.is_degraded());
        assert_eq!(interpretation.into_filter(), SearchFilter::default());
    }
}
