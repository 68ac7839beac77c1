use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use medai_config::ModelSettings;
use medai_contracts::{
    error::{MedaiError, MedaiResult},
    flow::CompletionRequest,
};
use medai_core::traits::ModelClient;

/// Blocking client for an Ollama-compatible completion endpoint.
pub struct HttpModelClient {
    base_url: String,
    model: String,
    system_prompt: String,
    api_key: Option<String>,
    timeout_secs: u64,
    client: reqwest::blocking::Client,
}

/// Request body for `/api/generate`.
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    /// Structured-output hint: the JSON Schema the answer should follow.
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a Value>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<TaggedModel>,
}

#[derive(Deserialize)]
struct TaggedModel {
    name: String,
}

impl HttpModelClient {
    /// Build a client from the `[model]` configuration section.
    ///
    /// The bearer token, if any, is read from the environment here, once.
    pub fn new(settings: &ModelSettings) -> MedaiResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| MedaiError::ConfigError {
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            system_prompt: settings.system_prompt.clone(),
            api_key: settings.api_key(),
            timeout_secs: settings.timeout_secs,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Names of the models the endpoint has installed.
    pub fn list_models(&self) -> MedaiResult<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .authorized(self.client.get(&url))
            .send()
            .map_err(|e| self.transport_error(e))?;

        let tags: TagsResponse = Self::read_json(response)?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    fn authorized(&self, builder: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.api_key {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> MedaiError {
        if e.is_connect() {
            MedaiError::ModelUnavailable {
                endpoint: self.base_url.clone(),
            }
        } else if e.is_timeout() {
            MedaiError::ModelRequest {
                reason: format!("request timed out after {}s", self.timeout_secs),
            }
        } else {
            MedaiError::ModelRequest {
                reason: e.to_string(),
            }
        }
    }

    fn read_json<T: for<'de> Deserialize<'de>>(response: reqwest::blocking::Response) -> MedaiResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(MedaiError::ModelRequest {
                reason: format!("endpoint returned HTTP {}: {}", status.as_u16(), body.trim()),
            });
        }
        response.json().map_err(|e| MedaiError::MalformedResponse {
            reason: format!("endpoint reply is not the expected JSON: {e}"),
        })
    }
}

impl ModelClient for HttpModelClient {
    fn complete(&self, request: &CompletionRequest) -> MedaiResult<String> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt: &request.prompt,
            system: Some(self.system_prompt.as_str()).filter(|s| !s.is_empty()),
            stream: false,
            format: Some(&request.output_schema).filter(|v| !v.is_null()),
        };

        debug!(flow = %request.flow, model = %self.model, %url, "sending completion request");
        let response = self
            .authorized(self.client.post(&url))
            .json(&body)
            .send()
            .map_err(|e| {
                let err = self.transport_error(e);
                warn!(flow = %request.flow, error = %err, "completion request failed");
                err
            })?;

        let parsed: GenerateResponse = Self::read_json(response)?;
        Ok(parsed.response)
    }

    fn model_name(&self) -> String {
        self.model.clone()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn settings(base_url: &str) -> ModelSettings {
        ModelSettings {
            base_url: base_url.to_string(),
            ..ModelSettings::default()
        }
    }

    #[test]
    fn constructor_trims_trailing_slash() {
        let client = HttpModelClient::new(&settings("http://localhost:11434/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
        assert_eq!(client.model_name(), "llama3.1");
    }

    /// The output schema travels as Ollama's `format` field and streaming is off.
    #[test]
    fn generate_body_carries_schema_and_disables_streaming() {
        let schema = json!({ "type": "object", "required": ["answer"] });
        let body = GenerateRequest {
            model: "llama3.1",
            prompt: "Question: why?",
            system: Some("Answer in JSON."),
            stream: false,
            format: Some(&schema),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["stream"], false);
        assert_eq!(value["format"]["required"][0], "answer");
        assert_eq!(value["system"], "Answer in JSON.");
    }

    #[test]
    fn empty_system_and_null_schema_are_omitted() {
        let body = GenerateRequest {
            model: "m",
            prompt: "p",
            system: None,
            stream: false,
            format: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("system").is_none());
        assert!(value.get("format").is_none());
    }

    #[test]
    fn tags_response_decodes_model_names() {
        let tags: TagsResponse =
            serde_json::from_str(r#"{"models":[{"name":"llama3.1:latest","size":1},{"name":"medgemma"}]}"#)
                .unwrap();
        let names: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["llama3.1:latest", "medgemma"]);
    }
}
