//! A scripted model client.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use medai_contracts::{
    error::{MedaiError, MedaiResult},
    flow::CompletionRequest,
};
use medai_core::traits::ModelClient;

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail(String),
    Unreachable,
}

/// Answers each request from a script keyed by flow name.
///
/// Flows without a scripted reply get the default reply. Every request is
/// recorded and can be inspected through [`MockModelClient::requests`].
#[derive(Debug, Clone)]
pub struct MockModelClient {
    by_flow: HashMap<String, Reply>,
    default: Reply,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockModelClient {
    /// Answer every request with `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_default(Reply::Text(text.into()))
    }

    /// Fail every request with `ModelRequest { reason }`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::with_default(Reply::Fail(reason.into()))
    }

    /// Fail every request with `ModelUnavailable`.
    pub fn unreachable() -> Self {
        Self::with_default(Reply::Unreachable)
    }

    /// Answer requests from `flow` with `text`, leaving other flows alone.
    pub fn with_flow_response(mut self, flow: impl Into<String>, text: impl Into<String>) -> Self {
        self.by_flow.insert(flow.into(), Reply::Text(text.into()));
        self
    }

    /// A shared handle on every request received so far.
    pub fn requests(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        Arc::clone(&self.requests)
    }

    fn with_default(default: Reply) -> Self {
        Self {
            by_flow: HashMap::new(),
            default,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl ModelClient for MockModelClient {
    fn complete(&self, request: &CompletionRequest) -> MedaiResult<String> {
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.clone());
        }

        let reply = self.by_flow.get(&request.flow).unwrap_or(&self.default);
        debug!(flow = %request.flow, "scripted model reply");
        match reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail(reason) => Err(MedaiError::ModelRequest {
                reason: reason.clone(),
            }),
            Reply::Unreachable => Err(MedaiError::ModelUnavailable {
                endpoint: "mock://offline".to_string(),
            }),
        }
    }

    fn model_name(&self) -> String {
        "scripted".to_string()
    }
}
