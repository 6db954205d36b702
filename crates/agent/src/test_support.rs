//! Shared scripted collaborators for pipeline tests.

use docent_core::error::ProviderError;
use docent_core::message::{Message, ToolRequest};
use docent_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use std::sync::Mutex;

/// A provider that replays a scripted response sequence.
///
/// Each call to `complete` records the request it received and returns
/// the next response in the queue. Panics if more calls are made than
/// responses provided.
pub struct ScriptedProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
    served: Mutex<usize>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            served: Mutex::new(0),
        }
    }

    /// Every request seen so far, in call order.
    pub fn recorded_requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        *self.served.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);

        let mut served = self.served.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        if *served >= responses.len() {
            panic!(
                "ScriptedProvider: no more responses (call #{}, have {})",
                *served,
                responses.len()
            );
        }
        let response = responses[*served].clone();
        *served += 1;
        Ok(response)
    }
}

/// A provider that fails every call and counts the attempts.
pub struct FailingProvider {
    calls: Mutex<usize>,
}

impl FailingProvider {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(
        &self,
        _request: ProviderRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        *self.calls.lock().unwrap() += 1;
        Err(ProviderError::Network("connection refused".into()))
    }
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Create a probe response carrying tool calls and optional thought content.
pub fn make_tool_call_response(tool_calls: Vec<ToolRequest>, thought: &str) -> ProviderResponse {
    let mut message = Message::assistant(thought);
    message.tool_calls = tool_calls;
    ProviderResponse {
        message,
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Helper to create one requested tool invocation.
pub fn make_tool_call(name: &str, args: serde_json::Value) -> ToolRequest {
    ToolRequest {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}
