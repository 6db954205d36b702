//! Tool trait — named, logged operations the handlers can invoke.
//!
//! Every tool takes one free-text argument and returns formatted text.
//! The registry records each invocation (tool name, input, truncated
//! output) before the result is handed back; a failure to record never
//! blocks the result.

use crate::error::ToolError;
use crate::provider::ToolDefinition;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Longest output prefix kept in a usage-log entry.
const LOG_OUTPUT_LIMIT: usize = 200;

/// The core Tool trait.
///
/// Tools share a uniform contract: one named text argument in,
/// formatted text out. The JSON definition advertised to the model is
/// derived from that contract.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "calculator").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// The name of the single text argument (e.g., "expression").
    fn input_param(&self) -> &str;

    /// Run the tool on the given input.
    async fn invoke(&self, input: &str) -> std::result::Result<String, ToolError>;

    /// The definition sent to the model.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    (self.input_param()): { "type": "string" }
                },
                "required": [self.input_param()]
            }),
        }
    }
}

/// One recorded tool invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInvocation {
    pub tool: String,
    pub input: String,
    /// Output text on success, error text on failure. Truncated.
    pub output: String,
    pub at: DateTime<Utc>,
}

/// A registry of available tools.
///
/// The handlers use this to:
/// 1. Get tool definitions for the probe call
/// 2. Invoke tools the model requested, in request order
///
/// Every invocation lands in the usage log.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
    log: Mutex<Vec<ToolInvocation>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// All tool definitions.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Definitions for the named tools, in the given order. Unknown
    /// names are skipped.
    pub fn definitions_for(&self, names: &[&str]) -> Vec<ToolDefinition> {
        names
            .iter()
            .filter_map(|n| self.tools.get(*n).map(|t| t.definition()))
            .collect()
    }

    /// Invoke a tool by name and record the invocation.
    pub async fn invoke(
        &self,
        name: &str,
        input: &str,
    ) -> std::result::Result<String, ToolError> {
        let outcome = match self.tools.get(name) {
            Some(tool) => tool.invoke(input).await,
            None => Err(ToolError::NotFound(name.to_string())),
        };

        let summary = match &outcome {
            Ok(output) => truncate_for_log(output),
            Err(err) => truncate_for_log(&err.to_string()),
        };
        debug!(tool = name, input = input, output = %summary, ok = outcome.is_ok(), "tool invoked");
        self.record(ToolInvocation {
            tool: name.to_string(),
            input: input.to_string(),
            output: summary,
            at: Utc::now(),
        });

        outcome
    }

    /// List all registered tool names, sorted for stable display.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// A snapshot of every recorded invocation, oldest first.
    pub fn usage_log(&self) -> Vec<ToolInvocation> {
        match self.log.lock() {
            Ok(log) => log.clone(),
            Err(_) => Vec::new(),
        }
    }

    fn record(&self, entry: ToolInvocation) {
        match self.log.lock() {
            Ok(mut log) => log.push(entry),
            // a poisoned log must not block the tool result
            Err(_) => warn!(tool = %entry.tool, "usage log unavailable, dropping entry"),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate_for_log(text: &str) -> String {
    if text.len() <= LOG_OUTPUT_LIMIT {
        return text.to_string();
    }
    let mut cut = LOG_OUTPUT_LIMIT;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &text[..cut])
}
