use crate::provider::{ToolCall, ToolSpec};
use serde_json::Value;
use std::collections::BTreeMap;

pub const TOOL_SUCCESS: &str = "true";
pub const TOOL_FAILURE: &str = "false";

/// Handlers report success as a boolean, which the model sees as
/// `true`/`false`.
pub type ToolHandler = Box<dyn Fn(&Value) -> bool>;

struct RegisteredTool {
    spec: ToolSpec,
    handler: ToolHandler,
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering a name twice replaces the earlier handler.
    pub fn register_tool<F>(&mut self, spec: ToolSpec, handler: F)
    where
        F: Fn(&Value) -> bool + 'static,
    {
        self.tools.insert(
            spec.name.clone(),
            RegisteredTool {
                spec,
                handler: Box::new(handler),
            },
        );
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.values().map(|tool| tool.spec.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn dispatch(&self, call: &ToolCall) -> &'static str {
        match self.tools.get(&call.name) {
            Some(tool) if (tool.handler)(&call.arguments) => TOOL_SUCCESS,
            _ => TOOL_FAILURE,
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}
