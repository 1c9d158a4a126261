use serde_json::Value;

pub mod build_job;
pub mod document;
pub mod pipeline;
pub mod publish;
pub mod renderer;
pub mod shell_quote;
pub mod slot;

pub use build_job::{compose, BuildJob, CommandStep, ExtraPackages, RuntimeEcosystem};
pub use document::{document_file_name, write_document, SourceDocument};
pub use pipeline::{PipelineStage, ReportOutcome, ReportPipeline, REPORT_TOOL_NAME};
pub use publish::{PublishedOutput, ResultPathPublisher, SERVED_PREFIX, UNPUBLISHED_PATH};
pub use renderer::{ContainerRenderer, RenderResult, RenderStatus};
pub use slot::{normalize_stem, OutputSlot, SlotAllocator, DEFAULT_COLLISION_CEILING};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report filename must be non-empty")]
    EmptyFilename,
    #[error("too many collisions for `{base_name}` under {root} after {attempts} attempts")]
    TooManyCollisions {
        base_name: String,
        root: String,
        attempts: u32,
    },
    #[error("failed to create output directory {path}: {source}")]
    CreateSlot {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write document {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("document {path} is outside output root {root}")]
    OutsideOutputRoot { path: String, root: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub filename: String,
    pub content: String,
}

impl ToolInvocation {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    pub fn from_arguments(arguments: &Value) -> Result<Self, String> {
        let object = arguments
            .as_object()
            .ok_or_else(|| "tool arguments must be a json object".to_string())?;
        let filename = required_string(object, "filename")?;
        let content = required_string(object, "answer")?;
        Ok(Self { filename, content })
    }
}

fn required_string(
    object: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<String, String> {
    match object.get(key) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(format!("tool argument `{key}` must be a string")),
        None => Err(format!("missing required tool argument `{key}`")),
    }
}
