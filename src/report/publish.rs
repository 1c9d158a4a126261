use crate::report::ReportError;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock};

pub const SERVED_PREFIX: &str = "/output";
pub const RENDERED_EXTENSION: &str = "html";
pub const UNPUBLISHED_PATH: &str = "/output/none.html";

/// Shared handle to the current rendered-output path. Clones share one cell.
#[derive(Debug, Clone)]
pub struct PublishedOutput {
    inner: Arc<RwLock<String>>,
}

impl Default for PublishedOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl PublishedOutput {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(UNPUBLISHED_PATH.to_string())),
        }
    }

    pub fn get(&self) -> String {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_published(&self) -> bool {
        self.get() != UNPUBLISHED_PATH
    }

    fn set(&self, value: String) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = value;
    }
}

#[derive(Debug, Clone)]
pub struct ResultPathPublisher {
    output_root: PathBuf,
    served_prefix: String,
    cell: PublishedOutput,
}

impl ResultPathPublisher {
    pub fn new(output_root: impl Into<PathBuf>, cell: PublishedOutput) -> Self {
        Self {
            output_root: output_root.into(),
            served_prefix: SERVED_PREFIX.to_string(),
            cell,
        }
    }

    pub fn with_served_prefix(mut self, served_prefix: impl Into<String>) -> Self {
        self.served_prefix = served_prefix.into();
        self
    }

    pub fn cell(&self) -> &PublishedOutput {
        &self.cell
    }

    pub fn expected_output_path(&self, source_path: &Path) -> Result<String, ReportError> {
        let outside = || ReportError::OutsideOutputRoot {
            path: source_path.display().to_string(),
            root: self.output_root.display().to_string(),
        };
        let relative = source_path
            .strip_prefix(&self.output_root)
            .map_err(|_| outside())?
            .with_extension(RENDERED_EXTENSION);

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => segments.push(segment.to_string_lossy().into_owned()),
                Component::CurDir => {}
                _ => return Err(outside()),
            }
        }
        if segments.is_empty() {
            return Err(outside());
        }

        Ok(format!(
            "{}/{}",
            self.served_prefix.trim_end_matches('/'),
            segments.join("/")
        ))
    }

    pub fn publish(&self, source_path: &Path) -> Result<String, ReportError> {
        let published = self.expected_output_path(source_path)?;
        self.cell.set(published.clone());
        Ok(published)
    }
}
