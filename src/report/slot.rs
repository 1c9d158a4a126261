use crate::report::ReportError;
use crate::shared::fs_atomic::{create_dir_exclusive, ExclusiveCreate};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_COLLISION_CEILING: u32 = 100;
pub const DOCUMENT_EXTENSION: &str = "qmd";
const FALLBACK_STEM: &str = "answer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSlot {
    pub base_name: String,
    pub collision_index: u32,
    pub directory_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SlotAllocator {
    output_root: PathBuf,
    ceiling: u32,
}

impl SlotAllocator {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self::with_ceiling(output_root, DEFAULT_COLLISION_CEILING)
    }

    pub fn with_ceiling(output_root: impl Into<PathBuf>, ceiling: u32) -> Self {
        Self {
            output_root: output_root.into(),
            ceiling: ceiling.max(1),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    pub fn allocate(&self, base_name: &str) -> Result<OutputSlot, ReportError> {
        let stem = normalize_stem(base_name);
        fs::create_dir_all(&self.output_root).map_err(|source| ReportError::CreateSlot {
            path: self.output_root.display().to_string(),
            source,
        })?;

        for collision_index in 0..self.ceiling {
            let directory_path = self.output_root.join(slot_directory_name(&stem, collision_index));
            match create_dir_exclusive(&directory_path) {
                Ok(ExclusiveCreate::Created) => {
                    return Ok(OutputSlot {
                        base_name: stem,
                        collision_index,
                        directory_path,
                    })
                }
                Ok(ExclusiveCreate::AlreadyExists) => continue,
                Err(source) => {
                    return Err(ReportError::CreateSlot {
                        path: directory_path.display().to_string(),
                        source,
                    })
                }
            }
        }

        Err(ReportError::TooManyCollisions {
            base_name: stem,
            root: self.output_root.display().to_string(),
            attempts: self.ceiling,
        })
    }
}

fn slot_directory_name(stem: &str, collision_index: u32) -> String {
    if collision_index == 0 {
        stem.to_string()
    } else {
        format!("{stem}-{collision_index}")
    }
}

pub fn normalize_stem(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_extension = match trimmed.len().checked_sub(DOCUMENT_EXTENSION.len() + 1) {
        Some(split)
            if trimmed.is_char_boundary(split)
                && trimmed[split..].eq_ignore_ascii_case(".qmd") =>
        {
            &trimmed[..split]
        }
        _ => trimmed,
    };

    let mut stem = String::with_capacity(without_extension.len());
    let mut pending_dash = false;
    for ch in without_extension.chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' {
            if pending_dash && !stem.is_empty() {
                stem.push('-');
            }
            pending_dash = false;
            stem.push(ch);
        } else {
            pending_dash = true;
        }
    }

    let stem = stem.trim_matches(|c| c == '-' || c == '.');
    if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem.to_string()
    }
}
