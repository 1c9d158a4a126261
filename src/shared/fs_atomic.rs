use std::fs;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusiveCreate {
    Created,
    AlreadyExists,
}

pub fn create_dir_exclusive(path: &Path) -> std::io::Result<ExclusiveCreate> {
    match fs::create_dir(path) {
        Ok(()) => {
            if let Some(parent) = path.parent() {
                sync_parent_dir(parent)?;
            }
            Ok(ExclusiveCreate::Created)
        }
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
            Ok(ExclusiveCreate::AlreadyExists)
        }
        Err(err) => Err(err),
    }
}

pub fn write_new_file(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::other("path has no parent"))?;

    {
        let mut file = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(path)?;
        file.write_all(content)?;
        file.sync_all()?;
    }

    sync_parent_dir(parent)?;
    Ok(())
}

#[cfg(unix)]
fn sync_parent_dir(parent: &Path) -> std::io::Result<()> {
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    fs::File::open(parent)?.sync_all()
}

#[cfg(not(unix))]
fn sync_parent_dir(_parent: &Path) -> std::io::Result<()> {
    Ok(())
}
