use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::info;

use crate::models::Dataset;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path} is not a valid dataset: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Serialize the dataset as 4-space indented UTF-8 JSON. Non-ASCII text is
/// written as-is; field order follows the struct definitions.
pub fn to_json(data: &Dataset) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    data.serialize(&mut ser)?;
    Ok(buf)
}

pub fn write(path: &Path, data: &Dataset) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }

    let bytes = to_json(data).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, bytes).map_err(io_err)?;

    info!(
        "Wrote {} products, {} testimonials, {} reviews to {}",
        data.products.len(),
        data.testimonials.len(),
        data.reviews.len(),
        path.display()
    );
    Ok(())
}

/// Load the dataset. `Ok(None)` means nothing has been scraped yet;
/// an unreadable or malformed document is an error.
pub fn load(path: &Path) -> Result<Option<Dataset>, StoreError> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let data = serde_json::from_str(&text).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(data))
}

// ── Tests ──
