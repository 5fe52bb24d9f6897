pub mod cluster;
pub mod simulate;

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde_json::Value;

/// Read a JSON array of raw documents; fields are coerced later by the library.
fn read_documents(path: &Path) -> Result<Vec<Value>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Expected a JSON array of documents in {}", path.display()))
}
