use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::model::StoreRecord;

/// Writes all records as one pretty-printed JSON array, replacing any existing file.
pub fn write_records(path: &Path, records: &[StoreRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json)?;

    info!("💾 Wrote {} stores to {}", records.len(), path.display());
    Ok(())
}
