//! Cleanup step for uploaded coverage reports
//!
//! Each artifact's file is removed exactly once after its upload attempt,
//! success or failure alike, so a later CI step (or a re-run) never uploads
//! the same report twice. Deletion is best-effort: the caller reports
//! failures through the failure reporter and carries on.

use crate::error::Result;
use std::path::Path;
use tracing::debug;

/// Delete a coverage report file
///
/// # Errors
///
/// Returns the underlying I/O error; callers treat it as non-fatal.
pub async fn remove_report(path: &Path) -> Result<()> {
    tokio::fs::remove_file(path).await?;
    debug!(path = ?path, "removed coverage report");
    Ok(())
}
