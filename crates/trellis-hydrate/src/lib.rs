//! Source-text hydration for assembled neighborhoods
//!
//! Assembly itself performs no I/O; this crate is the collaborator that
//! fills `MiniCodebase.symbols[*].code` by reading byte ranges from disk
//! after the neighborhood has been assembled.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use trellis_core::MiniCodebase;

/// Read the byte range `[start, end)` of a file as (lossily decoded) text.
pub fn read_range(file_path: &Path, start: usize, end: usize) -> Result<String> {
    let bytes =
        fs::read(file_path).with_context(|| format!("reading {}", file_path.display()))?;
    if start > end || end > bytes.len() {
        bail!(
            "byte range {}..{} out of bounds for {} ({} bytes)",
            start,
            end,
            file_path.display(),
            bytes.len()
        );
    }
    Ok(String::from_utf8_lossy(&bytes[start..end]).into_owned())
}

/// Fill `code` for every symbol in the mini codebase, resolving file paths
/// against `root`. A symbol that cannot be read is logged and skipped
/// rather than failing the whole neighborhood. Returns how many symbols
/// were hydrated.
pub fn hydrate(mini: &mut MiniCodebase, root: &Path) -> usize {
    let mut hydrated = 0;
    for symbol in &mut mini.symbols {
        let path = root.join(&symbol.file_path);
        match read_range(&path, symbol.byte_range.start, symbol.byte_range.end) {
            Ok(code) => {
                symbol.code = Some(code);
                hydrated += 1;
            }
            Err(error) => {
                tracing::warn!(symbol = %symbol.id, %error, "failed to hydrate symbol");
            }
        }
    }
    tracing::debug!(hydrated, total = mini.symbols.len(), "hydrated neighborhood");
    hydrated
}
