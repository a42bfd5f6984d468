//! Surface specifications and the spec-file loaders.
//!
//! Two on-disk forms are accepted: the line-oriented `key value` format (one `surface` keyword
//! per entry) and a JSON document. [`load_specs`] dispatches on the file extension.

pub mod model;
pub mod parser;

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{StrobeError, StrobeResult};
use model::{SpecDocument, SurfaceSpec};

/// Load every surface spec from `path`.
pub fn load_specs(path: &Path) -> StrobeResult<Vec<SurfaceSpec>> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read spec file '{}'", path.display()))?;

    if is_json {
        let doc: SpecDocument = serde_json::from_str(&text).map_err(|e| {
            StrobeError::config(format!("parse spec file '{}': {e}", path.display()))
        })?;
        return Ok(doc.surfaces);
    }

    Ok(parser::parse_str(&text, &path.display().to_string()))
}
