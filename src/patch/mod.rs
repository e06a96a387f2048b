//! Deterministic textual patch application.
//!
//! Applies one file's unified-diff hunks against a base text with
//! strict, byte-for-byte matching: no fuzzy offsets, no whitespace
//! normalization. Any mismatch rejects the whole file; a partially
//! patched result is never produced.

pub mod parser;

use serde::Serialize;
use thiserror::Error;

use parser::LineKind;

/// Why a patch was rejected for a file.
///
/// Both variants are recoverable at the run level: they become a
/// `Conflicted` outcome rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictReason {
    /// Context or removed lines of a hunk do not match the base at the
    /// declared offset.
    #[error("hunk #{hunk} does not match the base at line {line}")]
    HunkMismatch { hunk: usize, line: usize },

    /// The patch text is not a well-formed unified diff.
    #[error("malformed patch: {detail}")]
    MalformedPatch { detail: String },
}

/// Apply a unified-diff patch to `base`.
///
/// An absent or blank patch is a no-op success: the GitHub API omits
/// the `patch` field for binary and oversized files, which are treated
/// as already matching. On success hunks apply in ascending order and
/// the base's line-ending convention is preserved. Identical inputs
/// always produce identical results.
pub fn apply(base: &str, patch: Option<&str>) -> Result<String, ConflictReason> {
    let Some(patch) = patch.filter(|p| !p.trim().is_empty()) else {
        return Ok(base.to_string());
    };
    let hunks = parser::parse_patch(patch)?;

    let had_trailing_newline = base.ends_with('\n');
    let mut base_lines: Vec<&str> = if base.is_empty() {
        Vec::new()
    } else {
        base.split('\n').collect()
    };
    if had_trailing_newline {
        base_lines.pop();
    }

    let mut out: Vec<&str> = Vec::new();
    let mut cursor = 0usize;

    for (i, hunk) in hunks.iter().enumerate() {
        let anchor = hunk.anchor();
        if anchor > base_lines.len() {
            // The hunk addresses lines past the end of the base.
            return Err(ConflictReason::HunkMismatch {
                hunk: i + 1,
                line: base_lines.len() + 1,
            });
        }
        out.extend_from_slice(&base_lines[cursor..anchor]);
        cursor = anchor;

        for line in &hunk.lines {
            match line.kind {
                LineKind::Context | LineKind::Removed => match base_lines.get(cursor) {
                    Some(&actual) if actual == line.content => {
                        if line.kind == LineKind::Context {
                            out.push(actual);
                        }
                        cursor += 1;
                    }
                    _ => {
                        return Err(ConflictReason::HunkMismatch {
                            hunk: i + 1,
                            line: cursor + 1,
                        });
                    }
                },
                LineKind::Added => out.push(line.content.as_str()),
            }
        }
    }
    out.extend_from_slice(&base_lines[cursor..]);

    let trailing = resolve_trailing_newline(&hunks, had_trailing_newline, base.is_empty());
    let mut result = out.join("\n");
    if !result.is_empty() && trailing {
        result.push('\n');
    }
    Ok(result)
}

/// Decide whether the patched result ends with a newline.
///
/// `\ No newline at end of file` markers win: on a kept or added line
/// the result is unterminated; on a removed line only, the unterminated
/// tail was replaced by terminated content. Without markers the base's
/// convention carries over (an empty base means a newly created file,
/// which gets a terminating newline).
fn resolve_trailing_newline(
    hunks: &[parser::Hunk],
    base_trailing: bool,
    base_empty: bool,
) -> bool {
    let mut removed_marker = false;
    for line in hunks.iter().flat_map(|h| &h.lines) {
        if line.missing_newline {
            match line.kind {
                LineKind::Removed => removed_marker = true,
                LineKind::Context | LineKind::Added => return false,
            }
        }
    }
    if removed_marker || base_empty {
        return true;
    }
    base_trailing
}
