//! Parser for per-file patch payloads.
//!
//! The GitHub commits API reports each changed file's diff as bare
//! `@@` hunks without the `diff --git` preamble. Header lines are
//! tolerated before the first hunk so a hand-fed single-file unified
//! diff parses too.

use super::ConflictReason;

/// The role of a line within a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Present on both sides; must match the base verbatim.
    Context,
    /// Present only in the old version; must match the base verbatim.
    Removed,
    /// Present only in the new version.
    Added,
}

/// A single body line of a hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchLine {
    pub kind: LineKind,
    /// Line content without the leading `+`/`-`/space.
    pub content: String,
    /// Set when a `\ No newline at end of file` marker followed this line.
    pub missing_newline: bool,
}

/// One contiguous block of changes at a declared base offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// 1-based first line of the hunk in the old file (0 when the old
    /// side is empty).
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    pub lines: Vec<PatchLine>,
}

impl Hunk {
    /// 0-based index into the base where this hunk engages.
    ///
    /// A pure insertion (`old_count == 0`) anchors *after* `old_start`,
    /// so the index equals `old_start` itself.
    pub fn anchor(&self) -> usize {
        if self.old_count == 0 {
            self.old_start
        } else {
            self.old_start - 1
        }
    }

    /// 0-based index one past the last base line this hunk consumes.
    fn old_end(&self) -> usize {
        self.anchor() + self.old_count
    }
}

fn malformed(detail: impl Into<String>) -> ConflictReason {
    ConflictReason::MalformedPatch { detail: detail.into() }
}

/// Header lines that may precede the first hunk of a full unified diff.
fn is_preamble(line: &str) -> bool {
    line.starts_with("diff --git ")
        || line.starts_with("index ")
        || line.starts_with("--- ")
        || line.starts_with("+++ ")
        || line.starts_with("new file mode")
        || line.starts_with("deleted file mode")
        || line.starts_with("old mode")
        || line.starts_with("new mode")
        || line.starts_with("similarity index")
        || line.starts_with("dissimilarity index")
        || line.starts_with("rename from")
        || line.starts_with("rename to")
}

/// Parse a patch into validated hunks.
///
/// Rejects anything that is not a well-formed unified diff: bad hunk
/// headers, unknown line prefixes, body tallies that disagree with the
/// declared counts, and hunks that are out of order or overlapping.
pub fn parse_patch(input: &str) -> Result<Vec<Hunk>, ConflictReason> {
    // Split on bare `\n` rather than `str::lines()`: CR bytes are part
    // of the content and must survive for exact matching against CRLF
    // bases. A terminal newline in the payload is not a body line.
    let mut raw: Vec<&str> = input.split('\n').collect();
    if raw.last() == Some(&"") {
        raw.pop();
    }
    let mut lines = raw.into_iter().peekable();

    while let Some(&line) = lines.peek() {
        if line.starts_with("@@") {
            break;
        }
        if is_preamble(line) {
            lines.next();
        } else {
            return Err(malformed(format!(
                "unexpected line before first hunk: {line:?}"
            )));
        }
    }

    let mut hunks: Vec<Hunk> = Vec::new();
    while let Some(header) = lines.next() {
        let (old_start, old_count, new_start, new_count) = parse_hunk_header(header)
            .ok_or_else(|| malformed(format!("invalid hunk header: {header:?}")))?;

        if old_start == 0 && old_count != 0 {
            return Err(malformed(format!("invalid old range in {header:?}")));
        }
        if new_start == 0 && new_count != 0 {
            return Err(malformed(format!("invalid new range in {header:?}")));
        }

        let mut body: Vec<PatchLine> = Vec::new();
        while let Some(&next) = lines.peek() {
            if next.starts_with("@@") {
                break;
            }
            let raw = lines.next().unwrap();

            if let Some(content) = raw.strip_prefix('+') {
                body.push(PatchLine {
                    kind: LineKind::Added,
                    content: content.to_string(),
                    missing_newline: false,
                });
            } else if let Some(content) = raw.strip_prefix('-') {
                body.push(PatchLine {
                    kind: LineKind::Removed,
                    content: content.to_string(),
                    missing_newline: false,
                });
            } else if let Some(content) = raw.strip_prefix(' ') {
                body.push(PatchLine {
                    kind: LineKind::Context,
                    content: content.to_string(),
                    missing_newline: false,
                });
            } else if raw.is_empty() {
                // Some transports strip the single space off an empty
                // context line.
                body.push(PatchLine {
                    kind: LineKind::Context,
                    content: String::new(),
                    missing_newline: false,
                });
            } else if raw.starts_with('\\') {
                match body.last_mut() {
                    Some(prev) => prev.missing_newline = true,
                    None => {
                        return Err(malformed(
                            "newline marker with no preceding line",
                        ));
                    }
                }
            } else {
                return Err(malformed(format!("unknown line prefix: {raw:?}")));
            }
        }

        let old_lines = body
            .iter()
            .filter(|l| l.kind != LineKind::Added)
            .count();
        let new_lines = body
            .iter()
            .filter(|l| l.kind != LineKind::Removed)
            .count();
        if old_lines != old_count {
            return Err(malformed(format!(
                "hunk declares {old_count} old line(s) but contains {old_lines}"
            )));
        }
        if new_lines != new_count {
            return Err(malformed(format!(
                "hunk declares {new_count} new line(s) but contains {new_lines}"
            )));
        }

        let hunk = Hunk { old_start, old_count, new_start, new_count, lines: body };
        if let Some(prev) = hunks.last() {
            if hunk.anchor() < prev.old_end() {
                return Err(malformed("hunks overlap or are out of order"));
            }
        }
        hunks.push(hunk);
    }

    if hunks.is_empty() {
        return Err(malformed("no hunks found"));
    }
    Ok(hunks)
}

/// Parse a `@@ -old_start,old_count +new_start,new_count @@ ...` line.
fn parse_hunk_header(line: &str) -> Option<(usize, usize, usize, usize)> {
    let line = line.strip_prefix("@@ ")?;
    let end = line.find(" @@")?;
    let range_part = &line[..end];

    let (old, new) = range_part.split_once(' ')?;
    let (old_start, old_count) = parse_range(old.strip_prefix('-')?)?;
    let (new_start, new_count) = parse_range(new.strip_prefix('+')?)?;

    Some((old_start, old_count, new_start, new_count))
}

/// Parse "start,count" or "start" (count defaults to 1).
fn parse_range(s: &str) -> Option<(usize, usize)> {
    if let Some((start, count)) = s.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        Some((s.parse().ok()?, 1))
    }
}
