// Scans one reconstructed terminal line for local link candidates.

use regex::Regex;

use super::grammar::{local_link_regex, OperatingSystem};

/// Longest reconstructed line (in characters) that is scanned for links.
pub const MAX_LINE_LENGTH: usize = 2000;

/// A raw match: the matched text and its byte offset in the scanned line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    pub text: String,
    pub offset: usize,
}

/// Finds path-like substrings (with optional line/column suffix) in a line.
pub struct LinkScanner {
    regex: &'static Regex,
    max_line_length: usize,
}

impl LinkScanner {
    pub fn new(os: OperatingSystem) -> Self {
        Self {
            regex: local_link_regex(os),
            max_line_length: MAX_LINE_LENGTH,
        }
    }

    /// Override the line length cap.
    pub fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = max_line_length;
        self
    }

    /// Scan `text` for non-overlapping candidates, in order of appearance.
    ///
    /// Empty lines and lines longer than the cap yield nothing. Diff headers
    /// (`--- a/…`, `+++ b/…`, `diff --git a/… b/…`) have their `a/`/`b/`
    /// prefix removed from the reported text and offset.
    pub fn scan(&self, text: &str) -> Vec<LinkCandidate> {
        if text.is_empty() || text.chars().count() > self.max_line_length {
            return Vec::new();
        }

        let mut candidates = Vec::new();
        let mut resume = 0;
        while resume <= text.len() {
            let Some(m) = self.regex.find_at(text, resume) else {
                break;
            };
            if m.is_empty() {
                log::debug!("Empty link match at offset {}, stopping scan", m.start());
                break;
            }
            resume = m.end();

            let (link, offset) = strip_diff_prefix(text, m.as_str(), m.start());
            candidates.push(LinkCandidate {
                text: link.to_string(),
                offset,
            });
        }
        candidates
    }
}

fn strip_diff_prefix<'a>(line: &str, link: &'a str, offset: usize) -> (&'a str, usize) {
    let unified_header = (line.starts_with("--- a/") || line.starts_with("+++ b/")) && offset == 4;
    let git_header =
        line.starts_with("diff --git") && (link.starts_with("a/") || link.starts_with("b/"));
    if unified_header || git_header {
        (&link[2..], offset + 2)
    } else {
        (link, offset)
    }
}
