//! Extraction of original/revised clause pairs from the verdict text.
//!
//! The verdict prompt asks the mediator to append one delimited block per
//! rewritten clause. The markers are a contract between prompt and parser;
//! bump [`ClauseProtocol::version`] whenever they change.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::diff::{diff, tokenize, DiffSpan};
use crate::error::ClauseBlockError;

/// Explanation used when a block has no explanation section.
pub const DEFAULT_EXPLANATION: &str = "No explanation provided.";

/// Marker literals shared by the verdict prompt and the clause parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClauseProtocol {
    pub version: u32,
    pub start_marker: &'static str,
    pub end_marker: &'static str,
    pub original_label: &'static str,
    pub revised_label: &'static str,
    pub explanation_label: &'static str,
}

/// First (and current) marker set.
pub const CLAUSE_PROTOCOL_V1: ClauseProtocol = ClauseProtocol {
    version: 1,
    start_marker: "---CLAUSE_COMPARISON_START---",
    end_marker: "---CLAUSE_COMPARISON_END---",
    original_label: "ORIGINAL:",
    revised_label: "REVISED:",
    explanation_label: "EXPLANATION:",
};

impl Default for ClauseProtocol {
    fn default() -> Self {
        CLAUSE_PROTOCOL_V1
    }
}

/// One rewritten clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseComparison {
    pub original: String,
    pub revised: String,
    pub explanation: String,
}

impl ClauseComparison {
    /// Word-level edit script from the original to the revised clause.
    pub fn spans(&self) -> Vec<DiffSpan> {
        diff(&tokenize(&self.original), &tokenize(&self.revised))
    }
}

/// Parse every clause comparison block in `text` with the current protocol.
pub fn parse_clause_comparisons(text: &str) -> Vec<ClauseComparison> {
    ClauseProtocol::default().parse(text)
}

impl ClauseProtocol {
    /// The block template shown to the model.
    pub fn template(&self) -> String {
        format!(
            "{}\n{} [the exact original text of the clause]\n{} [your new, fair version]\n{} [one sentence explaining the change]\n{}",
            self.start_marker,
            self.original_label,
            self.revised_label,
            self.explanation_label,
            self.end_marker
        )
    }

    /// Extract all well-formed blocks in order of appearance.
    ///
    /// Malformed blocks are logged and skipped; an unterminated trailing block
    /// ends the scan.
    pub fn parse(&self, text: &str) -> Vec<ClauseComparison> {
        let mut comparisons = Vec::new();
        let mut cursor = 0;
        let mut block_index = 0;

        while let Some(rel_start) = text[cursor..].find(self.start_marker) {
            let body_start = cursor + rel_start + self.start_marker.len();
            let Some(rel_end) = text[body_start..].find(self.end_marker) else {
                debug!(offset = body_start, "Unterminated clause comparison block");
                break;
            };
            let mut body = &text[body_start..body_start + rel_end];
            cursor = body_start + rel_end + self.end_marker.len();

            // A start marker inside the body means the earlier block was never closed.
            if let Some(inner) = body.rfind(self.start_marker) {
                debug!(block = block_index, "Dropping unclosed clause comparison block");
                body = &body[inner + self.start_marker.len()..];
            }

            match self.parse_block(body) {
                Ok(comparison) => comparisons.push(comparison),
                Err(e) => warn!(
                    block = block_index,
                    error = %e,
                    "Skipping malformed clause comparison block"
                ),
            }
            block_index += 1;
        }

        comparisons
    }

    fn parse_block(&self, body: &str) -> Result<ClauseComparison, ClauseBlockError> {
        let (head, tail) =
            body.split_once(self.revised_label)
                .ok_or(ClauseBlockError::MissingMarker {
                    marker: self.revised_label,
                })?;

        let original = match head.split_once(self.original_label) {
            Some((_, original)) => original,
            None => head,
        };

        let (revised, explanation) = match tail.split_once(self.explanation_label) {
            Some((revised, explanation)) => (revised, Some(explanation)),
            None => (tail, None),
        };

        let original = clean_section(original);
        let revised = clean_section(revised);
        if original.is_empty() && revised.is_empty() {
            return Err(ClauseBlockError::Empty);
        }

        let explanation = explanation
            .map(clean_section)
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_EXPLANATION.to_string());

        Ok(ClauseComparison {
            original,
            revised,
            explanation,
        })
    }
}

/// Trim whitespace and the markdown emphasis models like to wrap labels in.
fn clean_section(section: &str) -> String {
    section
        .trim_matches(|c: char| c.is_whitespace() || c == '*')
        .to_string()
}
