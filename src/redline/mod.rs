//! Redlines: word-level diffs between original and revised clauses, and the
//! parser that pulls those clause pairs out of the mediator's verdict.

mod clauses;
mod diff;
mod render;

pub use clauses::{
    parse_clause_comparisons, ClauseComparison, ClauseProtocol, CLAUSE_PROTOCOL_V1,
    DEFAULT_EXPLANATION,
};
pub use diff::{diff, tokenize, DiffSpan, SpanTag};
pub use render::{render_html, render_markdown, Fragment, WordDiff};
