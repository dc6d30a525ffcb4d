//! Track-changes style rendering of a word diff.

use super::diff::{diff, tokenize, DiffSpan};

/// A piece of rendered redline text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Unchanged(String),
    Added(String),
    Removed(String),
}

/// Tokens of both clauses together with their edit script.
#[derive(Debug, Clone)]
pub struct WordDiff<'a> {
    pub original: Vec<&'a str>,
    pub revised: Vec<&'a str>,
    pub spans: Vec<DiffSpan>,
}

impl<'a> WordDiff<'a> {
    /// Tokenize both texts on whitespace and align them.
    pub fn new(original: &'a str, revised: &'a str) -> Self {
        let original = tokenize(original);
        let revised = tokenize(revised);
        let spans = diff(&original, &revised);
        Self {
            original,
            revised,
            spans,
        }
    }

    /// Presentation fragments; a replace becomes a removal followed by an addition.
    pub fn fragments(&self) -> Vec<Fragment> {
        let mut fragments = Vec::with_capacity(self.spans.len() + 1);
        for span in &self.spans {
            let removed = self.original[span.original_range()].join(" ");
            let added = self.revised[span.revised_range()].join(" ");
            match span {
                DiffSpan::Equal { .. } => fragments.push(Fragment::Unchanged(removed)),
                DiffSpan::Delete { .. } => fragments.push(Fragment::Removed(removed)),
                DiffSpan::Insert { .. } => fragments.push(Fragment::Added(added)),
                DiffSpan::Replace { .. } => {
                    fragments.push(Fragment::Removed(removed));
                    fragments.push(Fragment::Added(added));
                }
            }
        }
        fragments
    }
}

/// Render a redline as HTML: removals struck through in red, additions bold green.
pub fn render_html(original: &str, revised: &str) -> String {
    WordDiff::new(original, revised)
        .fragments()
        .iter()
        .map(|fragment| match fragment {
            Fragment::Unchanged(text) => escape_html(text),
            Fragment::Removed(text) => format!(
                "<span class=\"redline-del\" style=\"color: #ff4b4b; text-decoration: line-through;\">{}</span>",
                escape_html(text)
            ),
            Fragment::Added(text) => format!(
                "<span class=\"redline-ins\" style=\"color: #4caf50; font-weight: bold;\">{}</span>",
                escape_html(text)
            ),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a redline as Markdown: `~~removed~~ **added**`.
pub fn render_markdown(original: &str, revised: &str) -> String {
    WordDiff::new(original, revised)
        .fragments()
        .iter()
        .map(|fragment| match fragment {
            Fragment::Unchanged(text) => text.clone(),
            Fragment::Removed(text) => format!("~~{}~~", text),
            Fragment::Added(text) => format!("**{}**", text),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
