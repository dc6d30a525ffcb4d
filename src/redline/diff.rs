//! Word-level alignment of two token sequences.
//!
//! The alignment repeatedly takes the longest block common to both sides,
//! recurses on the unmatched regions to its left and right, and turns the
//! resulting matching blocks into an edit script.

use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;
use std::ops::Range;

/// Kind of a [`DiffSpan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanTag {
    Equal,
    Insert,
    Delete,
    Replace,
}

/// One opcode of an edit script, as half-open ranges into both sequences.
///
/// Spans come out left to right, contiguous on both sides, and never as two
/// adjacent spans of the same kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DiffSpan {
    Equal {
        original: Range<usize>,
        revised: Range<usize>,
    },
    Insert {
        original: Range<usize>,
        revised: Range<usize>,
    },
    Delete {
        original: Range<usize>,
        revised: Range<usize>,
    },
    Replace {
        original: Range<usize>,
        revised: Range<usize>,
    },
}

impl DiffSpan {
    fn new(tag: SpanTag, original: Range<usize>, revised: Range<usize>) -> Self {
        match tag {
            SpanTag::Equal => DiffSpan::Equal { original, revised },
            SpanTag::Insert => DiffSpan::Insert { original, revised },
            SpanTag::Delete => DiffSpan::Delete { original, revised },
            SpanTag::Replace => DiffSpan::Replace { original, revised },
        }
    }

    /// The span's kind.
    pub fn tag(&self) -> SpanTag {
        match self {
            DiffSpan::Equal { .. } => SpanTag::Equal,
            DiffSpan::Insert { .. } => SpanTag::Insert,
            DiffSpan::Delete { .. } => SpanTag::Delete,
            DiffSpan::Replace { .. } => SpanTag::Replace,
        }
    }

    /// Range into the original sequence (empty for inserts).
    pub fn original_range(&self) -> Range<usize> {
        match self {
            DiffSpan::Equal { original, .. }
            | DiffSpan::Insert { original, .. }
            | DiffSpan::Delete { original, .. }
            | DiffSpan::Replace { original, .. } => original.clone(),
        }
    }

    /// Range into the revised sequence (empty for deletes).
    pub fn revised_range(&self) -> Range<usize> {
        match self {
            DiffSpan::Equal { revised, .. }
            | DiffSpan::Insert { revised, .. }
            | DiffSpan::Delete { revised, .. }
            | DiffSpan::Replace { revised, .. } => revised.clone(),
        }
    }
}

/// Split text into whitespace-separated tokens.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Align `original` against `revised` and return the edit script.
///
/// Tokens compare by exact equality. Two empty inputs give an empty script.
pub fn diff<T: Eq + Hash>(original: &[T], revised: &[T]) -> Vec<DiffSpan> {
    let matcher = BlockMatcher::new(original, revised);
    opcodes(&matcher.matching_blocks())
}

/// A contiguous run of equal tokens: `original[a..a+len] == revised[b..b+len]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct MatchBlock {
    a: usize,
    b: usize,
    len: usize,
}

struct BlockMatcher<'a, T> {
    a: &'a [T],
    b: &'a [T],
    /// Positions of each distinct token in `b`, ascending.
    b_positions: HashMap<&'a T, Vec<usize>>,
}

impl<'a, T: Eq + Hash> BlockMatcher<'a, T> {
    fn new(a: &'a [T], b: &'a [T]) -> Self {
        let mut b_positions: HashMap<&'a T, Vec<usize>> = HashMap::new();
        for (j, token) in b.iter().enumerate() {
            b_positions.entry(token).or_default().push(j);
        }
        Self { a, b, b_positions }
    }

    /// Longest common block inside `a[alo..ahi]` x `b[blo..bhi]`.
    ///
    /// Ties go to the block starting earliest in `a`, then earliest in `b`.
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> MatchBlock {
        let mut best = MatchBlock {
            a: alo,
            b: blo,
            len: 0,
        };
        // run_ending_at[j] = length of the common run ending at a[i-1], b[j]
        let mut run_ending_at: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b_positions.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let prev = j
                        .checked_sub(1)
                        .and_then(|p| run_ending_at.get(&p))
                        .copied()
                        .unwrap_or(0);
                    let len = prev + 1;
                    next.insert(j, len);
                    if len > best.len {
                        best = MatchBlock {
                            a: i + 1 - len,
                            b: j + 1 - len,
                            len,
                        };
                    }
                }
            }
            run_ending_at = next;
        }

        best
    }

    /// All matching blocks in order, adjacent blocks merged, terminated by a
    /// zero-length block at `(len(a), len(b))`.
    fn matching_blocks(&self) -> Vec<MatchBlock> {
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];
        let mut found = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let block = self.longest_match(alo, ahi, blo, bhi);
            if block.len == 0 {
                continue;
            }
            found.push(block);
            if alo < block.a && blo < block.b {
                pending.push((alo, block.a, blo, block.b));
            }
            if block.a + block.len < ahi && block.b + block.len < bhi {
                pending.push((block.a + block.len, ahi, block.b + block.len, bhi));
            }
        }
        found.sort();

        let mut merged: Vec<MatchBlock> = Vec::with_capacity(found.len() + 1);
        for block in found {
            match merged.last_mut() {
                Some(last) if last.a + last.len == block.a && last.b + last.len == block.b => {
                    last.len += block.len;
                }
                _ => merged.push(block),
            }
        }
        merged.push(MatchBlock {
            a: self.a.len(),
            b: self.b.len(),
            len: 0,
        });
        merged
    }
}

fn opcodes(blocks: &[MatchBlock]) -> Vec<DiffSpan> {
    let mut spans = Vec::new();
    let (mut i, mut j) = (0, 0);

    for block in blocks {
        let tag = match (i < block.a, j < block.b) {
            (true, true) => Some(SpanTag::Replace),
            (true, false) => Some(SpanTag::Delete),
            (false, true) => Some(SpanTag::Insert),
            (false, false) => None,
        };
        if let Some(tag) = tag {
            spans.push(DiffSpan::new(tag, i..block.a, j..block.b));
        }
        i = block.a + block.len;
        j = block.b + block.len;
        if block.len > 0 {
            spans.push(DiffSpan::new(SpanTag::Equal, block.a..i, block.b..j));
        }
    }

    spans
}
