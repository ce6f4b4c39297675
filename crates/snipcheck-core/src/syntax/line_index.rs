//! Byte offset to line/column mapping for a source string.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A 1-based line and column. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    ranges: Vec<Range<usize>>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut ranges = Vec::new();
        let mut start = 0;

        for (i, c) in source.char_indices() {
            if c == '\n' {
                ranges.push(start..i);
                start = i + 1;
            }
        }

        if start < source.len() || (start == 0 && !source.is_empty()) {
            ranges.push(start..source.len());
        }

        Self { ranges }
    }

    pub fn line_count(&self) -> usize {
        self.ranges.len()
    }

    /// Text of a 1-based line, without its line terminator.
    pub fn line<'s>(&self, source: &'s str, line_number: usize) -> Option<&'s str> {
        if line_number == 0 {
            return None;
        }

        let range = self.ranges.get(line_number - 1)?;
        let text = source.get(range.clone())?;
        Some(text.strip_suffix('\r').unwrap_or(text))
    }

    pub fn location(&self, source: &str, offset: usize) -> Location {
        if self.ranges.is_empty() {
            return Location::new(1, 1);
        }

        let index = self
            .ranges
            .partition_point(|range| range.start <= offset)
            .saturating_sub(1);
        let start = self.ranges[index].start;
        let offset = offset.min(source.len()).max(start);

        let column = match source.get(start..offset) {
            Some(prefix) => prefix.chars().count(),
            None => offset - start,
        };

        Location::new(index + 1, column + 1)
    }
}
