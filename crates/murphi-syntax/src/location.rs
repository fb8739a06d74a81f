//! Source locations attached to every AST node.

use std::fmt;

/// A range in the source text, tracked for diagnostics.
///
/// Locations never participate in structural equality of AST nodes; two
/// nodes parsed from different places compare equal if their contents do.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    /// Originating file, if known. `None` for synthesised nodes.
    pub file: Option<String>,
    /// Start line (1-indexed).
    pub line: u32,
    /// Start column (1-indexed).
    pub column: u32,
    /// End line (inclusive).
    pub end_line: u32,
    /// End column (exclusive).
    pub end_column: u32,
}

impl Location {
    /// Create a location covering a single point.
    pub fn new(file: Option<String>, line: u32, column: u32) -> Self {
        Self {
            file,
            line,
            column,
            end_line: line,
            end_column: column,
        }
    }

    /// A placeholder location for generated nodes.
    pub fn dummy() -> Self {
        Self::default()
    }

    /// Merge two locations into one that covers both.
    pub fn merge(&self, other: &Self) -> Self {
        let (line, column) = if (self.line, self.column) <= (other.line, other.column) {
            (self.line, self.column)
        } else {
            (other.line, other.column)
        };
        let (end_line, end_column) =
            if (self.end_line, self.end_column) >= (other.end_line, other.end_column) {
                (self.end_line, self.end_column)
            } else {
                (other.end_line, other.end_column)
            };
        Self {
            file: self.file.clone().or_else(|| other.file.clone()),
            line,
            column,
            end_line,
            end_column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self.file.as_deref().unwrap_or("<input>");
        write!(f, "{}:{}:{}", file, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_and_without_file() {
        let loc = Location::new(Some("cache.m".to_string()), 3, 7);
        assert_eq!(loc.to_string(), "cache.m:3:7");

        let anon = Location::new(None, 1, 1);
        assert_eq!(anon.to_string(), "<input>:1:1");
    }

    #[test]
    fn merge_covers_both_endpoints() {
        let a = Location {
            file: Some("m.m".to_string()),
            line: 2,
            column: 5,
            end_line: 2,
            end_column: 9,
        };
        let b = Location {
            file: Some("m.m".to_string()),
            line: 4,
            column: 1,
            end_line: 4,
            end_column: 3,
        };
        let merged = a.merge(&b);
        assert_eq!((merged.line, merged.column), (2, 5));
        assert_eq!((merged.end_line, merged.end_column), (4, 3));
    }
}
