//! Query text locations attached to expressions

use std::fmt;
use std::sync::Arc;

/// A line and column in the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub line: i32,
    pub column: i32,
}

impl Location {
    /// Location of synthesized expressions that have no query text
    pub const EMPTY: Location = Location {
        line: -1,
        column: -2,
    };

    pub fn new(line: i32, column: i32) -> Self {
        Location { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // columns are stored zero-based and reported one-based
        write!(f, "Line {}:{}", self.line, self.column + 1)
    }
}

/// The query text an expression was built from, and where it starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source {
    location: Location,
    text: Arc<str>,
}

impl Source {
    pub fn new(location: Location, text: impl Into<Arc<str>>) -> Self {
        Source {
            location,
            text: text.into(),
        }
    }

    /// A source without a query location
    pub fn synthetic(text: impl Into<Arc<str>>) -> Self {
        Source::new(Location::EMPTY, text)
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
