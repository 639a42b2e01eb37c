//! Element types of vectors and blocks

use serde::{Deserialize, Serialize};
use std::fmt;

/// The primitive storage type of a column.
///
/// Every vector and block declares exactly one element type for its whole
/// length; there are no heterogeneous columns in the compute layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementType {
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer (also carries datetimes and unsigned longs)
    Long,
    /// 64-bit IEEE 754 floating point
    Double,
    /// 32-bit IEEE 754 floating point
    Float,
    Boolean,
    /// Variable-length byte strings
    Bytes,
    /// Every position is null
    Null,
    /// Shard, segment and document id triples
    Doc,
    /// Positions are tuples of positions of several sub-blocks
    Composite,
    /// Tag for declared types the compute layer cannot carry
    Unknown,
}

impl ElementType {
    pub fn name(&self) -> &'static str {
        match self {
            ElementType::Int => "INT",
            ElementType::Long => "LONG",
            ElementType::Double => "DOUBLE",
            ElementType::Float => "FLOAT",
            ElementType::Boolean => "BOOLEAN",
            ElementType::Bytes => "BYTES",
            ElementType::Null => "NULL",
            ElementType::Doc => "DOC",
            ElementType::Composite => "COMPOSITE",
            ElementType::Unknown => "UNKNOWN",
        }
    }

    /// Returns true for element types backed by a single primitive vector
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            ElementType::Int
                | ElementType::Long
                | ElementType::Double
                | ElementType::Float
                | ElementType::Boolean
                | ElementType::Bytes
        )
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ElementType::Long.to_string(), "LONG");
        assert_eq!(ElementType::Composite.to_string(), "COMPOSITE");
    }

    #[test]
    fn test_primitive() {
        assert!(ElementType::Bytes.is_primitive());
        assert!(!ElementType::Null.is_primitive());
        assert!(!ElementType::Doc.is_primitive());
    }
}
