//! Document references.
//!
//! A DOC vector addresses rows in the storage layer by shard, segment and
//! document ordinal. It travels through a pipeline like any other column
//! until a reader operator swaps it for field values.

use strata_common::{ElementType, Error, Result, Value};

use super::vector::IntVector;

#[derive(Debug, Clone, PartialEq)]
pub struct DocVector {
    shards: IntVector,
    segments: IntVector,
    docs: IntVector,
}

impl DocVector {
    pub fn new(shards: IntVector, segments: IntVector, docs: IntVector) -> Result<Self> {
        let expected = docs.position_count();
        for actual in [shards.position_count(), segments.position_count()] {
            if actual != expected {
                return Err(Error::PositionCountMismatch { expected, actual });
            }
        }
        Ok(DocVector {
            shards,
            segments,
            docs,
        })
    }

    pub fn shards(&self) -> &IntVector {
        &self.shards
    }

    pub fn segments(&self) -> &IntVector {
        &self.segments
    }

    pub fn docs(&self) -> &IntVector {
        &self.docs
    }

    pub fn element_type(&self) -> ElementType {
        ElementType::Doc
    }

    pub fn position_count(&self) -> usize {
        self.docs.position_count()
    }

    pub fn is_constant(&self) -> bool {
        self.shards.is_constant() && self.segments.is_constant() && self.docs.is_constant()
    }

    /// True when every position is in one shard and segment and documents
    /// never go backwards, which lets a reader scan the segment once.
    pub fn is_single_segment_non_decreasing(&self) -> bool {
        if !self.shards.is_constant() || !self.segments.is_constant() {
            return false;
        }
        let docs = self.docs.to_values();
        docs.windows(2).all(|pair| pair[0] <= pair[1])
    }

    /// `[shard, segment, doc]` of one position
    pub fn get_value(&self, position: usize) -> Value {
        Value::Multi(vec![
            Value::Int(self.shards.get_int(position)),
            Value::Int(self.segments.get_int(position)),
            Value::Int(self.docs.get_int(position)),
        ])
    }

    pub fn filter(&self, positions: &[usize]) -> DocVector {
        DocVector {
            shards: self.shards.filter(positions),
            segments: self.segments.filter(positions),
            docs: self.docs.filter(positions),
        }
    }

    pub fn as_block(&self) -> DocBlock {
        DocBlock {
            vector: self.clone(),
        }
    }
}

/// Block view of a `DocVector`. Document references are never null or
/// multi-valued.
#[derive(Debug, Clone, PartialEq)]
pub struct DocBlock {
    vector: DocVector,
}

impl DocBlock {
    pub fn as_vector(&self) -> &DocVector {
        &self.vector
    }

    pub fn position_count(&self) -> usize {
        self.vector.position_count()
    }

    pub fn filter(&self, positions: &[usize]) -> DocBlock {
        self.vector.filter(positions).as_block()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_vector_lengths_must_match() {
        let err = DocVector::new(
            IntVector::constant(0, 3),
            IntVector::constant(0, 2),
            IntVector::from_values(vec![1, 2, 3]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::PositionCountMismatch { expected: 3, actual: 2 }));
    }

    #[test]
    fn test_single_segment_non_decreasing() {
        let docs = DocVector::new(
            IntVector::constant(0, 4),
            IntVector::constant(1, 4),
            IntVector::from_values(vec![1, 1, 5, 9]),
        )
        .unwrap();
        assert!(docs.is_single_segment_non_decreasing());

        let shuffled = docs.filter(&[2, 0]);
        assert!(!shuffled.is_single_segment_non_decreasing());
        assert_eq!(
            shuffled.get_value(0),
            Value::Multi(vec![Value::Int(0), Value::Int(1), Value::Int(5)])
        );
    }
}
