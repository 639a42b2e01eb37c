//! Null masks for blocks.

use std::sync::Arc;

/// Bit set marking the null positions of a block.
///
/// A block without nulls carries no mask at all, so `NullMask` is only ever
/// built with at least one bit set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullMask {
    /// Bit vector: 1 = null, 0 = value present
    words: Arc<[u64]>,
    len: usize,
    null_count: usize,
}

impl NullMask {
    /// Check if a specific position is null
    pub fn is_null(&self, idx: usize) -> bool {
        if idx >= self.len {
            return false;
        }
        (self.words[idx / 64] >> (idx % 64)) & 1 == 1
    }

    pub fn null_count(&self) -> usize {
        self.null_count
    }

    /// Number of positions covered by the mask
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Accumulates one null bit per position.
#[derive(Debug, Default)]
pub struct NullMaskBuilder {
    words: Vec<u64>,
    len: usize,
    null_count: usize,
}

impl NullMaskBuilder {
    pub fn with_capacity(positions: usize) -> Self {
        NullMaskBuilder {
            words: Vec::with_capacity(positions.div_ceil(64)),
            len: 0,
            null_count: 0,
        }
    }

    pub fn push(&mut self, is_null: bool) {
        let bit = self.len % 64;
        if bit == 0 {
            self.words.push(0);
        }
        if is_null {
            if let Some(word) = self.words.last_mut() {
                *word |= 1 << bit;
            }
            self.null_count += 1;
        }
        self.len += 1;
    }

    pub fn null_count(&self) -> usize {
        self.null_count
    }

    /// Finish the mask, or `None` when no position was null
    pub fn finish(self) -> Option<NullMask> {
        if self.null_count == 0 {
            return None;
        }
        Some(NullMask {
            words: self.words.into(),
            len: self.len,
            null_count: self.null_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_mask() {
        let mut builder = NullMaskBuilder::with_capacity(130);
        for i in 0..130 {
            builder.push(i % 65 == 5);
        }
        let mask = builder.finish().unwrap();
        assert_eq!(mask.len(), 130);
        assert_eq!(mask.null_count(), 2);
        assert!(mask.is_null(5));
        assert!(mask.is_null(70));
        assert!(!mask.is_null(6));
        assert!(!mask.is_null(129));
        assert!(!mask.is_null(500));
    }

    #[test]
    fn test_no_nulls_builds_nothing() {
        let mut builder = NullMaskBuilder::default();
        builder.push(false);
        builder.push(false);
        assert!(builder.finish().is_none());
    }
}
