//! Page - a batch of blocks for processing

use strata_common::{ElementType, Error, Result, Value};

use super::block::Block;

/// A batch of column blocks that share one position count.
///
/// A block's index in the page is its channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    blocks: Vec<Block>,
    position_count: usize,
}

impl Page {
    /// Create a page from blocks of equal position count
    pub fn new(blocks: Vec<Block>) -> Result<Self> {
        let position_count = blocks.first().map_or(0, Block::position_count);
        Self::with_position_count(position_count, blocks)
    }

    /// Create a page with an explicit position count, which also fixes the
    /// size of a page without blocks
    pub fn with_position_count(position_count: usize, blocks: Vec<Block>) -> Result<Self> {
        for block in &blocks {
            if block.position_count() != position_count {
                return Err(Error::PositionCountMismatch {
                    expected: position_count,
                    actual: block.position_count(),
                });
            }
        }
        Ok(Page {
            blocks,
            position_count,
        })
    }

    /// A page without blocks
    pub fn empty(position_count: usize) -> Self {
        Page {
            blocks: Vec::new(),
            position_count,
        }
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn position_count(&self) -> usize {
        self.position_count
    }

    pub fn is_empty(&self) -> bool {
        self.position_count == 0
    }

    /// Get the block on a channel
    pub fn block(&self, channel: usize) -> Result<&Block> {
        self.blocks.get(channel).ok_or(Error::ChannelOutOfBounds {
            channel,
            block_count: self.blocks.len(),
        })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// Add a block on the next channel
    pub fn append_block(mut self, block: Block) -> Result<Self> {
        if block.position_count() != self.position_count {
            return Err(Error::PositionCountMismatch {
                expected: self.position_count,
                actual: block.position_count(),
            });
        }
        self.blocks.push(block);
        Ok(self)
    }

    /// Keep `positions` of every block
    pub fn filter(&self, positions: &[usize]) -> Page {
        Page {
            blocks: self.blocks.iter().map(|b| b.filter(positions)).collect(),
            position_count: positions.len(),
        }
    }

    /// Get a single row
    pub fn row(&self, position: usize) -> Vec<Value> {
        self.blocks.iter().map(|b| b.get_value(position)).collect()
    }

    /// Convert to row-based representation
    pub fn to_rows(&self) -> Vec<Vec<Value>> {
        (0..self.position_count).map(|p| self.row(p)).collect()
    }

    /// Element types of all channels
    pub fn element_types(&self) -> Vec<ElementType> {
        self.blocks.iter().map(Block::element_type).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::vector::{IntVector, LongVector};

    fn longs(values: Vec<i64>) -> Block {
        LongVector::from_values(values).into_block().into()
    }

    #[test]
    fn test_page_new() {
        let page = Page::new(vec![longs(vec![1, 2]), Block::constant_null(2)]).unwrap();
        assert_eq!(page.block_count(), 2);
        assert_eq!(page.position_count(), 2);
        assert_eq!(page.element_types(), vec![ElementType::Long, ElementType::Null]);
        assert_eq!(page.row(1), vec![Value::Long(2), Value::Null]);
    }

    #[test]
    fn test_page_rejects_mismatched_blocks() {
        let err = Page::new(vec![longs(vec![1, 2]), longs(vec![1])]).unwrap_err();
        assert!(matches!(err, Error::PositionCountMismatch { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_channel_out_of_bounds() {
        let page = Page::new(vec![longs(vec![1])]).unwrap();
        assert!(matches!(
            page.block(3),
            Err(Error::ChannelOutOfBounds { channel: 3, block_count: 1 })
        ));
    }

    #[test]
    fn test_append_and_filter() {
        let page = Page::new(vec![longs(vec![1, 2, 3])])
            .unwrap()
            .append_block(IntVector::constant(9, 3).into_block().into())
            .unwrap();
        let filtered = page.filter(&[2, 0]);
        assert_eq!(
            filtered.to_rows(),
            vec![
                vec![Value::Long(3), Value::Int(9)],
                vec![Value::Long(1), Value::Int(9)],
            ]
        );
    }

    #[test]
    fn test_empty_page_keeps_position_count() {
        let page = Page::empty(5);
        assert_eq!(page.block_count(), 0);
        assert_eq!(page.position_count(), 5);
        assert!(!page.is_empty());
    }
}
