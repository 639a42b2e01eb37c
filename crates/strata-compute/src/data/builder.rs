//! Incremental block construction.

use super::block::TypedBlock;
use super::element::Element;
use super::mask::NullMaskBuilder;
use super::vector::TypedVector;

/// Builds a [`TypedBlock`] one position at a time.
///
/// Single values go through [`append_value`](Self::append_value). A
/// multi-valued position is bracketed by
/// [`begin_positions_entry`](Self::begin_positions_entry) and
/// [`end_positions_entry`](Self::end_positions_entry); an entry closed
/// without values becomes null.
#[derive(Debug)]
pub struct BlockBuilder<T: Element> {
    values: Vec<T>,
    first_value_indexes: Vec<usize>,
    nulls: NullMaskBuilder,
    multivalued: bool,
    open_entry: Option<usize>,
}

impl<T: Element> BlockBuilder<T> {
    pub fn with_capacity(estimated_positions: usize) -> Self {
        let mut first_value_indexes = Vec::with_capacity(estimated_positions + 1);
        first_value_indexes.push(0);
        BlockBuilder {
            values: Vec::with_capacity(estimated_positions),
            first_value_indexes,
            nulls: NullMaskBuilder::with_capacity(estimated_positions),
            multivalued: false,
            open_entry: None,
        }
    }

    /// Append a value: a whole position, or one more value of the open entry
    pub fn append_value(&mut self, value: T) -> &mut Self {
        self.values.push(value);
        if self.open_entry.is_none() {
            self.close_position();
        }
        self
    }

    pub fn append_null(&mut self) -> &mut Self {
        if self.open_entry.is_some() {
            self.end_positions_entry();
        }
        self.close_position();
        self
    }

    /// Start a position that may hold several values. An entry that is
    /// still open is closed first.
    pub fn begin_positions_entry(&mut self) -> &mut Self {
        if self.open_entry.is_some() {
            self.end_positions_entry();
        }
        self.open_entry = Some(self.values.len());
        self
    }

    pub fn end_positions_entry(&mut self) -> &mut Self {
        if let Some(start) = self.open_entry.take() {
            if self.values.len() - start > 1 {
                self.multivalued = true;
            }
            self.close_position();
        }
        self
    }

    /// Append one position holding all of `values`; no values means null
    pub fn append_values(&mut self, values: impl IntoIterator<Item = T>) -> &mut Self {
        self.begin_positions_entry();
        self.values.extend(values);
        self.end_positions_entry()
    }

    fn close_position(&mut self) {
        let start = self.first_value_indexes.last().copied().unwrap_or(0);
        self.nulls.push(self.values.len() == start);
        self.first_value_indexes.push(self.values.len());
    }

    pub fn position_count(&self) -> usize {
        self.first_value_indexes.len() - 1
    }

    /// Finish the block. Without nulls or multi-valued positions the
    /// result is a plain vector-backed block.
    pub fn build(mut self) -> TypedBlock<T> {
        self.end_positions_entry();
        let values = TypedVector::from_values(self.values);
        if !self.multivalued && self.nulls.null_count() == 0 {
            return TypedBlock::from_vector(values);
        }
        TypedBlock::from_parts(values, self.first_value_indexes, self.nulls.finish())
    }
}
