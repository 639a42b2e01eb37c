//! What single-value operators do with multi-valued positions.

use std::fmt;

use crate::warnings::Warnings;

use super::arithmetic::EvaluationFailure;

/// Picks the one value an operator should see at a multi-valued position.
///
/// Returns the value index to use, or `None` to make the position null.
/// Only called when a position holds more than one value.
pub trait MultiValueSelector: Send + Sync + fmt::Debug {
    fn select(&self, first_value_index: usize, value_count: usize, warnings: &Warnings) -> Option<usize>;
}

/// Null plus a warning
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOnMultiValue;

impl MultiValueSelector for NullOnMultiValue {
    fn select(&self, _first_value_index: usize, _value_count: usize, warnings: &Warnings) -> Option<usize> {
        warnings.register_failure(&EvaluationFailure::MultiValue);
        None
    }
}

/// The first stored value, silently
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstValue;

impl MultiValueSelector for FirstValue {
    fn select(&self, first_value_index: usize, _value_count: usize, _warnings: &Warnings) -> Option<usize> {
        Some(first_value_index)
    }
}
