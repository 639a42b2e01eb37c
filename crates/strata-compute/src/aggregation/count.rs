//! Value count.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use strata_common::Value;

/// Running value count. Null positions hold no values and add nothing; a
/// multi-valued position adds each of its values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountState {
    pub count: i64,
}

impl CountState {
    pub fn add_range(&mut self, values: Range<usize>) {
        self.count += values.len() as i64;
    }

    pub fn merge(&mut self, other: &CountState) {
        self.count += other.count;
    }

    pub fn finish(&self) -> Value {
        Value::Long(self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_ranges_and_merge() {
        let mut a = CountState::default();
        a.add_range(0..7);
        a.add_range(3..3);
        let mut b = CountState::default();
        b.add_range(10..23);

        a.merge(&b);
        assert_eq!(a.finish(), Value::Long(20));
        assert_eq!(CountState::default().finish(), Value::Long(0));
    }
}
