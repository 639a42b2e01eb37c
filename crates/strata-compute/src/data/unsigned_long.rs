//! `unsigned_long` values stored in LONG vectors.
//!
//! The sign bit is flipped on the way in, so comparing two encoded values as
//! `i64` gives the same answer as comparing the decoded values as `u64`.
//! Min, max and comparison operators work on the encoded form directly.

#[inline]
pub fn encode(value: u64) -> i64 {
    (value ^ (1 << 63)) as i64
}

#[inline]
pub fn decode(encoded: i64) -> u64 {
    (encoded as u64) ^ (1 << 63)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_edges() {
        for v in [0u64, 1, 42, i64::MAX as u64, 1 << 63, u64::MAX] {
            assert_eq!(decode(encode(v)), v);
        }
    }

    #[test]
    fn test_order_preserved() {
        let values = [0u64, 7, i64::MAX as u64, (i64::MAX as u64) + 1, u64::MAX - 1, u64::MAX];
        for pair in values.windows(2) {
            assert!(encode(pair[0]) < encode(pair[1]));
        }
        assert_eq!(encode(0), i64::MIN);
        assert_eq!(encode(u64::MAX), i64::MAX);
    }
}
