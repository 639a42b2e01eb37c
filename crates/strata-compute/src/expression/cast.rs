//! Numeric widening of operand blocks.

use strata_common::{DataType, Error, Result};

use crate::data::unsigned_long;
use crate::data::Block;

/// Widen `block` from `from` to `to`.
///
/// Constant blocks stay constant and nulls and multi-values keep their
/// positions. Types sharing an element type pass through untouched.
pub fn cast_block(block: &Block, from: DataType, to: DataType) -> Result<Block> {
    if from == to || matches!(block, Block::Null(_)) || from.element_type() == to.element_type() {
        return Ok(block.clone());
    }
    let widened: Block = match (from, to) {
        (DataType::Integer, DataType::Long) => block.as_int()?.map_values(|v| *v as i64).into(),
        (DataType::Integer, DataType::Double) => block.as_int()?.map_values(|v| *v as f64).into(),
        (DataType::Long, DataType::Double) => block.as_long()?.map_values(|v| *v as f64).into(),
        (DataType::UnsignedLong, DataType::Double) => block
            .as_long()?
            .map_values(|v| unsigned_long::decode(*v) as f64)
            .into(),
        _ => {
            return Err(Error::Internal(format!(
                "cannot cast [{}] to [{}]",
                from, to
            )))
        }
    };
    Ok(widened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{IntVector, LongBlock, LongVector};
    use strata_common::Value;

    #[test]
    fn test_int_to_long_keeps_constant() {
        let block: Block = IntVector::constant(3, 5).into_block().into();
        let cast = cast_block(&block, DataType::Integer, DataType::Long).unwrap();
        assert!(cast.is_constant());
        assert_eq!(cast.get_value(4), Value::Long(3));
    }

    #[test]
    fn test_long_to_double_keeps_nulls() {
        let mut builder = LongBlock::builder(2);
        builder.append_null().append_value(-4);
        let block: Block = builder.build().into();
        let cast = cast_block(&block, DataType::Long, DataType::Double).unwrap();
        assert!(cast.is_null(0));
        assert_eq!(cast.get_value(1), Value::Double(-4.0));
    }

    #[test]
    fn test_unsigned_long_to_double_decodes() {
        let block: Block = LongVector::from_values(vec![unsigned_long::encode(u64::MAX)])
            .into_block()
            .into();
        let cast = cast_block(&block, DataType::UnsignedLong, DataType::Double).unwrap();
        assert_eq!(cast.get_value(0), Value::Double(u64::MAX as f64));
    }

    #[test]
    fn test_keyword_to_text_passes_through() {
        let block = Block::constant(&Value::from("a"), 1).unwrap();
        let cast = cast_block(&block, DataType::Keyword, DataType::Text).unwrap();
        assert_eq!(cast, block);
    }

    #[test]
    fn test_unsupported_cast() {
        let block: Block = LongVector::from_values(vec![1]).into_block().into();
        assert!(cast_block(&block, DataType::Long, DataType::Integer).is_err());
    }
}
