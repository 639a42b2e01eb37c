//! Binary operators and their type resolution.
//!
//! Resolution runs once per expression, before any page is evaluated. It
//! either rejects the operand types or fixes the common type both operands
//! are widened to and the type of the result.

use std::fmt;

use strata_common::{DataType, ResolutionFailure, Source};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // ========================================
    // Arithmetic
    // ========================================
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // ========================================
    // Comparison
    // ========================================
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl BinaryOperator {
    pub const ALL: [BinaryOperator; 11] = [
        BinaryOperator::Add,
        BinaryOperator::Sub,
        BinaryOperator::Mul,
        BinaryOperator::Div,
        BinaryOperator::Mod,
        BinaryOperator::Eq,
        BinaryOperator::NotEq,
        BinaryOperator::Lt,
        BinaryOperator::Lte,
        BinaryOperator::Gt,
        BinaryOperator::Gte,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Eq => "==",
            BinaryOperator::NotEq => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Lte => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Gte => ">=",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Sub
                | BinaryOperator::Mul
                | BinaryOperator::Div
                | BinaryOperator::Mod
        )
    }

    pub fn is_comparison(&self) -> bool {
        !self.is_arithmetic()
    }

    /// Whether this operator accepts the operand types at all
    pub fn applicable(&self, lhs: DataType, rhs: DataType) -> bool {
        resolve(*self, &Source::synthetic(self.symbol()), lhs, rhs).is_ok()
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A binary operator bound to concrete operand types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinary {
    pub operator: BinaryOperator,
    pub source: Source,
    pub lhs_type: DataType,
    pub rhs_type: DataType,
    /// Both operands are widened to this type before evaluation
    pub common_type: DataType,
    pub result_type: DataType,
}

/// Resolve `lhs <op> rhs`.
///
/// Rejects operands the compute layer cannot carry (and the null type),
/// mixes of `unsigned_long` with any other type, non-numeric arithmetic, and
/// comparisons of unrelated types.
pub fn resolve(
    operator: BinaryOperator,
    source: &Source,
    lhs: DataType,
    rhs: DataType,
) -> Result<ResolvedBinary, ResolutionFailure> {
    let unsupported = |data_type| ResolutionFailure::Unsupported {
        source_text: source.text().to_string(),
        data_type,
    };
    for data_type in [lhs, rhs] {
        if !data_type.is_representable() {
            return Err(unsupported(data_type));
        }
    }

    // checked before null so `unsigned_long <op> null` names both sides
    if (lhs == DataType::UnsignedLong) != (rhs == DataType::UnsignedLong) {
        return Err(ResolutionFailure::UnsignedLongMismatch {
            source_text: source.text().to_string(),
            lhs,
            rhs,
        });
    }

    if let Some(data_type) = [lhs, rhs].into_iter().find(|t| *t == DataType::Null) {
        return Err(unsupported(data_type));
    }

    let common_type = if operator.is_arithmetic() {
        for (ordinal, data_type) in [("first", lhs), ("second", rhs)] {
            if !data_type.is_numeric() {
                return Err(ResolutionFailure::NotNumeric {
                    source_text: source.text().to_string(),
                    ordinal,
                    data_type,
                });
            }
        }
        lhs.common_type(&rhs)
    } else if lhs == rhs
        || (lhs.is_numeric() && rhs.is_numeric())
        || (lhs.is_string() && rhs.is_string())
    {
        lhs.common_type(&rhs)
    } else {
        None
    };

    let common_type = common_type.ok_or_else(|| ResolutionFailure::Incompatible {
        source_text: source.text().to_string(),
        lhs,
        rhs,
    })?;

    Ok(ResolvedBinary {
        operator,
        source: source.clone(),
        lhs_type: lhs,
        rhs_type: rhs,
        common_type,
        result_type: if operator.is_arithmetic() {
            common_type
        } else {
            DataType::Boolean
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> Source {
        Source::synthetic("lhs + rhs")
    }

    #[test]
    fn test_numeric_widening() {
        let resolved = resolve(BinaryOperator::Add, &source(), DataType::Integer, DataType::Long).unwrap();
        assert_eq!(resolved.common_type, DataType::Long);
        assert_eq!(resolved.result_type, DataType::Long);

        let resolved = resolve(BinaryOperator::Mul, &source(), DataType::Long, DataType::Double).unwrap();
        assert_eq!(resolved.common_type, DataType::Double);
    }

    #[test]
    fn test_unsigned_long_mismatch_message() {
        let err = resolve(BinaryOperator::Add, &source(), DataType::UnsignedLong, DataType::Long).unwrap_err();
        assert_eq!(
            err.to_string(),
            "first argument of [lhs + rhs] is [unsigned_long] and second is [long]. \
             [unsigned_long] can only be operated on together with another [unsigned_long]"
        );
    }

    #[test]
    fn test_unsigned_long_with_null_names_both_sides() {
        let err = resolve(BinaryOperator::Mul, &source(), DataType::UnsignedLong, DataType::Null).unwrap_err();
        assert_eq!(
            err.to_string(),
            "first argument of [lhs + rhs] is [unsigned_long] and second is [null]. \
             [unsigned_long] can only be operated on together with another [unsigned_long]"
        );
        let err = resolve(BinaryOperator::Add, &source(), DataType::Null, DataType::Long).unwrap_err();
        assert!(matches!(err, ResolutionFailure::Unsupported { data_type: DataType::Null, .. }));
    }

    #[test]
    fn test_unsigned_long_with_itself() {
        let resolved = resolve(
            BinaryOperator::Sub,
            &source(),
            DataType::UnsignedLong,
            DataType::UnsignedLong,
        )
        .unwrap();
        assert_eq!(resolved.common_type, DataType::UnsignedLong);
    }

    #[test]
    fn test_unrepresentable_and_null_rejected() {
        for data_type in [DataType::Null, DataType::Short, DataType::Object] {
            assert!(!BinaryOperator::Add.applicable(data_type, DataType::Long));
            assert!(!BinaryOperator::Eq.applicable(DataType::Long, data_type));
        }
    }

    #[test]
    fn test_arithmetic_needs_numbers() {
        let err = resolve(BinaryOperator::Add, &source(), DataType::Long, DataType::Keyword).unwrap_err();
        assert!(matches!(
            err,
            ResolutionFailure::NotNumeric {
                ordinal: "second",
                data_type: DataType::Keyword,
                ..
            }
        ));
        assert!(!BinaryOperator::Add.applicable(DataType::Datetime, DataType::Datetime));
    }

    #[test]
    fn test_comparison_rules() {
        let resolved = resolve(BinaryOperator::Lt, &source(), DataType::Integer, DataType::Double).unwrap();
        assert_eq!(resolved.result_type, DataType::Boolean);
        assert_eq!(resolved.common_type, DataType::Double);

        assert!(BinaryOperator::Eq.applicable(DataType::Keyword, DataType::Text));
        assert!(BinaryOperator::Gte.applicable(DataType::Datetime, DataType::Datetime));
        assert!(!BinaryOperator::Eq.applicable(DataType::Boolean, DataType::Keyword));
    }
}
