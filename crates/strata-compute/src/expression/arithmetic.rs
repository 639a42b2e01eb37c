//! Per-position kernels for binary operators.
//!
//! A kernel maps two operand values to a result or an [`EvaluationFailure`];
//! the evaluator turns failures into nulls plus a warning. Kernels are plain
//! function pointers, picked once per expression.

use strata_common::DataType;
use thiserror::Error;

use crate::data::element::Element;
use crate::data::unsigned_long;

use super::binary::BinaryOperator;

/// Why one position failed to evaluate. The `Display` text is the warning
/// category.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationFailure {
    #[error("arithmetic error: {0} overflow")]
    Overflow(DataType),

    #[error("arithmetic error: / by zero")]
    DivisionByZero,

    #[error("arithmetic error: not a finite double number")]
    NonFinite,

    #[error("illegal argument: single-value function encountered multi-value")]
    MultiValue,
}

pub type Kernel<T, R> = fn(&T, &T) -> Result<R, EvaluationFailure>;

/// Arithmetic that reports overflow and division by zero instead of
/// wrapping or panicking
pub trait CheckedArithmetic: Element + Copy + PartialOrd {
    fn add(lhs: &Self, rhs: &Self) -> Result<Self, EvaluationFailure>;
    fn sub(lhs: &Self, rhs: &Self) -> Result<Self, EvaluationFailure>;
    fn mul(lhs: &Self, rhs: &Self) -> Result<Self, EvaluationFailure>;
    fn div(lhs: &Self, rhs: &Self) -> Result<Self, EvaluationFailure>;
    fn rem(lhs: &Self, rhs: &Self) -> Result<Self, EvaluationFailure>;
}

macro_rules! checked_integer {
    ($ty:ty, $data_type:expr) => {
        impl CheckedArithmetic for $ty {
            fn add(lhs: &Self, rhs: &Self) -> Result<Self, EvaluationFailure> {
                lhs.checked_add(*rhs).ok_or(EvaluationFailure::Overflow($data_type))
            }

            fn sub(lhs: &Self, rhs: &Self) -> Result<Self, EvaluationFailure> {
                lhs.checked_sub(*rhs).ok_or(EvaluationFailure::Overflow($data_type))
            }

            fn mul(lhs: &Self, rhs: &Self) -> Result<Self, EvaluationFailure> {
                lhs.checked_mul(*rhs).ok_or(EvaluationFailure::Overflow($data_type))
            }

            fn div(lhs: &Self, rhs: &Self) -> Result<Self, EvaluationFailure> {
                if *rhs == 0 {
                    return Err(EvaluationFailure::DivisionByZero);
                }
                // MIN / -1
                lhs.checked_div(*rhs).ok_or(EvaluationFailure::Overflow($data_type))
            }

            fn rem(lhs: &Self, rhs: &Self) -> Result<Self, EvaluationFailure> {
                if *rhs == 0 {
                    return Err(EvaluationFailure::DivisionByZero);
                }
                Ok(lhs.wrapping_rem(*rhs))
            }
        }
    };
}

checked_integer!(i32, DataType::Integer);
checked_integer!(i64, DataType::Long);

fn finite(value: f64) -> Result<f64, EvaluationFailure> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvaluationFailure::NonFinite)
    }
}

impl CheckedArithmetic for f64 {
    fn add(lhs: &Self, rhs: &Self) -> Result<Self, EvaluationFailure> {
        finite(lhs + rhs)
    }

    fn sub(lhs: &Self, rhs: &Self) -> Result<Self, EvaluationFailure> {
        finite(lhs - rhs)
    }

    fn mul(lhs: &Self, rhs: &Self) -> Result<Self, EvaluationFailure> {
        finite(lhs * rhs)
    }

    fn div(lhs: &Self, rhs: &Self) -> Result<Self, EvaluationFailure> {
        finite(lhs / rhs)
    }

    fn rem(lhs: &Self, rhs: &Self) -> Result<Self, EvaluationFailure> {
        finite(lhs % rhs)
    }
}

pub fn arithmetic_kernel<T: CheckedArithmetic>(operator: BinaryOperator) -> Option<Kernel<T, T>> {
    let kernel: Kernel<T, T> = match operator {
        BinaryOperator::Add => T::add,
        BinaryOperator::Sub => T::sub,
        BinaryOperator::Mul => T::mul,
        BinaryOperator::Div => T::div,
        BinaryOperator::Mod => T::rem,
        _ => return None,
    };
    Some(kernel)
}

// unsigned_long operands arrive encoded; decode, compute in u64, re-encode

fn unsigned(
    lhs: &i64,
    rhs: &i64,
    op: fn(u64, u64) -> Option<u64>,
) -> Result<i64, EvaluationFailure> {
    op(unsigned_long::decode(*lhs), unsigned_long::decode(*rhs))
        .map(unsigned_long::encode)
        .ok_or(EvaluationFailure::Overflow(DataType::UnsignedLong))
}

fn unsigned_add(lhs: &i64, rhs: &i64) -> Result<i64, EvaluationFailure> {
    unsigned(lhs, rhs, u64::checked_add)
}

fn unsigned_sub(lhs: &i64, rhs: &i64) -> Result<i64, EvaluationFailure> {
    unsigned(lhs, rhs, u64::checked_sub)
}

fn unsigned_mul(lhs: &i64, rhs: &i64) -> Result<i64, EvaluationFailure> {
    unsigned(lhs, rhs, u64::checked_mul)
}

fn unsigned_div(lhs: &i64, rhs: &i64) -> Result<i64, EvaluationFailure> {
    if unsigned_long::decode(*rhs) == 0 {
        return Err(EvaluationFailure::DivisionByZero);
    }
    unsigned(lhs, rhs, u64::checked_div)
}

fn unsigned_rem(lhs: &i64, rhs: &i64) -> Result<i64, EvaluationFailure> {
    if unsigned_long::decode(*rhs) == 0 {
        return Err(EvaluationFailure::DivisionByZero);
    }
    unsigned(lhs, rhs, u64::checked_rem)
}

pub fn unsigned_long_kernel(operator: BinaryOperator) -> Option<Kernel<i64, i64>> {
    let kernel: Kernel<i64, i64> = match operator {
        BinaryOperator::Add => unsigned_add,
        BinaryOperator::Sub => unsigned_sub,
        BinaryOperator::Mul => unsigned_mul,
        BinaryOperator::Div => unsigned_div,
        BinaryOperator::Mod => unsigned_rem,
        _ => return None,
    };
    Some(kernel)
}

/// Comparison kernel. Encoded `unsigned_long` values compare correctly as
/// `i64`.
pub fn comparison_kernel<T: Element + PartialOrd>(operator: BinaryOperator) -> Option<Kernel<T, bool>> {
    let kernel: Kernel<T, bool> = match operator {
        BinaryOperator::Eq => |l, r| Ok(l == r),
        BinaryOperator::NotEq => |l, r| Ok(l != r),
        BinaryOperator::Lt => |l, r| Ok(l < r),
        BinaryOperator::Lte => |l, r| Ok(l <= r),
        BinaryOperator::Gt => |l, r| Ok(l > r),
        BinaryOperator::Gte => |l, r| Ok(l >= r),
        _ => return None,
    };
    Some(kernel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::unsigned_long::{decode, encode};

    #[test]
    fn test_integer_overflow() {
        assert_eq!(
            <i64 as CheckedArithmetic>::add(&i64::MAX, &1),
            Err(EvaluationFailure::Overflow(DataType::Long))
        );
        assert_eq!(
            <i32 as CheckedArithmetic>::mul(&i32::MAX, &2),
            Err(EvaluationFailure::Overflow(DataType::Integer))
        );
        assert_eq!(
            EvaluationFailure::Overflow(DataType::Long).to_string(),
            "arithmetic error: long overflow"
        );
    }

    #[test]
    fn test_division_by_zero() {
        let div = arithmetic_kernel::<i64>(BinaryOperator::Div).unwrap();
        assert_eq!(div(&7, &0), Err(EvaluationFailure::DivisionByZero));
        assert_eq!(div(&7, &2), Ok(3));
        assert_eq!(div(&i64::MIN, &-1), Err(EvaluationFailure::Overflow(DataType::Long)));

        let rem = arithmetic_kernel::<i32>(BinaryOperator::Mod).unwrap();
        assert_eq!(rem(&i32::MIN, &-1), Ok(0));
        assert_eq!(rem(&-7, &3), Ok(-1));
    }

    #[test]
    fn test_double_must_be_finite() {
        let div = arithmetic_kernel::<f64>(BinaryOperator::Div).unwrap();
        assert_eq!(div(&1.0, &0.0), Err(EvaluationFailure::NonFinite));
        let mul = arithmetic_kernel::<f64>(BinaryOperator::Mul).unwrap();
        assert_eq!(mul(&f64::MAX, &2.0), Err(EvaluationFailure::NonFinite));
        assert_eq!(mul(&1.5, &2.0), Ok(3.0));
    }

    #[test]
    fn test_unsigned_long_kernels() {
        let add = unsigned_long_kernel(BinaryOperator::Add).unwrap();
        let big = encode(u64::MAX - 1);
        assert_eq!(add(&big, &encode(1)).map(decode), Ok(u64::MAX));
        assert_eq!(
            add(&big, &encode(2)),
            Err(EvaluationFailure::Overflow(DataType::UnsignedLong))
        );
        let sub = unsigned_long_kernel(BinaryOperator::Sub).unwrap();
        assert!(sub(&encode(1), &encode(2)).is_err());
        let div = unsigned_long_kernel(BinaryOperator::Div).unwrap();
        assert_eq!(div(&encode(1), &encode(0)), Err(EvaluationFailure::DivisionByZero));
    }

    #[test]
    fn test_comparisons() {
        let lt = comparison_kernel::<i64>(BinaryOperator::Lt).unwrap();
        assert_eq!(lt(&encode(1), &encode(u64::MAX)), Ok(true));
        assert!(comparison_kernel::<i64>(BinaryOperator::Add).is_none());
        assert!(arithmetic_kernel::<i64>(BinaryOperator::Eq).is_none());
    }
}
