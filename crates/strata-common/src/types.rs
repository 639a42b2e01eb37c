//! Declared data types for Strata
//!
//! A `DataType` is what the planner knows about an expression before any page
//! is evaluated. The compute layer only sees the narrower `ElementType` of the
//! vectors that carry the values; `DataType::element_type` is the bridge.

use crate::element_type::ElementType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared type of an expression operand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    // ============================================
    // Special types
    // ============================================
    /// The type of the `null` literal
    #[default]
    Null,
    /// A source field type the engine does not understand
    Unsupported,

    // ============================================
    // Boolean
    // ============================================
    Boolean,

    // ============================================
    // Integer types
    // ============================================
    /// 8-bit signed integer, widened on load
    Byte,
    /// 16-bit signed integer, widened on load
    Short,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    Long,
    /// 64-bit unsigned integer, stored sign-flipped in LONG vectors
    UnsignedLong,

    // ============================================
    // Rational types
    // ============================================
    Double,
    Float,
    HalfFloat,
    ScaledFloat,

    // ============================================
    // Byte-string types
    // ============================================
    Keyword,
    Text,
    Ip,
    Version,

    // ============================================
    // Temporal types
    // ============================================
    /// Milliseconds since the epoch
    Datetime,
    DatePeriod,
    TimeDuration,

    // ============================================
    // Nested types
    // ============================================
    Object,
    Nested,
}

const ALL_TYPES: &[DataType] = &[
    DataType::Null,
    DataType::Unsupported,
    DataType::Boolean,
    DataType::Byte,
    DataType::Short,
    DataType::Integer,
    DataType::Long,
    DataType::UnsignedLong,
    DataType::Double,
    DataType::Float,
    DataType::HalfFloat,
    DataType::ScaledFloat,
    DataType::Keyword,
    DataType::Text,
    DataType::Ip,
    DataType::Version,
    DataType::Datetime,
    DataType::DatePeriod,
    DataType::TimeDuration,
    DataType::Object,
    DataType::Nested,
];

impl DataType {
    /// Every declared type, in a stable order
    pub fn all() -> &'static [DataType] {
        ALL_TYPES
    }

    /// The lower-case name used in user-facing messages
    pub fn type_name(&self) -> &'static str {
        match self {
            DataType::Null => "null",
            DataType::Unsupported => "unsupported",
            DataType::Boolean => "boolean",
            DataType::Byte => "byte",
            DataType::Short => "short",
            DataType::Integer => "integer",
            DataType::Long => "long",
            DataType::UnsignedLong => "unsigned_long",
            DataType::Double => "double",
            DataType::Float => "float",
            DataType::HalfFloat => "half_float",
            DataType::ScaledFloat => "scaled_float",
            DataType::Keyword => "keyword",
            DataType::Text => "text",
            DataType::Ip => "ip",
            DataType::Version => "version",
            DataType::Datetime => "datetime",
            DataType::DatePeriod => "date_period",
            DataType::TimeDuration => "time_duration",
            DataType::Object => "object",
            DataType::Nested => "nested",
        }
    }

    /// Look a type up by its `type_name`
    pub fn from_type_name(name: &str) -> Option<DataType> {
        ALL_TYPES.iter().copied().find(|t| t.type_name() == name)
    }

    /// Returns true if this type is numeric (integer or rational)
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_rational()
    }

    /// Returns true if this type is an integer type
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::Byte
                | DataType::Short
                | DataType::Integer
                | DataType::Long
                | DataType::UnsignedLong
        )
    }

    /// Returns true if this type is a floating point type
    pub fn is_rational(&self) -> bool {
        matches!(
            self,
            DataType::Double | DataType::Float | DataType::HalfFloat | DataType::ScaledFloat
        )
    }

    /// Returns true if this type is a byte-string type
    pub fn is_string(&self) -> bool {
        matches!(self, DataType::Keyword | DataType::Text)
    }

    /// Returns true if values of this type can flow through the compute layer.
    ///
    /// Narrow numeric source types are widened before they reach a page, and
    /// nested or period types never do.
    pub fn is_representable(&self) -> bool {
        !matches!(
            self,
            DataType::Unsupported
                | DataType::Byte
                | DataType::Short
                | DataType::Float
                | DataType::HalfFloat
                | DataType::ScaledFloat
                | DataType::DatePeriod
                | DataType::TimeDuration
                | DataType::Object
                | DataType::Nested
        )
    }

    /// Size in bytes of one value, used to pick the wider of two numerics
    pub fn size(&self) -> usize {
        match self {
            DataType::Null => 0,
            DataType::Boolean | DataType::Byte => 1,
            DataType::Short | DataType::HalfFloat => 2,
            DataType::Integer | DataType::Float => 4,
            DataType::Long
            | DataType::UnsignedLong
            | DataType::Double
            | DataType::ScaledFloat
            | DataType::Datetime
            | DataType::DatePeriod
            | DataType::TimeDuration => 8,
            DataType::Keyword
            | DataType::Text
            | DataType::Ip
            | DataType::Version
            | DataType::Unsupported
            | DataType::Object
            | DataType::Nested => usize::MAX,
        }
    }

    /// The element type of the vectors carrying values of this type
    pub fn element_type(&self) -> ElementType {
        match self {
            DataType::Null => ElementType::Null,
            DataType::Boolean => ElementType::Boolean,
            DataType::Integer => ElementType::Int,
            DataType::Long | DataType::UnsignedLong | DataType::Datetime => ElementType::Long,
            DataType::Double => ElementType::Double,
            DataType::Float | DataType::HalfFloat => ElementType::Float,
            DataType::Keyword | DataType::Text | DataType::Ip | DataType::Version => {
                ElementType::Bytes
            }
            _ => ElementType::Unknown,
        }
    }

    /// Find the type two operands are coerced to before an operator runs.
    ///
    /// Integers widen to the larger integer, any rational wins over an
    /// integer and the larger rational wins over the smaller one.
    pub fn common_type(&self, other: &DataType) -> Option<DataType> {
        if self == other {
            return Some(*self);
        }

        // NULL takes the type of the other side
        if *self == DataType::Null {
            return Some(*other);
        }
        if *other == DataType::Null {
            return Some(*self);
        }

        if self.is_string() && other.is_string() {
            return Some(DataType::Text);
        }

        if self.is_numeric() && other.is_numeric() {
            return Some(self.promote_numeric(other));
        }

        None
    }

    fn promote_numeric(&self, other: &DataType) -> DataType {
        if self.is_integer() {
            if other.is_integer() {
                if *self == DataType::UnsignedLong || *other == DataType::UnsignedLong {
                    return DataType::UnsignedLong;
                }
                return if self.size() >= other.size() { *self } else { *other };
            }
            return *other;
        }
        if other.is_integer() {
            return *self;
        }
        if self.size() >= other.size() {
            *self
        } else {
            *other
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_null() {
        assert_eq!(DataType::default(), DataType::Null);
    }

    #[test]
    fn test_is_numeric() {
        assert!(DataType::Integer.is_numeric());
        assert!(DataType::UnsignedLong.is_numeric());
        assert!(DataType::Double.is_numeric());
        assert!(!DataType::Keyword.is_numeric());
        assert!(!DataType::Boolean.is_numeric());
        assert!(!DataType::Datetime.is_numeric());
    }

    #[test]
    fn test_representable() {
        assert!(DataType::Long.is_representable());
        assert!(DataType::Null.is_representable());
        assert!(!DataType::Float.is_representable());
        assert!(!DataType::Object.is_representable());
    }

    #[test]
    fn test_common_type_widens() {
        assert_eq!(
            DataType::Integer.common_type(&DataType::Long),
            Some(DataType::Long)
        );
        assert_eq!(
            DataType::Long.common_type(&DataType::Integer),
            Some(DataType::Long)
        );
        assert_eq!(
            DataType::Long.common_type(&DataType::Double),
            Some(DataType::Double)
        );
        assert_eq!(
            DataType::Double.common_type(&DataType::Integer),
            Some(DataType::Double)
        );
        assert_eq!(
            DataType::Null.common_type(&DataType::Keyword),
            Some(DataType::Keyword)
        );
        assert_eq!(DataType::Keyword.common_type(&DataType::Long), None);
    }

    #[test]
    fn test_element_type_mapping() {
        assert_eq!(DataType::Integer.element_type(), ElementType::Int);
        assert_eq!(DataType::UnsignedLong.element_type(), ElementType::Long);
        assert_eq!(DataType::Datetime.element_type(), ElementType::Long);
        assert_eq!(DataType::Keyword.element_type(), ElementType::Bytes);
        assert_eq!(DataType::Object.element_type(), ElementType::Unknown);
    }

    #[test]
    fn test_type_names_round_trip() {
        for t in DataType::all() {
            assert_eq!(DataType::from_type_name(t.type_name()), Some(*t));
        }
        assert_eq!(DataType::UnsignedLong.to_string(), "unsigned_long");
    }
}
