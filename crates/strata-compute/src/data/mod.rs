//! Columnar data: vectors, blocks and pages.

pub mod block;
pub mod builder;
pub mod doc;
pub mod element;
pub mod mask;
pub mod page;
pub mod unsigned_long;
pub mod vector;

pub use block::{
    Block, BooleanBlock, BytesBlock, CompositeBlock, ConstantNullBlock, DoubleBlock, FloatBlock,
    IntBlock, LongBlock, TypedBlock,
};
pub use builder::BlockBuilder;
pub use doc::{DocBlock, DocVector};
pub use element::Element;
pub use mask::{NullMask, NullMaskBuilder};
pub use page::Page;
pub use vector::{
    BooleanVector, BytesVector, DoubleVector, FloatVector, IntVector, LongVector, TypedVector,
    Vector,
};
