//! Markup data model shared by the parsers and the minifiers.
//!
//! - `Tag` / `Attribute`: one occurrence in the source, typed through `metadata`
//! - `NodeCoordinates`: 1-based line/column, composable across nesting levels
//! - `MarkupParsingContext`: where the parser currently is

mod attribute;
mod context;
mod coordinates;
pub mod metadata;
pub mod optional;
mod tag;

pub use attribute::Attribute;
pub use context::MarkupParsingContext;
pub use coordinates::{LineIndex, NodeCoordinates};
pub use metadata::{AttributeType, TagFlags, attribute_type, tag_flags};
pub use tag::{Attributes, Tag};
