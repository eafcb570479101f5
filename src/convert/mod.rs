//! Conversion between stored documents and typed entities.

pub mod document;
pub mod read;
pub mod write;

pub use document::{CLASS_FIELD, Document, ID_FIELD, RESERVED_PREFIX};
pub use read::{ConvertiblePair, RecordReadConverter};
pub use write::RecordWriteConverter;
