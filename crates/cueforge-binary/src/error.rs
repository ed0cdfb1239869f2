//! Error types for the binary codec.

use thiserror::Error;

use crate::image::FILE_IDENTIFIER;

/// Result type for codec operations.
pub type BinaryResult<T> = Result<T, BinaryError>;

/// Errors that can occur while encoding or decoding an engine-data image.
///
/// Every decode failure names the entity and field that failed along with
/// the offending value and its bound, so upstream data problems can be
/// reported with enough context to fix the source project.
#[derive(Debug, Error)]
pub enum BinaryError {
    /// The stream does not start with the engine-data file identifier.
    #[error("invalid file identifier {found:02X?}, expected {:02X?}", FILE_IDENTIFIER)]
    InvalidFileIdentifier {
        /// The bytes actually present at the start of the stream.
        found: Vec<u8>,
    },

    /// A required chunk is missing from the stream.
    #[error("chunk 0x{chunk_id:08X} not found in stream")]
    ChunkNotFound {
        /// Numeric id of the missing chunk.
        chunk_id: i32,
    },

    /// A cross-reference index falls outside its target array.
    #[error("{entity}: {field} is {index}, expected value in [0, {bound})")]
    OutOfBoundsIndex {
        /// The entity holding the bad reference (e.g. "mix bus master").
        entity: String,
        /// The field that failed validation.
        field: &'static str,
        /// The offending index.
        index: i64,
        /// Exclusive upper bound of the target array.
        bound: usize,
    },

    /// Zero or more than one mix preset is marked as the default.
    #[error("expected exactly one default mix preset, found {found}")]
    DuplicateOrMissingDefault {
        /// Number of default presets observed when the error was raised.
        found: usize,
    },

    /// A declared count is invalid, or a required non-empty collection
    /// is empty.
    #[error("{entity}: {field} is {value}, expected {expected}")]
    MalformedCount {
        /// The entity holding the bad count.
        entity: String,
        /// The field that failed validation.
        field: &'static str,
        /// The offending value.
        value: i64,
        /// Description of the accepted range.
        expected: &'static str,
    },

    /// An enum field carries an unknown wire discriminant.
    #[error("{entity}: unknown {field} value {value}")]
    InvalidEnumValue {
        /// The entity holding the bad discriminant.
        entity: String,
        /// The enum field.
        field: &'static str,
        /// The offending wire value.
        value: i32,
    },

    /// The decoded sub-bus graph contains a cycle.
    #[error("mix bus {id:?} (index {index}) participates in a sub-bus cycle")]
    CyclicBusGraph {
        /// Id of a bus on the cycle.
        id: String,
        /// Index of that bus in the mix bus array.
        index: usize,
    },

    /// A wire string contains a byte outside the ASCII range.
    #[error("non-ASCII byte {byte:#04X} in string field")]
    NonAsciiString {
        /// The offending byte.
        byte: u8,
    },

    /// An underlying I/O failure (truncated stream, unreadable file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
