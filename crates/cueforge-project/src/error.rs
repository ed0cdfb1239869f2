//! Error types for project loading and compilation.

use thiserror::Error;

/// Result type for compiler operations.
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors that can occur while loading a source project or compiling it
/// into a binary image.
///
/// Referential lookups that miss are defects in the authored data, so
/// they carry the referencing entity and the unresolved id, never just
/// "not found".
#[derive(Debug, Error)]
pub enum CompileError {
    /// The source document could not be parsed.
    #[error("failed to parse project document: {0}")]
    DocumentError(#[from] serde_json::Error),

    /// A required top-level section is missing from the source tree.
    #[error("project has no {section} section")]
    ProjectStructureError {
        /// The missing section (e.g. "mix bus").
        section: &'static str,
    },

    /// A string reference has no match in the referenced collection.
    #[error("{entity} references unknown {kind} {referenced:?}")]
    UnknownReference {
        /// The referencing entity (e.g. a sound's path id).
        entity: String,
        /// What kind of thing was referenced (e.g. "wave bank").
        kind: &'static str,
        /// The id that failed to resolve.
        referenced: String,
    },

    /// A node lacks a required attribute.
    #[error("{node} node is missing required attribute {attribute:?}")]
    MissingAttribute {
        /// Description of the node (name plus declared id, if any).
        node: String,
        /// The missing attribute.
        attribute: String,
    },

    /// An attribute value could not be interpreted.
    #[error("{node} node attribute {attribute:?} has invalid value {value:?}, expected {expected}")]
    InvalidAttribute {
        /// Description of the node.
        node: String,
        /// The offending attribute.
        attribute: String,
        /// The value as authored.
        value: String,
        /// Description of the accepted values.
        expected: String,
    },

    /// A required collection has the wrong size (empty wave bank, sound
    /// without wave references, preset parameter-set count mismatch).
    #[error("{entity}: expected {expected}, found {found}")]
    MalformedCount {
        /// The entity with the bad collection.
        entity: String,
        /// Description of the required size.
        expected: String,
        /// The size actually found.
        found: usize,
    },

    /// Zero or more than one mix preset is marked as the default.
    #[error("expected exactly one default mix preset, found {found}")]
    DuplicateOrMissingDefault {
        /// Number of default presets in the project.
        found: usize,
    },

    /// An event references both a sound and a streaming wave bank entry,
    /// or neither.
    #[error("event {id:?} must reference either a sound or a streaming wave bank entry; found {found}")]
    AmbiguousEventReference {
        /// Path id of the event.
        id: String,
        /// "both" or "neither".
        found: &'static str,
    },
}
