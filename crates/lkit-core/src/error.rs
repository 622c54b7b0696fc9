#![forbid(unsafe_code)]

//! Errors for the core document types.

/// Errors from segment table mutation.
#[derive(Debug, Clone)]
pub enum SegmentError {
    /// The inserted range intersects an existing segment.
    Overlap {
        /// Name of the rejected segment.
        inserted: String,
        /// Name of the segment it collides with.
        existing: String,
    },
    /// `start >= end`.
    EmptyRange {
        /// Name of the rejected segment.
        name: String,
    },
}

impl std::fmt::Display for SegmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overlap { inserted, existing } => {
                write!(f, "segment '{inserted}' overlaps existing '{existing}'")
            }
            Self::EmptyRange { name } => write!(f, "segment '{name}' has an empty range"),
        }
    }
}

impl std::error::Error for SegmentError {}
