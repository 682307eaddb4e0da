//! Error type shared by every container in the crate.

use thiserror::Error;

/// Broad classification of a [`SetError`].
///
/// Several variants can share a kind; callers that only care whether an
/// argument was rejected match on the kind instead of the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A caller-supplied value or parameter was not acceptable.
    InvalidArgument,
    /// The requested element does not exist.
    NoSuchElement,
    /// A cursor was used out of order.
    IllegalState,
    /// A fixed-capacity container has no room left.
    ResourceExhausted,
}

/// Error type for set operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetError {
    /// `sub_set(from, to)` was called with `from > to`.
    #[error("range bounds are inverted: lower bound is greater than upper bound")]
    InvertedBounds,

    /// A view was narrowed to a range reaching outside its own bounds.
    #[error("requested range exceeds the bounds of the view")]
    BoundsExceeded,

    /// A value outside a view's bounds was added or removed through it.
    #[error("value is outside the bounds of the view")]
    OutOfRange,

    /// The bit width passed to an open-addressing set is unsupported.
    #[error("bit width {bits} is outside the supported range 2..=31")]
    InvalidBitWidth {
        /// The rejected bit width.
        bits: u32,
    },

    /// `first`/`last` on an empty collection, or a cursor advanced past its end.
    #[error("no such element")]
    NoSuchElement,

    /// Cursor `remove` without a preceding `advance`, or twice for one element.
    #[error("cursor remove called without a freshly yielded element")]
    IllegalState,

    /// Every slot of an open-addressing table is occupied.
    #[error("table full: all {capacity} slots are occupied")]
    TableFull {
        /// Fixed capacity of the table.
        capacity: usize,
    },
}

impl SetError {
    /// Returns the broad kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SetError::InvertedBounds
            | SetError::BoundsExceeded
            | SetError::OutOfRange
            | SetError::InvalidBitWidth { .. } => ErrorKind::InvalidArgument,
            SetError::NoSuchElement => ErrorKind::NoSuchElement,
            SetError::IllegalState => ErrorKind::IllegalState,
            SetError::TableFull { .. } => ErrorKind::ResourceExhausted,
        }
    }
}

/// Result type for set operations.
pub type Result<T> = std::result::Result<T, SetError>;
