//! Allocation error types.
//!
//! [`AllocError`] only travels between an underlying allocator and the
//! fail-fast layer. Callers of [`CheckedAllocator`](crate::CheckedAllocator)
//! never see it as a value: it is rendered into the abort diagnostic.

use std::alloc::Layout;
use std::collections::TryReserveError;
use std::error::Error;
use std::fmt;

/// Why an underlying allocator could not satisfy a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The allocator has no memory left for a request of this shape.
    Exhausted {
        /// Number of bytes requested.
        requested: usize,
        /// Alignment requested, in bytes.
        align: usize,
    },
    /// The request cannot be expressed as a valid [`Layout`]: the size,
    /// rounded up to the alignment, exceeds `isize::MAX`.
    InvalidLayout {
        /// Number of bytes requested.
        requested: usize,
        /// Alignment requested, in bytes.
        align: usize,
    },
}

impl AllocError {
    /// An exhaustion error for the given layout.
    pub fn exhausted(layout: Layout) -> Self {
        Self::Exhausted {
            requested: layout.size(),
            align: layout.align(),
        }
    }

    /// Number of bytes the failed request asked for.
    pub fn requested(&self) -> usize {
        match *self {
            Self::Exhausted { requested, .. } | Self::InvalidLayout { requested, .. } => requested,
        }
    }

    /// Alignment the failed request asked for.
    pub fn align(&self) -> usize {
        match *self {
            Self::Exhausted { align, .. } | Self::InvalidLayout { align, .. } => align,
        }
    }

    /// Convert a collection reservation failure.
    ///
    /// `TryReserveError` does not expose its cause on stable, so the
    /// distinction is made by whether the resulting capacity of
    /// `len + additional` elements is even representable as a layout.
    pub(crate) fn from_reserve<T>(_err: TryReserveError, len: usize, additional: usize) -> Self {
        let align = std::mem::align_of::<T>();
        let elem = std::mem::size_of::<T>();
        match len
            .checked_add(additional)
            .and_then(|total| total.checked_mul(elem))
            .and_then(|bytes| Layout::from_size_align(bytes, align).ok())
        {
            Some(layout) => Self::exhausted(layout),
            None => Self::InvalidLayout {
                requested: len.saturating_add(additional).saturating_mul(elem),
                align,
            },
        }
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { requested, align } => {
                write!(
                    f,
                    "allocation of {requested} bytes (align {align}) failed: out of memory"
                )
            }
            Self::InvalidLayout { requested, align } => {
                write!(
                    f,
                    "allocation of {requested} bytes (align {align}) failed: size exceeds isize::MAX"
                )
            }
        }
    }
}

impl Error for AllocError {}
