//! Fail-fast memory allocation.
//!
//! Every allocation either succeeds with a usable block or the process
//! terminates: callers never check for a null, empty, or error result.
//!
//! # Architecture
//!
//! ```text
//! allocate(size) / CheckedAllocator<A>
//! ├── RawAllocator (underlying allocator seam, Result-returning)
//! │   └── SystemAllocator → std::alloc::System
//! ├── Block<A> (owned, uninitialised bytes; released on drop)
//! └── fail_fast() (one stderr line, then process::abort)
//!
//! FailFastGlobal<A: GlobalAlloc>   (#[global_allocator] adapter)
//! collections::{string_from, vec_with_capacity, ...}
//! ```
//!
//! # Zero-size requests
//!
//! `allocate(0)` returns an empty, well-aligned block without consulting
//! the underlying allocator. It never terminates the process.
//!
//! # Unsafe code
//!
//! Confined to `raw`, `source`, `block` and `global`; each block carries a
//! `// SAFETY:` comment.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod block;
pub mod checked;
pub mod collections;
pub mod config;
pub mod error;
pub mod failure;
pub mod global;
mod raw;
pub mod source;

// Public re-exports for the primary API surface.
pub use block::Block;
pub use checked::CheckedAllocator;
pub use config::{ConfigError, Diagnostic, FailFastConfig};
pub use error::AllocError;
pub use failure::fail_fast;
pub use global::FailFastGlobal;
pub use source::{RawAllocator, SystemAllocator};

static SYSTEM: CheckedAllocator = CheckedAllocator::system();

/// Allocate `size` uninitialised bytes from the system allocator.
///
/// Aborts the process with a diagnostic if the request cannot be satisfied.
pub fn allocate(size: usize) -> Block {
    SYSTEM.allocate(size)
}

/// Allocate `size` zeroed bytes from the system allocator.
///
/// Aborts the process with a diagnostic if the request cannot be satisfied.
pub fn allocate_zeroed(size: usize) -> Block {
    SYSTEM.allocate_zeroed(size)
}
