//! Benchmark inputs for checked-alloc.
//!
//! Request sizes span the small-object, page, and large-mapping regimes of
//! typical system allocators so the wrapper's overhead is visible in each.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Sizes (in bytes) exercised by every allocation benchmark.
pub const REQUEST_SIZES: [usize; 4] = [16, 256, 4096, 1 << 20];

/// Element counts exercised by the collection benchmarks.
pub const VEC_CAPACITIES: [usize; 3] = [8, 1024, 65_536];

/// A short source line, the kind of string a compiler copies constantly.
pub const SAMPLE_LINE: &str = "let total = compute(base, offset) * scale;";
