//! The fail-fast allocator.
//!
//! [`CheckedAllocator`] turns an underlying allocator's `Result` into a
//! guarantee: every allocation call either returns a usable [`Block`] or
//! the process is gone. Zero-length requests are satisfied without calling
//! the underlying allocator.

use std::alloc::Layout;

use crate::block::Block;
use crate::config::{ConfigError, FailFastConfig};
use crate::error::AllocError;
use crate::failure::fail_fast;
use crate::raw;
use crate::source::{RawAllocator, SystemAllocator};

/// A [`RawAllocator`] wrapper that aborts instead of failing.
///
/// Holds only immutable configuration and the allocator handle, so it is
/// `Send + Sync` whenever `A` is and may be shared across threads freely.
#[derive(Clone, Debug)]
pub struct CheckedAllocator<A: RawAllocator = SystemAllocator> {
    allocator: A,
    config: FailFastConfig,
}

impl CheckedAllocator<SystemAllocator> {
    /// A checked allocator over the system allocator with default config.
    pub const fn system() -> Self {
        Self::new(SystemAllocator)
    }
}

impl Default for CheckedAllocator<SystemAllocator> {
    fn default() -> Self {
        Self::system()
    }
}

impl<A: RawAllocator> CheckedAllocator<A> {
    /// Wrap `allocator` with the default configuration.
    pub const fn new(allocator: A) -> Self {
        Self {
            allocator,
            config: FailFastConfig::DEFAULT,
        }
    }

    /// Wrap `allocator` with a validated configuration.
    pub fn with_config(allocator: A, config: FailFastConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { allocator, config })
    }

    /// The active configuration.
    pub fn config(&self) -> &FailFastConfig {
        &self.config
    }

    /// The underlying allocator.
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Allocate `size` uninitialised bytes at the configured alignment.
    ///
    /// `size == 0` yields an empty block. Aborts the process if the
    /// underlying allocator cannot satisfy the request.
    pub fn allocate(&self, size: usize) -> Block<A>
    where
        A: Clone,
    {
        let layout = self.layout_for(size);
        self.allocate_layout(layout)
    }

    /// Allocate `size` zeroed bytes at the configured alignment.
    ///
    /// Aborts the process if the underlying allocator cannot satisfy the request.
    pub fn allocate_zeroed(&self, size: usize) -> Block<A>
    where
        A: Clone,
    {
        let layout = self.layout_for(size);
        if layout.size() == 0 {
            return self.empty(layout);
        }
        match self.allocator.try_allocate_zeroed(layout) {
            Ok(ptr) => Block::new(ptr, layout, self.allocator.clone()),
            Err(err) => fail_fast(&err, &self.config),
        }
    }

    /// Allocate a block for an explicit size and alignment.
    ///
    /// Aborts the process if the underlying allocator cannot satisfy the request.
    pub fn allocate_layout(&self, layout: Layout) -> Block<A>
    where
        A: Clone,
    {
        if layout.size() == 0 {
            return self.empty(layout);
        }
        match self.allocator.try_allocate(layout) {
            Ok(ptr) => Block::new(ptr, layout, self.allocator.clone()),
            Err(err) => fail_fast(&err, &self.config),
        }
    }

    fn layout_for(&self, size: usize) -> Layout {
        match Layout::from_size_align(size, self.config.align) {
            Ok(layout) => layout,
            Err(_) => fail_fast(
                &AllocError::InvalidLayout {
                    requested: size,
                    align: self.config.align,
                },
                &self.config,
            ),
        }
    }

    fn empty(&self, layout: Layout) -> Block<A>
    where
        A: Clone,
    {
        Block::new(raw::dangling(layout.align()), layout, self.allocator.clone())
    }
}
