//! Arena allocation for resolved program nodes.
//!
//! All HIR nodes handed to the checker are allocated from a bump arena to
//! minimize allocation overhead and improve cache locality.

use bumpalo::Bump;

/// The HIR arena wraps a bump allocator for program-node allocations.
///
/// Statements, expressions, and type annotations are allocated from this
/// arena. When a checking pass is done, the entire arena is freed at once
/// (O(1) deallocation).
pub struct HirArena {
    bump: Bump,
}

impl HirArena {
    /// Create a new arena with default capacity.
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    /// Create a new arena with the specified initial capacity in bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bump: Bump::with_capacity(capacity),
        }
    }

    /// Get a reference to the underlying bump allocator.
    #[inline]
    pub fn bump(&self) -> &Bump {
        &self.bump
    }

    /// Allocate a value in the arena and return a reference to it.
    #[inline]
    pub fn alloc<T>(&self, val: T) -> &T {
        self.bump.alloc(val)
    }

    /// Allocate a slice by cloning from a source slice.
    #[inline]
    pub fn alloc_slice<T: Clone>(&self, src: &[T]) -> &[T] {
        self.bump.alloc_slice_clone(src)
    }

    /// Allocate a string slice in the arena.
    #[inline]
    pub fn alloc_str(&self, s: &str) -> &str {
        self.bump.alloc_str(s)
    }

    /// Returns the total bytes allocated in this arena.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }

    /// Reset the arena, deallocating all objects but keeping the memory.
    pub fn reset(&mut self) {
        self.bump.reset();
    }
}

impl Default for HirArena {
    fn default() -> Self {
        Self::new()
    }
}
