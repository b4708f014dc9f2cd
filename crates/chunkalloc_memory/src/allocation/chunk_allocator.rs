use std::{marker::PhantomData, ptr::NonNull, rc::Rc};

use chunkalloc_logger::core_debug;

use super::{
    allocation_error::AllocationError,
    allocator::{RawAllocator, Rebind, StableAllocator},
    arena_chunk::{ArenaChunk, CHUNK_ALIGN},
};

pub const DEFAULT_CHUNK_SIZE: usize = 1 << 9;

/// A handle to a chain of [ArenaChunks](ArenaChunk) that allocates `T`s.
///
/// Cloning a handle shares every chunk the source holds at that moment: each
/// chunk is reference counted and lives until the last handle holding it is
/// dropped. Chunks grown afterwards belong only to the handle that grew them.
///
/// Memory is never reclaimed piecewise, [deallocate](Self::deallocate) does
/// nothing. A single allocation can take up at most `CHUNK_SIZE` bytes.
pub struct ChunkAllocator<T, const CHUNK_SIZE: usize = DEFAULT_CHUNK_SIZE> {
    chunks: Vec<Rc<ArenaChunk>>,
    _phantom: PhantomData<T>,
}

impl<T, const CHUNK_SIZE: usize> StableAllocator for ChunkAllocator<T, CHUNK_SIZE> {}

impl<T, const CHUNK_SIZE: usize> ChunkAllocator<T, CHUNK_SIZE> {
    pub const CHUNK_SIZE: usize = CHUNK_SIZE;

    const LAYOUT_CHECK: () = {
        assert!(CHUNK_SIZE > 0, "chunk size must not be zero");
        assert!(
            std::mem::align_of::<T>() <= CHUNK_ALIGN,
            "element alignment exceeds the chunk alignment"
        );
    };

    pub fn new() -> Self {
        let () = Self::LAYOUT_CHECK;
        Self {
            chunks: Vec::new(),
            _phantom: PhantomData,
        }
    }

    /// Allocates uninitialized memory for `count` consecutive `T`s.
    ///
    /// # Errors
    ///
    /// Returns [AllocationError::InvalidSize] when `count * size_of::<T>()`
    /// exceeds `CHUNK_SIZE`. The handle is left untouched in that case.
    pub fn allocate(&mut self, count: usize) -> Result<NonNull<T>, AllocationError> {
        let invalid_size = || AllocationError::InvalidSize {
            count,
            element_size: std::mem::size_of::<T>(),
            capacity: CHUNK_SIZE,
        };
        let size = std::mem::size_of::<T>()
            .checked_mul(count)
            .filter(|size| *size <= CHUNK_SIZE)
            .ok_or_else(invalid_size)?;

        // A fresh chunk always fits `size`, since `T` is at most chunk aligned.
        let ptr = self
            .alloc_bytes(size, std::mem::align_of::<T>())
            .ok_or_else(invalid_size)?;
        Ok(ptr.cast::<T>())
    }

    /// Does nothing: chunks only give memory back when they are freed whole.
    pub fn deallocate(&mut self, _ptr: NonNull<T>, _count: usize) {}

    /// Moves `value` into the memory at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for writes and properly aligned for `U`. Whatever
    /// was stored there before is overwritten without being dropped.
    pub unsafe fn construct<U>(&self, ptr: NonNull<U>, value: U) {
        unsafe { ptr.as_ptr().write(value) }
    }

    /// Builds a value with `make` and moves it into the memory at `ptr`.
    /// Nothing is written if `make` panics.
    ///
    /// # Safety
    ///
    /// Same as [construct](Self::construct).
    pub unsafe fn construct_with<U, F: FnOnce() -> U>(&self, ptr: NonNull<U>, make: F) {
        let value = make();
        unsafe { ptr.as_ptr().write(value) }
    }

    /// Drops the value at `ptr` in place. The memory stays allocated.
    ///
    /// # Safety
    ///
    /// `ptr` must point to an initialized `U` that is not used afterwards.
    pub unsafe fn destroy<U>(&self, ptr: NonNull<U>) {
        unsafe { std::ptr::drop_in_place(ptr.as_ptr()) }
    }

    /// Gives up this handle's claim on every chunk of its chain. Chunks no
    /// other handle holds are freed.
    pub fn release(&mut self) {
        if self.chunks.is_empty() {
            return;
        }
        core_debug!(
            "Releasing chunk chain of {} chunks, {} of them unshared",
            self.chunks.len(),
            self.chunks
                .iter()
                .filter(|chunk| Rc::strong_count(chunk) == 1)
                .count()
        );
        self.chunks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// The chain, oldest chunk first.
    pub fn chunks(&self) -> impl Iterator<Item = &ArenaChunk> + '_ {
        self.chunks.iter().map(|chunk| chunk.as_ref())
    }

    /// How many handles hold each chunk of the chain, oldest chunk first.
    pub fn ref_counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.chunks.iter().map(Rc::strong_count)
    }

    fn alloc_bytes(&mut self, size: usize, align: usize) -> Option<NonNull<u8>> {
        if let Some(ptr) = self
            .chunks
            .iter()
            .find_map(|chunk| chunk.try_allocate(size, align))
        {
            return Some(ptr);
        }

        // The chunk only joins the chain once it has served the request.
        let chunk = Rc::new(ArenaChunk::new(CHUNK_SIZE));
        let ptr = chunk.try_allocate(size, align)?;
        self.chunks.push(chunk);
        core_debug!("Chunk chain grew to {} chunks", self.chunks.len());
        Some(ptr)
    }
}

impl<T, const CHUNK_SIZE: usize> RawAllocator for ChunkAllocator<T, CHUNK_SIZE> {
    fn alloc_raw(&mut self, size: usize, align: usize) -> anyhow::Result<NonNull<u8>> {
        if !align.is_power_of_two() {
            anyhow::bail!("alignment {align} is not a power of two");
        }
        let invalid_size = AllocationError::InvalidSize {
            count: size,
            element_size: 1,
            capacity: CHUNK_SIZE,
        };
        // Worst-case padding in a fresh chunk, whose start is CHUNK_ALIGN aligned.
        let padding = align.saturating_sub(CHUNK_ALIGN);
        if size.saturating_add(padding) > CHUNK_SIZE {
            anyhow::bail!(invalid_size)
        }
        match self.alloc_bytes(size, align) {
            Some(ptr) => Ok(ptr),
            None => anyhow::bail!(invalid_size),
        }
    }
}

impl<T, const CHUNK_SIZE: usize> Rebind for ChunkAllocator<T, CHUNK_SIZE> {
    type Rebound<U> = ChunkAllocator<U, CHUNK_SIZE>;

    /// Shares the chain with a handle for another element type, the same way
    /// [clone](Clone::clone) does.
    fn rebind<U>(&self) -> Self::Rebound<U> {
        let mut rebound = ChunkAllocator::<U, CHUNK_SIZE>::new();
        rebound.chunks = self.chunks.clone();
        rebound
    }
}

impl<T, const CHUNK_SIZE: usize> Clone for ChunkAllocator<T, CHUNK_SIZE> {
    fn clone(&self) -> Self {
        Self {
            chunks: self.chunks.clone(),
            _phantom: PhantomData,
        }
    }

    /// Releases this handle's chain before sharing the one of `source`.
    fn clone_from(&mut self, source: &Self) {
        self.release();
        self.chunks.extend(source.chunks.iter().cloned());
    }
}

impl<T, const CHUNK_SIZE: usize> Default for ChunkAllocator<T, CHUNK_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const CHUNK_SIZE: usize> Drop for ChunkAllocator<T, CHUNK_SIZE> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T, const CHUNK_SIZE: usize> std::fmt::Debug for ChunkAllocator<T, CHUNK_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkAllocator")
            .field("chunk_size", &CHUNK_SIZE)
            .field("chunks", &self.chunks.len())
            .finish()
    }
}
