use std::{alloc::Layout, cell::Cell, ptr::NonNull};

use chunkalloc_logger::core_debug;

/// Alignment of every chunk buffer. Element types with a stricter alignment
/// cannot be allocated from chunks.
pub const CHUNK_ALIGN: usize = 16;

/// A fixed-size block of memory handed out front to back by a bump cursor.
///
/// Chunks are shared between [ChunkAllocator](crate::ChunkAllocator) handles
/// through `Rc`, so the cursor lives in a [Cell]: every handle that holds the
/// chunk advances the same cursor. Granted ranges are never given back; the
/// buffer is freed as a whole when the chunk is dropped.
#[derive(Debug)]
pub struct ArenaChunk {
    start: NonNull<u8>,
    size: usize,
    cursor: Cell<usize>,
}

impl ArenaChunk {
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "arena chunk must not be empty");
        let layout = Self::layout(size);
        let start = match NonNull::new(unsafe { std::alloc::alloc(layout) }) {
            Some(start) => start,
            None => std::alloc::handle_alloc_error(layout),
        };
        core_debug!("Allocated arena chunk of {} bytes at {:?}", size, start);

        Self {
            start,
            size,
            cursor: Cell::new(0),
        }
    }

    fn layout(size: usize) -> Layout {
        Layout::from_size_align(size, CHUNK_ALIGN).expect("arena chunk size overflows a Layout")
    }

    /// Carves `size` bytes aligned to `align` out of the chunk.
    ///
    /// Returns `None` without moving the cursor when the rest of the chunk is
    /// too small.
    pub fn try_allocate(&self, size: usize, align: usize) -> Option<NonNull<u8>> {
        debug_assert!(align > 0);
        debug_assert!(align.is_power_of_two());

        let base = self.start.as_ptr() as usize;
        let bump = base + self.cursor.get();
        let aligned = bump.checked_add(align - 1)? & !(align - 1);
        let offset = aligned - base;
        let new_cursor = offset.checked_add(size)?;
        if new_cursor > self.size {
            return None;
        }

        self.cursor.set(new_cursor);
        // offset <= size, so this stays inside the buffer or one past its end.
        Some(unsafe { NonNull::new_unchecked(self.start.as_ptr().add(offset)) })
    }

    pub fn start(&self) -> *mut u8 {
        self.start.as_ptr()
    }

    pub fn end(&self) -> *mut u8 {
        unsafe { self.start.as_ptr().add(self.size) }
    }

    pub fn bump_ptr(&self) -> *mut u8 {
        unsafe { self.start.as_ptr().add(self.cursor.get()) }
    }

    pub fn capacity(&self) -> usize {
        self.size
    }

    pub fn remaining(&self) -> usize {
        self.size - self.cursor.get()
    }

    /// Whether `len` bytes starting at `ptr` lie inside this chunk.
    pub fn contains(&self, ptr: *const u8, len: usize) -> bool {
        let start = self.start.as_ptr() as usize;
        let ptr = ptr as usize;
        ptr >= start && ptr - start <= self.size && self.size - (ptr - start) >= len
    }
}

impl Drop for ArenaChunk {
    fn drop(&mut self) {
        core_debug!("Freeing arena chunk at {:?}", self.start);
        unsafe { std::alloc::dealloc(self.start.as_ptr(), Self::layout(self.size)) }
    }
}
