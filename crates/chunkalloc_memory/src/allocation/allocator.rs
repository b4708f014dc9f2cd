use std::ptr::NonNull;

use anyhow::Result;

/// Untyped allocation by size and alignment.
pub trait RawAllocator {
    fn alloc_raw(&mut self, size: usize, align: usize) -> Result<NonNull<u8>>;
}

/// A contractual trait for allocators that won't move allocated objects in no
/// circumstances
pub trait StableAllocator {}

/// A trait for allocators that can allocate uninitialized slices of any type.
/// Every [RawAllocator] gets it for free.
pub trait SliceAllocator {
    fn alloc_slice<T>(&mut self, len: usize) -> Result<NonNull<[T]>>;
}

impl<R: RawAllocator + ?Sized> SliceAllocator for R {
    fn alloc_slice<T>(&mut self, len: usize) -> Result<NonNull<[T]>> {
        let size = std::mem::size_of::<T>()
            .checked_mul(len)
            .ok_or_else(|| anyhow::anyhow!("slice of {len} elements overflows usize"))?;
        let align = std::mem::align_of::<T>();
        let ptr = self.alloc_raw(size, align)?.cast::<T>();
        Ok(NonNull::slice_from_raw_parts(ptr, len))
    }
}

/// Retargets an allocator to another element type while keeping its
/// allocation policy and, for sharing allocators, its memory.
pub trait Rebind {
    type Rebound<U>;

    fn rebind<U>(&self) -> Self::Rebound<U>;
}
