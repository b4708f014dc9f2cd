use std::{
    ops::{Deref, DerefMut},
    ptr::NonNull,
};

use super::{
    allocation_error::AllocationError,
    chunk_allocator::{ChunkAllocator, DEFAULT_CHUNK_SIZE},
};

const MIN_CAPACITY: usize = 4;

/// A growable array whose storage comes from a [ChunkAllocator].
///
/// Growing moves the elements into a fresh, larger allocation; the old one is
/// handed back through `deallocate`, which keeps it in its chunk. The vector
/// therefore can never hold more than `CHUNK_SIZE / size_of::<T>()` elements.
pub struct ChunkVec<T, const CHUNK_SIZE: usize = DEFAULT_CHUNK_SIZE> {
    ptr: NonNull<T>,
    len: usize,
    capacity: usize,
    allocator: ChunkAllocator<T, CHUNK_SIZE>,
}

impl<T, const CHUNK_SIZE: usize> ChunkVec<T, CHUNK_SIZE> {
    pub fn new() -> Self {
        Self::new_in(ChunkAllocator::new())
    }

    pub fn new_in(allocator: ChunkAllocator<T, CHUNK_SIZE>) -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            capacity: 0,
            allocator,
        }
    }

    /// The largest number of elements that fit into a single chunk.
    pub fn max_capacity() -> usize {
        CHUNK_SIZE
            .checked_div(std::mem::size_of::<T>())
            .unwrap_or(usize::MAX)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn allocator(&self) -> &ChunkAllocator<T, CHUNK_SIZE> {
        &self.allocator
    }

    /// Appends `value`, growing the storage if needed.
    ///
    /// # Errors
    ///
    /// Fails with [AllocationError::InvalidSize] once the vector would
    /// outgrow one chunk. `value` is dropped and the vector is unchanged.
    pub fn push(&mut self, value: T) -> Result<(), AllocationError> {
        if self.len == self.capacity {
            self.grow()?;
        }

        unsafe { self.allocator.construct(self.ptr.add(self.len), value) };
        self.len += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        self.len -= 1;
        Some(unsafe { self.ptr.add(self.len).as_ptr().read() })
    }

    /// Destroys every element, keeping the capacity.
    pub fn clear(&mut self) {
        let len = self.len;
        // Elements past `len` are never observed again, even if a drop panics.
        self.len = 0;
        for i in 0..len {
            unsafe { self.allocator.destroy(self.ptr.add(i)) };
        }
    }

    fn grow(&mut self) -> Result<(), AllocationError> {
        let doubled = self.capacity.saturating_mul(2).max(MIN_CAPACITY);
        let new_capacity = doubled.min(Self::max_capacity()).max(self.len + 1);

        let new_ptr = self.allocator.allocate(new_capacity)?;
        unsafe {
            std::ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), self.len);
        }
        if self.capacity > 0 {
            self.allocator.deallocate(self.ptr, self.capacity);
        }

        self.ptr = new_ptr;
        self.capacity = new_capacity;
        Ok(())
    }
}

impl<T, const CHUNK_SIZE: usize> Deref for ChunkVec<T, CHUNK_SIZE> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T, const CHUNK_SIZE: usize> DerefMut for ChunkVec<T, CHUNK_SIZE> {
    fn deref_mut(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T, const CHUNK_SIZE: usize> Default for ChunkVec<T, CHUNK_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: std::fmt::Debug, const CHUNK_SIZE: usize> std::fmt::Debug for ChunkVec<T, CHUNK_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, const CHUNK_SIZE: usize> Drop for ChunkVec<T, CHUNK_SIZE> {
    fn drop(&mut self) {
        self.clear();
        if self.capacity > 0 {
            self.allocator.deallocate(self.ptr, self.capacity);
        }
    }
}

#[cfg(test)]
mod test {
    use std::{cell::Cell, rc::Rc};

    use anyhow::Result;

    use super::*;

    #[test]
    fn test_push_and_read() -> Result<()> {
        let mut vec = ChunkVec::<(i32, i32)>::new();
        vec.push((1, 2))?;
        vec.push((32, 32))?;
        vec.push((42, -1232))?;
        vec.push((1012, -2))?;
        vec.push((7, 7))?;

        assert_eq!(vec.len(), 5);
        assert_eq!(vec.capacity(), 8);
        assert_eq!(&vec[..2], &[(1, 2), (32, 32)]);
        assert_eq!(vec.last(), Some(&(7, 7)));

        vec[0].0 = 100;
        assert_eq!(vec[0], (100, 2));

        assert_eq!(vec.pop(), Some((7, 7)));
        assert_eq!(vec.len(), 4);
        Ok(())
    }

    #[test]
    fn test_growth_stops_at_one_chunk() -> Result<()> {
        let mut vec = ChunkVec::<u64>::new();
        assert_eq!(ChunkVec::<u64>::max_capacity(), 64);

        for i in 0..64 {
            vec.push(i)?;
        }
        assert_eq!(vec.capacity(), 64);

        let err = vec.push(64).unwrap_err();
        assert_eq!(
            err,
            AllocationError::InvalidSize {
                count: 65,
                element_size: 8,
                capacity: DEFAULT_CHUNK_SIZE
            }
        );
        assert_eq!(vec.len(), 64);
        assert_eq!(vec.iter().sum::<u64>(), (0..64u64).sum::<u64>());
        Ok(())
    }

    #[test]
    fn test_growth_spills_into_new_chunks() -> Result<()> {
        let mut vec = ChunkVec::<u32, 64>::new();
        for i in 0..16 {
            vec.push(i)?;
        }

        // 4 + 8 elements fill the first chunk, 16 need a second one.
        assert_eq!(vec.capacity(), 16);
        assert_eq!(vec.allocator().chunk_count(), 2);
        assert_eq!(&vec[..], &(0..16u32).collect::<Vec<_>>()[..]);
        Ok(())
    }

    #[test]
    fn test_shared_allocator() -> Result<()> {
        let allocator = ChunkAllocator::<i32>::new();
        let mut first = ChunkVec::new_in(allocator.clone());
        first.push(1)?;

        let mut second = ChunkVec::new_in(first.allocator().clone());
        second.push(2)?;

        assert_eq!(first.allocator().ref_counts().collect::<Vec<_>>(), vec![2]);
        drop(first);
        assert_eq!(second[0], 2);
        assert_eq!(second.allocator().ref_counts().collect::<Vec<_>>(), vec![1]);
        Ok(())
    }

    #[test]
    fn test_drop_destroys_elements() -> Result<()> {
        let counter = Rc::new(Cell::new(0));

        struct Tracked(Rc<Cell<usize>>);

        impl Drop for Tracked {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        {
            let mut vec = ChunkVec::<Tracked>::new();
            for _ in 0..10 {
                vec.push(Tracked(counter.clone()))?;
            }
            let popped = vec.pop();
            assert_eq!(counter.get(), 0);
            drop(popped);
            assert_eq!(counter.get(), 1);
        }

        assert_eq!(counter.get(), 10);
        Ok(())
    }

    #[test]
    fn test_clear_keeps_capacity() -> Result<()> {
        let mut vec = ChunkVec::<String>::new();
        vec.push("chunk".to_string())?;
        vec.push("arena".to_string())?;

        vec.clear();

        assert!(vec.is_empty());
        assert_eq!(vec.capacity(), 4);
        vec.push("again".to_string())?;
        assert_eq!(format!("{:?}", vec), "[\"again\"]");
        Ok(())
    }

    #[test]
    fn test_zero_sized_elements() -> Result<()> {
        let mut vec = ChunkVec::<()>::new();
        for _ in 0..1000 {
            vec.push(())?;
        }
        assert_eq!(vec.len(), 1000);
        assert_eq!(vec.pop(), Some(()));
        Ok(())
    }
}
