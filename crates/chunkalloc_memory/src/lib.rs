pub mod allocation;
pub use allocation::{
    allocation_error::AllocationError,
    allocator::*,
    arena_chunk::{ArenaChunk, CHUNK_ALIGN},
    chunk_allocator::{ChunkAllocator, DEFAULT_CHUNK_SIZE},
    chunk_vec::ChunkVec,
};
