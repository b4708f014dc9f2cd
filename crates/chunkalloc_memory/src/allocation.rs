pub mod allocation_error;
pub mod allocator;
pub mod arena_chunk;
pub mod chunk_allocator;
pub mod chunk_vec;
