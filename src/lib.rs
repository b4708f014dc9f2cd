pub use chunkalloc_logger as log;
pub use chunkalloc_memory as memory;
