//! Blob store implementations.

pub mod file;
pub mod memory;

pub use file::FileBlobStore;
pub use memory::MemoryBlobStore;
