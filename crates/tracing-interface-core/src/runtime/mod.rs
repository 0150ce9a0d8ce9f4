pub mod memory;

pub use memory::MemoryHost;
