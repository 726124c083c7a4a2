/* src/loader/source/mod.rs */

mod file;
mod memory;

pub use file::FileLoader;
pub use memory::MemoryLoader;
