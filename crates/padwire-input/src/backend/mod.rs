mod memory;
#[cfg(feature = "sdl2-backend")]
mod sdl;

pub use memory::{MemoryHandle, MemorySource};
#[cfg(feature = "sdl2-backend")]
pub use sdl::Sdl2Source;
