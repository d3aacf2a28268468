/// Resource module - GPU object lifetime, buffers and pools

pub mod gpu_object;
pub mod rendering_dispatcher;
pub mod vertex;
pub mod buffer;
pub mod buffer_pool;

pub use gpu_object::*;
pub use rendering_dispatcher::*;
pub use vertex::*;
pub use buffer::*;
pub use buffer_pool::*;
