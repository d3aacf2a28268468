/// Renderer module - batching, state cache and the frame driver

pub mod render_state;
pub mod platform_renderer;
pub mod render_batch;
pub mod render_list;
pub mod renderer;

pub use render_state::*;
pub use platform_renderer::*;
pub use render_batch::*;
pub use render_list::*;
pub use renderer::Renderer;
