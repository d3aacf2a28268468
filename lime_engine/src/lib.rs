/*!
# Lime Engine

Render-batching and GPU-resource-lifecycle core of the Lime engine.

The crate is backend-agnostic: every native call goes through the
`GraphicsDevice` trait, implemented by a backend crate (OpenGL / GLES in
`lime_engine_renderer_gl`) or by `RecordingDevice` for headless use.

## Architecture

- **GpuObjectRegistry**: weak registry of every object owning a native handle,
  swept when the context is lost
- **Buffer / BufferPool**: vertex and index buffers with CPU shadow copies,
  recycled through doubling pools
- **RenderBatch / RenderList**: draw requests merged into as few indexed
  draw calls as possible
- **Texture2D / TextureManager**: multi-format decoding, deferred upload and
  batched deferred deletion
- **PlatformRenderer**: state cache eliding redundant device calls
- **Renderer**: the frame driver owning all of the above

Native objects are only touched on the rendering thread; other threads
queue closures through a `RenderingQueue`.
*/

// Internal modules
mod error;
mod engine;
mod config;
pub mod log;
pub mod graphics_device;
pub mod resource;
pub mod renderer;
pub mod texture;

// Main lime namespace module
pub mod lime {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton (logging)
    pub use crate::engine::Engine;

    // Frame driver
    pub use crate::renderer::Renderer;

    // Configuration
    pub use crate::config::{RendererConfig, TextureConfig};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Graphics device abstraction
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Batching and state cache
    pub mod render {
        pub use crate::renderer::*;
    }

    // GPU object lifetime, buffers and pools
    pub mod resource {
        pub use crate::resource::*;
    }

    // Textures and decoders
    pub mod texture {
        pub use crate::texture::*;
    }
}

// Re-export math library at crate root
pub use glam;
