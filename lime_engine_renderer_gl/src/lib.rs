/*!
# Lime Engine - OpenGL Renderer Backend

OpenGL / OpenGL ES implementation of the `lime_engine` graphics device.

This crate provides `GlGraphicsDevice`, which implements the
`GraphicsDevice` trait over a `glow` context: the six blending shader
programs, runtime capability detection from the version and extension
strings, and the vertex layout shared with the render core.

## Example

```no_run
use lime_engine::lime::{Renderer, RendererConfig, TextureConfig};
use lime_engine_renderer_gl::lime::{GlGraphicsDevice, GlDeviceConfig};

# fn run(gl: lime_engine_renderer_gl::glow::Context) -> lime_engine::lime::Result<()> {
let device = GlGraphicsDevice::new(gl, GlDeviceConfig::default())?;
let mut renderer = Renderer::new(Box::new(device), RendererConfig::default(), TextureConfig::default())?;
renderer.begin_frame()?;
renderer.end_frame()?;
# Ok(())
# }
```
*/

// OpenGL implementation modules
mod gl_device;
mod gl_format;
mod gl_shader;
mod debug;

// Main lime namespace module
pub mod lime {
    pub use crate::gl_device::{GlGraphicsDevice, GlDeviceConfig};

    // Capabilities report
    pub use crate::debug::{feature_support, print_capabilities_report};
}

// Re-export glow so callers build contexts with the same version
pub use glow;
