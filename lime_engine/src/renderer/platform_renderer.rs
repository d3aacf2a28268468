/// Platform renderer - state cache in front of the graphics device
///
/// Remembers the last value applied to every binding slot (two texture
/// stages, blending, program, vertex and index buffer) and skips device
/// calls that would not change anything. `begin_frame` forgets everything
/// and reasserts the frame baseline, so a slot never trusts state left by
/// code running outside the cache.

use glam::Mat4;
use crate::config::RendererConfig;
use crate::error::{Error, Result};
use crate::graphics_device::{BufferHandle, BufferTarget, GraphicsDevice, ShaderProgram, TextureHandle};
use crate::renderer::{Blending, ShaderId};
use crate::{engine_error, engine_warn};

/// Number of texture stages a batch can bind
pub const TEXTURE_STAGES: usize = 2;

/// Driver error codes drained per check, so a broken driver cannot spin forever
const MAX_DRAINED_ERRORS: usize = 32;

/// Store `value` in `slot`, returning whether it differed
fn update<T: PartialEq + Copy>(slot: &mut Option<T>, value: T) -> bool {
    if *slot == Some(value) {
        false
    } else {
        *slot = Some(value);
        true
    }
}

/// Redundant-call-eliminating wrapper around a `GraphicsDevice`
pub struct PlatformRenderer {
    device: Box<dyn GraphicsDevice>,
    // `None` is "unset": the next request always reaches the device
    textures: [Option<Option<TextureHandle>>; TEXTURE_STAGES],
    blending: Option<Blending>,
    program: Option<ShaderProgram>,
    vertex_buffer: Option<Option<BufferHandle>>,
    index_buffer: Option<Option<BufferHandle>>,
    premultiplied_alpha: bool,
    clear_color: [f32; 4],
    check_errors: bool,
    draw_calls: u32,
}

impl PlatformRenderer {
    pub fn new(device: Box<dyn GraphicsDevice>, config: &RendererConfig) -> Self {
        Self {
            device,
            textures: [None; TEXTURE_STAGES],
            blending: None,
            program: None,
            vertex_buffer: None,
            index_buffer: None,
            premultiplied_alpha: config.premultiplied_alpha,
            clear_color: config.clear_color,
            check_errors: config.check_errors,
            draw_calls: 0,
        }
    }

    pub fn device(&self) -> &dyn GraphicsDevice {
        &*self.device
    }

    /// Direct device access; calls made here bypass the cache
    pub fn device_mut(&mut self) -> &mut dyn GraphicsDevice {
        &mut *self.device
    }

    /// Forget every cached slot
    pub fn invalidate(&mut self) {
        self.textures = [None; TEXTURE_STAGES];
        self.blending = None;
        self.program = None;
        self.vertex_buffer = None;
        self.index_buffer = None;
    }

    /// Reset the cache and apply the frame baseline
    pub fn begin_frame(&mut self) {
        self.invalidate();
        self.draw_calls = 0;
        self.device.set_blending_enabled(true);
        self.set_blending(Blending::Default);
        self.set_shader(ShaderId::Default, 0);
        self.device.clear(self.clear_color);
    }

    /// Bind `handle` on texture `stage` (0 or 1)
    pub fn set_texture(&mut self, handle: Option<TextureHandle>, stage: usize) {
        let Some(slot) = self.textures.get_mut(stage) else {
            engine_warn!("lime::PlatformRenderer", "Texture stage {} out of range", stage);
            return;
        };
        if update(slot, handle) {
            self.device.bind_texture(stage as u32, handle);
        }
    }

    pub fn set_blending(&mut self, blending: Blending) {
        if update(&mut self.blending, blending) {
            let (src, dst) = blending.factors(self.premultiplied_alpha);
            self.device.blend_func(src, dst);
        }
    }

    /// Select the program for `shader` with `texture_count` bound textures
    pub fn set_shader(&mut self, shader: ShaderId, texture_count: usize) {
        self.set_program(shader.program(texture_count));
    }

    pub fn set_program(&mut self, program: ShaderProgram) {
        if update(&mut self.program, program) {
            self.device.use_program(program);
        }
    }

    pub fn bind_vertex_buffer(&mut self, handle: Option<BufferHandle>) {
        if update(&mut self.vertex_buffer, handle) {
            self.device.bind_buffer(BufferTarget::Vertex, handle);
        }
    }

    pub fn bind_index_buffer(&mut self, handle: Option<BufferHandle>) {
        if update(&mut self.index_buffer, handle) {
            self.device.bind_buffer(BufferTarget::Index, handle);
        }
    }

    pub fn bind_buffer(&mut self, target: BufferTarget, handle: Option<BufferHandle>) {
        match target {
            BufferTarget::Vertex => self.bind_vertex_buffer(handle),
            BufferTarget::Index => self.bind_index_buffer(handle),
        }
    }

    pub fn set_projection(&mut self, projection: &Mat4) {
        self.device.set_projection(projection);
    }

    /// Draw `index_count` indices from the bound buffers
    pub fn draw_triangles(&mut self, index_count: u32) {
        self.device.draw_indexed_triangles(index_count);
        self.draw_calls += 1;
    }

    /// Draw calls issued since the last `begin_frame`
    pub fn draw_calls(&self) -> u32 {
        self.draw_calls
    }

    pub fn premultiplied_alpha(&self) -> bool {
        self.premultiplied_alpha
    }

    /// Switch blend factor selection; cached blending is re-applied on next use
    pub fn set_premultiplied_alpha(&mut self, premultiplied_alpha: bool) {
        if self.premultiplied_alpha != premultiplied_alpha {
            self.premultiplied_alpha = premultiplied_alpha;
            self.blending = None;
        }
    }

    /// Drain pending driver errors
    ///
    /// Disabled unless `RendererConfig::check_errors` is set (debug builds by
    /// default). Every drained code is reported in one `DriverErrors`.
    pub fn check_errors(&mut self) -> Result<()> {
        if !self.check_errors {
            return Ok(());
        }
        let mut codes = Vec::new();
        while codes.len() < MAX_DRAINED_ERRORS {
            match self.device.get_error() {
                Some(code) => codes.push(code),
                None => break,
            }
        }
        if codes.is_empty() {
            return Ok(());
        }
        let error = Error::DriverErrors(codes);
        engine_error!("lime::PlatformRenderer", "{}", error);
        Err(error)
    }
}

#[cfg(test)]
#[path = "platform_renderer_tests.rs"]
mod tests;
