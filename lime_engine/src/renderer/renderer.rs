/// Renderer - frame driver tying the render core together
///
/// Owns the platform renderer (and through it the graphics device), the
/// rendering-thread dispatcher, the GPU object registry, the buffer and batch
/// pools, the current render list and the texture manager.
///
/// # Frame structure
///
/// ```text
/// begin_frame()      delete scheduled textures, run queued rendering work,
///                    reset the state cache, clear
/// draw_triangles()*  append to the render list
/// flush()*           draw and recycle everything queued so far
/// end_frame()        flush, report driver errors
/// ```

use std::sync::Arc;
use glam::Mat4;
use crate::config::{RendererConfig, TextureConfig};
use crate::error::Result;
use crate::graphics_device::GraphicsDevice;
use crate::renderer::{BatchState, BatchWriter, Blending, PlatformRenderer, RenderList, RenderPools, ShaderId};
use crate::resource::{GpuObjectRegistry, GpuResources, RenderingDispatcher, RenderingQueue, Vertex};
use crate::texture::{Texture, Texture2D, TextureManager};
use crate::{engine_bail, engine_info};

pub struct Renderer {
    platform: PlatformRenderer,
    dispatcher: RenderingDispatcher,
    resources: GpuResources,
    pools: RenderPools,
    render_list: RenderList,
    textures: TextureManager,
}

impl Renderer {
    /// Create a renderer driving `device`
    ///
    /// Fails with `InitializationFailed` when the configured capacities
    /// cannot work with 16-bit indices.
    pub fn new(device: Box<dyn GraphicsDevice>, config: RendererConfig, texture_config: TextureConfig) -> Result<Self> {
        if config.vertex_buffer_capacity == 0
            || config.vertex_buffer_capacity > RendererConfig::MAX_VERTEX_BUFFER_CAPACITY
        {
            engine_bail!(InitializationFailed, "lime::Renderer",
                "Vertex buffer capacity must be in 1..={}, got {}",
                RendererConfig::MAX_VERTEX_BUFFER_CAPACITY, config.vertex_buffer_capacity);
        }
        if config.batch_index_capacity < 3 {
            engine_bail!(InitializationFailed, "lime::Renderer",
                "Batch index capacity must hold a triangle, got {}", config.batch_index_capacity);
        }

        let capabilities = device.capabilities().clone();
        let version = capabilities.version();
        engine_info!("lime::Renderer",
            "Renderer created ({} {}.{}, {} extension(s), max texture size {})",
            if version.embedded { "GLES" } else { "GL" }, version.major, version.minor,
            capabilities.extension_count(), capabilities.max_texture_size());

        let dispatcher = RenderingDispatcher::new();
        let resources = GpuResources::new(Arc::new(GpuObjectRegistry::new()), dispatcher.queue());
        let pools = RenderPools::new(&resources, &config);
        let textures = TextureManager::new(resources.clone(), capabilities, texture_config);
        Ok(Self {
            platform: PlatformRenderer::new(device, &config),
            dispatcher,
            resources,
            pools,
            render_list: RenderList::new(),
            textures,
        })
    }

    pub fn resources(&self) -> &GpuResources {
        &self.resources
    }

    /// Queue for work that must run on the rendering thread
    pub fn rendering_queue(&self) -> RenderingQueue {
        self.dispatcher.queue()
    }

    pub fn texture_manager(&self) -> &TextureManager {
        &self.textures
    }

    /// New empty texture managed by this renderer
    pub fn create_texture(&self) -> Texture2D {
        Texture2D::new(&self.textures)
    }

    pub fn platform(&self) -> &PlatformRenderer {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut PlatformRenderer {
        &mut self.platform
    }

    pub fn render_list(&self) -> &RenderList {
        &self.render_list
    }

    pub fn pools(&self) -> &RenderPools {
        &self.pools
    }

    /// Start a frame
    ///
    /// Scheduled texture deletions run before any queued work (uploads
    /// included), and both before the state cache is reset, so the frame
    /// starts from known bindings.
    pub fn begin_frame(&mut self) -> Result<()> {
        self.textures.delete_scheduled_textures(self.platform.device_mut());
        self.dispatcher.run_pending(self.platform.device_mut());
        self.platform.begin_frame();
        self.platform.check_errors()
    }

    /// Queue a triangle list drawn with up to two textures
    ///
    /// `indices` refer to `vertices`, starting at 0.
    pub fn draw_triangles(
        &mut self,
        texture1: Option<&dyn Texture>,
        texture2: Option<&dyn Texture>,
        blending: Blending,
        shader: ShaderId,
        vertices: &[Vertex],
        indices: &[u16],
    ) -> Result<()> {
        let texture1 = texture1.map(|texture| texture.native_handle()).transpose()?.flatten();
        let texture2 = texture2.map(|texture| texture.native_handle()).transpose()?.flatten();
        let state = BatchState::new(texture1, texture2, blending, shader);
        let mut writer = self.request_for_batch(state, vertices.len(), indices.len())?;
        writer.write(vertices, indices)
    }

    /// Batch able to take `num_vertices` vertices and `num_indices` indices with `state`
    pub fn request_for_batch(
        &mut self,
        state: BatchState,
        num_vertices: usize,
        num_indices: usize,
    ) -> Result<BatchWriter<'_>> {
        self.render_list.request_for_batch(&mut self.pools, state, num_vertices, num_indices)
    }

    /// Draw and recycle everything queued so far
    pub fn flush(&mut self) -> Result<()> {
        self.render_list.flush(&mut self.platform, &mut self.pools)
    }

    pub fn end_frame(&mut self) -> Result<()> {
        self.flush()?;
        self.platform.check_errors()
    }

    /// Projection mapping `left..right` x `bottom..top` to the viewport
    pub fn set_orthogonal_projection(&mut self, left: f32, right: f32, bottom: f32, top: f32) {
        let projection = Mat4::orthographic_rh_gl(left, right, bottom, top, -1.0, 1.0);
        self.platform.set_projection(&projection);
    }

    /// Draw calls issued since `begin_frame`
    pub fn draw_calls(&self) -> u32 {
        self.platform.draw_calls()
    }

    /// The context is gone: every GPU object forgets its native handle
    ///
    /// Buffers re-create theirs on next bind. Textures stay empty until they
    /// are loaded again.
    pub fn context_lost(&mut self) {
        let discarded = self.resources.registry().discard_objects();
        self.platform.invalidate();
        engine_info!("lime::Renderer", "Context lost, {} GPU object(s) discarded", discarded);
    }

    /// A new context is current; cached bindings of the old one are forgotten
    pub fn context_restored(&mut self) {
        self.platform.invalidate();
        engine_info!("lime::Renderer", "Context restored (generation {})",
            self.platform.device().context_generation());
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
