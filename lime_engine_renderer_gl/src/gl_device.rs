/// GlGraphicsDevice - OpenGL / GLES implementation of GraphicsDevice
///
/// Wraps a `glow::Context` owned by the rendering thread. The device
/// compiles the six shader programs up front (a failure is fatal), probes
/// the context capabilities once, and maps every `GraphicsDevice` call onto
/// the matching GL entry point without caching: redundant-state elimination
/// happens in `PlatformRenderer`.
///
/// # Context loss
///
/// When the platform reports the context gone, call `context_lost()`; the
/// device stops touching GL. Hand the new context to `context_restored()`,
/// which recompiles the programs and bumps the context generation so that
/// handles from the old context are never passed to the new one.

use glow::{HasContext, PixelUnpackData};
use rustc_hash::FxHashMap;
use lime_engine::glam::Mat4;
use lime_engine::lime::{Error, Result};
use lime_engine::lime::device::{
    ApiVersion, BlendFactor, BufferHandle, BufferTarget, BufferUsage, Capabilities,
    CompressedFormat, GraphicsDevice, PixelFormat, ShaderProgram, TextureHandle, TextureParams,
};
use lime_engine::lime::resource::Vertex;
use lime_engine::{engine_debug, engine_error, engine_info, engine_warn};

use crate::gl_format::{
    blend_factor_to_gl, buffer_target_to_gl, buffer_usage_to_gl, compressed_format_to_gl,
    default_shader_header, gl_int, mag_filter_to_gl, min_filter_to_gl, needs_vertex_array,
    pixel_format_to_gl, texture_unit, wrap_to_gl,
};
use crate::gl_shader::{self, GlProgram, ATTRIB_COLOR, ATTRIB_POSITION, ATTRIB_UV1, ATTRIB_UV2};

/// Configuration of the GL device
#[derive(Debug, Clone, Default)]
pub struct GlDeviceConfig {
    /// Text prepended to every shader source (`#version` line and defines)
    ///
    /// `None` picks GLSL ES 1.00 on embedded contexts and GLSL 1.20 on
    /// desktop ones.
    pub shader_version_header: Option<String>,
}

pub struct GlGraphicsDevice {
    gl: glow::Context,
    config: GlDeviceConfig,
    capabilities: Capabilities,
    programs: FxHashMap<ShaderProgram, GlProgram>,
    current_program: Option<ShaderProgram>,
    vertex_array: Option<glow::VertexArray>,
    projection: Mat4,
    projection_revision: u64,
    context_current: bool,
    generation: u64,
}

impl GlGraphicsDevice {
    /// Create a device on `gl`, which must be current on this thread
    ///
    /// Fails with `ShaderCompilation` (carrying the info log) if any program
    /// does not compile or link.
    pub fn new(gl: glow::Context, config: GlDeviceConfig) -> Result<Self> {
        let capabilities = probe_capabilities(&gl);
        let mut device = Self {
            gl,
            config,
            capabilities,
            programs: FxHashMap::default(),
            current_program: None,
            vertex_array: None,
            projection: Mat4::IDENTITY,
            projection_revision: 1,
            context_current: true,
            generation: 1,
        };
        device.setup_context()?;
        let version = device.capabilities.version();
        engine_info!("lime::gl", "OpenGL{} {}.{} device created ({} extension(s))",
            if version.embedded { " ES" } else { "" }, version.major, version.minor,
            device.capabilities.extension_count());
        Ok(device)
    }

    /// The wrapped context
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    pub fn config(&self) -> &GlDeviceConfig {
        &self.config
    }

    /// Stop issuing GL calls; the context is gone
    pub fn context_lost(&mut self) {
        if !self.context_current {
            return;
        }
        self.context_current = false;
        self.programs.clear();
        self.current_program = None;
        self.vertex_array = None;
        engine_info!("lime::gl", "Context lost (generation {})", self.generation);
    }

    /// Adopt the re-created context `gl` and rebuild the device state on it
    pub fn context_restored(&mut self, gl: glow::Context) -> Result<()> {
        self.gl = gl;
        self.generation += 1;
        self.programs.clear();
        self.current_program = None;
        self.vertex_array = None;
        self.setup_context()?;
        self.context_current = true;
        engine_info!("lime::gl", "Context restored (generation {})", self.generation);
        Ok(())
    }

    fn shader_header(&self) -> String {
        match &self.config.shader_version_header {
            Some(header) => header.clone(),
            None => default_shader_header(self.capabilities.version()).to_string(),
        }
    }

    /// Compile the programs and apply the state every frame relies on
    fn setup_context(&mut self) -> Result<()> {
        let header = self.shader_header();
        for program in ShaderProgram::ALL {
            let compiled = gl_shader::compile_program(&self.gl, &header, program)?;
            self.programs.insert(program, compiled);
        }
        engine_debug!("lime::gl", "{} shader program(s) linked", self.programs.len());

        unsafe {
            if needs_vertex_array(self.capabilities.version()) {
                let vertex_array = self.gl.create_vertex_array().map_err(|e| {
                    engine_error!("lime::gl", "Failed to create vertex array: {}", e);
                    Error::InitializationFailed(format!("Failed to create vertex array: {}", e))
                })?;
                self.gl.bind_vertex_array(Some(vertex_array));
                self.vertex_array = Some(vertex_array);
            }
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.disable(glow::DEPTH_TEST);
            self.gl.disable(glow::CULL_FACE);
        }
        Ok(())
    }

    /// Point the vertex attributes at the bound vertex buffer
    unsafe fn setup_vertex_attributes(&self) {
        let stride = Vertex::STRIDE as i32;
        let gl = &self.gl;
        gl.enable_vertex_attrib_array(ATTRIB_POSITION);
        gl.vertex_attrib_pointer_f32(ATTRIB_POSITION, 2, glow::FLOAT, false, stride, Vertex::POS_OFFSET as i32);
        gl.enable_vertex_attrib_array(ATTRIB_UV1);
        gl.vertex_attrib_pointer_f32(ATTRIB_UV1, 2, glow::FLOAT, false, stride, Vertex::UV1_OFFSET as i32);
        gl.enable_vertex_attrib_array(ATTRIB_UV2);
        gl.vertex_attrib_pointer_f32(ATTRIB_UV2, 2, glow::FLOAT, false, stride, Vertex::UV2_OFFSET as i32);
        gl.enable_vertex_attrib_array(ATTRIB_COLOR);
        gl.vertex_attrib_pointer_f32(ATTRIB_COLOR, 4, glow::UNSIGNED_BYTE, true, stride, Vertex::COLOR_OFFSET as i32);
    }

    /// Upload the projection to `program` if it has an older revision
    fn sync_projection(&mut self, program: ShaderProgram) {
        let Some(slot) = self.programs.get_mut(&program) else {
            return;
        };
        if slot.projection_revision == self.projection_revision {
            return;
        }
        unsafe {
            self.gl.uniform_matrix_4_f32_slice(
                slot.projection.as_ref(),
                false,
                &self.projection.to_cols_array(),
            );
        }
        slot.projection_revision = self.projection_revision;
    }

    #[cfg(feature = "gl-trace-errors")]
    fn trace(&self, call: &str) {
        loop {
            let code = unsafe { self.gl.get_error() };
            if code == glow::NO_ERROR {
                break;
            }
            engine_warn!("lime::gl", "{} after {} (0x{:04X})",
                crate::gl_format::error_name(code), call, code);
        }
    }

    #[cfg(not(feature = "gl-trace-errors"))]
    #[inline(always)]
    fn trace(&self, _call: &str) {}
}

/// Read version, extensions and limits from `gl`
fn probe_capabilities(gl: &glow::Context) -> Capabilities {
    let version = gl.version();
    let version = ApiVersion {
        major: version.major,
        minor: version.minor,
        embedded: version.is_embedded,
    };
    let extensions = gl.supported_extensions().iter().cloned();
    let max_texture_size = unsafe { gl.get_parameter_i32(glow::MAX_TEXTURE_SIZE) };
    Capabilities::new(version, extensions, u32::try_from(max_texture_size).unwrap_or(0))
}

fn native_buffer(handle: BufferHandle) -> glow::Buffer {
    glow::NativeBuffer(handle.0)
}

fn native_texture(handle: TextureHandle) -> glow::Texture {
    glow::NativeTexture(handle.0)
}

impl GraphicsDevice for GlGraphicsDevice {
    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn is_context_current(&self) -> bool {
        self.context_current
    }

    fn context_generation(&self) -> u64 {
        self.generation
    }

    fn create_buffer(&mut self) -> Result<BufferHandle> {
        if !self.context_current {
            return Err(Error::BackendError("no current context".to_string()));
        }
        let buffer = unsafe { self.gl.create_buffer() }.map_err(|e| {
            engine_error!("lime::gl", "Failed to create buffer: {}", e);
            Error::OutOfMemory
        })?;
        Ok(BufferHandle(buffer.0))
    }

    fn delete_buffer(&mut self, handle: BufferHandle) {
        if self.context_current {
            unsafe { self.gl.delete_buffer(native_buffer(handle)) };
            self.trace("delete_buffer");
        }
    }

    fn bind_buffer(&mut self, target: BufferTarget, handle: Option<BufferHandle>) {
        if !self.context_current {
            return;
        }
        unsafe {
            self.gl.bind_buffer(buffer_target_to_gl(target), handle.map(native_buffer));
            if target == BufferTarget::Vertex && handle.is_some() {
                self.setup_vertex_attributes();
            }
        }
        self.trace("bind_buffer");
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        if self.context_current {
            unsafe {
                self.gl.buffer_data_u8_slice(buffer_target_to_gl(target), data, buffer_usage_to_gl(usage));
            }
            self.trace("buffer_data");
        }
    }

    fn create_texture(&mut self) -> Result<TextureHandle> {
        if !self.context_current {
            return Err(Error::BackendError("no current context".to_string()));
        }
        let texture = unsafe { self.gl.create_texture() }.map_err(|e| {
            engine_error!("lime::gl", "Failed to create texture: {}", e);
            Error::OutOfMemory
        })?;
        Ok(TextureHandle(texture.0))
    }

    /// glow exposes single-name deletion only; the names are released in one pass
    fn delete_textures(&mut self, handles: &[TextureHandle]) {
        if !self.context_current {
            return;
        }
        for &handle in handles {
            unsafe { self.gl.delete_texture(native_texture(handle)) };
        }
        self.trace("delete_textures");
    }

    fn bind_texture(&mut self, stage: u32, handle: Option<TextureHandle>) {
        if !self.context_current {
            return;
        }
        unsafe {
            self.gl.active_texture(texture_unit(stage));
            self.gl.bind_texture(glow::TEXTURE_2D, handle.map(native_texture));
            if stage != 0 {
                self.gl.active_texture(glow::TEXTURE0);
            }
        }
        self.trace("bind_texture");
    }

    fn set_texture_params(&mut self, params: &TextureParams, level_count: u32) {
        if !self.context_current {
            return;
        }
        let mipmapped = level_count > 1;
        let set = |name: u32, value: u32| unsafe {
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, name, value as i32);
        };
        set(glow::TEXTURE_MIN_FILTER, min_filter_to_gl(params.min_filter, mipmapped));
        set(glow::TEXTURE_MAG_FILTER, mag_filter_to_gl(params.mag_filter));
        set(glow::TEXTURE_WRAP_S, wrap_to_gl(params.wrap_u));
        set(glow::TEXTURE_WRAP_T, wrap_to_gl(params.wrap_v));
        if mipmapped && self.capabilities.version().at_least(3, 0) {
            set(glow::TEXTURE_MAX_LEVEL, level_count - 1);
        }
        self.trace("set_texture_params");
    }

    fn tex_image_2d(&mut self, level: u32, format: PixelFormat, width: u32, height: u32, data: &[u8]) {
        if !self.context_current {
            return;
        }
        let gl_format = pixel_format_to_gl(format);
        unsafe {
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                gl_int(level),
                gl_format.internal_format as i32,
                gl_int(width),
                gl_int(height),
                0,
                gl_format.format,
                gl_format.ty,
                PixelUnpackData::Slice(Some(data)),
            );
        }
        self.trace("tex_image_2d");
    }

    fn compressed_tex_image_2d(
        &mut self,
        level: u32,
        format: CompressedFormat,
        width: u32,
        height: u32,
        data: &[u8],
    ) {
        if !self.context_current {
            return;
        }
        unsafe {
            self.gl.compressed_tex_image_2d(
                glow::TEXTURE_2D,
                gl_int(level),
                compressed_format_to_gl(format) as i32,
                gl_int(width),
                gl_int(height),
                0,
                i32::try_from(data.len()).unwrap_or(i32::MAX),
                data,
            );
        }
        self.trace("compressed_tex_image_2d");
    }

    fn tex_sub_image_2d(&mut self, x: u32, y: u32, width: u32, height: u32, data: &[u8]) {
        if !self.context_current {
            return;
        }
        unsafe {
            self.gl.tex_sub_image_2d(
                glow::TEXTURE_2D,
                0,
                gl_int(x),
                gl_int(y),
                gl_int(width),
                gl_int(height),
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                PixelUnpackData::Slice(Some(data)),
            );
        }
        self.trace("tex_sub_image_2d");
    }

    fn set_blending_enabled(&mut self, enabled: bool) {
        if !self.context_current {
            return;
        }
        unsafe {
            if enabled {
                self.gl.enable(glow::BLEND);
            } else {
                self.gl.disable(glow::BLEND);
            }
        }
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        if self.context_current {
            unsafe { self.gl.blend_func(blend_factor_to_gl(src), blend_factor_to_gl(dst)) };
            self.trace("blend_func");
        }
    }

    fn use_program(&mut self, program: ShaderProgram) {
        if !self.context_current {
            return;
        }
        let Some(slot) = self.programs.get(&program) else {
            engine_warn!("lime::gl", "Program {:?} is not compiled", program);
            return;
        };
        unsafe { self.gl.use_program(Some(slot.program)) };
        self.current_program = Some(program);
        self.sync_projection(program);
        self.trace("use_program");
    }

    fn set_projection(&mut self, projection: &Mat4) {
        self.projection = *projection;
        self.projection_revision += 1;
        if let (true, Some(program)) = (self.context_current, self.current_program) {
            self.sync_projection(program);
        }
    }

    fn clear(&mut self, color: [f32; 4]) {
        if self.context_current {
            unsafe {
                self.gl.clear_color(color[0], color[1], color[2], color[3]);
                self.gl.clear(glow::COLOR_BUFFER_BIT);
            }
        }
    }

    fn draw_indexed_triangles(&mut self, index_count: u32) {
        if self.context_current {
            unsafe {
                self.gl.draw_elements(glow::TRIANGLES, gl_int(index_count), glow::UNSIGNED_SHORT, 0);
            }
            self.trace("draw_indexed_triangles");
        }
    }

    fn get_error(&mut self) -> Option<u32> {
        if !self.context_current {
            return None;
        }
        let code = unsafe { self.gl.get_error() };
        (code != glow::NO_ERROR).then_some(code)
    }
}

impl Drop for GlGraphicsDevice {
    fn drop(&mut self) {
        if !self.context_current {
            return;
        }
        unsafe {
            for slot in self.programs.values() {
                self.gl.delete_program(slot.program);
            }
            if let Some(vertex_array) = self.vertex_array.take() {
                self.gl.delete_vertex_array(vertex_array);
            }
        }
    }
}

