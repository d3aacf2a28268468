//! Renderer and texture configuration
//!
//! Plain structs with `Default` impls; every knob has the value the
//! renderer uses when constructed with `Default::default()`.

/// Configuration for a `Renderer`
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Vertex capacity of each pooled vertex buffer
    pub vertex_buffer_capacity: usize,
    /// Index capacity of each render batch
    pub batch_index_capacity: usize,
    /// Whether textures carry premultiplied alpha (selects blend factors)
    pub premultiplied_alpha: bool,
    /// Color used by the frame-start clear
    pub clear_color: [f32; 4],
    /// Drain driver errors at frame start and report them
    pub check_errors: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            vertex_buffer_capacity: 1000,
            batch_index_capacity: 500,
            premultiplied_alpha: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            check_errors: cfg!(debug_assertions),
        }
    }
}

impl RendererConfig {
    /// Largest capacity allowed by 16-bit indices
    pub const MAX_VERTEX_BUFFER_CAPACITY: usize = u16::MAX as usize + 1;
}

/// Configuration for texture loading
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureConfig {
    /// Stubs for missing assets are fully transparent instead of a blue checkerboard
    pub transparent_stub: bool,
    /// Pad every decoded image to power-of-two dimensions even when NPOT is supported
    pub force_pot: bool,
}
