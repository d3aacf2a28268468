/// Vertex layout consumed by every shader program
///
/// Interleaved, 28 bytes per vertex: position, two texture coordinate sets,
/// and an 8-bit RGBA color.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// 8-bit RGBA color
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct Color4 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color4 {
    pub const WHITE: Color4 = Color4::new(255, 255, 255, 255);
    pub const BLACK: Color4 = Color4::new(0, 0, 0, 255);
    pub const TRANSPARENT: Color4 = Color4::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Multiply the color channels by alpha
    pub fn premultiplied(self) -> Self {
        let scale = |c: u8| ((c as u16 * self.a as u16 + 127) / 255) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b), self.a)
    }
}

/// One batched vertex
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub pos: Vec2,
    pub uv1: Vec2,
    pub uv2: Vec2,
    pub color: Color4,
}

impl Vertex {
    /// Byte stride of the interleaved layout
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
    pub const POS_OFFSET: usize = std::mem::offset_of!(Vertex, pos);
    pub const UV1_OFFSET: usize = std::mem::offset_of!(Vertex, uv1);
    pub const UV2_OFFSET: usize = std::mem::offset_of!(Vertex, uv2);
    pub const COLOR_OFFSET: usize = std::mem::offset_of!(Vertex, color);

    pub fn new(pos: Vec2, uv1: Vec2, color: Color4) -> Self {
        Self { pos, uv1, uv2: Vec2::ZERO, color }
    }
}
