/// High-level render state carried by each batch
///
/// `Blending` and `ShaderId` are what callers ask for; the platform renderer
/// turns them into blend factors and a concrete `ShaderProgram`.

use crate::graphics_device::{BlendFactor, ShaderProgram};

/// Blending mode of a draw request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Blending {
    /// Source replaces destination
    None,
    #[default]
    Default,
    Alpha,
    Add,
    Silhouette,
    Glow,
    Modulate,
    Burn,
}

impl Blending {
    /// Source and destination factors for this mode
    pub fn factors(self, premultiplied_alpha: bool) -> (BlendFactor, BlendFactor) {
        match self {
            Blending::None => (BlendFactor::One, BlendFactor::Zero),
            Blending::Default | Blending::Alpha => {
                if premultiplied_alpha {
                    (BlendFactor::One, BlendFactor::OneMinusSrcAlpha)
                } else {
                    (BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha)
                }
            }
            Blending::Add | Blending::Glow => (BlendFactor::SrcAlpha, BlendFactor::One),
            Blending::Silhouette => (BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha),
            Blending::Burn => (BlendFactor::DstColor, BlendFactor::OneMinusSrcAlpha),
            Blending::Modulate => (BlendFactor::DstColor, BlendFactor::Zero),
        }
    }
}

/// Shader requested by a draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShaderId {
    #[default]
    Default,
    Diffuse,
    Silhouette,
    InversedSilhouette,
}

impl ShaderId {
    /// Program to run for this shader with `texture_count` bound textures
    pub fn program(self, texture_count: usize) -> ShaderProgram {
        match (self, texture_count) {
            (ShaderId::Default | ShaderId::Diffuse, 1) => ShaderProgram::OneTexture,
            (ShaderId::Default | ShaderId::Diffuse, 2) => ShaderProgram::TwoTextures,
            (ShaderId::Silhouette, 1) => ShaderProgram::Silhouette,
            (ShaderId::Silhouette, 2) => ShaderProgram::TwoTexturesSilhouette,
            (ShaderId::InversedSilhouette, 1) => ShaderProgram::InversedSilhouette,
            _ => ShaderProgram::ColorOnly,
        }
    }
}
