/// Context capabilities, probed once per device
///
/// The GL version and extension list are queried when the device is created;
/// everything the render core asks afterwards (`supports`, `supports_npot`)
/// is answered from the cached `FormatSupport` flags.

use bitflags::bitflags;
use rustc_hash::FxHashSet;
use crate::graphics_device::CompressedFormat;

bitflags! {
    /// Texture features the context can consume natively
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FormatSupport: u32 {
        const S3TC = 1 << 0;
        const ETC1 = 1 << 1;
        const ETC2 = 1 << 2;
        const PVRTC = 1 << 3;
        const NPOT = 1 << 4;
    }
}

/// Context API version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
    /// OpenGL ES (or WebGL) rather than desktop GL
    pub embedded: bool,
}

impl ApiVersion {
    pub fn at_least(&self, major: u32, minor: u32) -> bool {
        (self.major, self.minor) >= (major, minor)
    }
}

/// Cached capabilities of a graphics context
#[derive(Debug, Clone)]
pub struct Capabilities {
    version: ApiVersion,
    extensions: FxHashSet<String>,
    max_texture_size: u32,
    formats: FormatSupport,
}

impl Capabilities {
    /// Derive capabilities from a version and an extension list
    pub fn new<I, S>(version: ApiVersion, extensions: I, max_texture_size: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let extensions: FxHashSet<String> = extensions.into_iter().map(Into::into).collect();
        let has = |name: &str| extensions.contains(name);

        let mut formats = FormatSupport::empty();
        if has("GL_EXT_texture_compression_s3tc") || has("WEBGL_compressed_texture_s3tc") {
            formats |= FormatSupport::S3TC;
        }
        let etc2 = (version.embedded && version.at_least(3, 0))
            || (!version.embedded && version.at_least(4, 3))
            || has("GL_ARB_ES3_compatibility");
        if etc2 {
            formats |= FormatSupport::ETC2 | FormatSupport::ETC1;
        }
        if has("GL_OES_compressed_ETC1_RGB8_texture") || has("WEBGL_compressed_texture_etc1") {
            formats |= FormatSupport::ETC1;
        }
        if has("GL_IMG_texture_compression_pvrtc") || has("WEBGL_compressed_texture_pvrtc") {
            formats |= FormatSupport::PVRTC;
        }
        let npot = if version.embedded {
            version.at_least(3, 0) || has("GL_OES_texture_npot")
        } else {
            version.at_least(2, 0) || has("GL_ARB_texture_non_power_of_two")
        };
        if npot {
            formats |= FormatSupport::NPOT;
        }

        Self { version, extensions, max_texture_size, formats }
    }

    /// Capabilities with fixed format flags and no extension list
    pub fn with_formats(formats: FormatSupport) -> Self {
        Self {
            version: ApiVersion { major: 3, minor: 0, embedded: true },
            extensions: FxHashSet::default(),
            max_texture_size: 4096,
            formats,
        }
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    pub fn max_texture_size(&self) -> u32 {
        self.max_texture_size
    }

    pub fn formats(&self) -> FormatSupport {
        self.formats
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.contains(name)
    }

    pub fn extension_count(&self) -> usize {
        self.extensions.len()
    }

    pub fn supports_npot(&self) -> bool {
        self.formats.contains(FormatSupport::NPOT)
    }

    /// Whether `format` can be uploaded without software decoding
    pub fn supports(&self, format: CompressedFormat) -> bool {
        let required = match format {
            CompressedFormat::Dxt1 | CompressedFormat::Dxt3 | CompressedFormat::Dxt5 => {
                FormatSupport::S3TC
            }
            CompressedFormat::Etc1 => FormatSupport::ETC1,
            CompressedFormat::Etc2Rgb8
            | CompressedFormat::Etc2Rgb8A1
            | CompressedFormat::Etc2Rgba8 => FormatSupport::ETC2,
            CompressedFormat::Pvrtc2Bpp | CompressedFormat::Pvrtc4Bpp => FormatSupport::PVRTC,
        };
        self.formats.contains(required)
    }
}

#[cfg(test)]
#[path = "capabilities_tests.rs"]
mod tests;
