/// Texture module - decoding, upload and deferred deletion

pub mod texture_data;
pub mod rewindable_reader;
pub mod dds;
pub mod ktx;
pub mod pvr;
pub mod bitmap;
pub mod etc_decoder;
pub mod texture_loader;
pub mod asset_bundle;
pub mod texture_manager;
pub mod texture_2d;

pub use texture_data::{DecodedImage, MipLevel, TextureFormat, MIN_MIP_SIDE};
pub use rewindable_reader::RewindableReader;
pub use texture_loader::ContainerKind;
pub use asset_bundle::{AssetBundle, DirectoryBundle};
pub use texture_manager::TextureManager;
pub use texture_2d::{AtlasPart, Rect, Texture, Texture2D, BUNDLE_EXTENSIONS, STUB_SIZE};
