use super::*;
use crate::error::Error;

fn pixel(rgba: &[u8], width: usize, x: usize, y: usize) -> [u8; 4] {
    let offset = (y * width + x) * 4;
    [rgba[offset], rgba[offset + 1], rgba[offset + 2], rgba[offset + 3]]
}

// ============================================================================
// ETC1
// ============================================================================

#[test]
fn test_etc1_individual_mode() {
    // Sub-block 1 red, sub-block 2 black, codeword 0, all pixel indices 0 (+2)
    let block = [0xF0, 0x00, 0x00, 0x00, 0, 0, 0, 0];
    let rgba = decode(CompressedFormat::Etc1, &block, 4, 4).unwrap();

    assert_eq!(rgba.len(), 64);
    assert_eq!(pixel(&rgba, 4, 0, 0), [255, 2, 2, 255]);
    assert_eq!(pixel(&rgba, 4, 1, 3), [255, 2, 2, 255]);
    assert_eq!(pixel(&rgba, 4, 2, 0), [2, 2, 2, 255]);
    assert_eq!(pixel(&rgba, 4, 3, 3), [2, 2, 2, 255]);
}

#[test]
fn test_etc1_flip_splits_horizontally() {
    let block = [0xF0, 0x00, 0x00, 0x01, 0, 0, 0, 0];
    let rgba = decode(CompressedFormat::Etc1, &block, 4, 4).unwrap();

    assert_eq!(pixel(&rgba, 4, 3, 1), [255, 2, 2, 255]);
    assert_eq!(pixel(&rgba, 4, 0, 2), [2, 2, 2, 255]);
}

#[test]
fn test_etc1_differential_mode() {
    // Base red 16 (132 expanded), delta -1 for the second sub-block
    let block = [(16 << 3) | 0b111, 0x00, 0x00, 0x02, 0, 0, 0, 0];
    let rgba = decode(CompressedFormat::Etc1, &block, 4, 4).unwrap();

    assert_eq!(pixel(&rgba, 4, 0, 0), [134, 2, 2, 255]);
    assert_eq!(pixel(&rgba, 4, 2, 0), [125, 2, 2, 255]);
}

#[test]
fn test_etc1_pixel_indices_select_modifiers() {
    // Pixel (0,0) has index 1 (+8), pixel (0,1) index 2 (-2), pixel (0,2) index 3 (-8)
    let lsb: u32 = 0b0101;
    let msb: u32 = 0b0110;
    let bits = (msb << 16) | lsb;
    let mut block = [0x80, 0x80, 0x80, 0x02, 0, 0, 0, 0];
    block[4..8].copy_from_slice(&bits.to_be_bytes());
    let rgba = decode(CompressedFormat::Etc1, &block, 4, 4).unwrap();

    assert_eq!(pixel(&rgba, 4, 0, 0), [140, 140, 140, 255]);
    assert_eq!(pixel(&rgba, 4, 0, 1), [130, 130, 130, 255]);
    assert_eq!(pixel(&rgba, 4, 0, 2), [124, 124, 124, 255]);
    assert_eq!(pixel(&rgba, 4, 0, 3), [134, 134, 134, 255]);
}

// ============================================================================
// ETC2 modes
// ============================================================================

#[test]
fn test_etc2_t_mode() {
    // Red overflow (31 + 1) selects T mode
    let block = [0xF9, 0x00, 0xF0, 0x02, 0, 0, 0, 0];
    let rgba = decode(CompressedFormat::Etc2Rgb8, &block, 4, 4).unwrap();
    assert_eq!(pixel(&rgba, 4, 0, 0), [221, 0, 0, 255]);

    let mut block = block;
    block[6] = 0xFF;
    block[7] = 0xFF;
    let rgba = decode(CompressedFormat::Etc2Rgb8, &block, 4, 4).unwrap();
    assert_eq!(pixel(&rgba, 4, 2, 2), [255, 3, 3, 255]);
}

#[test]
fn test_etc2_h_mode() {
    // Green overflow selects H mode
    let block = [0x00, 0xF9, 0x00, 0x02, 0, 0, 0, 0];
    let rgba = decode(CompressedFormat::Etc2Rgb8, &block, 4, 4).unwrap();
    assert_eq!(pixel(&rgba, 4, 1, 1), [6, 23, 176, 255]);
}

#[test]
fn test_etc2_planar_mode() {
    // Blue overflow selects planar mode
    let block = [0x00, 0x00, 0xF9, 0x02, 0, 0, 0, 0];
    let rgba = decode(CompressedFormat::Etc2Rgb8, &block, 4, 4).unwrap();

    assert_eq!(pixel(&rgba, 4, 0, 0), [0, 0, 105, 255]);
    assert_eq!(pixel(&rgba, 4, 1, 0), [0, 0, 79, 255]);
    assert_eq!(pixel(&rgba, 4, 3, 3), [0, 0, 0, 255]);
}

#[test]
fn test_etc1_ignores_overflow() {
    // Same block as the T-mode test, decoded as plain differential ETC1
    let block = [0xF9, 0x00, 0xF0, 0x02, 0, 0, 0, 0];
    let rgba = decode(CompressedFormat::Etc1, &block, 4, 4).unwrap();
    assert_eq!(pixel(&rgba, 4, 0, 0), [255, 2, 249, 255]);
}

// ============================================================================
// Alpha
// ============================================================================

#[test]
fn test_punchthrough_transparent_pixels() {
    // Opaque bit cleared, every pixel index 2
    let block = [0x80, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00];
    let rgba = decode(CompressedFormat::Etc2Rgb8A1, &block, 4, 4).unwrap();
    assert!(rgba.chunks(4).all(|p| p == [0, 0, 0, 0]));
}

#[test]
fn test_punchthrough_index_zero_has_no_modifier() {
    let block = [0x80, 0x00, 0x00, 0x00, 0, 0, 0, 0];
    let rgba = decode(CompressedFormat::Etc2Rgb8A1, &block, 4, 4).unwrap();
    assert_eq!(pixel(&rgba, 4, 0, 0), [132, 0, 0, 255]);
}

#[test]
fn test_eac_alpha_block() {
    // Base 128, multiplier 1, table 0, every index 4 (+2)
    let alpha = [128, 0x10, 0x92, 0x49, 0x24, 0x92, 0x49, 0x24];
    let color = [0xF0, 0x00, 0x00, 0x00, 0, 0, 0, 0];
    let mut block = [0u8; 16];
    block[..8].copy_from_slice(&alpha);
    block[8..].copy_from_slice(&color);
    let rgba = decode(CompressedFormat::Etc2Rgba8, &block, 4, 4).unwrap();

    assert_eq!(pixel(&rgba, 4, 0, 0), [255, 2, 2, 130]);
    assert_eq!(pixel(&rgba, 4, 3, 3), [2, 2, 2, 130]);
}

// ============================================================================
// Layout and errors
// ============================================================================

#[test]
fn test_partial_blocks_are_cropped() {
    let blocks = [[0xF0, 0x00, 0x00, 0x00, 0, 0, 0, 0], [0x0F, 0x00, 0x00, 0x00, 0, 0, 0, 0]].concat();
    let rgba = decode(CompressedFormat::Etc1, &blocks, 6, 2).unwrap();

    assert_eq!(rgba.len(), 6 * 2 * 4);
    assert_eq!(pixel(&rgba, 6, 0, 1), [255, 2, 2, 255]);
    assert_eq!(pixel(&rgba, 6, 5, 1), [2, 2, 2, 255]);
}

#[test]
fn test_short_data_rejected() {
    let result = decode(CompressedFormat::Etc1, &[0; 8], 8, 8);
    assert!(matches!(result, Err(Error::InvalidData(_))));
}

#[test]
fn test_non_etc_format_rejected() {
    let result = decode(CompressedFormat::Dxt1, &[0; 8], 4, 4);
    assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
}
