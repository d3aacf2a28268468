/// Software ETC1 / ETC2 decoder
///
/// Used when the context cannot sample ETC textures natively. Produces
/// tightly packed RGBA8 rows. Handles every ETC2 color mode (individual,
/// differential, T, H, planar), punch-through alpha and the EAC alpha block
/// of `Etc2Rgba8`.

use crate::error::Result;
use crate::graphics_device::CompressedFormat;
use crate::engine_bail;

const MODIFIER_TABLE: [[i32; 2]; 8] = [
    [2, 8], [5, 17], [9, 29], [13, 42], [18, 60], [24, 80], [33, 106], [47, 183],
];

const DISTANCE_TABLE: [i32; 8] = [3, 6, 11, 16, 23, 32, 41, 64];

const ALPHA_MODIFIER_TABLE: [[i32; 8]; 16] = [
    [-3, -6, -9, -15, 2, 5, 8, 14],
    [-3, -7, -10, -13, 2, 6, 9, 12],
    [-2, -5, -8, -13, 1, 4, 7, 12],
    [-2, -4, -6, -13, 1, 3, 5, 12],
    [-3, -6, -8, -12, 2, 5, 7, 11],
    [-3, -7, -9, -11, 2, 6, 8, 10],
    [-4, -7, -8, -11, 3, 6, 7, 10],
    [-3, -5, -8, -11, 2, 4, 7, 10],
    [-2, -6, -8, -10, 1, 5, 7, 9],
    [-2, -5, -8, -10, 1, 4, 7, 9],
    [-2, -4, -8, -10, 1, 3, 7, 9],
    [-2, -5, -7, -10, 1, 4, 6, 9],
    [-3, -4, -7, -10, 2, 3, 6, 9],
    [-1, -2, -3, -10, 0, 1, 2, 9],
    [-4, -6, -8, -9, 3, 5, 7, 8],
    [-3, -5, -7, -9, 2, 4, 6, 8],
];

/// Decoded 4x4 block, pixels in row-major order
type Block = [[u8; 4]; 16];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorMode {
    Etc1,
    Etc2,
    Etc2Punchthrough,
}

fn clamp(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

fn expand4(c: u32) -> i32 {
    ((c << 4) | c) as i32
}

fn expand5(c: u32) -> i32 {
    ((c << 3) | (c >> 2)) as i32
}

fn expand6(c: u32) -> i32 {
    ((c << 2) | (c >> 4)) as i32
}

fn expand7(c: u32) -> i32 {
    ((c << 1) | (c >> 6)) as i32
}

/// Sign-extend a 3-bit delta
fn delta3(bits: u32) -> i32 {
    ((bits as i32) << 29) >> 29
}

fn offset(color: [i32; 3], amount: i32) -> [u8; 4] {
    [clamp(color[0] + amount), clamp(color[1] + amount), clamp(color[2] + amount), 255]
}

/// Pixel index (0..4) of the pixel at column `x`, row `y`
fn pixel_index(index_bits: u32, x: usize, y: usize) -> usize {
    let i = x * 4 + y;
    let lsb = (index_bits >> i) & 1;
    let msb = (index_bits >> (16 + i)) & 1;
    ((msb << 1) | lsb) as usize
}

fn decode_color_block(block: &[u8], mode: ColorMode, out: &mut Block) {
    let b: [u32; 8] = std::array::from_fn(|i| block[i] as u32);
    let index_bits = (b[4] << 24) | (b[5] << 16) | (b[6] << 8) | b[7];
    let diff_bit = b[3] & 2 != 0;
    let flip = b[3] & 1 != 0;
    let punchthrough = mode == ColorMode::Etc2Punchthrough;
    let opaque = !punchthrough || diff_bit;

    let (base1, base2) = if !punchthrough && !diff_bit {
        (
            [expand4(b[0] >> 4), expand4(b[1] >> 4), expand4(b[2] >> 4)],
            [expand4(b[0] & 0xF), expand4(b[1] & 0xF), expand4(b[2] & 0xF)],
        )
    } else {
        let r = (b[0] >> 3) as i32;
        let g = (b[1] >> 3) as i32;
        let bl = (b[2] >> 3) as i32;
        let r2 = r + delta3(b[0] & 7);
        let g2 = g + delta3(b[1] & 7);
        let b2 = bl + delta3(b[2] & 7);
        if mode != ColorMode::Etc1 {
            if !(0..32).contains(&r2) {
                return decode_t_mode(&b, index_bits, opaque, out);
            }
            if !(0..32).contains(&g2) {
                return decode_h_mode(&b, index_bits, opaque, out);
            }
            if !(0..32).contains(&b2) {
                return decode_planar(&b, out);
            }
        }
        (
            [expand5(r as u32), expand5(g as u32), expand5(bl as u32)],
            [expand5((r2 & 31) as u32), expand5((g2 & 31) as u32), expand5((b2 & 31) as u32)],
        )
    };

    let tables = [MODIFIER_TABLE[(b[3] >> 5) as usize], MODIFIER_TABLE[((b[3] >> 2) & 7) as usize]];
    for y in 0..4 {
        for x in 0..4 {
            let second = if flip { y >= 2 } else { x >= 2 };
            let (base, table) = if second { (base2, tables[1]) } else { (base1, tables[0]) };
            let index = pixel_index(index_bits, x, y);
            out[y * 4 + x] = if !opaque && index == 2 {
                [0, 0, 0, 0]
            } else {
                let modifier = match index {
                    0 if !opaque => 0,
                    0 => table[0],
                    1 => table[1],
                    2 => -table[0],
                    _ => -table[1],
                };
                offset(base, modifier)
            };
        }
    }
}

fn paint_block(paint: &[[u8; 4]; 4], index_bits: u32, opaque: bool, out: &mut Block) {
    for y in 0..4 {
        for x in 0..4 {
            let index = pixel_index(index_bits, x, y);
            out[y * 4 + x] = if !opaque && index == 2 { [0, 0, 0, 0] } else { paint[index] };
        }
    }
}

fn decode_t_mode(b: &[u32; 8], index_bits: u32, opaque: bool, out: &mut Block) {
    let c1 = [
        expand4(((b[0] >> 1) & 0xC) | (b[0] & 3)),
        expand4(b[1] >> 4),
        expand4(b[1] & 0xF),
    ];
    let c2 = [expand4(b[2] >> 4), expand4(b[2] & 0xF), expand4(b[3] >> 4)];
    let d = DISTANCE_TABLE[(((b[3] >> 1) & 6) | (b[3] & 1)) as usize];
    let paint = [offset(c1, 0), offset(c2, d), offset(c2, 0), offset(c2, -d)];
    paint_block(&paint, index_bits, opaque, out);
}

fn decode_h_mode(b: &[u32; 8], index_bits: u32, opaque: bool, out: &mut Block) {
    let r1 = (b[0] >> 3) & 0xF;
    let g1 = ((b[0] << 1) & 0xE) | ((b[1] >> 4) & 1);
    let b1 = (b[1] & 8) | ((b[1] << 1) & 6) | (b[2] >> 7);
    let r2 = (b[2] >> 3) & 0xF;
    let g2 = ((b[2] << 1) & 0xE) | (b[3] >> 7);
    let b2 = (b[3] >> 3) & 0xF;

    let mut distance_index = (b[3] & 4) | ((b[3] << 1) & 2);
    if (r1 << 8) | (g1 << 4) | b1 >= (r2 << 8) | (g2 << 4) | b2 {
        distance_index |= 1;
    }
    let d = DISTANCE_TABLE[distance_index as usize];
    let c1 = [expand4(r1), expand4(g1), expand4(b1)];
    let c2 = [expand4(r2), expand4(g2), expand4(b2)];
    let paint = [offset(c1, d), offset(c1, -d), offset(c2, d), offset(c2, -d)];
    paint_block(&paint, index_bits, opaque, out);
}

fn decode_planar(b: &[u32; 8], out: &mut Block) {
    let origin = [
        expand6((b[0] >> 1) & 0x3F),
        expand7(((b[0] & 1) << 6) | ((b[1] >> 1) & 0x3F)),
        expand6(((b[1] & 1) << 5) | (b[2] & 0x18) | ((b[2] & 3) << 1) | (b[3] >> 7)),
    ];
    let horizontal = [
        expand6(((b[3] >> 1) & 0x3E) | (b[3] & 1)),
        expand7((b[4] >> 1) & 0x7F),
        expand6(((b[4] & 1) << 5) | (b[5] >> 3)),
    ];
    let vertical = [
        expand6(((b[5] & 7) << 3) | (b[6] >> 5)),
        expand7(((b[6] & 0x1F) << 2) | (b[7] >> 6)),
        expand6(b[7] & 0x3F),
    ];
    for y in 0..4 {
        for x in 0..4 {
            let channel = |c: usize| {
                let (x, y) = (x as i32, y as i32);
                clamp((x * (horizontal[c] - origin[c]) + y * (vertical[c] - origin[c]) + 4 * origin[c] + 2) >> 2)
            };
            out[y * 4 + x] = [channel(0), channel(1), channel(2), 255];
        }
    }
}

fn decode_alpha_block(block: &[u8], out: &mut Block) {
    let base = block[0] as i32;
    let multiplier = (block[1] >> 4) as i32;
    let table = ALPHA_MODIFIER_TABLE[(block[1] & 0xF) as usize];
    let bits = block[2..8].iter().fold(0u64, |acc, &byte| (acc << 8) | byte as u64);
    for y in 0..4 {
        for x in 0..4 {
            let i = x * 4 + y;
            let index = ((bits >> (45 - 3 * i)) & 7) as usize;
            out[y * 4 + x][3] = clamp(base + table[index] * multiplier);
        }
    }
}

/// Decode one ETC level into RGBA8
pub fn decode(format: CompressedFormat, data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let (mode, block_size) = match format {
        CompressedFormat::Etc1 => (ColorMode::Etc1, 8),
        CompressedFormat::Etc2Rgb8 => (ColorMode::Etc2, 8),
        CompressedFormat::Etc2Rgb8A1 => (ColorMode::Etc2Punchthrough, 8),
        CompressedFormat::Etc2Rgba8 => (ColorMode::Etc2, 16),
        other => engine_bail!(UnsupportedFormat, "lime::EtcDecoder",
            "{:?} is not an ETC format", other),
    };
    let (width, height) = (width as usize, height as usize);
    let blocks_x = width.div_ceil(4);
    let blocks_y = height.div_ceil(4);
    let required = blocks_x.checked_mul(blocks_y).and_then(|blocks| blocks.checked_mul(block_size));
    let rgba_size = width.checked_mul(height).and_then(|pixels| pixels.checked_mul(4));
    let (Some(required), Some(rgba_size)) = (required, rgba_size) else {
        engine_bail!(InvalidData, "lime::EtcDecoder", "ETC image {}x{} is too large", width, height);
    };
    if data.len() < required {
        engine_bail!(InvalidData, "lime::EtcDecoder",
            "ETC data too short: {} bytes for {}x{} ({} required)", data.len(), width, height, required);
    }

    let mut rgba = vec![0u8; rgba_size];
    let mut block: Block = [[0; 4]; 16];
    for (index, chunk) in data[..required].chunks_exact(block_size).enumerate() {
        let (bx, by) = (index % blocks_x, index / blocks_x);
        if block_size == 16 {
            decode_color_block(&chunk[8..], mode, &mut block);
            decode_alpha_block(&chunk[..8], &mut block);
        } else {
            decode_color_block(chunk, mode, &mut block);
        }
        for y in 0..4 {
            let py = by * 4 + y;
            if py >= height {
                break;
            }
            for x in 0..4 {
                let px = bx * 4 + x;
                if px >= width {
                    break;
                }
                let offset = (py * width + px) * 4;
                rgba[offset..offset + 4].copy_from_slice(&block[y * 4 + x]);
            }
        }
    }
    Ok(rgba)
}

#[cfg(test)]
#[path = "etc_decoder_tests.rs"]
mod tests;
