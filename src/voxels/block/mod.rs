//! # Block Module
//!
//! A block is a single voxel packed into one `u32`. Only the low 24 bits are
//! significant:
//!
//! ```text
//! bit  0..4   local x      (0..=15)
//! bit  4..8   local y      (0..=15)
//! bit  8..12  local z      (0..=15)
//! bit 12..15  red          (0..=7)
//! bit 15..18  green        (0..=7)
//! bit 18..21  blue         (0..=7)
//! bit 21..24  alpha        (0..=7)
//! ```
//!
//! Packing never fails: positions are clamped into the 4-bit range and colour
//! channels are clamped to `0.0..=1.0` before being quantised to 8 levels.
//! Unpacking is exact for positions and returns the nearest quantisation level
//! for colours.

use cgmath::Point3;
use serde::{Deserialize, Serialize};

pub mod block_side;

/// Largest local coordinate a block can store.
pub const MAX_LOCAL_COORDINATE: i32 = 15;

/// Number of quantisation steps above zero for each colour channel.
pub const COLOR_LEVELS: f32 = 7.0;

const POSITION_MASK: u32 = 0xF;
const CHANNEL_MASK: u32 = 0x7;
const PACKED_MASK: u32 = 0xFF_FFFF;

const Y_SHIFT: u32 = 4;
const Z_SHIFT: u32 = 8;
const RED_SHIFT: u32 = 12;
const GREEN_SHIFT: u32 = 15;
const BLUE_SHIFT: u32 = 18;
const ALPHA_SHIFT: u32 = 21;

/// A normalised RGBA colour.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color {
    /// Red, `0.0..=1.0`.
    pub r: f32,
    /// Green, `0.0..=1.0`.
    pub g: f32,
    /// Blue, `0.0..=1.0`.
    pub b: f32,
    /// Alpha, `0.0..=1.0`; 1.0 when omitted from JSON.
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Color {
    /// Colour used when a palette is empty.
    pub const DEFAULT: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    /// Creates a colour from four channels.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color { r, g, b, a }
    }

    /// Creates an opaque colour.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b, a: 1.0 }
    }

    /// Channels in `[r, g, b, a]` order, as stored per vertex.
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// A single voxel: local position and quantised colour packed into 24 bits.
///
/// Two blocks with the same packed value are the same voxel, which is why chunks
/// keep their blocks in a set.
#[repr(C)]
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, bytemuck::Pod, bytemuck::Zeroable,
)]
pub struct Block {
    packed: u32,
}

impl Block {
    /// Packs a local position and colour into a block.
    ///
    /// # Arguments
    /// * `x`, `y`, `z` - Local coordinates, clamped to `0..=15`
    /// * `color` - Normalised colour, each channel clamped to `0.0..=1.0`
    pub fn pack(x: i32, y: i32, z: i32, color: Color) -> Self {
        let x = x.clamp(0, MAX_LOCAL_COORDINATE) as u32;
        let y = y.clamp(0, MAX_LOCAL_COORDINATE) as u32;
        let z = z.clamp(0, MAX_LOCAL_COORDINATE) as u32;

        Block {
            packed: x
                | y << Y_SHIFT
                | z << Z_SHIFT
                | quantize(color.r) << RED_SHIFT
                | quantize(color.g) << GREEN_SHIFT
                | quantize(color.b) << BLUE_SHIFT
                | quantize(color.a) << ALPHA_SHIFT,
        }
    }

    /// Rebuilds a block from its packed form. Bits above the 24th are dropped.
    pub fn from_packed(packed: u32) -> Self {
        Block {
            packed: packed & PACKED_MASK,
        }
    }

    /// The packed 24-bit value.
    pub fn packed(self) -> u32 {
        self.packed
    }

    /// Splits the block back into its local position and dequantised colour.
    pub fn unpack(self) -> (Point3<i32>, Color) {
        (self.position(), self.color())
    }

    /// Local position inside the chunk, each axis in `0..=15`.
    pub fn position(self) -> Point3<i32> {
        Point3::new(
            (self.packed & POSITION_MASK) as i32,
            (self.packed >> Y_SHIFT & POSITION_MASK) as i32,
            (self.packed >> Z_SHIFT & POSITION_MASK) as i32,
        )
    }

    /// Colour rebuilt from the quantised channels.
    ///
    /// # Returns
    /// Each channel as `level / 7`, so unpacking never reproduces more than
    /// eight distinct values per channel.
    pub fn color(self) -> Color {
        Color::rgba(
            dequantize(self.packed >> RED_SHIFT),
            dequantize(self.packed >> GREEN_SHIFT),
            dequantize(self.packed >> BLUE_SHIFT),
            dequantize(self.packed >> ALPHA_SHIFT),
        )
    }
}

fn quantize(channel: f32) -> u32 {
    // NaN clamps to NaN, and `as` saturates it to 0.
    (channel.clamp(0.0, 1.0) * COLOR_LEVELS).round() as u32 & CHANNEL_MASK
}

fn dequantize(bits: u32) -> f32 {
    (bits & CHANNEL_MASK) as f32 / COLOR_LEVELS
}
