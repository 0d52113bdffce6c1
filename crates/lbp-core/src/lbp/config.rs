use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_NEIGHBORS, DEFAULT_RADIUS, MAX_NEIGHBORS};
use crate::error::{LbpError, Result};

/// How the raw comparison bit vector is formed from the sampled neighbors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncodingType {
    /// Bit `i` is set when neighbor `i` is `>=` the reference value.
    #[default]
    Regular,
    /// Bit `i` is set when neighbor `i` is `>=` neighbor `i + 1` (circularly).
    Transitional,
    /// Two bits per pair of opposite neighbors: bit `2k` is set when both lie on
    /// the same side of the reference, bit `2k + 1` when neighbor `k` deviates
    /// at least as much as neighbor `k + N/2`.
    DirectionCoded,
}

impl fmt::Display for EncodingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingType::Regular => write!(f, "Regular"),
            EncodingType::Transitional => write!(f, "Transitional"),
            EncodingType::DirectionCoded => write!(f, "Direction coded"),
        }
    }
}

/// Treatment of pixels whose neighborhood leaves the image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BorderHandling {
    /// Only centers with a complete neighborhood are coded; the output shrinks.
    #[default]
    Shrink,
    /// Coordinates wrap around to the opposite border; the output keeps the
    /// input size.
    Wrap,
}

impl fmt::Display for BorderHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BorderHandling::Shrink => write!(f, "Shrink"),
            BorderHandling::Wrap => write!(f, "Wrap"),
        }
    }
}

/// Full parameter set of an LBP operator.
///
/// Multi-block mode is active iff `block_size != (0, 0)`; the radii and the
/// `circular` flag are then ignored in favor of a 3x3 grid of blocks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LbpConfig {
    /// Number of sampled neighbors, i.e. bits of the raw code.
    pub neighbor_count: u32,
    /// Vertical sampling radius.
    pub radius_y: f64,
    /// Horizontal sampling radius.
    pub radius_x: f64,
    /// Elliptical (true) or rectangular (false) neighborhood.
    pub circular: bool,
    /// Compare neighbors to their mean instead of the center pixel.
    pub to_average: bool,
    /// Append one most-significant bit comparing the center to the mean.
    pub add_average_bit: bool,
    /// Reduce codes to uniform (u2) patterns.
    pub uniform: bool,
    /// Reduce codes to rotation-invariant classes.
    pub rotation_invariant: bool,
    pub encoding: EncodingType,
    pub border_handling: BorderHandling,
    /// (height, width) of one block in multi-block mode.
    pub block_size: (u32, u32),
    /// (height, width) overlap of neighboring blocks in multi-block mode.
    pub block_overlap: (u32, u32),
}

impl Default for LbpConfig {
    fn default() -> Self {
        Self {
            neighbor_count: DEFAULT_NEIGHBORS,
            radius_y: DEFAULT_RADIUS,
            radius_x: DEFAULT_RADIUS,
            circular: false,
            to_average: false,
            add_average_bit: false,
            uniform: false,
            rotation_invariant: false,
            encoding: EncodingType::Regular,
            border_handling: BorderHandling::Shrink,
            block_size: (0, 0),
            block_overlap: (0, 0),
        }
    }
}

impl LbpConfig {
    /// Circular neighborhood with a single radius.
    pub fn circular(neighbor_count: u32, radius: f64) -> Self {
        Self::elliptical(neighbor_count, radius, radius)
    }

    /// Elliptical neighborhood with independent vertical and horizontal radii.
    pub fn elliptical(neighbor_count: u32, radius_y: f64, radius_x: f64) -> Self {
        Self {
            neighbor_count,
            radius_y,
            radius_x,
            circular: true,
            ..Self::default()
        }
    }

    /// Square neighborhood with a single radius (4 or 8 neighbors).
    pub fn rectangular(neighbor_count: u32, radius: f64) -> Self {
        Self {
            neighbor_count,
            radius_y: radius,
            radius_x: radius,
            circular: false,
            ..Self::default()
        }
    }

    /// Multi-block LBP over a 3x3 grid of `block_size` blocks that overlap by
    /// `block_overlap` (4 or 8 neighbors).
    pub fn multi_block(
        neighbor_count: u32,
        block_size: (u32, u32),
        block_overlap: (u32, u32),
    ) -> Self {
        Self {
            neighbor_count,
            circular: false,
            block_size,
            block_overlap,
            ..Self::default()
        }
    }

    pub fn with_to_average(mut self, to_average: bool) -> Self {
        self.to_average = to_average;
        self
    }

    pub fn with_average_bit(mut self, add_average_bit: bool) -> Self {
        self.add_average_bit = add_average_bit;
        self
    }

    pub fn with_uniform(mut self, uniform: bool) -> Self {
        self.uniform = uniform;
        self
    }

    pub fn with_rotation_invariant(mut self, rotation_invariant: bool) -> Self {
        self.rotation_invariant = rotation_invariant;
        self
    }

    pub fn with_encoding(mut self, encoding: EncodingType) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_border_handling(mut self, border_handling: BorderHandling) -> Self {
        self.border_handling = border_handling;
        self
    }

    pub fn is_multi_block(&self) -> bool {
        self.block_size != (0, 0)
    }

    /// Width of the raw comparison vector, including the average bit.
    pub fn code_bits(&self) -> u32 {
        self.neighbor_count + u32::from(self.add_average_bit)
    }

    /// Check field-level invariants. Geometry and table construction perform
    /// their own, more specific checks on top of this.
    pub fn validate(&self) -> Result<()> {
        let n = self.neighbor_count;
        if n == 0 {
            return Err(LbpError::config("at least one neighbor is required"));
        }
        if n > MAX_NEIGHBORS {
            return Err(LbpError::config(format!(
                "{n} neighbors exceed the supported maximum of {MAX_NEIGHBORS}"
            )));
        }

        if self.is_multi_block() {
            let (bh, bw) = self.block_size;
            let (oh, ow) = self.block_overlap;
            if bh == 0 || bw == 0 {
                return Err(LbpError::config(format!(
                    "block size {bh}x{bw} must be non-zero in both dimensions"
                )));
            }
            if oh >= bh || ow >= bw {
                return Err(LbpError::config(format!(
                    "block overlap {oh}x{ow} must be smaller than block size {bh}x{bw}"
                )));
            }
            if self.circular {
                return Err(LbpError::config(
                    "multi-block LBP uses a rectangular block grid and cannot be circular",
                ));
            }
        } else {
            for (name, r) in [("radius_y", self.radius_y), ("radius_x", self.radius_x)] {
                if !r.is_finite() || r <= 0.0 {
                    return Err(LbpError::config(format!(
                        "{name} must be positive and finite, got {r}"
                    )));
                }
            }
        }

        if self.encoding == EncodingType::DirectionCoded && n % 2 != 0 {
            return Err(LbpError::config(format!(
                "direction coded LBP pairs opposite neighbors and needs an even neighbor count, got {n}"
            )));
        }

        Ok(())
    }
}
