use std::f64::consts::PI;

use crate::consts::{MAX_NEIGHBORS, OFFSET_SNAP_EPSILON};
use crate::error::{LbpError, Result};

/// Unit directions of the rectangular neighborhoods, starting to the right of
/// the center and winding towards increasing rows, like the circular layout.
static RECT_8: [(f64, f64); 8] = [
    (0.0, 1.0),
    (1.0, 1.0),
    (1.0, 0.0),
    (1.0, -1.0),
    (0.0, -1.0),
    (-1.0, -1.0),
    (-1.0, 0.0),
    (-1.0, 1.0),
];

static RECT_4: [(f64, f64); 4] = [(0.0, 1.0), (1.0, 0.0), (0.0, -1.0), (-1.0, 0.0)];

/// Ordered `(dy, dx)` sampling positions relative to the center pixel.
///
/// Position `i` feeds bit `i` of the raw code, so the order is part of the
/// code definition.
#[derive(Clone, Debug, PartialEq)]
pub struct NeighborOffsets {
    points: Vec<(f64, f64)>,
}

impl NeighborOffsets {
    pub fn as_slice(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(f64, f64)> {
        self.points.iter()
    }

    /// Per-axis margin `(ceil(max |dy|), ceil(max |dx|))`.
    ///
    /// A center at least this far from every border has all its samples
    /// (including the bilinear support) inside the image.
    pub fn offset(&self) -> (usize, usize) {
        let (my, mx) = self
            .points
            .iter()
            .fold((0.0f64, 0.0f64), |(my, mx), &(dy, dx)| (my.max(dy.abs()), mx.max(dx.abs())));
        (my.ceil() as usize, mx.ceil() as usize)
    }
}

fn snap(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < OFFSET_SNAP_EPSILON {
        // normalizes -0.0
        r + 0.0
    } else {
        v
    }
}

fn check_neighbor_count(neighbor_count: u32) -> Result<()> {
    if neighbor_count == 0 || neighbor_count > MAX_NEIGHBORS {
        return Err(LbpError::config(format!(
            "neighbor count must be in 1..={MAX_NEIGHBORS}, got {neighbor_count}"
        )));
    }
    Ok(())
}

fn rectangular_layout(neighbor_count: u32) -> Result<&'static [(f64, f64)]> {
    match neighbor_count {
        4 => Ok(&RECT_4[..]),
        8 => Ok(&RECT_8[..]),
        n => Err(LbpError::config(format!(
            "rectangular neighborhoods support 4 or 8 neighbors, got {n}"
        ))),
    }
}

/// Sampling offsets of a single-pixel LBP neighborhood.
///
/// Circular: point `i` lies at `(radius_y * sin t, radius_x * cos t)` with
/// `t = 2*pi*i / neighbor_count`. Rectangular: the same directions pushed out
/// to the border of the `radius_y` x `radius_x` box, for 4 or 8 neighbors.
pub fn compute_offsets(
    neighbor_count: u32,
    radius_y: f64,
    radius_x: f64,
    circular: bool,
) -> Result<NeighborOffsets> {
    check_neighbor_count(neighbor_count)?;
    if !(radius_y.is_finite() && radius_x.is_finite() && radius_y > 0.0 && radius_x > 0.0) {
        return Err(LbpError::config(format!(
            "radii must be positive and finite, got ({radius_y}, {radius_x})"
        )));
    }

    let points = if circular {
        let step = 2.0 * PI / f64::from(neighbor_count);
        (0..neighbor_count)
            .map(|i| {
                let theta = step * f64::from(i);
                (snap(radius_y * theta.sin()), snap(radius_x * theta.cos()))
            })
            .collect()
    } else {
        rectangular_layout(neighbor_count)?
            .iter()
            .map(|&(uy, ux)| (snap(radius_y * uy), snap(radius_x * ux)))
            .collect()
    };

    Ok(NeighborOffsets { points })
}

/// Offsets of the neighbor blocks of a multi-block LBP.
///
/// Each offset points from the top-left corner of the center block to the
/// top-left corner of a neighbor block; neighbor blocks are one stride
/// (`block_size - block_overlap`) away in the rectangular layout.
pub fn block_offsets(
    neighbor_count: u32,
    block_size: (u32, u32),
    block_overlap: (u32, u32),
) -> Result<NeighborOffsets> {
    check_neighbor_count(neighbor_count)?;
    let (bh, bw) = block_size;
    let (oh, ow) = block_overlap;
    if bh == 0 || bw == 0 || oh >= bh || ow >= bw {
        return Err(LbpError::config(format!(
            "invalid block geometry: size {bh}x{bw}, overlap {oh}x{ow}"
        )));
    }
    let stride_y = f64::from(bh - oh);
    let stride_x = f64::from(bw - ow);

    let points = rectangular_layout(neighbor_count)?
        .iter()
        .map(|&(uy, ux)| (stride_y * uy + 0.0, stride_x * ux + 0.0))
        .collect();

    Ok(NeighborOffsets { points })
}
