use ndarray::{s, Array1, ArrayView2};
use rayon::prelude::*;
use tracing::debug;

use crate::consts::PARALLEL_BLOCK_THRESHOLD;
use crate::error::{LbpError, Result};
use crate::lbp::config::LbpConfig;
use crate::lbp::operator::LbpOperator;
use crate::sample::{Sample, SampleImage};

/// Local Binary Pattern Histogram Sequences (LBPHS).
///
/// The image is tiled into `block_size` blocks that overlap by `block_overlap`;
/// blocks that would cross the right or bottom border are dropped. Each block
/// is coded on its own by the embedded [`LbpOperator`] and reduced to a label
/// histogram of length [`LbpHistogramOperator::n_bins`].
#[derive(Clone, Debug, PartialEq)]
pub struct LbpHistogramOperator {
    block_size: (usize, usize),
    block_overlap: (usize, usize),
    lbp: LbpOperator,
}

impl LbpHistogramOperator {
    pub fn new(
        block_size: (usize, usize),
        block_overlap: (usize, usize),
        lbp: LbpOperator,
    ) -> Result<Self> {
        let (bh, bw) = block_size;
        let (oh, ow) = block_overlap;
        if bh == 0 || bw == 0 {
            return Err(LbpError::config(format!(
                "histogram block size {bh}x{bw} must be non-zero"
            )));
        }
        if oh >= bh || ow >= bw {
            return Err(LbpError::config(format!(
                "histogram block overlap {oh}x{ow} must be smaller than block size {bh}x{bw}"
            )));
        }
        Ok(Self {
            block_size,
            block_overlap,
            lbp,
        })
    }

    /// Build the embedded operator from `config`.
    pub fn from_config(
        block_size: (usize, usize),
        block_overlap: (usize, usize),
        config: LbpConfig,
    ) -> Result<Self> {
        Self::new(block_size, block_overlap, LbpOperator::new(config)?)
    }

    pub fn lbp(&self) -> &LbpOperator {
        &self.lbp
    }

    pub fn block_size(&self) -> (usize, usize) {
        self.block_size
    }

    pub fn block_overlap(&self) -> (usize, usize) {
        self.block_overlap
    }

    /// Length of every histogram.
    pub fn n_bins(&self) -> usize {
        self.lbp.max_label()
    }

    fn blocks_along(len: usize, block: usize, overlap: usize) -> usize {
        if len < block {
            0
        } else {
            (len - block) / (block - overlap) + 1
        }
    }

    /// (rows, columns) of the block grid for an image of `input_shape`.
    pub fn block_grid(&self, input_shape: (usize, usize)) -> (usize, usize) {
        let (h, w) = input_shape;
        (
            Self::blocks_along(h, self.block_size.0, self.block_overlap.0),
            Self::blocks_along(w, self.block_size.1, self.block_overlap.1),
        )
    }

    pub fn block_count(&self, input_shape: (usize, usize)) -> usize {
        let (ny, nx) = self.block_grid(input_shape);
        ny * nx
    }

    /// Top-left corners of all blocks in raster order.
    pub fn block_origins(&self, input_shape: (usize, usize)) -> Vec<(usize, usize)> {
        let (ny, nx) = self.block_grid(input_shape);
        let sy = self.block_size.0 - self.block_overlap.0;
        let sx = self.block_size.1 - self.block_overlap.1;
        (0..ny)
            .flat_map(|by| (0..nx).map(move |bx| (by * sy, bx * sx)))
            .collect()
    }

    /// One label histogram per block, in raster order.
    pub fn extract<T: Sample>(&self, image: ArrayView2<'_, T>) -> Vec<Array1<u64>> {
        let origins = self.block_origins(image.dim());
        let (bh, bw) = self.block_size;
        debug!(
            blocks = origins.len(),
            bins = self.n_bins(),
            "Extracting LBP histograms"
        );

        let histogram_of = |&(y, x): &(usize, usize)| {
            let block = image.slice(s![y..y + bh, x..x + bw]);
            let codes = self.lbp.extract_allocating(block, false);
            let mut hist = Array1::<u64>::zeros(self.n_bins());
            for &c in codes.iter() {
                hist[c as usize] += 1;
            }
            hist
        };

        if origins.len() >= PARALLEL_BLOCK_THRESHOLD {
            origins.par_iter().map(histogram_of).collect()
        } else {
            origins.iter().map(histogram_of).collect()
        }
    }

    pub fn extract_image(&self, image: &SampleImage) -> Vec<Array1<u64>> {
        match image {
            SampleImage::U8(a) => self.extract(a.view()),
            SampleImage::U16(a) => self.extract(a.view()),
            SampleImage::F64(a) => self.extract(a.view()),
        }
    }
}
