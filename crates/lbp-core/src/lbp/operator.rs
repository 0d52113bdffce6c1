use ndarray::parallel::prelude::*;
use ndarray::{Array2, ArrayView2, ArrayViewMut2, Axis};
use num_traits::AsPrimitive;
use tracing::debug;

use crate::consts::{MAX_NEIGHBORS, PARALLEL_PIXEL_THRESHOLD, WEIGHT_EPSILON};
use crate::error::{LbpError, Result};
use crate::lbp::config::{BorderHandling, EncodingType, LbpConfig};
use crate::lbp::geometry::{block_offsets, compute_offsets, NeighborOffsets};
use crate::lbp::table::LookupTable;
use crate::sample::{Sample, SampleImage};

/// Bilinear sampling plan of one neighbor: the top-left support pixel
/// relative to the center and the fractional weights towards the next
/// row/column.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SamplePoint {
    y0: isize,
    x0: isize,
    fy: f64,
    fx: f64,
}

impl SamplePoint {
    fn new(dy: f64, dx: f64) -> Self {
        let y0 = dy.floor();
        let x0 = dx.floor();
        Self {
            y0: y0 as isize,
            x0: x0 as isize,
            fy: dy - y0,
            fx: dx - x0,
        }
    }
}

/// Distance from each border to the first valid center, in logical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Margins {
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
}

/// Pixel access on a (possibly integral) image, with wrap-around when the
/// operator wraps at the borders.
///
/// Coordinates are logical: for an integral image of shape `(H+1, W+1)` the
/// logical image is the `(H, W)` source it was summed from.
#[derive(Clone, Copy)]
pub(crate) struct Sampler<'a, T> {
    image: ArrayView2<'a, T>,
    height: usize,
    width: usize,
    integral: bool,
    wrap: bool,
}

impl<'a, T: Sample> Sampler<'a, T> {
    fn new(image: ArrayView2<'a, T>, integral: bool, wrap: bool) -> Self {
        let (h, w) = logical_dim(image.dim(), integral);
        Self {
            image,
            height: h,
            width: w,
            integral,
            wrap,
        }
    }

    #[inline]
    fn raw(&self, y: usize, x: usize) -> f64 {
        self.image[[y, x]].as_()
    }

    #[inline]
    fn resolve(&self, y: isize, x: isize) -> (usize, usize) {
        if self.wrap {
            (
                y.rem_euclid(self.height as isize) as usize,
                x.rem_euclid(self.width as isize) as usize,
            )
        } else {
            (y as usize, x as usize)
        }
    }

    #[inline]
    fn pixel(&self, y: isize, x: isize) -> f64 {
        let (y, x) = self.resolve(y, x);
        if self.integral {
            self.raw(y + 1, x + 1) - self.raw(y, x + 1) - self.raw(y + 1, x) + self.raw(y, x)
        } else {
            self.raw(y, x)
        }
    }

    /// Bilinear interpolation at `(cy + p.y0 + p.fy, cx + p.x0 + p.fx)`.
    /// Support pixels with zero weight are not read.
    #[inline]
    fn interpolate(&self, cy: isize, cx: isize, p: &SamplePoint) -> f64 {
        let y = cy + p.y0;
        let x = cx + p.x0;
        let mut acc = 0.0;
        for (dy, wy) in [(0, 1.0 - p.fy), (1, p.fy)] {
            if wy < WEIGHT_EPSILON {
                continue;
            }
            for (dx, wx) in [(0, 1.0 - p.fx), (1, p.fx)] {
                if wx < WEIGHT_EPSILON {
                    continue;
                }
                acc += wy * wx * self.pixel(y + dy, x + dx);
            }
        }
        acc
    }

    /// Mean of the `bh` x `bw` block whose top-left corner is `(y, x)`.
    fn block_mean(&self, y: isize, x: isize, bh: usize, bw: usize) -> f64 {
        let inside = y >= 0
            && x >= 0
            && y as usize + bh <= self.height
            && x as usize + bw <= self.width;
        let sum = if self.integral && inside {
            let (t, l) = (y as usize, x as usize);
            let (b, r) = (t + bh, l + bw);
            self.raw(b, r) - self.raw(t, r) - self.raw(b, l) + self.raw(t, l)
        } else {
            let mut s = 0.0;
            for dy in 0..bh as isize {
                for dx in 0..bw as isize {
                    s += self.pixel(y + dy, x + dx);
                }
            }
            s
        };
        sum / (bh * bw) as f64
    }
}

fn logical_dim(shape: (usize, usize), integral: bool) -> (usize, usize) {
    if integral {
        (shape.0.saturating_sub(1), shape.1.saturating_sub(1))
    } else {
        shape
    }
}

/// Local Binary Pattern extractor.
///
/// Owns an [`LbpConfig`] plus the neighbor offsets and lookup table derived
/// from it. Every configuration change goes through [`LbpOperator::reconfigure`],
/// which builds the new derived state completely before replacing the old one:
/// a rejected change leaves the operator untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct LbpOperator {
    config: LbpConfig,
    offsets: NeighborOffsets,
    points: Vec<SamplePoint>,
    table: LookupTable,
}

struct Derived {
    offsets: NeighborOffsets,
    points: Vec<SamplePoint>,
    table: LookupTable,
}

impl LbpOperator {
    pub fn new(config: LbpConfig) -> Result<Self> {
        let d = Self::derive(&config)?;
        Ok(Self {
            config,
            offsets: d.offsets,
            points: d.points,
            table: d.table,
        })
    }

    fn derive(config: &LbpConfig) -> Result<Derived> {
        config.validate()?;
        let offsets = if config.is_multi_block() {
            block_offsets(config.neighbor_count, config.block_size, config.block_overlap)?
        } else {
            compute_offsets(
                config.neighbor_count,
                config.radius_y,
                config.radius_x,
                config.circular,
            )?
        };
        let points = offsets.iter().map(|&(dy, dx)| SamplePoint::new(dy, dx)).collect();
        let table = LookupTable::for_config(config)?;

        debug!(
            neighbors = config.neighbor_count,
            circular = config.circular,
            multi_block = config.is_multi_block(),
            encoding = %config.encoding,
            max_label = table.max_label(),
            "LBP operator configured"
        );

        Ok(Derived {
            offsets,
            points,
            table,
        })
    }

    /// Install a new configuration, rebuilding offsets and lookup table.
    pub fn reconfigure(&mut self, config: LbpConfig) -> Result<()> {
        let d = Self::derive(&config)?;
        self.config = config;
        self.offsets = d.offsets;
        self.points = d.points;
        self.table = d.table;
        Ok(())
    }

    fn update(&mut self, f: impl FnOnce(&mut LbpConfig)) -> Result<()> {
        let mut config = self.config.clone();
        f(&mut config);
        self.reconfigure(config)
    }

    // -----------------------------------------------------------------------
    // Configuration accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &LbpConfig {
        &self.config
    }

    pub fn neighbor_count(&self) -> u32 {
        self.config.neighbor_count
    }

    /// Single radius; the vertical one when the radii differ.
    pub fn radius(&self) -> f64 {
        self.config.radius_y
    }

    /// (radius_y, radius_x)
    pub fn radii(&self) -> (f64, f64) {
        (self.config.radius_y, self.config.radius_x)
    }

    pub fn block_size(&self) -> (u32, u32) {
        self.config.block_size
    }

    pub fn block_overlap(&self) -> (u32, u32) {
        self.config.block_overlap
    }

    pub fn is_multi_block(&self) -> bool {
        self.config.is_multi_block()
    }

    pub fn border_handling(&self) -> BorderHandling {
        self.config.border_handling
    }

    /// Number of distinct labels this operator can produce.
    pub fn max_label(&self) -> usize {
        self.table.max_label()
    }

    pub fn lookup_table(&self) -> &LookupTable {
        &self.table
    }

    /// Sampling positions relative to the center pixel (multi-block: relative
    /// to the top-left corner of the center block).
    pub fn relative_positions(&self) -> &NeighborOffsets {
        &self.offsets
    }

    /// First valid center `(y, x)` under [`BorderHandling::Shrink`].
    pub fn offset(&self) -> (usize, usize) {
        self.offsets.offset()
    }

    // -----------------------------------------------------------------------
    // Setters; each one rebuilds the derived state
    // -----------------------------------------------------------------------

    pub fn set_neighbor_count(&mut self, neighbor_count: u32) -> Result<()> {
        self.update(|c| c.neighbor_count = neighbor_count)
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<()> {
        self.set_radii(radius, radius)
    }

    pub fn set_radii(&mut self, radius_y: f64, radius_x: f64) -> Result<()> {
        self.update(|c| {
            c.radius_y = radius_y;
            c.radius_x = radius_x;
        })
    }

    pub fn set_circular(&mut self, circular: bool) -> Result<()> {
        self.update(|c| c.circular = circular)
    }

    pub fn set_to_average(&mut self, to_average: bool) -> Result<()> {
        self.update(|c| c.to_average = to_average)
    }

    pub fn set_add_average_bit(&mut self, add_average_bit: bool) -> Result<()> {
        self.update(|c| c.add_average_bit = add_average_bit)
    }

    pub fn set_uniform(&mut self, uniform: bool) -> Result<()> {
        self.update(|c| c.uniform = uniform)
    }

    pub fn set_rotation_invariant(&mut self, rotation_invariant: bool) -> Result<()> {
        self.update(|c| c.rotation_invariant = rotation_invariant)
    }

    pub fn set_encoding(&mut self, encoding: EncodingType) -> Result<()> {
        self.update(|c| c.encoding = encoding)
    }

    pub fn set_border_handling(&mut self, border_handling: BorderHandling) -> Result<()> {
        self.update(|c| c.border_handling = border_handling)
    }

    pub fn set_block_size(&mut self, block_size: (u32, u32)) -> Result<()> {
        self.update(|c| c.block_size = block_size)
    }

    pub fn set_block_overlap(&mut self, block_overlap: (u32, u32)) -> Result<()> {
        self.update(|c| c.block_overlap = block_overlap)
    }

    /// Change block size and overlap together, so that shrinking the block
    /// below the current overlap is possible in one step.
    pub fn set_block_size_and_overlap(
        &mut self,
        block_size: (u32, u32),
        block_overlap: (u32, u32),
    ) -> Result<()> {
        self.update(|c| {
            c.block_size = block_size;
            c.block_overlap = block_overlap;
        })
    }

    /// Replace the lookup table with a custom one for the current code width.
    ///
    /// The table lasts until the next configuration change, which rebuilds
    /// it from the config.
    pub fn set_lookup_table(&mut self, labels: Vec<u16>) -> Result<()> {
        let table = LookupTable::from_labels(labels, self.config.code_bits())?;
        debug!(max_label = table.max_label(), "Custom LBP lookup table installed");
        self.table = table;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Geometry
    // -----------------------------------------------------------------------

    pub(crate) fn margins(&self) -> Margins {
        if self.config.border_handling == BorderHandling::Wrap {
            return Margins::default();
        }
        if self.config.is_multi_block() {
            let (sy, sx) = self.offsets.offset();
            let (bh, bw) = self.block_dims();
            Margins {
                top: sy,
                left: sx,
                bottom: sy + bh - 1,
                right: sx + bw - 1,
            }
        } else {
            let (oy, ox) = self.offsets.offset();
            Margins {
                top: oy,
                left: ox,
                bottom: oy,
                right: ox,
            }
        }
    }

    fn block_dims(&self) -> (usize, usize) {
        let (bh, bw) = self.config.block_size;
        (bh as usize, bw as usize)
    }

    /// Shape of the code image for an input of `input_shape`.
    ///
    /// Under `Shrink` every border loses its margin (single-pixel mode:
    /// `offset` on each side; multi-block: `3*block - 2*overlap - 1` in total).
    /// Under `Wrap` the output keeps the logical input shape. An integral image
    /// is one row and column larger than the image it sums.
    pub fn output_shape(
        &self,
        input_shape: (usize, usize),
        is_integral_image: bool,
    ) -> (usize, usize) {
        let (h, w) = logical_dim(input_shape, is_integral_image);
        let m = self.margins();
        (
            h.saturating_sub(m.top + m.bottom),
            w.saturating_sub(m.left + m.right),
        )
    }

    /// [`LbpOperator::output_shape`] of a concrete image.
    pub fn output_shape_of<T: Sample>(
        &self,
        image: ArrayView2<'_, T>,
        is_integral_image: bool,
    ) -> (usize, usize) {
        self.output_shape(image.dim(), is_integral_image)
    }

    // -----------------------------------------------------------------------
    // Extraction
    // -----------------------------------------------------------------------

    pub(crate) fn sampler<'a, T: Sample>(
        &self,
        image: ArrayView2<'a, T>,
        integral: bool,
    ) -> Sampler<'a, T> {
        Sampler::new(image, integral, self.config.border_handling == BorderHandling::Wrap)
    }

    /// Code of the center at logical `(y, x)`, without any bounds checks.
    pub(crate) fn code_at<T: Sample>(&self, sampler: &Sampler<'_, T>, y: usize, x: usize) -> u16 {
        let n = self.points.len();
        let mut buf = [0.0f64; MAX_NEIGHBORS as usize];
        let samples = &mut buf[..n];
        let (cy, cx) = (y as isize, x as isize);

        let center = if self.config.is_multi_block() {
            let (bh, bw) = self.block_dims();
            for (s, p) in samples.iter_mut().zip(&self.points) {
                *s = sampler.block_mean(cy + p.y0, cx + p.x0, bh, bw);
            }
            sampler.block_mean(cy, cx, bh, bw)
        } else {
            for (s, p) in samples.iter_mut().zip(&self.points) {
                *s = sampler.interpolate(cy, cx, p);
            }
            sampler.pixel(cy, cx)
        };

        self.table.label(self.raw_code(center, samples))
    }

    /// Raw comparison vector of one neighborhood. Bit `i` belongs to sample
    /// `i`; the average bit, if any, is bit `n`.
    fn raw_code(&self, center: f64, samples: &[f64]) -> usize {
        let n = samples.len();
        let c = &self.config;
        let mean = if c.to_average || c.add_average_bit {
            samples.iter().sum::<f64>() / n as f64
        } else {
            center
        };
        let reference = if c.to_average { mean } else { center };

        let mut code = 0usize;
        match c.encoding {
            EncodingType::Regular => {
                for (i, &s) in samples.iter().enumerate() {
                    code |= usize::from(s >= reference) << i;
                }
            }
            EncodingType::Transitional => {
                for i in 0..n {
                    code |= usize::from(samples[i] >= samples[(i + 1) % n]) << i;
                }
            }
            EncodingType::DirectionCoded => {
                let half = n / 2;
                for k in 0..half {
                    let a = samples[k] - reference;
                    let b = samples[k + half] - reference;
                    code |= usize::from(a * b >= 0.0) << (2 * k);
                    code |= usize::from(a.abs() >= b.abs()) << (2 * k + 1);
                }
            }
        }
        if c.add_average_bit {
            code |= usize::from(center >= mean) << n;
        }
        code
    }

    fn check_position(&self, logical: (usize, usize), y: usize, x: usize) -> Result<()> {
        let (h, w) = logical;
        let m = self.margins();
        let valid = y >= m.top && x >= m.left && y + m.bottom < h && x + m.right < w;
        if valid {
            Ok(())
        } else {
            Err(LbpError::InvalidPosition {
                y,
                x,
                height: h,
                width: w,
            })
        }
    }

    /// Code of the center at `(y, x)` (multi-block: top-left corner of the
    /// center block).
    ///
    /// Fails with [`LbpError::InvalidPosition`] when the neighborhood is not
    /// fully inside the image under `Shrink`, or the position is outside the
    /// image under `Wrap`.
    pub fn extract_at<T: Sample>(
        &self,
        image: ArrayView2<'_, T>,
        y: usize,
        x: usize,
        is_integral_image: bool,
    ) -> Result<u16> {
        self.check_position(logical_dim(image.dim(), is_integral_image), y, x)?;
        Ok(self.extract_at_unvalidated(image, y, x, is_integral_image))
    }

    /// [`LbpOperator::extract_at`] without the position check.
    ///
    /// The caller guarantees `(y, x)` is valid; an invalid position panics on
    /// out-of-bounds indexing or yields a meaningless code.
    pub fn extract_at_unvalidated<T: Sample>(
        &self,
        image: ArrayView2<'_, T>,
        y: usize,
        x: usize,
        is_integral_image: bool,
    ) -> u16 {
        let sampler = self.sampler(image, is_integral_image);
        self.code_at(&sampler, y, x)
    }

    /// Code every valid center of `image` into `output`.
    ///
    /// `output` must have exactly [`LbpOperator::output_shape`]; this is
    /// checked before anything is written. Output `(i, j)` is the code of the
    /// logical center `(i + offset.0, j + offset.1)` (`(i, j)` under `Wrap`).
    pub fn extract<T: Sample>(
        &self,
        image: ArrayView2<'_, T>,
        output: ArrayViewMut2<'_, u16>,
        is_integral_image: bool,
    ) -> Result<()> {
        let expected = self.output_shape(image.dim(), is_integral_image);
        if output.dim() != expected {
            return Err(LbpError::ShapeMismatch {
                what: "LBP output",
                expected: vec![expected.0, expected.1],
                actual: vec![output.nrows(), output.ncols()],
            });
        }
        self.extract_unvalidated(image, output, is_integral_image);
        Ok(())
    }

    /// [`LbpOperator::extract`] without the shape check.
    ///
    /// The caller guarantees `output` has [`LbpOperator::output_shape`]; a
    /// larger output panics on out-of-bounds indexing, a smaller one is only
    /// partially filled.
    pub fn extract_unvalidated<T: Sample>(
        &self,
        image: ArrayView2<'_, T>,
        mut output: ArrayViewMut2<'_, u16>,
        is_integral_image: bool,
    ) {
        let sampler = self.sampler(image, is_integral_image);
        let m = self.margins();
        let fill_row = |i: usize, mut row: ndarray::ArrayViewMut1<'_, u16>| {
            for (j, out) in row.iter_mut().enumerate() {
                *out = self.code_at(&sampler, i + m.top, j + m.left);
            }
        };

        if output.len() >= PARALLEL_PIXEL_THRESHOLD {
            output
                .axis_iter_mut(Axis(0))
                .into_par_iter()
                .enumerate()
                .for_each(|(i, row)| fill_row(i, row));
        } else {
            for (i, row) in output.axis_iter_mut(Axis(0)).enumerate() {
                fill_row(i, row);
            }
        }
    }

    /// Code every valid center of `image` into a freshly allocated array.
    pub fn extract_allocating<T: Sample>(
        &self,
        image: ArrayView2<'_, T>,
        is_integral_image: bool,
    ) -> Array2<u16> {
        let mut output = Array2::<u16>::zeros(self.output_shape(image.dim(), is_integral_image));
        self.extract_unvalidated(image, output.view_mut(), is_integral_image);
        output
    }

    // -----------------------------------------------------------------------
    // Runtime-typed images
    // -----------------------------------------------------------------------

    pub fn extract_image(&self, image: &SampleImage, is_integral_image: bool) -> Array2<u16> {
        match image {
            SampleImage::U8(a) => self.extract_allocating(a.view(), is_integral_image),
            SampleImage::U16(a) => self.extract_allocating(a.view(), is_integral_image),
            SampleImage::F64(a) => self.extract_allocating(a.view(), is_integral_image),
        }
    }

    pub fn extract_image_into(
        &self,
        image: &SampleImage,
        output: ArrayViewMut2<'_, u16>,
        is_integral_image: bool,
    ) -> Result<()> {
        match image {
            SampleImage::U8(a) => self.extract(a.view(), output, is_integral_image),
            SampleImage::U16(a) => self.extract(a.view(), output, is_integral_image),
            SampleImage::F64(a) => self.extract(a.view(), output, is_integral_image),
        }
    }

    pub fn extract_image_at(
        &self,
        image: &SampleImage,
        y: usize,
        x: usize,
        is_integral_image: bool,
    ) -> Result<u16> {
        match image {
            SampleImage::U8(a) => self.extract_at(a.view(), y, x, is_integral_image),
            SampleImage::U16(a) => self.extract_at(a.view(), y, x, is_integral_image),
            SampleImage::F64(a) => self.extract_at(a.view(), y, x, is_integral_image),
        }
    }
}
