use ndarray::{s, Array3, ArrayView3, ArrayViewMut3, Axis};
use tracing::debug;

use crate::error::{LbpError, Result};
use crate::lbp::operator::LbpOperator;
use crate::sample::{Sample, SampleVolume};

/// The three code volumes of an LBP-TOP extraction, each shaped
/// (time, height, width) over the common valid region.
#[derive(Clone, Debug, PartialEq)]
pub struct TopCodes {
    pub xy: Array3<u16>,
    pub xt: Array3<u16>,
    pub yt: Array3<u16>,
}

/// LBP on Three Orthogonal Planes of a (time, height, width) volume.
///
/// - `xy` codes the (height, width) frame at a fixed time,
/// - `xt` codes the (time, width) slice at a fixed row,
/// - `yt` codes the (time, height) slice at a fixed column.
///
/// In both temporal planes the operator's vertical axis is time. All three
/// codes of one output element share the same center voxel.
#[derive(Clone, Debug, PartialEq)]
pub struct LbpTopOperator {
    xy: LbpOperator,
    xt: LbpOperator,
    yt: LbpOperator,
}

impl LbpTopOperator {
    pub fn new(xy: LbpOperator, xt: LbpOperator, yt: LbpOperator) -> Result<Self> {
        for (plane, op) in [("xy", &xy), ("xt", &xt), ("yt", &yt)] {
            if op.is_multi_block() {
                return Err(LbpError::config(format!(
                    "LBP-TOP {plane} plane cannot use a multi-block operator"
                )));
            }
        }
        Ok(Self { xy, xt, yt })
    }

    pub fn xy(&self) -> &LbpOperator {
        &self.xy
    }

    pub fn xt(&self) -> &LbpOperator {
        &self.xt
    }

    pub fn yt(&self) -> &LbpOperator {
        &self.yt
    }

    /// (time, row, column) margin of the region where all three planes have a
    /// valid center.
    pub fn margins(&self) -> (usize, usize, usize) {
        let xy = self.xy.margins();
        let xt = self.xt.margins();
        let yt = self.yt.margins();
        (
            xt.top.max(yt.top),
            xy.top.max(yt.left),
            xy.left.max(xt.left),
        )
    }

    /// Shape shared by the three output volumes.
    pub fn output_shape(&self, volume_shape: (usize, usize, usize)) -> (usize, usize, usize) {
        let (t, h, w) = volume_shape;
        let (mt, my, mx) = self.margins();
        (
            t.saturating_sub(2 * mt),
            h.saturating_sub(2 * my),
            w.saturating_sub(2 * mx),
        )
    }

    /// Code every center of the common valid region on all three planes.
    ///
    /// Each output must have [`LbpTopOperator::output_shape`]; all three are
    /// checked before anything is written.
    pub fn extract<T: Sample>(
        &self,
        volume: ArrayView3<'_, T>,
        mut out_xy: ArrayViewMut3<'_, u16>,
        mut out_xt: ArrayViewMut3<'_, u16>,
        mut out_yt: ArrayViewMut3<'_, u16>,
    ) -> Result<()> {
        let expected = self.output_shape(volume.dim());
        for (what, dim) in [
            ("LBP-TOP xy output", out_xy.dim()),
            ("LBP-TOP xt output", out_xt.dim()),
            ("LBP-TOP yt output", out_yt.dim()),
        ] {
            if dim != expected {
                return Err(LbpError::ShapeMismatch {
                    what,
                    expected: vec![expected.0, expected.1, expected.2],
                    actual: vec![dim.0, dim.1, dim.2],
                });
            }
        }

        let margins = self.margins();
        debug!(
            shape = ?volume.dim(),
            output = ?expected,
            "Extracting LBP-TOP codes"
        );

        rayon::join(
            || self.fill_xy(volume, margins, &mut out_xy),
            || {
                rayon::join(
                    || self.fill_xt(volume, margins, &mut out_xt),
                    || self.fill_yt(volume, margins, &mut out_yt),
                )
            },
        );
        Ok(())
    }

    /// [`LbpTopOperator::extract`] into freshly allocated volumes.
    pub fn extract_allocating<T: Sample>(&self, volume: ArrayView3<'_, T>) -> TopCodes {
        let shape = self.output_shape(volume.dim());
        let mut codes = TopCodes {
            xy: Array3::zeros(shape),
            xt: Array3::zeros(shape),
            yt: Array3::zeros(shape),
        };
        let margins = self.margins();
        rayon::join(
            || self.fill_xy(volume, margins, &mut codes.xy.view_mut()),
            || {
                rayon::join(
                    || self.fill_xt(volume, margins, &mut codes.xt.view_mut()),
                    || self.fill_yt(volume, margins, &mut codes.yt.view_mut()),
                )
            },
        );
        codes
    }

    pub fn extract_volume(&self, volume: &SampleVolume) -> TopCodes {
        match volume {
            SampleVolume::U8(a) => self.extract_allocating(a.view()),
            SampleVolume::U16(a) => self.extract_allocating(a.view()),
            SampleVolume::F64(a) => self.extract_allocating(a.view()),
        }
    }

    fn fill_xy<T: Sample>(
        &self,
        volume: ArrayView3<'_, T>,
        (mt, my, mx): (usize, usize, usize),
        out: &mut ArrayViewMut3<'_, u16>,
    ) {
        for (i, mut plane) in out.axis_iter_mut(Axis(0)).enumerate() {
            let frame = volume.index_axis(Axis(0), i + mt);
            let sampler = self.xy.sampler(frame, false);
            for ((j, k), code) in plane.indexed_iter_mut() {
                *code = self.xy.code_at(&sampler, j + my, k + mx);
            }
        }
    }

    fn fill_xt<T: Sample>(
        &self,
        volume: ArrayView3<'_, T>,
        (mt, my, mx): (usize, usize, usize),
        out: &mut ArrayViewMut3<'_, u16>,
    ) {
        for (j, mut plane) in out.axis_iter_mut(Axis(1)).enumerate() {
            let slice = volume.slice(s![.., j + my, ..]);
            let sampler = self.xt.sampler(slice, false);
            for ((i, k), code) in plane.indexed_iter_mut() {
                *code = self.xt.code_at(&sampler, i + mt, k + mx);
            }
        }
    }

    fn fill_yt<T: Sample>(
        &self,
        volume: ArrayView3<'_, T>,
        (mt, my, mx): (usize, usize, usize),
        out: &mut ArrayViewMut3<'_, u16>,
    ) {
        for (k, mut plane) in out.axis_iter_mut(Axis(2)).enumerate() {
            let slice = volume.slice(s![.., .., k + mx]);
            let sampler = self.yt.sampler(slice, false);
            for ((i, j), code) in plane.indexed_iter_mut() {
                *code = self.yt.code_at(&sampler, i + mt, j + my);
            }
        }
    }
}
