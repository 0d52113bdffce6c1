use ndarray::{Array2, Array3, ArrayView2};
use num_traits::AsPrimitive;

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for f64 {}
}

/// Element types an LBP operator can sample: `u8`, `u16` and `f64`.
///
/// Values are widened to `f64` before comparison, which preserves the natural
/// order of every supported type.
pub trait Sample: Copy + Send + Sync + AsPrimitive<f64> + sealed::Sealed {
    /// Short type name used in diagnostics.
    const NAME: &'static str;
}

impl Sample for u8 {
    const NAME: &'static str = "uint8";
}

impl Sample for u16 {
    const NAME: &'static str = "uint16";
}

impl Sample for f64 {
    const NAME: &'static str = "float64";
}

/// A grayscale image whose element type is only known at runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum SampleImage {
    U8(Array2<u8>),
    U16(Array2<u16>),
    F64(Array2<f64>),
}

impl SampleImage {
    /// (height, width)
    pub fn dim(&self) -> (usize, usize) {
        match self {
            SampleImage::U8(a) => a.dim(),
            SampleImage::U16(a) => a.dim(),
            SampleImage::F64(a) => a.dim(),
        }
    }

    pub fn element_type(&self) -> &'static str {
        match self {
            SampleImage::U8(_) => u8::NAME,
            SampleImage::U16(_) => u16::NAME,
            SampleImage::F64(_) => f64::NAME,
        }
    }

    /// Integral image of this image, see [`integral_image`].
    pub fn integral(&self) -> Array2<f64> {
        match self {
            SampleImage::U8(a) => integral_image(a.view()),
            SampleImage::U16(a) => integral_image(a.view()),
            SampleImage::F64(a) => integral_image(a.view()),
        }
    }
}

impl From<Array2<u8>> for SampleImage {
    fn from(a: Array2<u8>) -> Self {
        SampleImage::U8(a)
    }
}

impl From<Array2<u16>> for SampleImage {
    fn from(a: Array2<u16>) -> Self {
        SampleImage::U16(a)
    }
}

impl From<Array2<f64>> for SampleImage {
    fn from(a: Array2<f64>) -> Self {
        SampleImage::F64(a)
    }
}

/// A grayscale (time, height, width) volume whose element type is only known
/// at runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum SampleVolume {
    U8(Array3<u8>),
    U16(Array3<u16>),
    F64(Array3<f64>),
}

impl SampleVolume {
    /// (time, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        match self {
            SampleVolume::U8(a) => a.dim(),
            SampleVolume::U16(a) => a.dim(),
            SampleVolume::F64(a) => a.dim(),
        }
    }

    pub fn element_type(&self) -> &'static str {
        match self {
            SampleVolume::U8(_) => u8::NAME,
            SampleVolume::U16(_) => u16::NAME,
            SampleVolume::F64(_) => f64::NAME,
        }
    }
}

impl From<Array3<u8>> for SampleVolume {
    fn from(a: Array3<u8>) -> Self {
        SampleVolume::U8(a)
    }
}

impl From<Array3<u16>> for SampleVolume {
    fn from(a: Array3<u16>) -> Self {
        SampleVolume::U16(a)
    }
}

impl From<Array3<f64>> for SampleVolume {
    fn from(a: Array3<f64>) -> Self {
        SampleVolume::F64(a)
    }
}

/// Computes the 2D running sum of an image.
///
/// The result is one row and one column larger than the input: `I[y][x]` holds
/// the sum of all pixels strictly above and strictly left of `(y, x)`, so the
/// first row and column are zero. The sum over rows `[t, b)` and columns
/// `[l, r)` is `I[b][r] - I[t][r] - I[b][l] + I[t][l]`.
pub fn integral_image<T: Sample>(image: ArrayView2<'_, T>) -> Array2<f64> {
    let (h, w) = image.dim();
    let mut out = Array2::<f64>::zeros((h + 1, w + 1));
    for row in 0..h {
        let mut row_sum = 0.0f64;
        for col in 0..w {
            row_sum += image[[row, col]].as_();
            out[[row + 1, col + 1]] = out[[row, col + 1]] + row_sum;
        }
    }
    out
}
