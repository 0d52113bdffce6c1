/// Minimum output pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Minimum block count to extract LBPHS histograms in parallel.
pub const PARALLEL_BLOCK_THRESHOLD: usize = 16;

/// Largest supported neighbor count. Lookup tables hold at most
/// `2^(MAX_NEIGHBORS + 1)` entries.
pub const MAX_NEIGHBORS: u32 = 16;

/// Number of distinct labels representable by a `u16` code.
pub const MAX_LABEL_COUNT: usize = 1 << 16;

/// Offset components closer than this to an integer are snapped onto the grid,
/// so `sin(pi)` and friends do not trigger needless interpolation.
pub const OFFSET_SNAP_EPSILON: f64 = 1e-10;

/// Interpolation weights below this are treated as zero and the
/// corresponding pixel is not read.
pub const WEIGHT_EPSILON: f64 = 1e-12;

/// Default neighbor count of a freshly constructed operator.
pub const DEFAULT_NEIGHBORS: u32 = 8;

/// Default sampling radius of a freshly constructed operator.
pub const DEFAULT_RADIUS: f64 = 1.0;
