use crate::consts::{MAX_LABEL_COUNT, MAX_NEIGHBORS};
use crate::error::{LbpError, Result};
use crate::lbp::config::{EncodingType, LbpConfig};

/// Mapping from a raw comparison vector to an output label.
///
/// Labels are dense: every value in `0..max_label` is produced by at least one
/// raw code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupTable {
    labels: Vec<u16>,
    max_label: usize,
    bits: u32,
}

/// Rotate the lowest `n` bits of `code` left by `r` positions.
pub fn rotate_left(code: u32, r: u32, n: u32) -> u32 {
    let r = r % n;
    if r == 0 {
        return code;
    }
    let mask = (1u32 << n) - 1;
    ((code << r) | (code >> (n - r))) & mask
}

/// Number of 0/1 changes around the circular `n`-bit pattern.
pub fn transitions(code: u32, n: u32) -> u32 {
    (code ^ rotate_left(code, 1, n)).count_ones()
}

/// Smallest value among all circular rotations of the `n`-bit pattern.
pub fn min_rotation(code: u32, n: u32) -> u32 {
    (1..n).fold(code, |min, r| min.min(rotate_left(code, r, n)))
}

impl LookupTable {
    /// Build the table for `neighbor_count` comparison bits.
    ///
    /// The base table covers `neighbor_count` bits; with `add_average_bit` it is
    /// duplicated and the upper half (average bit set) is offset by the base
    /// label count.
    pub fn build(
        neighbor_count: u32,
        add_average_bit: bool,
        uniform: bool,
        rotation_invariant: bool,
        encoding: EncodingType,
    ) -> Result<Self> {
        let n = neighbor_count;
        if n == 0 || n > MAX_NEIGHBORS {
            return Err(LbpError::config(format!(
                "lookup tables support 1..={MAX_NEIGHBORS} neighbors, got {n}"
            )));
        }
        if encoding == EncodingType::DirectionCoded && n % 2 != 0 {
            return Err(LbpError::config(format!(
                "direction coded LBP needs an even neighbor count, got {n}"
            )));
        }
        // with fewer than 4 bits every pattern is uniform and the non-uniform
        // label would never be produced
        if uniform && n < 4 {
            return Err(LbpError::config(format!(
                "uniform patterns need at least 4 neighbors, got {n}"
            )));
        }

        let (mut labels, base_max) = match (uniform, rotation_invariant) {
            (false, false) => regular_table(n),
            (true, false) => uniform_table(n),
            (false, true) => rotation_invariant_table(n),
            (true, true) => uniform_rotation_invariant_table(n),
        };

        let max_label = if add_average_bit { base_max * 2 } else { base_max };
        if max_label > MAX_LABEL_COUNT {
            return Err(LbpError::config(format!(
                "{max_label} labels do not fit into 16-bit codes"
            )));
        }
        if add_average_bit {
            let upper: Vec<u16> = labels.iter().map(|&l| l + base_max as u16).collect();
            labels.extend(upper);
        }

        Ok(Self {
            labels,
            max_label,
            bits: n + u32::from(add_average_bit),
        })
    }

    /// Build the table an [`LbpConfig`] asks for.
    pub fn for_config(config: &LbpConfig) -> Result<Self> {
        Self::build(
            config.neighbor_count,
            config.add_average_bit,
            config.uniform,
            config.rotation_invariant,
            config.encoding,
        )
    }

    /// Wrap a caller-provided table for `bits`-wide raw codes.
    ///
    /// The table must have exactly `2^bits` entries and its labels must be
    /// dense.
    pub fn from_labels(labels: Vec<u16>, bits: u32) -> Result<Self> {
        if bits == 0 || bits > MAX_NEIGHBORS + 1 {
            return Err(LbpError::config(format!("unsupported code width of {bits} bits")));
        }
        let expected = 1usize << bits;
        if labels.len() != expected {
            return Err(LbpError::config(format!(
                "lookup table for {bits}-bit codes needs {expected} entries, got {}",
                labels.len()
            )));
        }

        let max_label = labels.iter().map(|&l| l as usize + 1).max().unwrap_or(0);
        let mut seen = vec![false; max_label];
        for &l in &labels {
            seen[l as usize] = true;
        }
        if let Some(missing) = seen.iter().position(|s| !s) {
            return Err(LbpError::config(format!(
                "lookup table labels must be dense, label {missing} is never produced"
            )));
        }

        Ok(Self {
            labels,
            max_label,
            bits,
        })
    }

    #[inline]
    pub fn label(&self, code: usize) -> u16 {
        self.labels[code]
    }

    /// Number of distinct output labels.
    pub fn max_label(&self) -> usize {
        self.max_label
    }

    /// Width of the raw codes this table accepts.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.labels
    }
}

fn regular_table(n: u32) -> (Vec<u16>, usize) {
    let size = 1usize << n;
    ((0..size).map(|c| c as u16).collect(), size)
}

/// u2 patterns: all zeros, then every run of `ones` consecutive set bits in
/// each of its `n` rotations, then all ones, then one shared non-uniform label.
fn uniform_table(n: u32) -> (Vec<u16>, usize) {
    let size = 1usize << n;
    let max_label = (n * (n - 1) + 3) as usize;
    let non_uniform = (max_label - 1) as u16;
    let mut labels = vec![non_uniform; size];

    let mut next = 0u16;
    labels[0] = next;
    next += 1;
    for ones in 1..n {
        let run = (1u32 << ones) - 1;
        for r in 0..n {
            labels[rotate_left(run, r, n) as usize] = next;
            next += 1;
        }
    }
    labels[size - 1] = next;

    (labels, max_label)
}

/// Rank of each code's minimal rotation among all minimal rotations.
fn rotation_invariant_table(n: u32) -> (Vec<u16>, usize) {
    let size = 1usize << n;
    let minima: Vec<u32> = (0..size as u32).map(|c| min_rotation(c, n)).collect();

    let mut rank = vec![u16::MAX; size];
    let mut next = 0u16;
    // ascending scan: a minimal rotation is always reached before its class
    // members, since it is the smallest of them
    for c in 0..size {
        let m = minima[c] as usize;
        if m == c {
            rank[c] = next;
            next += 1;
        }
    }

    let labels = minima.iter().map(|&m| rank[m as usize]).collect();
    (labels, next as usize)
}

/// riu2: uniform patterns labeled by their number of set bits, which ranks
/// them by minimal rotation `2^k - 1`; non-uniform patterns share `n + 1`.
fn uniform_rotation_invariant_table(n: u32) -> (Vec<u16>, usize) {
    let size = 1usize << n;
    let labels = (0..size as u32)
        .map(|c| {
            if transitions(c, n) <= 2 {
                c.count_ones() as u16
            } else {
                (n + 1) as u16
            }
        })
        .collect();
    (labels, (n + 2) as usize)
}
