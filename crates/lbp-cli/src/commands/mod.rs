pub mod config;
pub mod extract;
pub mod histogram;
pub mod info;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use lbp_core::lbp::{BorderHandling, EncodingType, LbpConfig};

use self::config::CliConfig;

#[derive(Clone, Copy, ValueEnum)]
pub enum EncodingArg {
    Regular,
    Transitional,
    DirectionCoded,
}

impl From<EncodingArg> for EncodingType {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Regular => EncodingType::Regular,
            EncodingArg::Transitional => EncodingType::Transitional,
            EncodingArg::DirectionCoded => EncodingType::DirectionCoded,
        }
    }
}

/// Parse `HxW` (or a single `N` for a square) into (height, width).
pub fn parse_pair(s: &str) -> std::result::Result<(u32, u32), String> {
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid size '{v}': {e}"))
    };
    match s.split_once(['x', 'X']) {
        Some((h, w)) => Ok((parse(h)?, parse(w)?)),
        None => {
            let n = parse(s)?;
            Ok((n, n))
        }
    }
}

/// Operator options shared by every command that builds an LBP operator.
///
/// A `--config` file is read first; flags given on the command line then
/// override its `[lbp]` section. Switches (`--circular`, `--uniform`,
/// `--wrap`, ...) can only turn an option on: a feature enabled in the config
/// file stays enabled, and is turned off by editing the file.
#[derive(Args)]
pub struct OperatorArgs {
    /// LBP config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of sampled neighbors
    #[arg(short = 'n', long)]
    pub neighbors: Option<u32>,

    /// Sampling radius (the vertical one when --radius-x is given)
    #[arg(short, long)]
    pub radius: Option<f64>,

    /// Separate horizontal radius (elliptical neighborhoods)
    #[arg(long)]
    pub radius_x: Option<f64>,

    /// Sample on an ellipse instead of a rectangle
    #[arg(long)]
    pub circular: bool,

    /// Compare neighbors to their mean instead of the center
    #[arg(long)]
    pub to_average: bool,

    /// Append a center-versus-mean bit
    #[arg(long)]
    pub average_bit: bool,

    /// Keep only uniform patterns
    #[arg(long)]
    pub uniform: bool,

    /// Merge rotations of the same pattern
    #[arg(long)]
    pub rotation_invariant: bool,

    /// Comparison scheme
    #[arg(long, value_enum)]
    pub encoding: Option<EncodingArg>,

    /// Wrap around at image borders instead of shrinking the output
    #[arg(long)]
    pub wrap: bool,

    /// Multi-block mode with blocks of HxW pixels
    #[arg(long, value_parser = parse_pair)]
    pub block: Option<(u32, u32)>,

    /// Overlap of neighboring blocks in multi-block mode (HxW)
    #[arg(long, value_parser = parse_pair)]
    pub block_overlap: Option<(u32, u32)>,
}

impl OperatorArgs {
    /// Configuration file contents with the command-line overrides applied.
    pub fn resolve(&self) -> Result<CliConfig> {
        let mut config = match self.config {
            Some(ref path) => CliConfig::load(path)?,
            None => CliConfig::default(),
        };

        self.apply(&mut config.lbp);
        Ok(config)
    }

    /// Overlay the command-line options onto `lbp`.
    pub fn apply(&self, lbp: &mut LbpConfig) {
        if let Some(n) = self.neighbors {
            lbp.neighbor_count = n;
        }
        if let Some(r) = self.radius {
            lbp.radius_y = r;
            lbp.radius_x = r;
        }
        if let Some(rx) = self.radius_x {
            lbp.radius_x = rx;
        }
        lbp.circular |= self.circular;
        lbp.to_average |= self.to_average;
        lbp.add_average_bit |= self.average_bit;
        lbp.uniform |= self.uniform;
        lbp.rotation_invariant |= self.rotation_invariant;
        if let Some(encoding) = self.encoding {
            lbp.encoding = encoding.into();
        }
        if self.wrap {
            lbp.border_handling = BorderHandling::Wrap;
        }
        if let Some(block) = self.block {
            lbp.block_size = block;
        }
        if let Some(overlap) = self.block_overlap {
            lbp.block_overlap = overlap;
        }
    }
}
