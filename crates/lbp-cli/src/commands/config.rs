use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use lbp_core::lbp::LbpConfig;
use serde::{Deserialize, Serialize};

/// Block tiling of the `histogram` command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramConfig {
    /// (height, width) of one histogram block.
    pub block_size: (usize, usize),
    /// (height, width) overlap of neighboring blocks.
    pub block_overlap: (usize, usize),
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            block_size: (16, 16),
            block_overlap: (0, 0),
        }
    }
}

/// Contents of a `--config` TOML file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub lbp: LbpConfig,
    pub histogram: HistogramConfig,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Invalid LBP config {}", path.display()))
    }
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save the default configuration as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let toml_str = toml::to_string_pretty(&CliConfig::default())?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
