use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use lbp_core::io::load_sample_image;
use lbp_core::lbp::LbpOperator;

use super::OperatorArgs;
use crate::summary::print_operator_summary;

#[derive(Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub operator: OperatorArgs,

    /// Image whose output shape should be reported
    #[arg(long)]
    pub image: Option<PathBuf>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let config = args.operator.resolve()?;
    let op = LbpOperator::new(config.lbp).context("Invalid LBP operator")?;

    let input_shape = match args.image {
        Some(ref path) => {
            let image = load_sample_image(path, true)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            Some(image.dim())
        }
        None => None,
    };

    print_operator_summary(&op, input_shape);
    Ok(())
}
