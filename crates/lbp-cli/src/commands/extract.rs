use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use lbp_core::io::{load_sample_image, save_codes_png};
use lbp_core::lbp::LbpOperator;
use tracing::info;

use super::OperatorArgs;

#[derive(Args)]
pub struct ExtractArgs {
    /// Input image (8/16-bit grayscale, or color with --grayscale)
    pub file: PathBuf,

    #[command(flatten)]
    pub operator: OperatorArgs,

    /// Convert color or gray+alpha images to grayscale instead of rejecting them
    #[arg(long)]
    pub grayscale: bool,

    /// Output PNG of the code image
    #[arg(short, long, default_value = "codes.png")]
    pub output: PathBuf,
}

pub fn run(args: &ExtractArgs) -> Result<()> {
    let config = args.operator.resolve()?;
    let op = LbpOperator::new(config.lbp).context("Invalid LBP operator")?;

    let image = load_sample_image(&args.file, args.grayscale)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let (h, w) = image.dim();
    let (oh, ow) = op.output_shape((h, w), false);
    if oh == 0 || ow == 0 {
        bail!(
            "{}x{} image is too small for an operator with offset {:?}",
            h,
            w,
            op.offset()
        );
    }

    info!(
        input = %args.file.display(),
        element_type = image.element_type(),
        height = h,
        width = w,
        "Extracting LBP codes"
    );
    let codes = op.extract_image(&image, false);

    save_codes_png(&codes, op.max_label(), &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("Input:   {} ({}x{}, {})", args.file.display(), h, w, image.element_type());
    println!("Codes:   {}x{}, {} labels", oh, ow, op.max_label());
    println!("Output saved to {}", args.output.display());

    Ok(())
}
