use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use lbp_core::io::load_sample_image;
use lbp_core::lbp::{LbpHistogramOperator, LbpOperator};
use rayon::prelude::*;
use tracing::{debug, info};

use super::{parse_pair, OperatorArgs};
use crate::summary::print_histogram_summary;

#[derive(Args)]
pub struct HistogramArgs {
    /// Input images
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub operator: OperatorArgs,

    /// Histogram block size (HxW), overrides the config file
    #[arg(long, value_parser = parse_pair)]
    pub hist_block: Option<(u32, u32)>,

    /// Overlap of histogram blocks (HxW), overrides the config file
    #[arg(long, value_parser = parse_pair)]
    pub hist_overlap: Option<(u32, u32)>,

    /// Convert color or gray+alpha images to grayscale instead of rejecting them
    #[arg(long)]
    pub grayscale: bool,

    /// Write CSV to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

struct FileHistograms<'a> {
    path: &'a Path,
    origins: Vec<(usize, usize)>,
    counts: Vec<Vec<u64>>,
}

pub fn run(args: &HistogramArgs) -> Result<()> {
    let mut config = args.operator.resolve()?;
    if let Some((h, w)) = args.hist_block {
        config.histogram.block_size = (h as usize, w as usize);
    }
    if let Some((h, w)) = args.hist_overlap {
        config.histogram.block_overlap = (h as usize, w as usize);
    }

    let op = LbpOperator::new(config.lbp).context("Invalid LBP operator")?;
    let hist = LbpHistogramOperator::new(
        config.histogram.block_size,
        config.histogram.block_overlap,
        op,
    )
    .context("Invalid histogram blocks")?;

    if args.output.is_some() {
        print_histogram_summary(&hist, args.files.len());
    }

    let pb = ProgressBar::new(args.files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Computing histograms");

    let results = args
        .files
        .par_iter()
        .map(|path| {
            let image = load_sample_image(path, args.grayscale)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            let origins = hist.block_origins(image.dim());
            let counts = hist
                .extract_image(&image)
                .into_iter()
                .map(|h| h.to_vec())
                .collect();
            debug!(file = %path.display(), blocks = origins.len(), "Histograms done");
            pb.inc(1);
            Ok(FileHistograms {
                path,
                origins,
                counts,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    pb.finish_with_message("Done");

    let blocks: usize = results.iter().map(|r| r.counts.len()).sum();
    info!(files = results.len(), blocks, "Writing histograms");

    match args.output {
        Some(ref path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_csv(BufWriter::new(file), hist.n_bins(), &results)?;
            println!("\n{} histograms saved to {}", blocks, path.display());
        }
        None => write_csv(BufWriter::new(io::stdout().lock()), hist.n_bins(), &results)?,
    }

    Ok(())
}

/// One row per block: file, block index, block origin, then all bin counts.
fn write_csv<W: Write>(
    mut out: W,
    n_bins: usize,
    results: &[FileHistograms<'_>],
) -> Result<()> {
    write!(out, "file,block,y,x")?;
    for bin in 0..n_bins {
        write!(out, ",bin{bin}")?;
    }
    writeln!(out)?;

    for r in results {
        for (i, (&(y, x), counts)) in r.origins.iter().zip(&r.counts).enumerate() {
            write!(out, "{},{},{},{}", r.path.display(), i, y, x)?;
            for c in counts {
                write!(out, ",{c}")?;
            }
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
