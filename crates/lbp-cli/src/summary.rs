use console::Style;
use lbp_core::lbp::{BorderHandling, LbpHistogramOperator, LbpOperator};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
        }
    }

    fn row(&self, label: &str, value: impl std::fmt::Display) {
        println!(
            "    {:<14}{}",
            self.label.apply_to(label),
            self.value.apply_to(value)
        );
    }

    fn flag(&self, label: &str, on: bool) {
        if on {
            println!("    {:<14}{}", self.label.apply_to(label), self.method.apply_to("on"));
        } else {
            println!(
                "    {:<14}{}",
                self.label.apply_to(label),
                self.disabled.apply_to("off")
            );
        }
    }
}

/// Print the operator's configuration and derived geometry.
///
/// `input_shape` adds the output shape for an image of that size.
pub fn print_operator_summary(op: &LbpOperator, input_shape: Option<(usize, usize)>) {
    let s = Styles::new();
    let c = op.config();

    println!();
    println!("  {}", s.title.apply_to("LBP Operator"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(12)));
    println!();

    println!("  {}", s.header.apply_to("Neighborhood"));
    s.row("Neighbors", c.neighbor_count);
    if op.is_multi_block() {
        let (bh, bw) = op.block_size();
        let (oh, ow) = op.block_overlap();
        println!(
            "    {:<14}{}",
            s.label.apply_to("Shape"),
            s.method.apply_to("multi-block")
        );
        s.row("Block", format!("{bh}x{bw} px"));
        s.row("Overlap", format!("{oh}x{ow} px"));
    } else {
        let shape = if c.circular { "circular" } else { "rectangular" };
        println!(
            "    {:<14}{}",
            s.label.apply_to("Shape"),
            s.method.apply_to(shape)
        );
        let (ry, rx) = op.radii();
        if ry == rx {
            s.row("Radius", ry);
        } else {
            s.row("Radii", format!("{ry} x {rx}"));
        }
    }
    let (oy, ox) = op.offset();
    s.row("Offset", format!("({oy}, {ox})"));
    println!();

    println!("  {}", s.header.apply_to("Coding"));
    println!(
        "    {:<14}{}",
        s.label.apply_to("Encoding"),
        s.method.apply_to(c.encoding)
    );
    s.flag("To average", c.to_average);
    s.flag("Average bit", c.add_average_bit);
    s.flag("Uniform", c.uniform);
    s.flag("Rot. invar.", c.rotation_invariant);
    s.row("Labels", op.max_label());
    println!();

    println!("  {}", s.header.apply_to("Borders"));
    println!(
        "    {:<14}{}",
        s.label.apply_to("Handling"),
        s.method.apply_to(c.border_handling)
    );
    if let Some((h, w)) = input_shape {
        let (oh, ow) = op.output_shape((h, w), false);
        s.row("Input", format!("{h}x{w}"));
        s.row("Output", format!("{oh}x{ow}"));
        if c.border_handling == BorderHandling::Shrink && (oh == 0 || ow == 0) {
            println!(
                "    {:<14}{}",
                "",
                s.disabled.apply_to("image is smaller than one neighborhood")
            );
        }
    }
    println!();

    println!("  {}", s.header.apply_to("Sampling Points"));
    for (i, &(dy, dx)) in op.relative_positions().iter().enumerate() {
        s.row(&format!("#{i}"), format!("({dy:+.4}, {dx:+.4})"));
    }
    println!();
}

/// Print the block tiling of a histogram run.
pub fn print_histogram_summary(hist: &LbpHistogramOperator, files: usize) {
    let s = Styles::new();
    let (bh, bw) = hist.block_size();
    let (oh, ow) = hist.block_overlap();

    println!("  {}", s.header.apply_to("Histograms"));
    s.row("Files", files);
    s.row("Block", format!("{bh}x{bw} px"));
    s.row("Overlap", format!("{oh}x{ow} px"));
    s.row("Bins", hist.n_bins());
    println!();
}
