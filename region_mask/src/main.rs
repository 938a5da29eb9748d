//! mask_probe — check a still image against the instrument regions.
//!
//! Useful for calibrating a stick color: grab a webcam still with the stick
//! held over a drum, then see how many pixels each region picks up.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use image::{imageops, GrayImage};
use region_mask::{
    classify, layout_all, ColorRange, ColumnMapping, Coverage, MAX_INSTRUMENTS, REGION_SIZE,
};

#[derive(Debug, Parser)]
#[command(name = "mask_probe", about = "Report per-region color occupancy for a still frame")]
struct Args {
    /// Still frame to probe (PNG or JPEG).
    image: PathBuf,

    /// Number of instrument regions to lay out (1–4).
    #[arg(short = 'n', long, default_value_t = 2)]
    count: usize,

    /// Fraction of a region that must match to fire.
    #[arg(long, default_value_t = Coverage::DEFAULT)]
    coverage: f64,

    /// Use the evenly spread four-instrument layout.
    #[arg(long)]
    symmetric: bool,

    /// Mirror the image horizontally first, as the live loop does.
    #[arg(long)]
    mirror: bool,

    /// Write the combined occupancy mask to this PNG.
    #[arg(long)]
    mask_out: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("mask_probe: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let coverage = Coverage::new(args.coverage)?;
    let mapping = if args.symmetric { ColumnMapping::Symmetric } else { ColumnMapping::Legacy };

    let mut frame = image::open(&args.image)?.to_rgb8();
    if args.mirror {
        imageops::flip_horizontal_in_place(&mut frame);
    }
    let (w, h) = frame.dimensions();
    let rects = layout_all(args.count, w, h, mapping)?;
    let range = ColorRange::default();
    let threshold = coverage.threshold(REGION_SIZE);

    println!();
    println!("  {} — {}×{}, {} region(s) of max {}", args.image.display(), w, h, rects.len(), MAX_INSTRUMENTS);
    println!("  threshold: {} px ({:.0}% of {}×{})",
        threshold, coverage.ratio() * 100.0, REGION_SIZE.width, REGION_SIZE.height);
    println!();
    println!("  {:<5} {:<22} {:>8} {:>6}", "idx", "region", "count", "fire");
    println!("  {}", "─".repeat(44));

    let mut combined = GrayImage::new(w, h);
    for (i, rect) in rects.iter().enumerate() {
        let tl = rect.top_left();
        let br = rect.bottom_right();
        let label = format!("({},{})–({},{})", tl.x, tl.y, br.x, br.y);

        let Some((x, y, cw, ch)) = rect.clip(w, h) else {
            println!("  {:<5} {:<22} {:>8} {:>6}", i, label, "-", "off");
            continue;
        };
        let area = imageops::crop_imm(&frame, x, y, cw, ch).to_image();
        let occ = classify(&area, &range);
        imageops::replace(&mut combined, &occ.mask, x as i64, y as i64);

        let fire = if coverage.exceeded_by(occ.count, REGION_SIZE) { "yes" } else { "no" };
        let clipped = if rect.fits_within(w, h) { "" } else { " (clipped)" };
        println!("  {:<5} {:<22} {:>8} {:>6}{}", i, label, occ.count, fire, clipped);
    }
    println!();

    if let Some(out) = &args.mask_out {
        combined.save(out)?;
        println!("  mask written to {}", out.display());
        println!();
    }
    Ok(())
}
