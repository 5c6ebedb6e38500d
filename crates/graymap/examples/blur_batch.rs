//! Example: blur every image named in a list file.
//!
//! Each line of the list file is a path to a raw PGM image. The blurred copy
//! is written next to the input as `blurred_<file name>`. Files that fail to
//! load or save are reported and skipped.
//!
//! Run from the workspace root:
//!   cargo run -p graymap --example blur_batch -- --help
//!   cargo run -p graymap --example blur_batch -- images.txt --dx 2 --dy 2

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use graymap::{GrayImage, blur};
use log::{error, info};

#[derive(Parser, Debug)]
#[command(about = "Blur a list of PGM images with a (2dx+1)x(2dy+1) mean filter")]
struct Args {
    /// Text file with one image path per line
    list: PathBuf,

    /// Horizontal filter radius
    #[arg(long, default_value_t = 1)]
    dx: usize,

    /// Vertical filter radius
    #[arg(long, default_value_t = 1)]
    dy: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let list = fs::read_to_string(&args.list)
        .with_context(|| format!("reading image list {}", args.list.display()))?;

    let t0 = Instant::now();
    let mut done = 0usize;
    let mut failed = 0usize;
    for line in list.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match blur_one(Path::new(line), args.dx, args.dy) {
            Ok(out) => {
                info!("{line} -> {}", out.display());
                done += 1;
            }
            Err(e) => {
                error!("{line}: {e:#}");
                failed += 1;
            }
        }
    }

    println!(
        "blurred {done} image(s), {failed} failure(s) in {:.3} ms",
        t0.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}

fn blur_one(input: &Path, dx: usize, dy: usize) -> Result<PathBuf> {
    let mut img =
        GrayImage::load(input).with_context(|| format!("loading {}", input.display()))?;
    blur(&mut img, dx, dy).context("allocating blur table")?;

    let out = blurred_path(input)?;
    img.save(&out)
        .with_context(|| format!("saving {}", out.display()))?;
    Ok(out)
}

fn blurred_path(input: &Path) -> Result<PathBuf> {
    let name = input
        .file_name()
        .with_context(|| format!("{} has no file name", input.display()))?;
    let mut blurred = std::ffi::OsString::from("blurred_");
    blurred.push(name);
    Ok(input.with_file_name(blurred))
}
