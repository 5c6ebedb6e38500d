use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use graymap::{
    AccessCounter, CounterSnapshot, GrayImage, blend, blur, crop, locate, mirror, paste,
    rotate_ccw,
};
use log::info;
use serde::Serialize;

const OPERATIONS: &str = "\
Images created by operations are appended to an internal buffer I0, I1, ...
The last image is CURR and the one before it is PRED.

OPERATIONS:
  FILE            Load PGM image file, creating new image
  save FILE       Save CURR to PGM file
  info            Show size, maxval and gray level range of CURR
  tic             Reset instrumentation counters and clock
  toc             Print instrumentation counters and elapsed time
  neg             Apply photo-negative effect to CURR
  thr LEVEL       Apply thresholding to CURR
  bri FACTOR      Scale brightness in CURR by FACTOR
  create W,H      Create new black image with WxH pixels
  rotate          Rotate CURR 90 degrees counter-clockwise, creating new image
  mirror          Mirror CURR left-to-right, creating new image
  crop X,Y,W,H    Crop a rectangle from CURR, creating new image
  paste X,Y       Paste PRED into CURR at position (X,Y)
  blend X,Y,ALPHA Blend PRED into CURR at position (X,Y) with given alpha
  locate          Search PRED in CURR, print matching position or NOTFOUND
  blur DX,DY      Blur CURR using a (2DX+1)x(2DY+1) mean filter";

/// Maxval given to images made by `create`.
const CREATE_MAXVAL: u8 = 255;

#[derive(Parser, Debug)]
#[command(name = "gm_tool")]
#[command(about = "Apply a pipeline of image operations to raw PGM files")]
#[command(after_help = OPERATIONS)]
struct Cli {
    /// Maximum number of images held at once
    #[arg(long, default_value_t = 10)]
    capacity: usize,

    /// Write a JSON summary of the run (counters, images, locate results)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Files, operations and operands, processed left to right
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    steps: Vec<String>,
}

#[derive(Debug)]
enum ToolError {
    InsufficientOperands,
    InsufficientImages,
    BufferFull,
    Image(graymap::Error),
    InvalidOperand(String),
    InvalidRect,
    InvalidAlpha(String),
}

impl ToolError {
    fn status(&self) -> u8 {
        match self {
            Self::InsufficientOperands => 1,
            Self::InsufficientImages => 2,
            Self::BufferFull => 3,
            Self::Image(_) => 4,
            Self::InvalidOperand(_) => 5,
            Self::InvalidRect => 6,
            Self::InvalidAlpha(_) => 7,
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientOperands => write!(f, "Insufficient operands"),
            Self::InsufficientImages => write!(f, "Insufficient images"),
            Self::BufferFull => write!(f, "Image buffer is full"),
            Self::Image(e) => write!(f, "Image library failure: {e}"),
            Self::InvalidOperand(arg) => write!(f, "Invalid operand: {arg}"),
            Self::InvalidRect => write!(f, "Invalid rect (overflow)"),
            Self::InvalidAlpha(arg) => write!(f, "Invalid alpha: {arg}"),
        }
    }
}

impl std::error::Error for ToolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Image(e) => Some(e),
            _ => None,
        }
    }
}

impl From<graymap::Error> for ToolError {
    fn from(e: graymap::Error) -> Self {
        Self::Image(e)
    }
}

#[derive(Debug, Clone, Serialize)]
struct LocateRecord {
    needle: usize,
    haystack: usize,
    found: Option<[usize; 2]>,
}

#[derive(Debug, Clone, Serialize)]
struct ImageDto {
    index: usize,
    width: usize,
    height: usize,
    maxval: u8,
}

#[derive(Debug, Clone, Serialize)]
struct RunReport {
    counters: CounterSnapshot,
    images: Vec<ImageDto>,
    locate: Vec<LocateRecord>,
    error: Option<String>,
}

struct Pipeline {
    capacity: usize,
    images: Vec<GrayImage>,
    counter: AccessCounter,
    located: Vec<LocateRecord>,
}

impl Pipeline {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            images: Vec::with_capacity(capacity),
            counter: AccessCounter::new(),
            located: Vec::new(),
        }
    }

    fn run<S: AsRef<str>>(&mut self, steps: &[S]) -> Result<(), ToolError> {
        let mut tokens = steps.iter().map(|s| s.as_ref());
        while let Some(op) = tokens.next() {
            self.step(op, &mut tokens)?;
        }
        Ok(())
    }

    fn step<'a>(
        &mut self,
        op: &str,
        rest: &mut impl Iterator<Item = &'a str>,
    ) -> Result<(), ToolError> {
        match op {
            "info" => {
                let n = self.curr_index()?;
                info!("Info on I{n}");
                let img = &self.images[n];
                let stats = img.stats();
                println!("# Size: {}x{}", img.width(), img.height());
                println!("# Maxval: {}", img.maxval());
                println!("# Gray level range: [{}, {}]", stats.min, stats.max);
            }
            "tic" => self.counter.reset(),
            "toc" => {
                let snap = self.counter.snapshot();
                println!("# elapsed: {:.6} s", snap.elapsed_secs);
                println!("# pixmem: {}", snap.pixmem);
            }
            "neg" => {
                let n = self.curr_index()?;
                info!("Negating I{n}");
                self.images[n].negate();
            }
            "thr" => {
                let arg = operand(rest)?;
                let n = self.curr_index()?;
                let thr: u8 = parse_one(arg)?;
                info!("Thresholding I{n} at {thr}");
                self.images[n].threshold(thr);
            }
            "bri" => {
                let arg = operand(rest)?;
                let n = self.curr_index()?;
                let factor: f64 = parse_one(arg)?;
                if factor.is_nan() || factor < 0.0 {
                    return Err(ToolError::InvalidOperand(arg.to_string()));
                }
                info!("Brightening I{n} by {factor}");
                self.images[n].brighten(factor);
            }
            "create" => {
                let arg = operand(rest)?;
                self.ensure_room()?;
                let [w, h] = parse_list::<usize, 2>(arg)?;
                info!("Creating black image ({w},{h}) -> I{}", self.images.len());
                let img = GrayImage::with_counter(w, h, CREATE_MAXVAL, &self.counter)?;
                self.images.push(img);
            }
            "rotate" => {
                let n = self.curr_index()?;
                self.ensure_room()?;
                info!("Rotating I{n} -> I{}", n + 1);
                let img = rotate_ccw(&self.images[n])?;
                self.images.push(img);
            }
            "mirror" => {
                let n = self.curr_index()?;
                self.ensure_room()?;
                info!("Mirroring I{n} -> I{}", n + 1);
                let img = mirror(&self.images[n])?;
                self.images.push(img);
            }
            "crop" => {
                let arg = operand(rest)?;
                let n = self.curr_index()?;
                self.ensure_room()?;
                let [x, y, w, h] = parse_list::<usize, 4>(arg)?;
                if !self.images[n].valid_rect(x, y, w, h) {
                    return Err(ToolError::InvalidOperand(arg.to_string()));
                }
                info!("Cropping I{n} ({x},{y},{w},{h}) -> I{}", n + 1);
                let img = crop(&self.images[n], x, y, w, h)?;
                self.images.push(img);
            }
            "paste" => {
                let arg = operand(rest)?;
                let n = self.images.len();
                let (curr, pred) = self.curr_and_pred()?;
                let [x, y] = parse_list::<usize, 2>(arg)?;
                if !curr.valid_rect(x, y, pred.width(), pred.height()) {
                    return Err(ToolError::InvalidRect);
                }
                info!("Pasting I{} at I{} ({x},{y})", n - 2, n - 1);
                paste(curr, x, y, pred);
            }
            "blend" => {
                let arg = operand(rest)?;
                let n = self.images.len();
                let (curr, pred) = self.curr_and_pred()?;
                let (xy, alpha) = arg
                    .rsplit_once(',')
                    .ok_or_else(|| ToolError::InvalidOperand(arg.to_string()))?;
                let [x, y] = parse_list::<usize, 2>(xy)?;
                let alpha: f64 = parse_one(alpha)?;
                if !alpha.is_finite() {
                    return Err(ToolError::InvalidAlpha(arg.to_string()));
                }
                if !curr.valid_rect(x, y, pred.width(), pred.height()) {
                    return Err(ToolError::InvalidRect);
                }
                info!("Blending I{} into I{}@({x},{y}) with alpha={alpha:.3}", n - 2, n - 1);
                blend(curr, x, y, pred, alpha);
            }
            "locate" => {
                let n = self.images.len();
                let (curr, pred) = self.curr_and_pred()?;
                info!("Locating I{} in I{}", n - 2, n - 1);
                let found = locate(curr, pred);
                match found {
                    Some((x, y)) => println!("# FOUND ({x},{y})"),
                    None => println!("# NOTFOUND"),
                }
                self.located.push(LocateRecord {
                    needle: n - 2,
                    haystack: n - 1,
                    found: found.map(|(x, y)| [x, y]),
                });
            }
            "blur" => {
                let arg = operand(rest)?;
                let n = self.curr_index()?;
                let [dx, dy] = parse_list::<usize, 2>(arg)?;
                info!("Blur I{n} with radii ({dx},{dy})");
                blur(&mut self.images[n], dx, dy)?;
            }
            "save" => {
                let arg = operand(rest)?;
                let n = self.curr_index()?;
                info!("Saving {arg} <- I{n}");
                self.images[n].save(arg)?;
            }
            path => {
                self.ensure_room()?;
                info!("Loading {path} -> I{}", self.images.len());
                let img = GrayImage::load_with_counter(path, &self.counter)?;
                self.images.push(img);
            }
        }
        Ok(())
    }

    fn curr_index(&self) -> Result<usize, ToolError> {
        self.images
            .len()
            .checked_sub(1)
            .ok_or(ToolError::InsufficientImages)
    }

    fn curr_and_pred(&mut self) -> Result<(&mut GrayImage, &GrayImage), ToolError> {
        let n = self.images.len();
        if n < 2 {
            return Err(ToolError::InsufficientImages);
        }
        let (head, tail) = self.images.split_at_mut(n - 1);
        Ok((&mut tail[0], &head[n - 2]))
    }

    fn ensure_room(&self) -> Result<(), ToolError> {
        if self.images.len() >= self.capacity {
            return Err(ToolError::BufferFull);
        }
        Ok(())
    }

    fn report(&self, error: Option<&ToolError>) -> RunReport {
        RunReport {
            counters: self.counter.snapshot(),
            images: self
                .images
                .iter()
                .enumerate()
                .map(|(index, img)| ImageDto {
                    index,
                    width: img.width(),
                    height: img.height(),
                    maxval: img.maxval(),
                })
                .collect(),
            locate: self.located.clone(),
            error: error.map(ToString::to_string),
        }
    }
}

fn operand<'a>(rest: &mut impl Iterator<Item = &'a str>) -> Result<&'a str, ToolError> {
    rest.next().ok_or(ToolError::InsufficientOperands)
}

fn parse_one<T: FromStr>(arg: &str) -> Result<T, ToolError> {
    arg.trim()
        .parse()
        .map_err(|_| ToolError::InvalidOperand(arg.to_string()))
}

fn parse_list<T: FromStr, const N: usize>(arg: &str) -> Result<[T; N], ToolError> {
    let invalid = || ToolError::InvalidOperand(arg.to_string());
    let values = arg
        .split(',')
        .map(|part| part.trim().parse::<T>().map_err(|_| invalid()))
        .collect::<Result<Vec<T>, ToolError>>()?;
    values.try_into().map_err(|_| invalid())
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut pipeline = Pipeline::new(cli.capacity);
    let outcome = pipeline.run(&cli.steps);

    if let Some(path) = &cli.report {
        write_json(path, &pipeline.report(outcome.as_ref().err()))?;
    }
    drop(pipeline);

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("gm_tool: {e}");
            Ok(ExitCode::from(e.status()))
        }
    }
}

#[cfg(test)]
mod tests {
    use graymap::GrayImage;

    use super::{Pipeline, ToolError, parse_list};

    fn run(capacity: usize, steps: &[&str]) -> (Pipeline, Result<(), ToolError>) {
        let mut p = Pipeline::new(capacity);
        let outcome = p.run(steps);
        (p, outcome)
    }

    #[test]
    fn parse_list_requires_exact_arity() {
        assert_eq!(parse_list::<usize, 2>("3, 4").ok(), Some([3, 4]));
        assert!(parse_list::<usize, 2>("3").is_err());
        assert!(parse_list::<usize, 2>("3,4,5").is_err());
        assert!(parse_list::<usize, 2>("-1,4").is_err());
    }

    #[test]
    fn create_crop_paste_locate_pipeline() {
        let (p, outcome) = run(
            10,
            &["create", "6,4", "bri", "1.0", "crop", "1,1,2,2", "create", "8,8", "paste", "3,2"],
        );
        outcome.expect("pipeline runs");
        assert_eq!(p.images.len(), 3);
        assert_eq!((p.images[1].width(), p.images[1].height()), (2, 2));

        let (p, outcome) = run(10, &["create", "5,5", "create", "2,2", "locate"]);
        outcome.expect("pipeline runs");
        // I0 is PRED (the needle) and I1 is CURR (the haystack); 5x5 cannot fit.
        assert_eq!(p.located.len(), 1);
        assert_eq!(p.located[0].found, None);
    }

    #[test]
    fn save_and_reload_through_pipeline() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.pgm");
        let path_str = path.to_str().expect("utf-8 path");

        let (_, outcome) = run(4, &["create", "3,2", "neg", "blur", "1,1", "save", path_str]);
        outcome.expect("pipeline runs");

        let back = GrayImage::load(&path).expect("load");
        assert_eq!((back.width(), back.height()), (3, 2));
        assert_eq!(back.stats().min, 255);

        let (p, outcome) = run(4, &[path_str, "mirror", "locate"]);
        outcome.expect("pipeline runs");
        assert_eq!(p.located[0].found, Some([0, 0]));
        assert!(p.counter.pixmem() > 0);
    }

    #[test]
    fn errors_map_to_status_codes() {
        let cases: [(&[&str], u8); 8] = [
            (&["thr"], 1),
            (&["rotate"], 2),
            (&["create", "1,1", "create", "1,1"], 3),
            (&["/definitely/not/here.pgm"], 4),
            (&["create", "2,x"], 5),
            (&["create", "2,2", "create", "3,3", "paste", "2,2"], 6),
            (&["create", "2,2", "create", "3,3", "blend", "0,0,inf"], 7),
            (&["create", "2,2", "blur", "18446744073709551615,0"], 4),
        ];

        for (steps, status) in cases {
            let capacity = if status == 3 { 1 } else { 10 };
            let (_, outcome) = run(capacity, steps);
            let err = outcome.expect_err("pipeline must fail");
            assert_eq!(err.status(), status, "steps {steps:?}: {err}");
        }
    }

    #[test]
    fn crop_outside_is_an_invalid_operand() {
        let (p, outcome) = run(10, &["create", "4,4", "crop", "3,3,2,2"]);
        assert!(matches!(outcome, Err(ToolError::InvalidOperand(_))));
        assert_eq!(p.images.len(), 1);
    }

    #[test]
    fn report_lists_live_images_and_error() {
        let (p, outcome) = run(10, &["create", "4,3", "rotate", "rotate", "rotate", "neg", "bri"]);
        let err = outcome.expect_err("bri needs an operand");
        let report = p.report(Some(&err));

        assert_eq!(report.images.len(), 4);
        assert_eq!((report.images[1].width, report.images[1].height), (3, 4));
        assert_eq!(report.error.as_deref(), Some("Insufficient operands"));
    }
}
