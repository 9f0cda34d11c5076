//! Command line argument definitions.

use clap::{Args, Parser, Subcommand};
use snapedit::{Color, CropRatio};
use std::path::PathBuf;

/// SnapEdit - crop, transform and recompose photos from the command line.
#[derive(Parser, Debug)]
#[command(name = "snapedit", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (TOML or JSON). Defaults to the platform config dir.
    #[arg(long, short = 'c', global = true, env = "SNAPEDIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug information)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show image size and the available photo templates
    Info(InfoArgs),

    /// Crop to the default centred frame, optionally locked to a ratio
    Crop(CropArgs),

    /// Rotate by an angle in degrees (clockwise)
    Rotate(RotateArgs),

    /// Resize the canvas
    Resize(ResizeArgs),

    /// Cut the image into a grid of PNGs packed in a ZIP
    Slice(SliceArgs),

    /// Compose an ID photo on a solid backing
    IdPhoto(IdPhotoArgs),

    /// Replace the background behind the subject
    ReplaceBg(ReplaceBgArgs),

    /// Write the default configuration file
    InitConfig(InitConfigArgs),
}

/// Input and output shared by the editing commands.
#[derive(Args, Debug)]
pub struct ImageIo {
    /// Source image
    pub input: PathBuf,

    /// Destination PNG
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Image to inspect
    pub input: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CropArgs {
    #[command(flatten)]
    pub io: ImageIo,

    /// Aspect ratio as W:H, or "free" to keep the default frame
    #[arg(long, short = 'r', default_value = "free")]
    pub ratio: CropRatio,
}

#[derive(Args, Debug)]
pub struct RotateArgs {
    #[command(flatten)]
    pub io: ImageIo,

    /// Angle in degrees
    #[arg(long, short = 'a', allow_negative_numbers = true)]
    pub angle: f64,
}

#[derive(Args, Debug)]
pub struct ResizeArgs {
    #[command(flatten)]
    pub io: ImageIo,

    /// New width in pixels
    #[arg(long)]
    pub width: f64,

    /// New height in pixels
    #[arg(long)]
    pub height: f64,
}

#[derive(Args, Debug)]
pub struct SliceArgs {
    /// Source image
    pub input: PathBuf,

    /// Number of rows
    #[arg(long, default_value_t = 3)]
    pub rows: u32,

    /// Number of columns
    #[arg(long, default_value_t = 3)]
    pub cols: u32,

    /// Directory receiving the archive
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct IdPhotoArgs {
    #[command(flatten)]
    pub io: ImageIo,

    /// Template id (see `snapedit info`)
    #[arg(long, short = 't')]
    pub template: Option<String>,

    /// Backing colour, e.g. #438edb
    #[arg(long)]
    pub color: Option<Color>,

    /// Subject size multiplier (0.5 to 2.0)
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,
}

#[derive(Args, Debug)]
pub struct ReplaceBgArgs {
    #[command(flatten)]
    pub io: ImageIo,

    /// Background colour, e.g. #ffffff
    #[arg(long, conflicts_with = "background")]
    pub color: Option<Color>,

    /// Background image, scaled to cover the canvas
    #[arg(long)]
    pub background: Option<PathBuf>,

    /// Subject scale relative to the canvas (0.5 to 2.0)
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,
}

#[derive(Args, Debug)]
pub struct InitConfigArgs {
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}
