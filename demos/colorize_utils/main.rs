//! DMD Colorization CLI Utility
//!
//! A command-line tool for inspecting colorization bundles, running the HeatShrink codec on
//! files and colorizing raw frames.
//!
//! # Features
//!
//! - **info**: Print a JSON summary of a `.pal`, `.vni` or `.cRom` file
//! - **compress** / **decompress**: File-level HeatShrink
//! - **render**: Identify a raw frame in a cROM table and save the result as PNG
//! - **colorize**: Run a raw gray frame through a coloring bundle and save it as PNG
//!
//! # Usage
//!
//! ```bash
//! # Summarize a bundle
//! cargo run --example colorize_utils info afm_113b.vni
//!
//! # Compress with the VPIN parameters
//! cargo run --example colorize_utils compress planes.bin planes.hs --window 10 --lookahead 0
//!
//! # Colorize a frame from a cROM table
//! cargo run --example colorize_utils render afm_113b.cRom frame.raw frame.png
//!
//! # Colorize a 2-bit 128x32 frame with a coloring bundle
//! cargo run --example colorize_utils colorize afm_113b.pal frame.raw frame.png --bits 2
//! ```

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use dmdcolor_rs::prelude::*;
use dmdcolor_rs::file::vni::AnimationInfo;
use image::RgbImage;
use log::info;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "colorize_utils")]
#[command(author = "dmdcolor-rs project")]
#[command(version = "1.0")]
#[command(about = "DMD colorization utility - inspect bundles, run the codec, colorize frames", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Print a JSON summary of a bundle
	Info {
		/// Bundle path
		#[arg(value_name = "FILE")]
		input: PathBuf,

		/// Bundle kind, detected from magic and extension when omitted
		#[arg(short, long)]
		kind: Option<Kind>,
	},

	/// Compress a file with HeatShrink
	Compress {
		/// Input file path
		#[arg(value_name = "INPUT")]
		input: PathBuf,

		/// Output file path
		#[arg(value_name = "OUTPUT")]
		output: PathBuf,

		/// Window size in bits
		#[arg(short, long, default_value_t = 10)]
		window: u8,

		/// Lookahead size in bits
		#[arg(short, long, default_value_t = 0)]
		lookahead: u8,
	},

	/// Decompress a HeatShrink file
	Decompress {
		/// Input file path
		#[arg(value_name = "INPUT")]
		input: PathBuf,

		/// Output file path
		#[arg(value_name = "OUTPUT")]
		output: PathBuf,

		/// Window size in bits
		#[arg(short, long, default_value_t = 10)]
		window: u8,

		/// Lookahead size in bits
		#[arg(short, long, default_value_t = 0)]
		lookahead: u8,
	},

	/// Identify a raw frame in a cROM table and save the colorized frame
	Render {
		/// cROM table path
		#[arg(value_name = "CROM", env = "DMDCOLOR_CROM")]
		crom: PathBuf,

		/// Raw frame, one byte per pixel
		#[arg(value_name = "RAW_FRAME")]
		frame: PathBuf,

		/// Output PNG path
		#[arg(value_name = "OUTPUT_PNG")]
		output: PathBuf,
	},

	/// Colorize a raw gray frame with a coloring bundle
	Colorize {
		/// Coloring bundle path
		#[arg(value_name = "PAL", env = "DMDCOLOR_PAL")]
		pal: PathBuf,

		/// Raw frame, one byte per pixel
		#[arg(value_name = "RAW_FRAME")]
		frame: PathBuf,

		/// Output PNG path
		#[arg(value_name = "OUTPUT_PNG")]
		output: PathBuf,

		/// Animation bundle path
		#[arg(long, env = "DMDCOLOR_VNI")]
		vni: Option<PathBuf>,

		/// Gray depth of the frame
		#[arg(short, long, default_value_t = 2)]
		bits: usize,

		/// Frame width
		#[arg(long, default_value_t = 128)]
		width: usize,

		/// Frame height
		#[arg(long, default_value_t = 32)]
		height: usize,

		/// Upscaler for half-size frames
		#[arg(long, default_value = "doubler")]
		scaler: Scaler,
	},
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
	Pal,
	Vni,
	Crom,
}

#[derive(Clone, Copy, ValueEnum)]
enum Scaler {
	Doubler,
	Scale2x,
}

#[derive(Serialize)]
struct PalSummary<'a> {
	version: u8,
	default_palette: Option<u16>,
	palettes: &'a [Palette],
	mappings: Vec<MappingSummary>,
	masks: usize,
	mask_size: usize,
}

#[derive(Serialize)]
struct MappingSummary {
	checksum: String,
	#[serde(flatten)]
	mapping: Mapping,
}

#[derive(Serialize)]
struct VniSummary {
	version: i16,
	max_width: usize,
	max_height: usize,
	animations: Vec<AnimationInfo>,
}

/// Guess the bundle kind from magic bytes and extension
fn detect_kind(path: &Path, data: &[u8]) -> Kind {
	if data.starts_with(b"VPIN") {
		return Kind::Vni;
	}
	match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
		Some("crom") => Kind::Crom,
		Some("vni") => Kind::Vni,
		_ => Kind::Pal,
	}
}

/// Handle info command
fn handle_info(input: &Path, kind: Option<Kind>) -> anyhow::Result<()> {
	let data = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
	let json = match kind.unwrap_or_else(|| detect_kind(input, &data)) {
		Kind::Pal => {
			let pal = PalFile::from_bytes(&data)?;
			serde_json::to_string_pretty(&PalSummary {
				version: pal.version(),
				default_palette: pal.default_palette().map(|p| p.index),
				palettes: pal.palettes(),
				mappings: pal
					.mappings()
					.iter()
					.map(|m| MappingSummary {
						checksum: hex::encode_upper(m.checksum.to_be_bytes()),
						mapping: *m,
					})
					.collect(),
				masks: pal.masks().len(),
				mask_size: pal.masks().first().map_or(0, Vec::len),
			})?
		}
		Kind::Vni => {
			let vni = VniFile::from_bytes(&data)?;
			serde_json::to_string_pretty(&VniSummary {
				version: vni.version(),
				max_width: vni.max_width(),
				max_height: vni.max_height(),
				animations: vni.animations().iter().map(Animation::info).collect(),
			})?
		}
		Kind::Crom => {
			let crom = CromFile::from_bytes(&data)?;
			serde_json::to_string_pretty(crom.header())?
		}
	};
	println!("{json}");
	Ok(())
}

/// Handle compress and decompress commands
fn handle_codec(input: &Path, output: &Path, window: u8, lookahead: u8, pack: bool) -> anyhow::Result<()> {
	let data = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
	let result = if pack {
		compress(&data, window, lookahead)?
	} else {
		decompress(&data, window, lookahead)?
	};
	fs::write(output, &result)?;
	info!("{} bytes -> {} bytes (w{window} l{lookahead})", data.len(), result.len());
	Ok(())
}

/// Save a colored frame as PNG
fn save_png(frame: &ColoredFrame, output: &Path) -> anyhow::Result<()> {
	let dim = frame.dimensions;
	let image = RgbImage::from_raw(dim.width as u32, dim.height as u32, frame.to_rgb24())
		.context("frame size does not match its pixel data")?;
	image.save(output)?;
	info!("saved {dim} frame with {} colors to {}", frame.palette.len(), output.display());
	Ok(())
}

/// Handle render command
fn handle_render(crom: &Path, frame: &Path, output: &Path) -> anyhow::Result<()> {
	let mut store = CromFile::open(crom).with_context(|| format!("loading {}", crom.display()))?;
	let raw = fs::read(frame)?;
	let surface = store.dimensions().surface();
	if raw.len() != surface {
		bail!("frame has {} pixels, the table expects {surface}", raw.len());
	}

	let Some(row) = store.identify(&raw) else {
		bail!("frame not found in {}", store.header());
	};
	info!("frame matches row {row}");
	let colored = store.colorize(&raw, row).context("row out of range")?;
	save_png(&colored, output)
}

/// Handle colorize command
fn handle_colorize(
	pal: &Path,
	vni: Option<&Path>,
	frame: &Path,
	output: &Path,
	bits: usize,
	dim: Dimensions,
	scaler: Scaler,
) -> anyhow::Result<()> {
	let coloring = PalFile::open(pal).with_context(|| format!("loading {}", pal.display()))?;
	let animations = vni.map(VniFile::open).transpose()?;
	let config = match scaler {
		Scaler::Doubler => ColorizerConfig::doubler(),
		Scaler::Scale2x => ColorizerConfig::scale2x(),
	};
	let mut colorizer = VniColorizer::with_config(coloring, animations, config);

	let raw = fs::read(frame)?;
	let Some(frame) = DmdFrame::gray(dim, bits, raw) else {
		bail!("unsupported gray depth {bits}");
	};
	match colorizer.colorize(&frame, 0) {
		ColorizeOutcome::Colored(colored) => save_png(&colored, output),
		ColorizeOutcome::PassThrough => bail!("the coloring bundle has no palette for this frame"),
	}
}

fn main() -> anyhow::Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
	let cli = Cli::parse();

	match cli.command {
		Commands::Info {
			input,
			kind,
		} => handle_info(&input, kind),

		Commands::Compress {
			input,
			output,
			window,
			lookahead,
		} => handle_codec(&input, &output, window, lookahead, true),

		Commands::Decompress {
			input,
			output,
			window,
			lookahead,
		} => handle_codec(&input, &output, window, lookahead, false),

		Commands::Render {
			crom,
			frame,
			output,
		} => handle_render(&crom, &frame, &output),

		Commands::Colorize {
			pal,
			frame,
			output,
			vni,
			bits,
			width,
			height,
			scaler,
		} => handle_colorize(&pal, vni.as_deref(), &frame, &output, bits, Dimensions::new(width, height), scaler),
	}
}
