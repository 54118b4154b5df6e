use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use imagein_core::io::image_io::{load_image, save_image, to_gray, FileFormat};

#[derive(Clone, ValueEnum)]
pub enum FormatArg {
    Png,
    Bmp,
    Jpeg,
    Vff,
}

impl From<&FormatArg> for FileFormat {
    fn from(arg: &FormatArg) -> Self {
        match arg {
            FormatArg::Png => FileFormat::Png,
            FormatArg::Bmp => FileFormat::Bmp,
            FormatArg::Jpeg => FileFormat::Jpeg,
            FormatArg::Vff => FileFormat::Vff,
        }
    }
}

#[derive(Args)]
pub struct ConvertArgs {
    /// Input image file
    pub file: PathBuf,

    /// Output format; inferred from the output extension when omitted
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Reduce to a single gray channel before saving
    #[arg(long)]
    pub gray: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: PathBuf,
}

pub fn run(args: &ConvertArgs) -> Result<()> {
    let mut image = load_image(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    let format = args.format.as_ref().map(FileFormat::from);
    // VFF rasters only hold one band.
    let needs_gray = args.gray
        || (image.channels() > 1
            && format
                .or_else(|| FileFormat::from_path(&args.output))
                .is_some_and(|f| f == FileFormat::Vff));
    if needs_gray {
        println!("Converting {} channels to gray", image.channels());
        image = to_gray(&image);
    }

    save_image(&image, &args.output, format)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;
    println!("Saved to {}", args.output.display());

    Ok(())
}
