use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use imagein_core::image::Rect;
use imagein_core::io::image_io::{load_image, save_image};

#[derive(Args)]
pub struct CropArgs {
    /// Input image file
    pub file: PathBuf,

    /// Left edge of the crop rectangle
    #[arg(long, default_value = "0")]
    pub x: usize,

    /// Top edge of the crop rectangle
    #[arg(long, default_value = "0")]
    pub y: usize,

    /// Crop width in pixels
    #[arg(long)]
    pub width: usize,

    /// Crop height in pixels
    #[arg(long)]
    pub height: usize,

    /// Output file path
    #[arg(short, long, default_value = "cropped.png")]
    pub output: PathBuf,
}

pub fn run(args: &CropArgs) -> Result<()> {
    let image = load_image(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    let rect = Rect::new(args.x, args.y, args.width, args.height);
    let cropped = image.crop(&rect);
    if cropped.is_empty() {
        anyhow::bail!(
            "Crop rectangle {}x{}+{}+{} lies outside the {}x{} image",
            args.width,
            args.height,
            args.x,
            args.y,
            image.width(),
            image.height()
        );
    }

    println!(
        "Cropped {}x{} -> {}x{}",
        image.width(),
        image.height(),
        cropped.width(),
        cropped.height()
    );

    save_image(&cropped, &args.output, None)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;
    println!("Saved to {}", args.output.display());

    Ok(())
}
