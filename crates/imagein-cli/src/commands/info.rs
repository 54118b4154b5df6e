use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use imagein_core::io::image_io::{load_image, FileFormat};

#[derive(Args)]
pub struct InfoArgs {
    /// Input image (PNG, BMP, JPEG or VFF)
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let image = load_image(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    let format = FileFormat::from_path(&args.file)
        .map(|f| f.to_string())
        .unwrap_or_else(|| "unknown".into());

    println!("File:        {}", args.file.display());
    println!("Format:      {}", format);
    println!("Dimensions:  {}x{}", image.width(), image.height());
    println!("Channels:    {}", image.channels());

    for c in 0..image.channels() {
        let mean = image.channel_mean(c)?;
        println!(
            "Channel {}:   min {:>3}  max {:>3}  mean {:>7.2}  dev {:>7.2}",
            c,
            image.channel_min(c)?,
            image.channel_max(c)?,
            mean,
            image.channel_deviation_with_mean(c, mean)?,
        );
    }

    let total_kb = image.size() as f64 / 1024.0;
    println!("Data size:   {:.1} KB", total_kb);

    Ok(())
}
