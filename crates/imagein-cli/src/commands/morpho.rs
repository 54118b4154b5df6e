use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use imagein_core::io::image_io::{load_image, save_image};
use imagein_core::morphology::{self, Direction, MorphologyOp};
use imagein_core::pipeline::config::{ElementShape, ElementSpec};

#[derive(Clone, ValueEnum)]
pub enum OpArg {
    Erosion,
    Dilation,
    Opening,
    Closing,
    Gradient,
    WhiteTopHat,
    BlackTopHat,
}

impl From<&OpArg> for MorphologyOp {
    fn from(arg: &OpArg) -> Self {
        match arg {
            OpArg::Erosion => MorphologyOp::Erosion,
            OpArg::Dilation => MorphologyOp::Dilation,
            OpArg::Opening => MorphologyOp::Opening,
            OpArg::Closing => MorphologyOp::Closing,
            OpArg::Gradient => MorphologyOp::Gradient,
            OpArg::WhiteTopHat => MorphologyOp::WhiteTopHat,
            OpArg::BlackTopHat => MorphologyOp::BlackTopHat,
        }
    }
}

#[derive(Clone, ValueEnum)]
pub enum ElementArg {
    Square,
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

#[derive(Args)]
pub struct MorphoArgs {
    /// Input image file
    pub file: PathBuf,

    /// Morphological operator
    #[arg(long, value_enum, default_value = "opening")]
    pub op: OpArg,

    /// Built-in structuring element
    #[arg(long, value_enum, default_value = "square")]
    pub element: ElementArg,

    /// Side length of the square element
    #[arg(long, default_value = "3")]
    pub size: usize,

    /// Load the element from a picture (dark pixels are set), overriding --element
    #[arg(long)]
    pub element_file: Option<PathBuf>,

    /// Integer magnification of the element
    #[arg(long, default_value = "1")]
    pub scale: usize,

    /// Also write the element mask (unscaled) as a picture
    #[arg(long)]
    pub save_element: Option<PathBuf>,

    /// Output file path
    #[arg(short, long, default_value = "morpho.png")]
    pub output: PathBuf,
}

pub fn element_spec(
    element: &ElementArg,
    size: usize,
    file: Option<&PathBuf>,
    scale: usize,
) -> ElementSpec {
    let shape = match (file, element) {
        (Some(path), _) => ElementShape::File(path.clone()),
        (None, ElementArg::Square) => ElementShape::Square(size),
        (None, ElementArg::Left) => ElementShape::Direction(Direction::Left),
        (None, ElementArg::Right) => ElementShape::Direction(Direction::Right),
        (None, ElementArg::Top) => ElementShape::Direction(Direction::Top),
        (None, ElementArg::Bottom) => ElementShape::Direction(Direction::Bottom),
        (None, ElementArg::TopLeft) => ElementShape::Direction(Direction::TopLeft),
        (None, ElementArg::TopRight) => ElementShape::Direction(Direction::TopRight),
        (None, ElementArg::BottomRight) => ElementShape::Direction(Direction::BottomRight),
        (None, ElementArg::BottomLeft) => ElementShape::Direction(Direction::BottomLeft),
    };
    ElementSpec { shape, scale }
}

pub fn run(args: &MorphoArgs) -> Result<()> {
    let image = load_image(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    let spec = element_spec(&args.element, args.size, args.element_file.as_ref(), args.scale);
    let element = spec.build().context("Invalid structuring element")?;
    let op = MorphologyOp::from(&args.op);

    println!(
        "Applying {} with a {}x{} element (scale {})",
        op,
        element.width(),
        element.height(),
        element.scale()
    );

    if let Some(ref path) = args.save_element {
        element
            .save(path)
            .with_context(|| format!("Failed to save element to {}", path.display()))?;
        println!("Element saved to {}", path.display());
    }

    let result = morphology::apply(op, &image, &element)?;

    save_image(&result, &args.output, None)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;
    println!("Saved to {}", args.output.display());

    Ok(())
}
