use console::Style;
use imagein_core::pipeline::config::{ElementShape, PipelineConfig, ProcessingStep};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
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
            path: Style::new().underlined(),
        }
    }
}

pub fn print_pipeline_summary(config: &PipelineConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("ImageIn Pipeline"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(16)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(config.input.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output.display())
    );
    if let Some(format) = config.format {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Format"),
            s.method.apply_to(format)
        );
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Threads"),
        s.value.apply_to(rayon::current_num_threads())
    );
    println!();

    if config.steps.is_empty() {
        println!(
            "  {:<14}{}",
            s.header.apply_to("Steps"),
            s.disabled.apply_to("none")
        );
        println!();
        return;
    }

    println!("  {}", s.header.apply_to("Steps"));
    for (i, step) in config.steps.iter().enumerate() {
        print!("    {}. ", s.label.apply_to(i + 1));
        print_step(&s, step);
    }
    println!();
}

fn print_step(s: &Styles, step: &ProcessingStep) {
    match step {
        ProcessingStep::Crop(rect) => println!(
            "{} {}",
            s.method.apply_to("Crop"),
            s.value.apply_to(format!(
                "{}x{} at ({}, {})",
                rect.width, rect.height, rect.x, rect.y
            ))
        ),
        ProcessingStep::Normalize { min, max } => println!(
            "{} {}",
            s.method.apply_to("Normalize"),
            s.value.apply_to(format!("[{min}, {max}]"))
        ),
        ProcessingStep::Convolve(conv) => {
            println!(
                "{} {}",
                s.method.apply_to("Convolve"),
                s.value.apply_to(&conv.kernel)
            );
            println!(
                "       {:<12}{:?}",
                s.label.apply_to("Borders"),
                conv.policy
            );
            if conv.normalize {
                println!(
                    "       {:<12}{}",
                    s.label.apply_to("Normalize"),
                    s.value.apply_to("0-255")
                );
            }
            if let Some(workers) = conv.workers {
                println!(
                    "       {:<12}{}",
                    s.label.apply_to("Workers"),
                    s.value.apply_to(workers)
                );
            }
        }
        ProcessingStep::Morphology(morph) => {
            println!(
                "{} {}",
                s.method.apply_to(morph.op),
                s.value.apply_to(format!("(scale {})", morph.element.scale))
            );
            let element = match &morph.element.shape {
                ElementShape::Square(size) => format!("square {size}x{size}"),
                ElementShape::Direction(dir) => format!("{dir:?}"),
                ElementShape::File(path) => path.display().to_string(),
            };
            println!(
                "       {:<12}{}",
                s.label.apply_to("Element"),
                s.value.apply_to(element)
            );
        }
    }
}
