use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use qrstyle::helper::{generate, write_file, OutputFormat, QrRequest};

#[derive(Parser)]
#[command(name = "qrstyle")]
#[command(version)]
#[command(about = "Render styled QR codes as PNG or SVG", long_about = None)]
struct Cli {
    /// Text or URL to encode.
    content: String,
    #[arg(
        short,
        long,
        help = "Output file",
        long_help = "Output file. The format is determined based on the extension. \
        Supported extensions are:\n\
        * images: .png\n\
        * vectors: .svg"
    )]
    output: PathBuf,
    #[arg(short, long, default_value = "rounded", help = "classic, rounded, circle, gradient or orange_circle")]
    style: String,
    #[arg(long, default_value = "#000000")]
    foreground: String,
    #[arg(long, default_value = "#FFFFFF", help = "Hex color or 'transparent'")]
    background: String,
    #[arg(long, num_args = 2, value_names = ["START", "END"], help = "Two hex colors for a vertical gradient")]
    gradient: Option<Vec<String>>,
    #[arg(long, default_value_t = 350, help = "Requested canvas side in pixels")]
    size: u32,
    #[arg(long, help = "Image to place at the center")]
    logo: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    // Before doing anything, make sure the requested output is valid.
    let format = OutputFormat::from_extension(&cli.output).with_context(|| {
        format!("unsupported output extension for '{}', use .png or .svg", cli.output.display())
    })?;

    let logo = match &cli.logo {
        Some(path) => Some(fs::read(path).with_context(|| format!("reading logo '{}'", path.display()))?),
        None => None,
    };
    let gradient = cli
        .gradient
        .as_deref()
        .and_then(|colors| match colors {
            [start, end] => Some((start.as_str(), end.as_str())),
            _ => None,
        });

    let request = QrRequest {
        content: &cli.content,
        style: &cli.style,
        foreground: &cli.foreground,
        background: &cli.background,
        gradient,
        canvas_size: cli.size,
        logo: logo.as_deref(),
        format,
    };
    let rendered = generate(&request)?;
    write_file(&rendered, &cli.output)
        .with_context(|| format!("writing '{}'", cli.output.display()))?;
    info!("wrote {}", cli.output.display());
    Ok(())
}
