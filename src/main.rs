//! `pixmarshal` CLI - emit wire messages for images and maps as JSON.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixmarshal::{
    marshall_deck_gl, marshall_images, marshall_map, Captions, ChannelOrder, Config, DataFrame,
    Element, ImageSource, ImageWidth, OutputFormat, PixelArray,
};

/// Marshal images, maps and Deck.GL charts into front-end wire messages.
#[derive(Parser, Debug)]
#[command(name = "pixmarshal")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Print single-line JSON.
    #[arg(long, global = true)]
    compact: bool,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode image files (or pass through http(s) URLs) into an image list.
    Image {
        /// Image paths, URLs, or `.json` files holding nested pixel lists.
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<String>,

        /// Caption; give once to caption every image, or once per image.
        #[arg(short, long = "caption", value_name = "TEXT")]
        captions: Vec<String>,

        /// Display width in pixels. Wider images are shrunk.
        #[arg(short, long, value_name = "INT", conflicts_with = "column_width")]
        width: Option<u32>,

        /// Stretch images to the column width.
        #[arg(long)]
        column_width: bool,

        /// Encode as JPEG with this quality (1-100) instead of PNG.
        #[arg(long, value_name = "INT")]
        jpeg_quality: Option<u8>,

        /// Clip out-of-range pixel values in `.json` arrays instead of failing.
        #[arg(long)]
        clamp: bool,

        /// `.json` arrays store blue first.
        #[arg(long)]
        bgr: bool,
    },

    /// Build a Deck.GL chart from a JSON spec and row data.
    Deck {
        /// JSON array of row objects drawn as the default layer.
        #[arg(long, value_name = "FILE")]
        data: Option<PathBuf>,

        /// JSON object with the chart spec, optionally including `layers`.
        #[arg(long, value_name = "FILE")]
        spec: Option<PathBuf>,

        /// Spec override such as `viewport_zoom=11`; the value is parsed as JSON
        /// and falls back to a plain string.
        #[arg(long = "set", value_name = "KEY=VALUE")]
        settings: Vec<String>,
    },

    /// Build a point map from a JSON array of row objects with `lat`/`lon`.
    Map {
        #[arg(value_name = "FILE")]
        points: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("pixmarshal={log_level}").into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    let element = match &args.command {
        Command::Image {
            inputs,
            captions,
            width,
            column_width,
            jpeg_quality,
            clamp,
            bgr,
        } => {
            let config = Config {
                width: match (width, column_width) {
                    (Some(pixels), _) => ImageWidth::Pixels(*pixels),
                    (None, true) => ImageWidth::Column,
                    (None, false) => ImageWidth::Auto,
                },
                channels: if *bgr {
                    ChannelOrder::Bgr
                } else {
                    ChannelOrder::Rgb
                },
                output_format: jpeg_quality
                    .map_or(OutputFormat::Png, |quality| OutputFormat::Jpeg { quality }),
                clamp: *clamp,
            };

            let sources = inputs
                .iter()
                .map(|input| image_source(input))
                .collect::<Result<Vec<_>>>()?;
            let list = marshall_images(sources, captions_from_args(captions), &config)
                .context("Failed to marshal images")?;
            Element::Imgs(list)
        }
        Command::Deck {
            data,
            spec,
            settings,
        } => {
            let data = data.as_deref().map(read_frame).transpose()?;
            let spec = spec.as_deref().map(read_spec).transpose()?;
            let kwargs = settings
                .iter()
                .map(|setting| parse_setting(setting))
                .collect::<Result<Vec<_>>>()?;

            let chart = marshall_deck_gl(data.as_ref(), spec, &kwargs)
                .context("Failed to marshal Deck.GL chart")?;
            Element::DeckGlChart(chart)
        }
        Command::Map { points } => {
            let frame = read_frame(points)?;
            Element::Map(marshall_map(&frame).context("Failed to marshal map")?)
        }
    };

    let json = if args.compact {
        serde_json::to_string(&element)?
    } else {
        serde_json::to_string_pretty(&element)?
    };
    println!("{json}");

    Ok(())
}

fn image_source(input: &str) -> Result<ImageSource> {
    if input.starts_with("http://") || input.starts_with("https://") {
        return Ok(ImageSource::Url(input.to_string()));
    }

    let path = PathBuf::from(input);
    if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
        let array = PixelArray::from_json(&read_json(&path)?)
            .with_context(|| format!("Invalid pixel array in {}", path.display()))?;
        return Ok(ImageSource::Array(array));
    }

    Ok(ImageSource::Path(path))
}

fn captions_from_args(captions: &[String]) -> Captions {
    match captions {
        [] => Captions::None,
        [single] => Captions::One(single.clone()),
        many => Captions::Many(many.to_vec()),
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn read_frame(path: &Path) -> Result<DataFrame> {
    match read_json(path)? {
        Value::Array(records) => DataFrame::from_records(&records)
            .with_context(|| format!("Invalid rows in {}", path.display())),
        _ => anyhow::bail!("{} must hold a JSON array of row objects", path.display()),
    }
}

fn read_spec(path: &Path) -> Result<Map<String, Value>> {
    match read_json(path)? {
        Value::Object(spec) => Ok(spec),
        _ => anyhow::bail!("{} must hold a JSON object", path.display()),
    }
}

fn parse_setting(setting: &str) -> Result<(String, Value)> {
    let (key, raw) = setting
        .split_once('=')
        .with_context(|| format!("Expected KEY=VALUE, got {setting:?}"))?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
