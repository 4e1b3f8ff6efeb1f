//! # Geosnap CLI
//!
//! Command-line shell over the gallery client: list stored images, search
//! nearby, annotate-and-upload a photo, delete, and probe service health.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use geosnap_client::{GalleryApi, GalleryView, ListQuery, UploadPipeline};
use geosnap_core::{
    DeniedGeolocation, FixedGeolocation, GeolocationProvider, Geotag, Rgb, SourceFile, StrokeStyle,
};

#[derive(Parser)]
#[command(name = "geosnap", version, about = "Annotate, geotag, and upload images to a gallery service")]
struct Cli {
    /// Gallery service base URL.
    #[arg(long, env = "GEOSNAP_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List stored images, newest first.
    List {
        /// Records to skip.
        #[arg(long)]
        skip: Option<u32>,
        /// Maximum records to return.
        #[arg(long)]
        limit: Option<u32>,
    },
    /// List images near a position.
    Nearby {
        /// Latitude of the search center.
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude of the search center.
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Search radius in kilometres.
        #[arg(long, default_value_t = 10.0)]
        radius: f64,
    },
    /// Annotate an image and upload it with a geotag.
    Upload {
        /// Path to the source image.
        path: PathBuf,
        /// Stroke color as #RRGGBB.
        #[arg(long, default_value = "#FF0000")]
        color: String,
        /// Stroke width in pixels.
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=20))]
        width: u32,
        /// A stroke to draw, as space-separated "x,y" points. Repeatable.
        #[arg(long = "stroke")]
        strokes: Vec<String>,
        /// Latitude to record (requires --lon).
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        /// Longitude to record (requires --lat).
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Optional image description.
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a stored image by its server-side filename.
    Delete {
        /// Stored filename, as reported by `list`.
        filename: String,
    },
    /// Probe service health.
    Health,
}

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: warn,geosnap=info).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,geosnap=info,geosnap_client=info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let api = GalleryApi::new(&cli.api_url)
        .with_context(|| format!("invalid gallery URL: {}", cli.api_url))?;

    match cli.command {
        Command::List { skip, limit } => {
            let mut view = GalleryView::new();
            view.refresh(&api, ListQuery { skip, limit })
                .await
                .context("failed to list images")?;
            print_items(view.items());
        }
        Command::Nearby { lat, lon, radius } => {
            let items = api
                .nearby_images(Geotag::new(lat, lon), radius)
                .await
                .context("nearby search failed")?;
            print_items(&items);
        }
        Command::Upload {
            path,
            color,
            width,
            strokes,
            lat,
            lon,
            description,
        } => {
            upload(&api, &path, &color, width, &strokes, lat, lon, description.as_deref()).await?;
        }
        Command::Delete { filename } => {
            api.delete_image(&filename)
                .await
                .with_context(|| format!("failed to delete {filename}"))?;
            println!("deleted {filename}");
        }
        Command::Health => {
            let report = api.health().await.context("health probe failed")?;
            println!("status:   {}", report.status);
            println!("database: {}", report.database);
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn upload(
    api: &GalleryApi,
    path: &Path,
    color: &str,
    width: u32,
    strokes: &[String],
    lat: Option<f64>,
    lon: Option<f64>,
    description: Option<&str>,
) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let file = SourceFile::new(name, media_type_for(path), bytes);

    let color: Rgb = color.parse()?;
    let strokes = strokes
        .iter()
        .map(|s| parse_stroke(s))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let pipeline = UploadPipeline::new(api.clone());
    pipeline.select_file(file)?;

    pipeline.with_draft(|draft| {
        draft.canvas.set_style(StrokeStyle::new(color, width));
        for stroke in &strokes {
            let mut points = stroke.iter();
            if let Some(&(x, y)) = points.next() {
                draft.canvas.pointer_down(x, y);
                for &(x, y) in points {
                    draft.canvas.pointer_move(x, y);
                }
                draft.canvas.pointer_up();
            }
        }
    });

    // A position given on the command line stands in for the device
    // geolocation; without one the sample is denied and the upload falls
    // back to (0, 0).
    let provider: Box<dyn GeolocationProvider> = match (lat, lon) {
        (Some(lat), Some(lon)) => Box::new(FixedGeolocation(Geotag::new(lat, lon))),
        _ => Box::new(DeniedGeolocation),
    };
    match provider.sample().await {
        Ok(geotag) => {
            pipeline.set_geotag(geotag);
        }
        Err(err) => {
            tracing::warn!("geolocation unavailable, recording (0, 0): {err}");
        }
    }

    let receipt = pipeline.submit(description).await?;
    println!("{}: {}", receipt.status, receipt.message);
    println!("url: {}", receipt.url);

    let mut view = GalleryView::new();
    view.refresh(api, ListQuery::default())
        .await
        .context("upload accepted but gallery refresh failed")?;
    println!();
    print_items(view.items());
    Ok(())
}

/// Declared media type for a path, from its extension. Unknown extensions
/// map to an opaque type, which the upload validation then rejects.
fn media_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// Parse a stroke argument: space-separated "x,y" points.
fn parse_stroke(input: &str) -> anyhow::Result<Vec<(f32, f32)>> {
    input
        .split_whitespace()
        .map(|point| {
            let (x, y) = point
                .split_once(',')
                .with_context(|| format!("bad point {point:?}, expected x,y"))?;
            Ok((
                x.trim().parse().with_context(|| format!("bad x in {point:?}"))?,
                y.trim().parse().with_context(|| format!("bad y in {point:?}"))?,
            ))
        })
        .collect()
}

fn print_items(items: &[geosnap_core::GalleryImage]) {
    if items.is_empty() {
        println!("no images");
        return;
    }
    for item in items {
        let name = item.filename.as_deref().unwrap_or("<unnamed>");
        println!(
            "{name}  ({:.4}, {:.4})  {}",
            item.latitude, item.longitude, item.url
        );
        if let Some(description) = &item.description {
            println!("    {description}");
        }
    }
}
