mod server;
mod settings;
mod source;
mod tour;

use std::error::Error;
use std::net::SocketAddr;

use catalog::{CatalogSnapshot, CatalogSource};
use clap::{Parser, Subcommand};
use navigation::{build_scene, resolve, MapView, RenderMode};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::server::AppState;
use crate::settings::AppSettings;
use crate::source::{FeedSource, ImageChecker};

#[derive(Parser, Debug)]
#[command(author, version, about = "Map markers and directional hotspots for a panorama feed")]
struct Args {
    /// Metadata feed: http(s) URL or local JSON file (default: PANO_FEED_URL)
    #[arg(long, global = true)]
    feed: Option<String>,

    /// Farthest reachable neighbor, in world units (default: PANO_MAX_DISTANCE or 500)
    #[arg(long, global = true)]
    max_distance: Option<f64>,

    /// Viewer kind: flat or spherical
    #[arg(long, global = true)]
    mode: Option<RenderMode>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print map settings and markers as JSON
    Markers,

    /// Print the panoramas reachable from one panorama
    Neighbors {
        #[arg(long)]
        id: String,
    },

    /// Print the scene (image and hotspots) for one panorama as JSON
    Hotspots {
        #[arg(long)]
        id: String,
    },

    /// Open the first panorama from the map, then follow hotspots through the rest
    Tour {
        #[arg(required = true)]
        ids: Vec<String>,

        /// Check that each panorama image is reachable before showing it
        #[arg(long)]
        check_images: bool,
    },

    /// Run the JSON API
    Serve {
        /// Listen address (default: PANO_ADDR or 127.0.0.1:9200)
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let settings =
        AppSettings::from_env().with_overrides(args.feed, args.max_distance, args.mode);

    let runtime = match args.command {
        Command::Serve { .. } => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?,
        _ => tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?,
    };
    runtime.block_on(run(args.command, settings))
}

async fn run(command: Command, settings: AppSettings) -> Result<(), Box<dyn Error>> {
    let client = reqwest::Client::builder()
        .timeout(settings.fetch_timeout)
        .build()?;
    let source = FeedSource::from_location(&settings.feed, client.clone());

    match command {
        Command::Markers => {
            let snapshot = load(&source).await?;
            let projector = settings.map.projector();
            let view = MapView::build(settings.map.clone(), snapshot.records(), &projector)?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::Neighbors { id } => {
            let snapshot = load(&source).await?;
            let current = snapshot.find_by_id(&id)?;
            let nav = &settings.navigation;
            let neighbors = resolve(
                current,
                snapshot.records(),
                nav.max_distance,
                nav.compass_correction_deg,
            )?;
            for n in &neighbors {
                println!(
                    "{}\t{:.1}\t{:.1}\t{}",
                    n.target.id,
                    n.distance,
                    n.bearing,
                    n.target.display_name()
                );
            }
        }
        Command::Hotspots { id } => {
            let snapshot = load(&source).await?;
            let scene = build_scene(&id, &snapshot, &settings.navigation)?;
            println!("{}", serde_json::to_string_pretty(&scene)?);
        }
        Command::Tour { ids, check_images } => {
            let mut config = settings.navigation.clone();
            config.confirm_imagery |= check_images;
            let images = ImageChecker::new(client);
            let events = tour::run_tour(&source, &images, config, &ids).await;
            for event in &events {
                println!("{}", tour::describe_event(event));
            }
        }
        Command::Serve { addr } => {
            let addr = addr.unwrap_or(settings.addr);
            let state = AppState::new(source, settings.navigation, settings.map);
            server::serve(addr, state).await?;
        }
    }

    Ok(())
}

async fn load(source: &FeedSource) -> Result<CatalogSnapshot, Box<dyn Error>> {
    let snapshot = source.load().await?;
    info!(
        source = %source.describe(),
        panoramas = snapshot.len(),
        version = snapshot.version(),
        "catalog loaded"
    );
    Ok(snapshot)
}
