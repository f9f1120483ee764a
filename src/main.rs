//! Park board - prints ranked attraction, restaurant and show lists for one park
//!
//! Reads a saved live snapshot with `--feed`, or fetches the current one from
//! the configured API.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use park_board::{
    backfill_locations, build_board, AppConfig, Coordinates, DiningSortMode, Enriched,
    FeedProcessor, FeedSource, InMemoryLocationStore, ParkBoard, PositionCell, SortMode,
    ThemeParksClient,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "park-board", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read a saved live snapshot instead of fetching one
    #[arg(short, long)]
    feed: Option<PathBuf>,

    /// Park id to show (defaults to the first park in the feed)
    #[arg(short, long)]
    park: Option<String>,

    /// Attraction ordering: SHORTEST, SOONEST or NEAREST
    #[arg(long)]
    attractions: Option<SortMode>,

    /// Restaurant ordering: SHORTEST or NEAREST
    #[arg(long)]
    restaurants: Option<DiningSortMode>,

    /// Show ordering: SHORTEST, SOONEST or NEAREST
    #[arg(long)]
    shows: Option<SortMode>,

    /// Current latitude
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Current longitude
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Look up this many missing entity locations before printing
    #[arg(long, default_value_t = 0)]
    locate: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controls verbosity; default INFO
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref());
    let client = ThemeParksClient::new(config.client.clone())?;

    let processor = FeedProcessor::new();
    let snapshot = match &args.feed {
        Some(path) => processor
            .load_snapshot(path)
            .with_context(|| format!("Failed to read feed {}", path.display()))?,
        None => client
            .fetch_live()
            .await
            .context("Failed to load live data")?,
    };

    let organized = processor.organize(&snapshot);
    let store = InMemoryLocationStore::new();
    let position = PositionCell::new();
    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        position.update(Coordinates::new(lat, lon));
    }

    let mut sort = config.board;
    if let Some(mode) = args.attractions {
        sort.attractions = mode;
    }
    if let Some(mode) = args.restaurants {
        sort.restaurants = mode;
    }
    if let Some(mode) = args.shows {
        sort.shows = mode;
    }

    let park_id = match args.park.as_deref() {
        Some(id) => id.to_string(),
        None => organized
            .parks
            .first()
            .map(|p| p.id.clone())
            .context("Feed contains no parks")?,
    };

    if args.locate > 0 {
        let stored = backfill_locations(&client, &store, &snapshot, &park_id, args.locate).await;
        info!(stored, requested = args.locate, "resolved entity locations");
    }

    let board = build_board(&organized, Some(&park_id), &store, position.current(), sort)?;
    print_board(&board);
    Ok(())
}

fn print_board(board: &ParkBoard) {
    println!("{} ({})", board.park.name, board.park.id);

    println!("\nAttractions");
    for a in &board.attractions {
        println!(
            "  {:<40} {:>5} {:>6} {:>7}",
            a.name,
            wait(a.standby_wait),
            a.return_start
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_default(),
            metres(a)
        );
    }

    println!("\nRestaurants");
    for r in &board.restaurants {
        let parties = r
            .party_wait
            .iter()
            .map(|p| format!("{}:{}", p.party_size, wait(p.wait_minutes)))
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "  {:<40} {:>5} {:<20} {:>7}",
            r.name,
            wait(r.standby_wait),
            parties,
            metres(r)
        );
    }

    println!("\nShows");
    for s in &board.shows {
        let times = s
            .show_times
            .iter()
            .map(|t| t.format("%H:%M").to_string())
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "  {:<40} {:>5} {:<30} {:>7}",
            s.name,
            wait(s.standby_wait),
            times,
            metres(s)
        );
    }
}

fn wait(minutes: Option<u32>) -> String {
    minutes.map(|m| m.to_string()).unwrap_or_default()
}

fn metres<T>(entity: &Enriched<T>) -> String {
    entity
        .distance_km
        .map(|km| format!("{}m", (km * 1000.0).round()))
        .unwrap_or_default()
}
