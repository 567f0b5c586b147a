//! Neptune CLI - inspect a game's full universe report.
//!
//! Single binary that provides:
//! - `neptune status` - game state and timing
//! - `neptune stars` / `neptune fleets` - entity listings
//! - `neptune distance` - distance or range level between two stars
//! - `neptune field` - raw field lookup on any entity
//! - `neptune init` - write a default configuration

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use neptune_core::{ClientConfig, Credentials, Galaxy, HasData, Star};

#[derive(Parser)]
#[command(name = "neptune")]
#[command(about = "Inspect a game's full universe report", version)]
struct Cli {
    /// Project directory holding .neptune/config.yaml
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Game number (overrides config)
    #[arg(short, long, global = true)]
    game: Option<u64>,

    /// Session cookie as name=value (repeatable, overrides config)
    #[arg(long = "cookie", global = true, value_parser = parse_cookie)]
    cookies: Vec<(String, String)>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show game state, clock and players
    Status,

    /// List stars
    Stars {
        /// Only stars currently visible
        #[arg(long)]
        visible: bool,
    },

    /// List visible fleets
    Fleets,

    /// Distance between two stars
    Distance {
        from: u64,
        to: u64,

        /// Print the required range level instead
        #[arg(long)]
        level: bool,
    },

    /// Look up a field on the galaxy or one of its entities
    Field {
        /// Field name; omit to list the report's top-level fields
        name: Option<String>,

        #[arg(long, conflicts_with_all = ["fleet", "player"])]
        star: Option<u64>,

        #[arg(long, conflicts_with = "player")]
        fleet: Option<u64>,

        #[arg(long)]
        player: Option<u64>,
    },

    /// Write a default .neptune/config.yaml
    Init,
}

fn parse_cookie(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected name=value, got `{}`", raw)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let project_root = match cli.project.clone() {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let game = cli.game;
    let cookies = cli.cookies;

    match cli.command {
        Some(Commands::Status) => {
            let galaxy = connect(&project_root, game, &cookies)?;
            show_status(&galaxy).await
        }
        Some(Commands::Stars { visible }) => {
            let galaxy = connect(&project_root, game, &cookies)?;
            list_stars(&galaxy, visible).await
        }
        Some(Commands::Fleets) => {
            let galaxy = connect(&project_root, game, &cookies)?;
            list_fleets(&galaxy).await
        }
        Some(Commands::Distance { from, to, level }) => {
            let galaxy = connect(&project_root, game, &cookies)?;
            show_distance(&galaxy, from, to, level).await
        }
        Some(Commands::Field {
            name,
            star,
            fleet,
            player,
        }) => {
            let galaxy = connect(&project_root, game, &cookies)?;
            show_field(&galaxy, name.as_deref(), star, fleet, player).await
        }
        Some(Commands::Init) => init_project(&project_root),
        None => {
            println!("Neptune - full universe report viewer");
            println!();
            println!("Usage: neptune <COMMAND>");
            println!();
            println!("Commands:");
            println!("  status    Show game state");
            println!("  stars     List stars");
            println!("  fleets    List visible fleets");
            println!("  distance  Distance between two stars");
            println!("  field     Look up a raw field");
            println!("  init      Write a default configuration");
            println!();
            println!("Run 'neptune --help' for more information.");
            Ok(())
        }
    }
}

fn connect(project_root: &Path, game: Option<u64>, cookies: &[(String, String)]) -> Result<Galaxy> {
    let config = ClientConfig::load_from_project(project_root)?;
    open_galaxy(&config, game, cookies)
}

fn open_galaxy(
    config: &ClientConfig,
    game: Option<u64>,
    cookies: &[(String, String)],
) -> Result<Galaxy> {
    let game_number = game
        .or(config.game_number)
        .context("No game number: pass --game or set game_number in .neptune/config.yaml")?;

    let credentials = if cookies.is_empty() {
        config.credentials()
    } else {
        Some(Credentials::from_cookies(cookies.iter().cloned().collect()))
    };
    let Some(credentials) = credentials else {
        bail!("No credentials: pass --cookie name=value or set cookies in .neptune/config.yaml");
    };

    tracing::debug!(game_number, base_url = %config.base_url, "Opening galaxy");
    Ok(Galaxy::connect(game_number, credentials, config)?)
}

async fn show_status(galaxy: &Galaxy) -> Result<()> {
    let state = galaxy.game_state().await?;
    let now = galaxy.now_utc().await?;
    let started = galaxy.start_time_utc().await?;
    let turn_based = galaxy.turn_based().await?;
    let me = galaxy.player().await?;
    let admin = galaxy.admin().await?;
    let players = galaxy.players().await?;
    let stars = galaxy.stars().await?;
    let fleets = galaxy.fleets().await?;

    println!("Game {}", galaxy.game_number());
    println!("====================");
    println!();
    println!("State:      {}", state);
    println!("Server now: {}", now.to_rfc3339());
    println!("Started:    {}", started.to_rfc3339());
    println!("Turn based: {}", if turn_based { "yes" } else { "no" });
    println!();
    println!("You:   player {}", me.index());
    println!("Admin: player {}", admin.index());
    println!();
    println!("Players: {}", players.len());
    println!("Stars:   {} ({} visible)", stars.len(), stars.iter().filter(|s| s.visible()).count());
    println!("Fleets:  {} visible", fleets.len());

    Ok(())
}

async fn list_stars(galaxy: &Galaxy, visible_only: bool) -> Result<()> {
    for star in galaxy.stars().await? {
        if visible_only && !star.visible() {
            continue;
        }
        let owner = match star.player()? {
            Some(player) => player.index().to_string(),
            None => "-".to_string(),
        };
        let ships = star.ships().map(|n| n.to_string()).unwrap_or_else(|_| "?".to_string());
        println!(
            "{:>4}  {:<20} owner {:>3}  ({:>8.2}, {:>8.2})  ships {}",
            star.star_id(),
            star.name()?,
            owner,
            star.x()?,
            star.y()?,
            ships
        );
    }
    Ok(())
}

async fn list_fleets(galaxy: &Galaxy) -> Result<()> {
    let fleets = galaxy.fleets().await?;
    println!("Visible fleets: {}", fleets.len());
    for (fleet_id, fleet) in fleets.iter() {
        let route = fleet
            .waypoint_ids()?
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(" -> ");
        println!(
            "{:>5}  {:<20} owner {:>3}  ships {:>5}  ({:>8.2}, {:>8.2})  route [{}]",
            fleet_id,
            fleet.name()?,
            fleet.player()?.index(),
            fleet.ships()?,
            fleet.x()?,
            fleet.y()?,
            route
        );
    }
    Ok(())
}

async fn show_distance(galaxy: &Galaxy, from: u64, to: u64, level: bool) -> Result<()> {
    let a: Star = galaxy.star(from).await?;
    let b: Star = galaxy.star(to).await?;

    if level {
        println!("{}", a.range_level(&b)?);
    } else {
        println!("{:.4}", a.distance(&b)?);
    }
    Ok(())
}

async fn show_field(
    galaxy: &Galaxy,
    name: Option<&str>,
    star: Option<u64>,
    fleet: Option<u64>,
    player: Option<u64>,
) -> Result<()> {
    let Some(name) = name else {
        if star.is_some() || fleet.is_some() || player.is_some() {
            bail!("A field name is required when looking up an entity");
        }
        let report = galaxy.report().await?;
        for field in report.fields().keys() {
            println!("{}", field);
        }
        return Ok(());
    };

    let value = match (star, fleet, player) {
        (Some(id), _, _) => galaxy.star(id).await?.field(name)?,
        (_, Some(id), _) => galaxy.fleet(id).await?.field(name)?,
        (_, _, Some(index)) => galaxy.player_at(index).await?.field(name)?,
        _ => galaxy.field(name).await?,
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn init_project(project_root: &Path) -> Result<()> {
    let neptune_dir = project_root.join(".neptune");
    std::fs::create_dir_all(&neptune_dir)?;

    let config_path = neptune_dir.join("config.yaml");
    if !config_path.exists() {
        let default_config = r#"# Neptune client configuration

base_url: https://np.ironhelmet.com
timeout_secs: 30

# game_number: 1234567890
# cookies:
#   auth: <session cookie>
"#;
        std::fs::write(&config_path, default_config)?;
    }

    println!("Initialized Neptune project at {}", project_root.display());
    println!();
    println!("Created:");
    println!("  .neptune/config.yaml - client configuration");
    println!();
    println!("Next steps:");
    println!("  1. Set game_number and cookies in .neptune/config.yaml");
    println!("  2. Run: neptune status");

    Ok(())
}
