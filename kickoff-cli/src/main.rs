use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use kickoff_core::{
    apply_write_back, autogroup_pool, grouping_candidates, joinable_trips, plan_write_back, ClusterOrder, MatchId,
    TripId, UserId,
};
use kickoff_ingest::{load_csv_snapshot, load_snapshot, write_snapshot, Snapshot};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod state;
mod time;

use config::Config;
use render::AutoGroupReport;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("KICKOFF_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "kickoff", version, long_version = LONG_VERSION, about = "Match-day ride grouping recommendations")]
struct Cli {
    /// Config file (default: ~/.kickoff/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Suggest trips to group with a given trip
    Groupings {
        #[command(flatten)]
        source: SnapshotArgs,

        /// Trip to find grouping partners for
        #[arg(long)]
        trip: String,

        /// Limit number of suggestions printed (default: config display.limit)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Rank trips a user could join
    TripsForUser {
        #[command(flatten)]
        source: SnapshotArgs,

        #[arg(long)]
        user: String,

        /// Only trips to this match (default: any upcoming trip)
        #[arg(long = "match")]
        match_id: Option<String>,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Batch-group a match's ungrouped trips
    AutoGroup {
        #[command(flatten)]
        source: SnapshotArgs,

        #[arg(long = "match")]
        match_id: String,

        /// Minimum score against the group seed (default: config engine.auto_group_threshold)
        #[arg(long)]
        threshold: Option<u32>,

        /// Seeding order (default: config engine.cluster_order)
        #[arg(long, value_enum)]
        order: Option<OrderArg>,

        /// Write the snapshot with grouping flags applied to this path
        #[arg(long)]
        write: Option<PathBuf>,
    },

    /// Config file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write ~/.kickoff/config.toml with defaults
    Init,
    /// Print the effective config
    Show,
}

#[derive(Args, Debug)]
struct SnapshotArgs {
    /// JSON snapshot exported from the trips API
    #[arg(long, conflicts_with_all = ["users_csv", "trips_csv"])]
    snapshot: Option<PathBuf>,

    /// Users CSV export (with --trips-csv)
    #[arg(long, requires = "trips_csv")]
    users_csv: Option<PathBuf>,

    /// Trips CSV export (with --users-csv)
    #[arg(long, requires = "users_csv")]
    trips_csv: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrderArg {
    Given,
    CreatedAt,
    DepartureTime,
}

impl From<OrderArg> for ClusterOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Given => ClusterOrder::AsGiven,
            OrderArg::CreatedAt => ClusterOrder::CreatedAt,
            OrderArg::DepartureTime => ClusterOrder::DepartureTime,
        }
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Groupings { source, trip, limit } => {
            groupings(&cfg, &source, &TripId::new(trip), limit, cli.json)?;
        }

        Command::TripsForUser {
            source,
            user,
            match_id,
            limit,
        } => {
            let match_id = match_id.map(MatchId::new);
            trips_for_user(&cfg, &source, &UserId::new(user), match_id.as_ref(), limit, cli.json)?;
        }

        Command::AutoGroup {
            source,
            match_id,
            threshold,
            order,
            write,
        } => {
            let threshold = threshold.unwrap_or(cfg.engine.auto_group_threshold);
            let order = order.map(ClusterOrder::from).unwrap_or(cfg.engine.cluster_order);
            auto_group(&cfg, &source, &MatchId::new(match_id), threshold, order, write.as_deref(), cli.json)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                if cli.json {
                    render::print_json(&cfg)?;
                } else {
                    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
                }
            }
        },
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_source(source: &SnapshotArgs) -> Result<Snapshot> {
    match (&source.snapshot, &source.users_csv, &source.trips_csv) {
        (Some(path), _, _) => load_snapshot(path),
        (None, Some(users), Some(trips)) => load_csv_snapshot(users, trips),
        _ => bail!("no input: pass --snapshot <file.json> or --users-csv <file> --trips-csv <file>"),
    }
}

fn groupings(cfg: &Config, source: &SnapshotArgs, trip_id: &TripId, limit: Option<usize>, json: bool) -> Result<()> {
    let snapshot = load_source(source)?;
    let Some(target) = snapshot.trip(trip_id) else {
        bail!("trip not found: {trip_id}");
    };

    let target = target.clone().populate(&snapshot.users)?;
    let candidates = snapshot.populate(grouping_candidates(&target, &snapshot.trips))?;
    let engine = cfg.engine();
    let mut recs = engine.recommend_groupings_for_trip(&target, &candidates);
    recs.truncate(limit.unwrap_or(cfg.display.limit));

    if json {
        return render::print_json(&recs);
    }

    let tz = time::parse_timezone(&cfg.display.timezone)?;
    println!("# Grouping suggestions (threshold {})\n", engine.threshold());
    println!("{}\n", render::trip_line(&target, tz));
    if recs.is_empty() {
        println!("(no compatible trips among {} candidates)", candidates.len());
    }
    for line in render::recommendation_lines(&recs, tz) {
        println!("{line}");
    }
    Ok(())
}

fn trips_for_user(
    cfg: &Config,
    source: &SnapshotArgs,
    user_id: &UserId,
    match_id: Option<&MatchId>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let snapshot = load_source(source)?;
    let Some(user) = snapshot.user(user_id) else {
        bail!("user not found: {user_id}");
    };

    let candidates = snapshot.populate(joinable_trips(user, &snapshot.trips, match_id, Utc::now()))?;
    let mut recs = cfg.engine().recommend_trips_for_user(user, &candidates, match_id);
    recs.truncate(limit.unwrap_or(cfg.display.limit));

    if json {
        return render::print_json(&recs);
    }

    let tz = time::parse_timezone(&cfg.display.timezone)?;
    match match_id {
        Some(m) => println!("# Trips for {user_id} to match {m}\n"),
        None => println!("# Upcoming trips for {user_id}\n"),
    }
    if recs.is_empty() {
        println!("(no joinable trips)");
    }
    for line in render::recommendation_lines(&recs, tz) {
        println!("{line}");
    }
    Ok(())
}

fn auto_group(
    cfg: &Config,
    source: &SnapshotArgs,
    match_id: &MatchId,
    threshold: u32,
    order: ClusterOrder,
    write: Option<&Path>,
    json: bool,
) -> Result<()> {
    let mut snapshot = load_source(source)?;
    let pool = snapshot.populate(autogroup_pool(&snapshot.trips, match_id))?;
    let groups = cfg.engine().auto_group_trips(&pool, threshold, order);
    let updates = plan_write_back(&groups)?;

    if let Some(path) = write {
        apply_write_back(&mut snapshot.trips, &updates)?;
        write_snapshot(path, &snapshot)?;
        info!(path = %path.display(), updated = updates.len(), "wrote grouped snapshot");
    }

    if json {
        return render::print_json(&AutoGroupReport {
            groups: &groups,
            updates: &updates,
            written_to: write.map(|p| p.display().to_string()),
        });
    }

    println!(
        "# Auto-grouping match {match_id} (threshold {threshold}, {} eligible trips)\n",
        pool.len()
    );
    if groups.is_empty() {
        println!("(no groups formed)");
    }
    for line in render::group_lines(&groups) {
        println!("{line}");
    }
    if let Some(path) = write {
        println!("\nWrote {} ({} trips updated)", path.display(), updates.len());
    }
    Ok(())
}
