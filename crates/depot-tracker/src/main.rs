use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use depot_session::{hash_secret, DepotBoard, EditSession, SessionHandle};
use depot_store::{snapshot_channel, ActivityLog, DepotStore, MemoryActivityLog, MemoryStore};
use depot_tracker::{init_tracing, load_seed, render_list, TrackerConfig, VERSION};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

fn cli() -> Command {
    Command::new("depot-tracker")
        .version(VERSION)
        .about("Fuel and equipment depot tracker")
        .subcommand_required(true)
        .subcommand(
            Command::new("run")
                .about("Host the depot store headless and run housekeeping until Ctrl-C")
                .long_about(
                    "Host the depot store headless and run housekeeping until Ctrl-C.\n\n\
                     No user session is opened: nothing here passes the PIN or admin gates, \
                     and the host never edits depots. It keeps the store and its snapshot \
                     mirror alive while the backup and retention jobs run.",
                )
                .arg(config_arg())
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("JSON seed or backup file to load into the store"),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("Print depots sorted by name")
                .arg(config_arg())
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("JSON seed or backup file"),
                )
                .arg(
                    Arg::new("exclude")
                        .long("exclude")
                        .action(ArgAction::Append)
                        .help("Depot name to hide (repeatable; replaces the configured excluded_names)"),
                ),
        )
        .subcommand(
            Command::new("hash-secret")
                .about("Print the SHA-256 digest used for the admin password")
                .arg(Arg::new("value").required(true).help("Password or PIN")),
        )
}

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .value_parser(clap::value_parser!(PathBuf))
        .help("TOML configuration file (defaults apply when omitted)")
}

fn load_config(args: &ArgMatches) -> anyhow::Result<TrackerConfig> {
    match args.get_one::<PathBuf>("config") {
        Some(path) => TrackerConfig::load(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(TrackerConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match cli().get_matches().subcommand() {
        Some(("run", args)) => run(args).await,
        Some(("list", args)) => list(args),
        Some(("hash-secret", args)) => {
            let value = args
                .get_one::<String>("value")
                .context("missing value")?;
            println!("{}", hash_secret(value));
            Ok(())
        }
        _ => Ok(()),
    }
}

fn list(args: &ArgMatches) -> anyhow::Result<()> {
    let path = args.get_one::<PathBuf>("seed").context("missing --seed")?;
    let records = load_seed(path)?;

    let mut config = load_config(args)?;
    if let Some(names) = args.get_many::<String>("exclude") {
        config = config.with_excluded_names(names.cloned());
    }

    let mut board = DepotBoard::new();
    let stats = board.apply_snapshot(&records);
    if stats.skipped > 0 {
        eprintln!("skipped {} unreadable record(s)", stats.skipped);
    }
    println!("{}", render_list(&board.list(&config.excluded())));
    Ok(())
}

/// Headless store host. The session below only mirrors snapshots; it is
/// never selected or edited, so no auth gate is consulted.
async fn run(args: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(args)?;
    init_tracing(&config.log_filter, config.json_logs)?;

    let mut store = MemoryStore::new(config.collection.clone());
    if let Some(path) = args.get_one::<PathBuf>("seed") {
        store = store.with_records(load_seed(path)?);
    }
    info!(collection = %config.collection, depots = store.len(), "store ready");
    info!(
        admin_gate = config.auth.admin_password_sha256.is_some(),
        "headless host; no user session opened"
    );

    let store_port: Arc<dyn DepotStore> = Arc::new(store.clone());
    let activity: Arc<dyn ActivityLog> = Arc::new(MemoryActivityLog::new());
    let scheduler = depot_housekeeping::start(
        &config.housekeeping,
        Arc::clone(&store_port),
        Arc::clone(&activity),
        &config.collection,
    );

    let handle = SessionHandle::new(EditSession::new(store_port, activity, "host"));
    let (subscription, snapshots) = snapshot_channel(&store, &config.collection);
    let pump = handle.spawn_snapshot_pump(snapshots);

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;
    info!("shutting down");

    subscription.unsubscribe();
    if let Err(e) = pump.await {
        warn!(error = %e, "snapshot pump ended abnormally");
    }
    let excluded = config.excluded();
    let (remaining, visible) = handle
        .with(|s| (s.board().len(), s.list(&excluded).len()))
        .await;
    info!(depots = remaining, visible, "final depot count");
    scheduler.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_accepts_config_and_repeated_excludes() {
        let matches = cli()
            .try_get_matches_from([
                "depot-tracker", "list", "--config", "tracker.toml", "--seed", "seed.json",
                "--exclude", "admin", "--exclude", "spare",
            ])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "list");
        assert_eq!(
            args.get_one::<PathBuf>("config"),
            Some(&PathBuf::from("tracker.toml"))
        );
        let excluded: Vec<&String> = args.get_many::<String>("exclude").unwrap().collect();
        assert_eq!(excluded, ["admin", "spare"]);
    }

    #[test]
    fn missing_config_defaults() {
        let matches = cli().try_get_matches_from(["depot-tracker", "run"]).unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(load_config(args).unwrap(), TrackerConfig::default());
    }
}
