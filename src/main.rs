//! arspawn - Tracked-object prefab lifecycle manager
//!
//! Main entry point for the CLI application.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use arspawn::{
    config::Config,
    scene::MemoryScene,
    tracking::{replay::ReplayProvider, udp::UdpProvider},
    TrackerService,
};

/// arspawn - spawn and manage prefabs from object-tracking events
#[derive(Parser, Debug)]
#[command(name = "arspawn", version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSON-lines tracking session and print the resulting scene
    Replay {
        /// Session file, one tracking batch per line
        file: PathBuf,

        /// Also print every scene command as JSON
        #[arg(long)]
        journal: bool,
    },

    /// Receive tracking batches over UDP until Ctrl+C
    Listen {
        /// UDP port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate the configuration and print the prefab table
    Check,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    info!("Starting {} v{}", arspawn::NAME, arspawn::VERSION);

    let mut config = if let Some(ref path) = args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    // Apply CLI overrides
    if let Command::Listen { port: Some(port) } = args.command {
        config.udp.port = port;
    }

    config.validate()?;
    info!(
        "Prefabs: {}, duplicate policy: {:?}",
        config.prefabs.len(),
        config.tracker.duplicate_policy
    );

    match args.command {
        Command::Replay { file, journal } => run_replay(&config, &file, journal),
        Command::Listen { .. } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(run_listen(&config))
        }
        Command::Check => {
            print_registry(&config);
            Ok(())
        }
    }
}

/// Replay a recorded session through the tracker
fn run_replay(config: &Config, file: &Path, journal: bool) -> anyhow::Result<()> {
    let provider = ReplayProvider::from_file(file)?;
    let scene = if journal {
        MemoryScene::with_journal()
    } else {
        MemoryScene::new()
    };
    let mut service = TrackerService::from_config(config, scene);

    service.start(&provider)?;
    let delivered = provider.play();
    service.pump();
    service.stop(&provider);

    info!("Replayed {} batches: {}", delivered, service.totals());

    if journal {
        for command in service.manager().scene().journal() {
            println!("{}", serde_json::to_string(command)?);
        }
    }

    print_scene(&service);
    Ok(())
}

/// Receive batches over UDP and apply them until shutdown
async fn run_listen(config: &Config) -> anyhow::Result<()> {
    let provider = Arc::new(UdpProvider::bind(&config.udp).await?);
    let mut service = TrackerService::from_config(config, MemoryScene::new());
    service.start(provider.as_ref())?;

    let (shutdown_tx, _) = broadcast::channel(1);

    let udp_task = {
        let provider = Arc::clone(&provider);
        let shutdown_rx = shutdown_tx.subscribe();
        let shutdown_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = provider.run(shutdown_rx).await {
                error!("UDP provider error: {}", e);
                let _ = shutdown_tx.send(());
            }
        })
    };

    let service_shutdown = shutdown_tx.subscribe();
    {
        let shutdown_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(());
        });
    }

    service.run(service_shutdown).await;
    service.stop(provider.as_ref());
    udp_task.await?;

    info!(
        "Applied {} batches: {}",
        service.batches_applied(),
        service.totals()
    );
    print_scene(&service);
    service.teardown();

    info!("arspawn stopped");
    Ok(())
}

fn print_scene(service: &TrackerService<MemoryScene>) {
    let manager = service.manager();
    let mut active: Vec<_> = manager.iter().collect();
    active.sort_by(|a, b| a.0.cmp(b.0));

    println!("{} active representation(s)", active.len());
    for (identity, instance) in active {
        let pose = instance.pose();
        println!(
            "  {:<20} {} {:<24} {:<7} pos=[{:.3}, {:.3}, {:.3}]",
            identity.as_str(),
            instance.handle(),
            instance.template(),
            instance.visibility(),
            pose.position.x,
            pose.position.y,
            pose.position.z,
        );
    }
    let counts = manager.scene().counts();
    println!(
        "{} scene command(s): {} spawn, {} pose, {} visibility, {} destroy",
        counts.total(),
        counts.spawns,
        counts.poses,
        counts.visibility_changes,
        counts.destroys
    );
}

fn print_registry(config: &Config) {
    let registry = config.registry();
    println!("{} prefab(s)", registry.len());
    for prefab in registry.iter() {
        let reachable = registry
            .lookup(prefab.name.as_str())
            .map(|first| std::ptr::eq(first, prefab))
            .unwrap_or(false);
        println!(
            "  {:<20} {:<32} destroy_on_removal={}{}",
            prefab.name.as_str(),
            prefab.template,
            prefab.destroy_on_removal,
            if reachable { "" } else { "  (shadowed)" }
        );
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
