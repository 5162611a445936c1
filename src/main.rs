mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use hostlink_integration::{Backend, HostContext, ManagerRegistry, ManagerState};
use hostlink_metrics::{MetricsBackend, MetricsManager};
use hostlink_push::{PushBackend, PushManager};
use hostlink_search::{SearchBackend, SearchManager};
use tracing::debug;

use crate::cli::{Cli, Command};

const INSTANCE_NAME: &str = "hostlink-cli";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _guard = match hostlink_common::logging::init(cli.log_dir.as_deref(), cli.json) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("hostlink: {err:#}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli).await {
        eprintln!("hostlink: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let host = match cli.dir {
        Some(dir) => HostContext::new(INSTANCE_NAME, dir),
        None => HostContext::from_current_dir(INSTANCE_NAME)
            .context("failed to resolve working directory")?,
    };
    debug!(dir = %host.working_dir().display(), command = ?cli.command, "running");

    match cli.command {
        Command::Init => init(&host),
        Command::Status => status(&host).await,
        Command::Ping { message } => ping(&host, &message).await,
        Command::Probe => probe(&host).await,
    }
}

fn init(host: &HostContext) -> Result<()> {
    let store = host.config_store();
    bootstrap(&store, &SearchBackend)?;
    bootstrap(&store, &PushBackend)?;
    bootstrap(&store, &MetricsBackend)?;
    Ok(())
}

fn bootstrap<B: Backend>(store: &hostlink_common::ConfigStore, backend: &B) -> Result<()> {
    backend
        .load_config(store)
        .with_context(|| format!("failed to bootstrap {} config", backend.name()))?;
    println!(
        "{:<8} {}",
        backend.name(),
        store.path_for(backend.config_file()).display()
    );
    Ok(())
}

fn registry(host: &HostContext) -> Result<ManagerRegistry> {
    let mut registry = ManagerRegistry::new();
    registry.register(SearchManager::new(SearchBackend, host))?;
    registry.register(PushManager::new(PushBackend, host))?;
    registry.register(MetricsManager::new(MetricsBackend, host))?;
    Ok(registry)
}

async fn status(host: &HostContext) -> Result<()> {
    let mut registry = registry(host)?;
    registry.attach_all().await;

    for name in registry.names() {
        let Some(manager) = registry.get(name) else {
            continue;
        };
        match (manager.state(), manager.last_failure()) {
            (ManagerState::Unattached, Some(err)) => {
                println!(
                    "{:<8} {:<10} {}",
                    name,
                    manager.state(),
                    hostlink_common::error_chain(err)
                );
            }
            (state, _) => println!("{name:<8} {state}"),
        }
    }

    registry.shutdown().await;
    Ok(())
}

async fn ping(host: &HostContext, message: &str) -> Result<()> {
    let mut manager = MetricsManager::new(MetricsBackend, host);
    manager.attach().await;

    let Some(client) = manager.client() else {
        bail!("metrics integration is not attached; see the log for the reason");
    };
    client.write_ping(message);
    println!("queued ping {message:?} for {}", client.endpoint());

    manager.detach().await;
    Ok(())
}

async fn probe(host: &HostContext) -> Result<()> {
    let mut manager = SearchManager::new(SearchBackend, host);
    manager.attach().await;

    let Some(client) = manager.client() else {
        bail!("search integration is not attached; see the log for the reason");
    };
    let outcome = client.ping().await;
    let node = client.node_url().to_string();
    manager.detach().await;

    match outcome {
        Ok(true) => {
            println!("{node} responded");
            Ok(())
        }
        Ok(false) => bail!("{node} is not responding"),
        Err(err) => Err(err.context(format!("{node} is unreachable"))),
    }
}
