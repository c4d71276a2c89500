//! Repeater Console
//!
//! Starts every configured repeater against the simulated host, opens its
//! channels, prints the slot table and shuts down again. Useful as a smoke
//! run of the channel lifecycle without telephony hardware.

mod settings;

use std::ffi::OsStr;
use std::path::PathBuf;

use anyhow::Context;
use rpt_bridging::{
    run_repeater_actor, ChannelRegistry, RepeaterCommand, RepeaterEvent, RepeaterInstance,
    SlotSnapshot,
};
use settings::Settings;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repeater=info,rpt_bridging=info,rpt_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let arg = std::env::args_os().nth(1);
    if arg.as_deref() == Some(OsStr::new("--write-default")) {
        Settings::default().save()?;
        if let Some(path) = Settings::settings_path() {
            info!("Wrote default settings to {}", path.display());
        }
        return Ok(());
    }

    let settings = match arg.map(PathBuf::from) {
        Some(path) => Settings::load_from(&path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::load(),
    };

    info!(
        "Starting {} repeater(s) against the simulated host",
        settings.repeaters.len()
    );

    let caps = settings.caps();
    let (event_tx, mut event_rx) = mpsc::channel::<RepeaterEvent>(256);

    let event_log = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                RepeaterEvent::ChannelUp {
                    repeater,
                    kind,
                    endpoint,
                } => info!("{}: {} up ({})", repeater, kind, endpoint),
                RepeaterEvent::ChannelDown {
                    repeater,
                    kind,
                    endpoint,
                } => info!("{}: {} down ({})", repeater, kind, endpoint),
                RepeaterEvent::AcquireFailed {
                    repeater,
                    kind,
                    error,
                } => match kind {
                    Some(kind) => warn!("{}: {} failed: {}", repeater, kind, error),
                    None => warn!("{}: startup failed: {}", repeater, error),
                },
            }
        }
    });

    let mut running = Vec::new();
    for config in settings.repeaters.iter().cloned() {
        let (provider, call_setup) = settings.simulation.build();
        let registry = ChannelRegistry::new(provider, call_setup);
        let instance = RepeaterInstance::new(config);
        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        let name = instance.name().to_string();
        let task = tokio::spawn(run_repeater_actor(
            instance,
            registry,
            caps.clone(),
            cmd_rx,
            event_tx.clone(),
        ));
        running.push((name, cmd_tx, task));
    }
    drop(event_tx);

    for (name, cmd_tx, _) in &running {
        let (response, rx) = oneshot::channel();
        cmd_tx
            .send(RepeaterCommand::Open { response })
            .await
            .context("repeater actor stopped")?;
        if let Err(e) = rx.await.context("repeater actor dropped reply")? {
            error!("{}: could not open channels: {}", name, e);
            continue;
        }

        let (response, rx) = oneshot::channel();
        cmd_tx
            .send(RepeaterCommand::Snapshot { response })
            .await
            .context("repeater actor stopped")?;
        print_snapshot(&rx.await.context("repeater actor dropped reply")?);
    }

    for (name, cmd_tx, task) in running {
        let _ = cmd_tx.send(RepeaterCommand::Shutdown).await;
        let registry = task.await.context("repeater actor panicked")?;
        let provider = registry.provider();
        if provider.live() > 0 {
            error!("{}: {} endpoints left alive", name, provider.live());
        } else {
            info!(
                "{}: {} endpoints requested, all released",
                name,
                provider.requested()
            );
        }
    }

    event_log.await.context("event logger panicked")?;
    Ok(())
}

fn print_snapshot(snapshot: &SlotSnapshot) {
    println!("Repeater {}", snapshot.repeater);
    for (kind, endpoint) in &snapshot.slots {
        println!("  {:<12} {}", kind.name(), endpoint);
    }
    if snapshot.aliased {
        println!("  (txchan shares rxchan)");
    }
    let marker = |ep: Option<rpt_bridging::EndpointId>| {
        ep.map(|e| e.to_string()).unwrap_or_else(|| "-".to_string())
    };
    println!(
        "  hardware rx {}  hardware tx {}",
        marker(snapshot.shadow.rx),
        marker(snapshot.shadow.tx)
    );
}
