//! hidproxy entry point.
//!
//! Wires the pipeline together and runs the supervisor until Ctrl-C.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  ├─ load config, apply flags, init logging
//!  ├─ provision USB gadget            (configfs, optional)
//!  ├─ report writers                  (one thread per enabled class)
//!  │     ▲ bounded queues: keyboard 10, mouse 100
//!  ├─ DeviceSupervisor                (this task, 1 s tick)
//!  │     └─ capture handlers          (one thread per grabbed device)
//!  └─ disconnect monitor              (udev + BlueZ thread, optional)
//! ```

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hidproxy::application::capture::KeyRepeat;
use hidproxy::application::supervise::{DeviceSupervisor, ReportQueues, SupervisorOptions};
use hidproxy::application::write_reports::spawn_report_writer;
use hidproxy::cli::Cli;
use hidproxy::infrastructure::gadget::writer::HidgSink;
use hidproxy::infrastructure::gadget::{provision, GadgetLayout};
use hidproxy::infrastructure::input_capture::evdev_source::EvdevEnumerator;
use hidproxy::infrastructure::storage::config::load_config;
use hidproxy::infrastructure::udev_monitor::spawn_disconnect_monitor;
use hidproxy_core::ReportClass;

/// Capacity of the supervisor's disconnect-notice inbox.
const NOTICE_QUEUE: usize = 16;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    cli.apply(&mut config);

    // `RUST_LOG` overrides `--loglevel` when present.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.filter_directive())),
        )
        .init();

    info!("hidproxy {} starting", env!("CARGO_PKG_VERSION"));

    // ── Gadget provisioning ───────────────────────────────────────────────────
    if config.gadget.setup {
        let layout = GadgetLayout {
            root: config.gadget.gadget_dir(),
            udc_dir: config.gadget.udc_dir.clone(),
            settle: config.gadget.settle(),
        };
        let summary = tokio::task::spawn_blocking(move || provision(&layout))
            .await
            .context("gadget provisioning task panicked")?
            .context("failed to provision USB gadget")?;
        info!(writes = summary.writes(), "USB gadget provisioned");
    }

    // ── Report writers ────────────────────────────────────────────────────────
    let mut queues = ReportQueues::default();
    if config.capture.keyboard {
        let sink = HidgSink::open(&config.gadget.keyboard_device)
            .context("cannot open keyboard gadget node")?;
        let (tx, rx) = mpsc::channel(config.capture.keyboard_queue.max(1));
        spawn_report_writer(ReportClass::Keyboard, sink, rx)
            .context("failed to spawn keyboard writer")?;
        queues.keyboard = Some(tx);
    }
    if config.capture.mouse {
        let sink = HidgSink::open(&config.gadget.mouse_device)
            .context("cannot open mouse gadget node")?;
        let (tx, rx) = mpsc::channel(config.capture.mouse_queue.max(1));
        spawn_report_writer(ReportClass::Mouse, sink, rx).context("failed to spawn mouse writer")?;
        queues.mouse = Some(tx);
    }
    if queues.keyboard.is_none() && queues.mouse.is_none() {
        warn!("both keyboard and mouse capture are disabled; nothing will be forwarded");
    }

    // ── Disconnect monitor ────────────────────────────────────────────────────
    let (notice_tx, notice_rx) = mpsc::channel(NOTICE_QUEUE);
    if config.bluetooth.monitor {
        spawn_disconnect_monitor(config.bluetooth.adapter.clone(), notice_tx)
            .context("failed to spawn disconnect monitor")?;
    } else {
        drop(notice_tx);
    }

    // ── Supervisor ────────────────────────────────────────────────────────────
    let (delay, period) = config.capture.key_repeat();
    let options = SupervisorOptions {
        keyboard: config.capture.keyboard,
        mouse: config.capture.mouse,
        repeat: KeyRepeat { delay, period },
    };
    let supervisor = DeviceSupervisor::new(EvdevEnumerator::new(), options, queues, notice_rx);

    info!("hidproxy ready.  Press Ctrl-C to exit.");
    supervisor
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("cannot listen for Ctrl-C ({e}); running until killed");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await;

    info!("hidproxy stopped");
    Ok(())
}
