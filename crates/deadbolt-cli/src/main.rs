//! Demo harness: runs the controller over mock hardware with a scripted
//! scan sequence, logging every phase transition and store mutation.
//!
//! ```text
//! RUST_LOG=info cargo run -p deadbolt-cli
//! ```

use std::time::Duration;

use anyhow::Result;
use deadbolt_controller::{Controller, ControllerConfig};
use deadbolt_core::Sha256Digest;
use deadbolt_hardware::TokioClock;
use deadbolt_hardware::mock::{MockPanel, MockReader, MockWipeButton};
use deadbolt_store::FileBackend;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let data_dir = std::env::temp_dir().join("deadbolt-demo");
    info!(dir = %data_dir.display(), "using demo data directory");

    let (reader, reader_handle) = MockReader::new();
    let (panel, panel_handle) = MockPanel::new();
    let (button, _button_handle) = MockWipeButton::new();

    let mut controller = Controller::new(
        reader,
        panel,
        button,
        FileBackend::new(&data_dir)?,
        Sha256Digest,
        TokioClock::new(),
        // Short timings so the demo finishes quickly.
        ControllerConfig::default().with_lock_hold(Duration::from_millis(1000)),
    );

    // Scripted operator session: first scan enrolls the master, then a
    // stranger is denied, then the master enrolls them, then they get in.
    let script = async {
        let master = vec![0x04, 0xa1, 0xb2, 0xc3];
        let visitor = vec![0x04, 0xd4, 0xe5, 0xf6];

        tokio::time::sleep(Duration::from_millis(300)).await;
        info!("presenting first card (becomes master)");
        reader_handle.present(master.clone()).await?;

        tokio::time::sleep(Duration::from_millis(3000)).await;
        info!("presenting unknown card (denied)");
        reader_handle.present(visitor.clone()).await?;

        tokio::time::sleep(Duration::from_millis(2000)).await;
        info!("presenting master (enter program mode)");
        reader_handle.present(master.clone()).await?;

        tokio::time::sleep(Duration::from_millis(1500)).await;
        info!("presenting unknown card (enrolled as user)");
        reader_handle.present(visitor.clone()).await?;

        tokio::time::sleep(Duration::from_millis(1500)).await;
        info!("presenting master (exit program mode)");
        reader_handle.present(master).await?;

        tokio::time::sleep(Duration::from_millis(1500)).await;
        info!("presenting enrolled card (granted)");
        reader_handle.present(visitor).await?;

        tokio::time::sleep(Duration::from_millis(3000)).await;
        anyhow::Ok(())
    };

    tokio::select! {
        result = script => result?,
        () = controller.run() => unreachable!("controller loop never returns"),
    }

    info!(
        records = controller.store().len(),
        commands = panel_handle.commands().len(),
        "demo finished"
    );
    Ok(())
}
