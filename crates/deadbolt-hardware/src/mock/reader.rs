//! Mock proximity-card reader.

use crate::{
    Result,
    traits::{CardReader, CardScan, ReaderInfo},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

/// Mock card reader for testing and development.
///
/// Scans queued through the handle are returned one per `poll` call, which
/// matches the non-blocking contract of the real reader: no card in the
/// field means `Ok(None)`, immediately.
///
/// # Examples
///
/// ```
/// use deadbolt_hardware::mock::MockReader;
/// use deadbolt_hardware::traits::CardReader;
///
/// #[tokio::main]
/// async fn main() -> deadbolt_hardware::Result<()> {
///     let (mut reader, handle) = MockReader::new();
///
///     assert!(reader.poll().await?.is_none());
///
///     handle.present(vec![0x04, 0xab, 0xcd, 0xef]).await?;
///     let scan = reader.poll().await?.expect("card queued");
///     assert_eq!(scan.id_hex(), "04ABCDEF");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockReader {
    scan_rx: mpsc::Receiver<CardScan>,
    probe_ok: Arc<AtomicBool>,
    name: String,
}

impl MockReader {
    /// Create a new mock reader with the default name.
    pub fn new() -> (Self, MockReaderHandle) {
        Self::with_name("Mock Card Reader".to_string())
    }

    /// Create a new mock reader with a custom name.
    pub fn with_name(name: String) -> (Self, MockReaderHandle) {
        let (scan_tx, scan_rx) = mpsc::channel(32);
        let probe_ok = Arc::new(AtomicBool::new(true));

        let reader = Self {
            scan_rx,
            probe_ok: probe_ok.clone(),
            name: name.clone(),
        };

        let handle = MockReaderHandle {
            scan_tx,
            probe_ok,
            name,
        };

        (reader, handle)
    }
}

impl CardReader for MockReader {
    async fn poll(&mut self) -> Result<Option<CardScan>> {
        match self.scan_rx.try_recv() {
            Ok(scan) => Ok(Some(scan)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(
                crate::HardwareError::disconnected("reader scan channel closed"),
            ),
        }
    }

    async fn probe(&mut self) -> Result<ReaderInfo> {
        if !self.probe_ok.load(Ordering::SeqCst) {
            return Err(crate::HardwareError::probe_failed(
                "reader did not respond to identification",
            ));
        }
        Ok(ReaderInfo::new(self.name.clone()).with_firmware_version("mock-1.0"))
    }
}

/// Handle for controlling a [`MockReader`].
#[derive(Debug, Clone)]
pub struct MockReaderHandle {
    scan_tx: mpsc::Sender<CardScan>,
    probe_ok: Arc<AtomicBool>,
    name: String,
}

impl MockReaderHandle {
    /// Queue a card presentation.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is empty or the reader has been
    /// dropped.
    pub async fn present(&self, raw_id: Vec<u8>) -> Result<()> {
        let scan = CardScan::new(raw_id)?;
        self.scan_tx
            .send(scan)
            .await
            .map_err(|_| crate::HardwareError::disconnected("reader scan channel closed"))
    }

    /// Make subsequent probes fail, simulating a dead reader at boot.
    pub fn fail_probe(&self) {
        self.probe_ok.store(false, Ordering::SeqCst);
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
