//! Hardware abstraction layer for the deadbolt door lock controller.
//!
//! This crate defines trait seams for the three physical collaborators the
//! controller core consumes - the serial-attached proximity-card reader, the
//! multiplexed indicator/alarm/lock output panel, and the wipe trigger
//! button - plus a wrapping-millisecond clock used for window arithmetic.
//! Mock implementations are provided for development and testing without
//! physical hardware.
//!
//! # Design Philosophy
//!
//! - **Async-first**: all I/O operations are asynchronous using native
//!   `async fn` in traits (Edition 2024 RPITIT).
//! - **Thread-safe**: device traits require `Send + Sync` for use with Tokio.
//! - **Error-aware**: operations return `Result<T>` with detailed error
//!   information.
//!
//! The controller never sees bit-level reader protocol, output-line
//! multiplexing, or debouncing - those belong to the implementations behind
//! these traits.
//!
//! # Examples
//!
//! ```no_run
//! use deadbolt_hardware::traits::{CardReader, ControlPanel};
//! use deadbolt_hardware::types::{IndicatorColor, LockState};
//! use deadbolt_hardware::error::Result;
//!
//! async fn open_for<R: CardReader, P: ControlPanel>(
//!     reader: &mut R,
//!     panel: &mut P,
//! ) -> Result<()> {
//!     if let Some(scan) = reader.poll().await? {
//!         let _ = scan.id_hex();
//!         panel.set_indicator(IndicatorColor::Green).await?;
//!         panel.set_lock(LockState::Released).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

pub use clock::{MillisClock, TokioClock, elapsed_ms};
pub use error::{HardwareError, Result};
pub use traits::{CardReader, CardScan, ControlPanel, ReaderInfo, WipeTrigger};
pub use types::{IndicatorColor, LockState};
