//! Mock device implementations for testing and development.
//!
//! Each mock comes as a (device, handle) pair: the device implements the
//! hardware trait and is handed to the controller; the handle stays with the
//! test or demo harness and drives the simulated hardware.

mod clock;
mod panel;
mod reader;
mod wipe_button;

pub use clock::ManualClock;
pub use panel::{MockPanel, MockPanelHandle, PanelCommand};
pub use reader::{MockReader, MockReaderHandle};
pub use wipe_button::{MockWipeButton, MockWipeButtonHandle};
