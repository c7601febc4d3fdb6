//! State of the two controllers.
//!
//! Each session is a plain value changed only through `apply`, so that the site can wrap it in a
//! reducer and the command line can own it directly. The asynchronous flows next to each session
//! take the inputs they need and report through an `emit` callback, one action per change.

pub mod download;
pub mod smart;

pub use download::{DownloadAction, DownloadPhase, DownloadSession, SimulatedProgress};
pub use smart::{AdOverlay, Detection, SmartAction, SmartSession};
