//! Platform independent core of the VideoHQ front-ends.
//!
//! Everything that decides *what* the user sees lives here: URL validation, the typed request
//! client, quality gating, the ad countdown, the processing job poller, the two controller
//! sessions and the view model rendered from them. The browser site and the command line
//! front-end only provide a [`Transport`], a [`Ticker`] and a way to draw a view model.

pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod gate;
pub mod platform;
pub mod poller;
pub mod quality;
pub mod session;
pub mod timer;
pub mod toast;
pub mod transcript;
pub mod transport;
pub mod validate;
pub mod view;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{Error, Surface};
pub use timer::{CancelToken, TaskSlot, Ticker};
pub use transport::{RawResponse, Transport, TransportError};
