pub mod ad;
pub mod paywall;
pub mod progress;
pub mod quality;
pub mod section;
pub mod toasts;
pub mod transcript;
