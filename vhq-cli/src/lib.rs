//! Headless front-end of VideoHQ. Runs the flows of the browser site against a server from the
//! command line.

pub mod cfg;
pub mod commands;
pub mod transport;
