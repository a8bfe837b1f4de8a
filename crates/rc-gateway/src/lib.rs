pub mod bootstrap;
pub mod config;
pub mod flow;
pub mod http;
pub mod mock;
#[cfg(feature = "session-cache")]
pub mod session;
pub mod wire;
