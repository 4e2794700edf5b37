pub mod api;
pub mod config;
pub mod consumption;
pub mod error;
pub mod hooks;
pub mod host;
pub mod kernel;
pub mod policy;
pub mod presentation;
pub mod regen;
pub mod runtime;

// Re-export the pieces a host needs to wire the system up
pub use config::{ConfigStore, FlaskConfig};
pub use hooks::HostHooks;
pub use kernel::{ActorId, FlaskCategory, FlaskStateCache};
pub use runtime::FlaskRuntime;
