//! Webhook receiver that redeploys when a pull request is merged into the
//! production branch.
//!
//! The server exposes a single endpoint, [`app::REDEPLOY_PATH`], guarded by a
//! shared token passed as the `auth-token` query parameter. Qualifying events
//! run the configured deployment script and the response reports whether it
//! succeeded. Every other path answers 404.

pub mod app;
pub mod config;
pub mod deploy;
pub mod event;

pub use app::router;
pub use config::{Config, ConfigError};
pub use deploy::{DeployError, DeployOutput, DeployScript};
pub use event::PullRequestEvent;
