use std::path::PathBuf;

use thiserror::Error;

pub const ADDR_VAR: &str = "ADDR";
pub const PORT_VAR: &str = "PORT";
pub const AUTH_TOKEN_VAR: &str = "AUTH_TOKEN";
pub const DEPLOY_SCRIPT_VAR: &str = "DEPLOY_SCRIPT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
}

/// Settings resolved once at startup. Every field is required.
#[derive(Clone)]
pub struct Config {
    pub addr: String,
    pub port: String,
    pub auth_token: String,
    pub deploy_script: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves every setting through `lookup` and reports all missing
    /// names at once rather than stopping at the first.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut require = |name: &'static str| {
            let value = lookup(name);
            if value.is_none() {
                missing.push(name);
            }
            value.unwrap_or_default()
        };

        let addr = require(ADDR_VAR);
        let port = require(PORT_VAR);
        let auth_token = require(AUTH_TOKEN_VAR);
        let deploy_script = require(DEPLOY_SCRIPT_VAR);

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        Ok(Self {
            addr,
            port,
            auth_token,
            deploy_script: PathBuf::from(deploy_script),
        })
    }

    /// `host:port`, with IPv6 literals bracketed so the result can be
    /// handed straight to the listener.
    pub fn bind_address(&self) -> String {
        if self.addr.contains(':') && !self.addr.starts_with('[') {
            format!("[{}]:{}", self.addr, self.port)
        } else {
            format!("{}:{}", self.addr, self.port)
        }
    }
}

// The token is a secret; keep it out of debug output.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("port", &self.port)
            .field("auth_token", &"***")
            .field("deploy_script", &self.deploy_script)
            .finish()
    }
}
