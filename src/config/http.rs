use super::TrustProxy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// HTTP shell configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Which forwarding proxies are trusted when resolving the client address.
    /// TOML: `http.trust_proxy`, env: `TRUST_PROXY`. Default: disabled.
    #[serde(default)]
    pub trust_proxy: TrustProxy,

    /// Hand-written static assets, served first (`.html` extension optional).
    /// TOML: `http.public_dir`. Default: `public`.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// Build output (bundled scripts/styles), served after `public_dir`.
    /// TOML: `http.built_dir`. Default: `built`.
    #[serde(default = "default_built_dir")]
    pub built_dir: PathBuf,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            trust_proxy: TrustProxy::default(),
            public_dir: default_public_dir(),
            built_dir: default_built_dir(),
        }
    }
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_built_dir() -> PathBuf {
    PathBuf::from("built")
}
