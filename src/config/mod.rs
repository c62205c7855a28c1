mod basic;
mod http;
mod trust_proxy;

pub use basic::BasicConfig;
pub use http::HttpConfig;
pub use trust_proxy::TrustProxy;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// HTTP shell settings (see `http` table in config.toml).
    #[serde(default)]
    pub http: HttpConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "MODCATALOG_";

impl Config {
    /// Builds a Figment that merges defaults, an optional config TOML file and the environment.
    ///
    /// Precedence (lowest first): defaults, `config.toml`, `MODCATALOG_*` variables
    /// (`__` separates sections, e.g. `MODCATALOG_BASIC__LISTEN_PORT`), then the
    /// unprefixed `TRUST_PROXY` and `APP_ENV` variables.
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(
                Env::raw()
                    .only(&["TRUST_PROXY"])
                    .map(|_| "http.trust_proxy".into()),
            )
            .merge(
                Env::raw()
                    .only(&["APP_ENV"])
                    .map(|_| "basic.environment".into()),
            )
    }

    /// Loads configuration from defaults, optional `config.toml` and the environment.
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    /// Development mode exposes error details in HTTP responses.
    pub fn is_development(&self) -> bool {
        self.basic.environment.eq_ignore_ascii_case("development")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overrides_defaults() {
        let cfg: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(
                r#"
                [basic]
                listen_port = 9000
                environment = "development"

                [http]
                trust_proxy = 2
                public_dir = "static"
                "#,
            ))
            .extract()
            .expect("valid config");

        assert_eq!(cfg.basic.listen_port, 9000);
        assert!(cfg.is_development());
        assert_eq!(cfg.http.trust_proxy, TrustProxy::Hops(2));
        assert_eq!(cfg.http.public_dir, PathBuf::from("static"));
        assert_eq!(cfg.http.built_dir, PathBuf::from("built"));
    }

    #[test]
    fn defaults_are_production_without_proxy_trust() {
        let cfg = Config::default();
        assert!(!cfg.is_development());
        assert_eq!(cfg.http.trust_proxy, TrustProxy::Disabled);
        assert_eq!(cfg.basic.database_url, "sqlite://modcatalog.db");
    }
}
