use std::path::Path;

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use xplorer::XplorerConfig;

/// Prefix of environment overrides; nested keys use `__`.
pub const ENV_PREFIX: &str = "XPLORER_";

/// Values given on the command line, applied last.
#[derive(Debug, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub page_size: Option<u32>,
}

/// Layered config: defaults -> YAML file -> `XPLORER_*` env -> CLI overrides.
pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<XplorerConfig> {
    let mut figment = Figment::from(Serialized::defaults(XplorerConfig::default()));

    if let Some(path) = path {
        if !path.is_file() {
            bail!("config file does not exist: {}", path.display());
        }
        figment = figment.merge(Yaml::file(path));
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    if let Some(url) = &overrides.api_url {
        figment = figment.merge(Serialized::default("api_base_url", url));
    }
    if let Some(size) = overrides.page_size {
        figment = figment.merge(Serialized::default("page_size", size));
    }

    let config: XplorerConfig = figment.extract().context("invalid configuration")?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::time::Duration;

    #[test]
    fn test_defaults_without_sources() {
        Jail::expect_with(|_jail| {
            let cfg = load(None, &Overrides::default()).map_err(|e| e.to_string())?;
            assert_eq!(cfg, XplorerConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_layers_apply_in_order() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "xplorer.yaml",
                r#"
api_base_url: "http://from-file:8000"
page_size: 20
enrichment:
  lookup_delay: "2s"
"#,
            )?;
            jail.set_env("XPLORER_PAGE_SIZE", "30");
            jail.set_env("XPLORER_ENRICHMENT__CACHE_HIT_DELAY", "5ms");

            let overrides = Overrides {
                api_url: Some("http://from-cli:9000".to_owned()),
                page_size: None,
            };
            let cfg = load(Some(Path::new("xplorer.yaml")), &overrides)
                .map_err(|e| e.to_string())?;

            assert_eq!(cfg.api_base_url, "http://from-cli:9000");
            assert_eq!(cfg.page_size, 30);
            assert_eq!(cfg.enrichment.lookup_delay, Duration::from_secs(2));
            assert_eq!(cfg.enrichment.cache_hit_delay, Duration::from_millis(5));
            assert_eq!(cfg.geo_base_url, "http://ip-api.com");
            Ok(())
        });
    }

    #[test]
    fn test_out_of_range_page_size_is_rejected() {
        Jail::expect_with(|_jail| {
            let overrides = Overrides {
                api_url: None,
                page_size: Some(0),
            };
            let err = load(None, &overrides).unwrap_err();
            assert!(err.to_string().contains("page_size"));
            Ok(())
        });
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        Jail::expect_with(|_jail| {
            let err = load(Some(Path::new("nope.yaml")), &Overrides::default()).unwrap_err();
            assert!(err.to_string().contains("does not exist"));
            Ok(())
        });
    }
}
