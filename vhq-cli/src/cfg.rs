use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use config::Config;
use http::Uri;
use vhq_client::ClientConfig;

fn default_base_url() -> Uri {
    Uri::from_static("http://127.0.0.1:5000")
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ClientSection {
    /// Root URI of the VideoHQ server.
    #[serde(default = "default_base_url", with = "parse_uri")]
    pub base_url: Uri,

    /// Maximum duration of a single request.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Poll and countdown intervals.
    #[serde(flatten)]
    pub timing: ClientConfig,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: default_request_timeout(),
            timing: ClientConfig::default(),
        }
    }
}

#[derive(serde::Deserialize, Debug, Clone, Default)]
pub struct CliConfig {
    /// Enables debug logging.
    #[serde(default)]
    pub debug: bool,

    /// Connection to the server
    #[serde(default)]
    pub client: ClientSection,
}

/// Parses the configuration of the command line, returning a CliConfig struct.
/// Reads the structured file at `path` if given (toml, yaml, json, etc).
/// Individual values can be overriden by `VHQ_`-prefixed environment variables, with `__`
/// separating nested keys, e.g. `VHQ_CLIENT__BASE_URL`.
pub fn get_config(path: Option<&Path>) -> Result<CliConfig> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::with_name(
            path.to_str()
                .context("Parsing configuration path as a str")?,
        ));
    }

    let config = builder
        .add_source(
            config::Environment::with_prefix("VHQ")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .context("Building the configuration of the CLI from file and environment")?;

    config
        .try_deserialize()
        .context("Deserializing the configuration as CliConfig")
}

/// Parses a base URI given on the command line
pub fn parse_base_url(value: &str) -> Result<Uri> {
    let uri: Uri = value
        .try_into()
        .with_context(|| format!("{value} is an invalid URI"))?;
    if uri.scheme().is_none() || uri.authority().is_none() {
        anyhow::bail!("{value} is not an absolute URI");
    }
    Ok(uri)
}

mod parse_uri {
    use http::Uri;

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(
        d: D,
    ) -> std::result::Result<Uri, D::Error> {
        d.deserialize_str(Visitor {})
    }

    struct Visitor {}

    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = Uri;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            writeln!(formatter, "A valid absolute URI")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            super::parse_base_url(v).map_err(|e| E::custom(format!("{e:#}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    use tempfile::TempDir;

    fn write_config(contents: &str) -> googletest::Result<(TempDir, std::path::PathBuf)> {
        let dir = TempDir::new().or_fail()?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).or_fail()?;
        Ok((dir, path))
    }

    #[googletest::test]
    fn reads_file() -> googletest::Result<()> {
        let (_dir, path) = write_config(
            r#"
            debug = true

            [client]
            base_url = "https://videohq.example.com"
            poll_interval = "250ms"
            ad_tick = "10ms"
            request_timeout = "5s"
            "#,
        )?;

        let config = get_config(Some(path.as_path())).or_fail()?;
        expect_that!(config.debug, eq(true));
        expect_that!(
            config.client.base_url.to_string(),
            eq("https://videohq.example.com/")
        );
        expect_that!(config.client.request_timeout, eq(Duration::from_secs(5)));
        expect_that!(
            config.client.timing.poll_interval,
            eq(Duration::from_millis(250))
        );
        expect_that!(config.client.timing.ad_tick, eq(Duration::from_millis(10)));
        expect_that!(
            config.client.timing.toast_lifetime,
            eq(Duration::from_secs(3))
        );
        Ok(())
    }

    #[googletest::test]
    fn every_key_has_a_default() -> googletest::Result<()> {
        let (_dir, path) = write_config("")?;

        let config = get_config(Some(path.as_path())).or_fail()?;
        expect_that!(config.debug, eq(false));
        expect_that!(
            config.client.base_url.to_string(),
            eq("http://127.0.0.1:5000/")
        );
        expect_that!(
            config.client.timing.poll_interval,
            eq(Duration::from_secs(1))
        );
        Ok(())
    }

    #[googletest::test]
    fn rejects_relative_base_url() -> googletest::Result<()> {
        let (_dir, path) = write_config(
            r#"
            [client]
            base_url = "/api"
            "#,
        )?;

        expect_that!(get_config(Some(path.as_path())), err(anything()));
        Ok(())
    }

    #[googletest::test]
    fn parses_command_line_base_url() {
        expect_that!(parse_base_url("http://localhost:8080"), ok(anything()));
        expect_that!(parse_base_url("localhost"), err(anything()));
    }
}
