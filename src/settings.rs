use std::path::PathBuf;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

const ENV_PREFIX: &str = "LLMS";

const DEFAULT_OUTPUT_DIR: &str = "docs";
const DEFAULT_HOST: &str = "help.getzep.com";
const DEFAULT_URL_SUFFIX: &str = "/llms.txt";
const DEFAULT_FILE_SUFFIX: &str = "_llms.txt";
const DEFAULT_TIMEOUT_SECS: i64 = 10;

/// Everything a run needs, resolved from defaults, `LLMS_*` env vars and CLI flags.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub sitemap: PathBuf,
    pub output_dir: PathBuf,
    /// Substring a `<loc>` must contain to be fetched.
    pub host: String,
    /// Appended to each `<loc>` to build the fetch URL.
    pub url_suffix: String,
    /// Appended to the last path segment to build the output file name.
    pub file_suffix: String,
    pub timeout_secs: u64,
}

/// Values supplied on the command line; `None` falls through to env/defaults.
#[derive(Debug, Default)]
pub struct Overrides {
    pub sitemap: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub host: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Settings {
    pub fn load(overrides: Overrides) -> Result<Self> {
        Self::from_sources(overrides, Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    fn from_sources(overrides: Overrides, env: Environment) -> Result<Self> {
        let cfg = Config::builder()
            .set_default("output_dir", DEFAULT_OUTPUT_DIR)?
            .set_default("host", DEFAULT_HOST)?
            .set_default("url_suffix", DEFAULT_URL_SUFFIX)?
            .set_default("file_suffix", DEFAULT_FILE_SUFFIX)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .add_source(env)
            .set_override_option("sitemap", overrides.sitemap.map(path_string))?
            .set_override_option("output_dir", overrides.output_dir.map(path_string))?
            .set_override_option("host", overrides.host)?
            .set_override_option("timeout_secs", overrides.timeout_secs.map(|s| s as i64))?
            .build()
            .context("Failed to build settings")?;

        let settings: Settings = cfg
            .try_deserialize()
            .context("Invalid settings (is the sitemap path set?)")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        ensure!(!self.host.is_empty(), "host filter must not be empty");
        ensure!(!self.url_suffix.is_empty(), "url_suffix must not be empty");
        ensure!(self.timeout_secs > 0, "timeout_secs must be greater than zero");
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn path_string(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}
