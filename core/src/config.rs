use std::path::{Path, PathBuf};
use std::result::Result as StdResult;
use std::time::Duration;

use anyhow::Context as _;
use serde::{de, Deserialize, Deserializer};

use crate::duration::parse_duration;
use crate::testing::TestRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

/// Defaults read from `harn.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    #[serde(skip)]
    pub source_config_file: Option<PathBuf>,
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    pub hash: bool,
    pub verbose: bool,
    pub silent: bool,
    pub color: ColorChoice,
    pub fail_exit: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_config_file: None,
            timeout: TestRunner::DEFAULT_EXEC_TIME_LIMIT,
            hash: false,
            verbose: false,
            silent: false,
            color: ColorChoice::default(),
            fail_exit: false,
        }
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> StdResult<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(de::Error::custom)
}

impl Config {
    pub const FILENAME: &str = "harn.toml";

    pub fn from_toml(s: &str) -> StdResult<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn from_toml_file(filepath: PathBuf) -> anyhow::Result<Self> {
        let toml = fsutil::read_to_string(&filepath).context("Cannot read a file")?;
        let mut cfg = Self::from_toml(&toml)
            .with_context(|| format!("Invalid config TOML: {:?}", filepath))?;
        cfg.source_config_file = Some(filepath);
        Ok(cfg)
    }

    /// Find config file ancestor dirs, including current dir.
    pub fn find_file_in_ancestors(cur_dir: impl AsRef<Path>) -> Option<PathBuf> {
        cur_dir
            .as_ref()
            .ancestors()
            .map(|dir| dir.join(Self::FILENAME))
            .find(|path| path.is_file())
    }

    /// Load the first config found in `cur_dir`'s ancestors, then `fallback_dir`.
    /// No file at all gives the defaults.
    pub fn load(cur_dir: impl AsRef<Path>, fallback_dir: Option<&Path>) -> anyhow::Result<Self> {
        let filepath = Self::find_file_in_ancestors(cur_dir).or_else(|| {
            fallback_dir
                .map(|dir| dir.join(Self::FILENAME))
                .filter(|path| path.is_file())
        });
        match filepath {
            Some(path) => {
                log::info!("Loading config {:?}", path);
                Self::from_toml_file(path)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testutil::write_file;

    #[test]
    fn empty_toml_should_give_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert_eq!(cfg.color, ColorChoice::Auto);
    }

    #[test]
    fn should_parse_all_keys() {
        let cfg = Config::from_toml(
            r#"
            timeout = "1m30s"
            hash = true
            verbose = true
            silent = true
            color = "never"
            fail_exit = true
            "#,
        )
        .unwrap();

        let Config {
            source_config_file,
            timeout,
            hash,
            verbose,
            silent,
            color,
            fail_exit,
        } = cfg;
        assert_eq!(source_config_file, None);
        assert_eq!(timeout, Duration::from_secs(90));
        assert!(hash && verbose && silent && fail_exit);
        assert_eq!(color, ColorChoice::Never);
    }

    #[test]
    fn should_reject_bad_values() {
        assert!(Config::from_toml(r#"timeout = "soon""#).is_err());
        assert!(Config::from_toml(r#"color = "sometimes""#).is_err());
        assert!(Config::from_toml("retries = 3").is_err());
    }

    #[test]
    fn should_find_config_in_ancestors() {
        let root = tempfile::tempdir().unwrap();
        write_file(root.path(), Config::FILENAME, "timeout = \"2s\"\n");
        let sub = root.path().join("a").join("b");
        std::fs::create_dir_all(&sub).unwrap();

        let cfg = Config::load(&sub, None).unwrap();
        assert_eq!(cfg.timeout, Duration::from_secs(2));
        assert_eq!(
            cfg.source_config_file,
            Some(root.path().join(Config::FILENAME))
        );
    }

    #[test]
    fn should_use_fallback_dir_then_defaults() {
        let cwd = tempfile::tempdir().unwrap();
        let user = tempfile::tempdir().unwrap();

        let cfg = Config::load(cwd.path(), Some(user.path())).unwrap();
        assert_eq!(cfg, Config::default());

        write_file(user.path(), Config::FILENAME, "hash = true\n");
        let cfg = Config::load(cwd.path(), Some(user.path())).unwrap();
        assert!(cfg.hash);
    }

    #[test]
    fn invalid_file_should_be_error_with_path() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), Config::FILENAME, "hash = 1\n");
        let err = Config::load(dir.path(), None).unwrap_err();
        assert!(format!("{:#}", err).contains(Config::FILENAME));
    }
}
