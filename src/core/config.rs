use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    pub local: LocalConfig,
    pub preprocess: PreprocessConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// BLAST URL API endpoint
    pub url: String,
    pub program: String,
    pub database: String,
    pub user_agent: String,
    /// Wait before the first status check
    pub initial_delay_secs: u64,
    /// Wait between status checks
    pub poll_interval_secs: u64,
    /// Upper bound on total waiting per job. Unset means poll forever.
    pub max_wait_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    pub makeblastdb: PathBuf,
    pub blastn: PathBuf,
    /// Extra arguments appended to every blastn invocation
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Leading low-quality bases removed from every trace
    pub trim_leading: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// csv, json or table
    pub format: String,
    /// Pack raw reports into a .tar.gz next to the summary
    pub archive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            local: LocalConfig::default(),
            preprocess: PreprocessConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: "https://blast.ncbi.nlm.nih.gov/Blast.cgi".to_string(),
            program: "blastn".to_string(),
            database: "nt".to_string(),
            // NCBI blocks some non-browser agents
            user_agent: "Mozilla/5.0".to_string(),
            initial_delay_secs: 30,
            poll_interval_secs: 10,
            max_wait_secs: None,
        }
    }
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            makeblastdb: PathBuf::from("makeblastdb"),
            blastn: PathBuf::from("blastn"),
            extra_args: Vec::new(),
        }
    }
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self { trim_leading: 20 }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "csv".to_string(),
            archive: true,
        }
    }
}

/// Longest single wait accepted from a config file
pub const MAX_DELAY_SECS: u64 = 24 * 60 * 60;

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, crate::TracealignError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| crate::TracealignError::Config(format!("Failed to parse config: {}", e)))?;
    validate(&config)?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), crate::TracealignError> {
    let contents = to_toml(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn to_toml(config: &Config) -> Result<String, crate::TracealignError> {
    toml::to_string_pretty(config)
        .map_err(|e| crate::TracealignError::Config(format!("Failed to serialize config: {}", e)))
}

fn validate(config: &Config) -> Result<(), crate::TracealignError> {
    if config.remote.url.trim().is_empty() {
        return Err(crate::TracealignError::Config("remote.url must not be empty".to_string()));
    }
    if config.remote.poll_interval_secs == 0 {
        return Err(crate::TracealignError::Config(
            "remote.poll_interval_secs must be at least 1".to_string(),
        ));
    }
    for (key, value) in [
        ("initial_delay_secs", config.remote.initial_delay_secs),
        ("poll_interval_secs", config.remote.poll_interval_secs),
    ] {
        if value > MAX_DELAY_SECS {
            return Err(crate::TracealignError::Config(format!(
                "remote.{} must be at most {} (one day)",
                key, MAX_DELAY_SECS
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_ncbi_protocol() {
        let config = Config::default();
        assert_eq!(config.remote.initial_delay_secs, 30);
        assert_eq!(config.remote.poll_interval_secs, 10);
        assert_eq!(config.remote.max_wait_secs, None);
        assert_eq!(config.preprocess.trim_leading, 20);
    }

    #[test]
    fn test_round_trip_through_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tracealign.toml");
        let mut config = Config::default();
        config.remote.max_wait_secs = Some(600);
        config.local.extra_args = vec!["-evalue".to_string(), "1e-5".to_string()];

        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("partial.toml");
        std::fs::write(&path, "[remote]\nmax_wait_secs = 120\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.remote.max_wait_secs, Some(120));
        assert_eq!(config.remote.program, "blastn");
        assert_eq!(config.local.blastn, PathBuf::from("blastn"));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.toml");
        std::fs::write(&path, "[remote]\npoll_interval_secs = 0\n").unwrap();

        assert!(matches!(
            load_config(&path),
            Err(crate::TracealignError::Config(_))
        ));
    }

    #[test]
    fn test_day_long_waits_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("slow.toml");
        std::fs::write(&path, "[remote]\npoll_interval_secs = 9223372036854775807\nmax_wait_secs = 600\n").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(crate::TracealignError::Config(ref msg)) if msg.contains("poll_interval_secs")
        ));

        std::fs::write(&path, "[remote]\ninitial_delay_secs = 86401\n").unwrap();
        assert!(load_config(&path).is_err());

        std::fs::write(&path, "[remote]\ninitial_delay_secs = 86400\n").unwrap();
        assert!(load_config(&path).is_ok());
    }
}
