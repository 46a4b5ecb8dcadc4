//! Config command - emit the reference configuration, plus the loader
//! shared by the other commands

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use hexconquest_core::MatchConfig;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    let config = MatchConfig::default();

    match &args.output {
        Some(path) => {
            config
                .save(path)
                .with_context(|| format!("Failed to write config: {}", path.display()))?;
            tracing::info!("Wrote reference configuration to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&config)?),
    }

    Ok(())
}

/// Reference configuration, or the given file, with an optional round limit override
pub fn load_config(path: Option<&Path>, max_rounds: Option<u32>) -> Result<MatchConfig> {
    let config = match path {
        Some(path) => MatchConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => MatchConfig::default(),
    };

    let config = match max_rounds {
        Some(rounds) => config.with_max_rounds(rounds),
        None => config,
    };

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_with_override() {
        let config = load_config(None, Some(7)).unwrap();
        assert_eq!(config.max_rounds, 7);
        assert_eq!(config.factions.len(), 4);
    }

    #[test]
    fn test_zero_rounds_override_rejected() {
        assert!(load_config(None, Some(0)).is_err());
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = load_config(Some(Path::new("/nonexistent/hexconquest.json")), None).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
