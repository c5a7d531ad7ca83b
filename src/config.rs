use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "handleliste")]
#[command(about = "Runs the handleliste service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".handleliste")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct App {
    database: String,
    port: i32,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub database_auth_token: Option<String>,
    #[serde(default = "default_sync_interval")]
    pub sync_interval_seconds: u64,
}

fn default_sync_interval() -> u64 {
    60
}

impl App {
    pub fn get_db(&self) -> &str {
        &self.database
    }

    pub fn get_port(&self) -> i32 {
        self.port
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub app: App,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let cfg = Config::load_config(path)?;
        Ok(cfg)
    }

    fn load_config(path: &str) -> Result<Config> {
        let yaml_str = fs::read_to_string(path)?;
        let yaml_with_env = Config::substitute_env_vars(&yaml_str)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    /// Replaces `${VAR}` and `${VAR:-default}` references with values from
    /// the environment, so database credentials never live in the file.
    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = String::with_capacity(yaml_str.len());
        let mut rest = yaml_str;

        while let Some(start) = rest.find("${") {
            result.push_str(&rest[..start]);
            rest = &rest[start..];

            let Some(end) = rest.find('}') else {
                // unterminated reference, keep the tail as-is
                break;
            };

            let var_expr = &rest[2..end];
            let value = match var_expr.split_once(":-") {
                Some((name, default)) => env::var(name).unwrap_or_else(|_| default.to_string()),
                None => env::var(var_expr).unwrap_or_else(|_| {
                    tracing::warn!("environment variable '{}' not found", var_expr);
                    String::new()
                }),
            };
            result.push_str(&value);
            rest = &rest[end + 1..];
        }

        result.push_str(rest);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_default_when_var_is_unset() {
        let yaml =
            "app:\n  database: ${HANDLELISTE_UNSET_DB:-shopping.db}\n  port: ${HANDLELISTE_UNSET_PORT:-8080}\n";
        let substituted = Config::substitute_env_vars(yaml).unwrap();
        let cfg: Config = serde_yaml::from_str(&substituted).unwrap();

        assert_eq!(cfg.app.get_db(), "shopping.db");
        assert_eq!(cfg.app.get_port(), 8080);
    }

    #[test]
    fn leaves_plain_yaml_untouched() {
        let yaml = "app:\n  database: shopping.db\n  port: 8080\n";
        assert_eq!(Config::substitute_env_vars(yaml).unwrap(), yaml);
    }
}
