use clap::Parser;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/penny.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the transactions store.
    pub base_url: String,
    /// File receiving tracing output. The terminal is owned by the UI, so
    /// without a file nothing is logged.
    pub log_file: Option<String>,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            log_file: None,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "penny", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:8000).
    #[arg(long)]
    base_url: Option<String>,
    /// Write logs to this file.
    #[arg(long)]
    log_file: Option<String>,
    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    load_from(Args::parse())
}

fn load_from(args: Args) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("PENNY_TUI"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(log_file) = args.log_file {
        settings.log_file = Some(log_file);
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Args {
        let mut argv = vec!["penny"];
        argv.extend_from_slice(list);
        Args::try_parse_from(argv).unwrap()
    }

    fn write_config(name: &str, content: &str) -> String {
        let dir = std::env::temp_dir().join("penny_tui_config_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{name}.toml"));
        std::fs::write(&path, content).unwrap();
        path.display().to_string()
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_from(args(&["--config", "/nonexistent/penny.toml"])).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.log_level, "info");
        assert!(config.log_file.is_none());
    }

    #[test]
    fn file_values_are_read() {
        let path = write_config(
            "file_values",
            "base_url = \"http://store.local:9000\"\nlog_level = \"debug\"\n",
        );
        let config = load_from(args(&["--config", &path])).unwrap();
        assert_eq!(config.base_url, "http://store.local:9000");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn cli_overrides_file() {
        let path = write_config("cli_overrides", "base_url = \"http://store.local:9000\"\n");
        let config = load_from(args(&[
            "--config",
            &path,
            "--base-url",
            "http://10.0.0.2:8000",
            "--log-file",
            "penny.log",
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://10.0.0.2:8000");
        assert_eq!(config.log_file.as_deref(), Some("penny.log"));
    }
}
