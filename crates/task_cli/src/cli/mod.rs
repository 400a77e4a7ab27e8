use clap::{Parser, Subcommand};
use task_core::config::{ConfigOverrides, canonical_name};

#[derive(Parser, Debug)]
#[command(author, version, about = "Priority task scheduler with dependencies", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a pending task
    ///
    /// Example: tasksched add deploy 2 --depends-on build,test
    /// Example: tasksched add hotfix -1
    Add {
        name: Option<String>,
        #[arg(allow_negative_numbers = true)]
        priority: Option<String>,
        /// Names of tasks that must be completed first (comma separated)
        #[arg(long = "depends-on", value_delimiter = ',', value_name = "NAMES")]
        depends_on: Vec<String>,
        /// Creation timestamp used to break priority ties (defaults to now)
        #[arg(long = "at", value_name = "TIMESTAMP")]
        created_at: Option<String>,
    },
    /// List pending tasks in priority order
    ///
    /// Example: tasksched list
    List,
    /// Mark a task as completed
    ///
    /// Example: tasksched done deploy
    Done { name: String },
    /// Show the highest-priority pending task
    ///
    /// Example: tasksched next
    Next,
    /// List completed tasks in completion order
    ///
    /// Example: tasksched history
    History,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    StorePath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let field =
        canonical_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;
    let value = value_raw.trim().to_string();

    match field.as_str() {
        "theme" => Ok(ParsedConfigOverride {
            target: ConfigOverrideTarget::Theme,
            value,
        }),
        "store_path" | "store" => {
            if value.is_empty() {
                return Err("store_path override cannot be empty".to_string());
            }
            Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::StorePath,
                value,
            })
        }
        other => Err(format!("unknown config field '{other}'")),
    }
}

/// Folds every `--config-override` into one set; later flags win.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::StorePath => overrides.store_path = Some(parsed.value),
        }
    }
    Ok(overrides)
}

/// Splits `--depends-on` values, dropping blanks and surrounding whitespace.
pub fn normalize_dependencies(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
