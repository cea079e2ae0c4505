//! Console configuration: one command-line flag plus environment tuning.
//!
//! The only flag is `--radio`. Everything else comes from environment
//! variables (or a `.env` file via `dotenvy`) and falls back to defaults
//! when unset or unparsable.

use std::time::Duration;

use clap::Parser;

use crate::domain::{DISCOVER_SENTINEL, RadioAddress};
use crate::error::Result;
use crate::relay::{DEFAULT_UPDATE_CAPACITY, MAX_UPDATE_CAPACITY};
use crate::render::ColorMode;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "flex-console", version, about = "Interactive radio command console")]
pub struct Cli {
    /// Radio to connect to, or `:discover:` to use the first one found
    #[arg(long, default_value = DISCOVER_SENTINEL)]
    pub radio: RadioAddress,
}

/// Top-level console configuration.
///
/// Loaded once at startup via [`ConsoleConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Radio to connect to.
    pub radio: RadioAddress,

    /// Capacity of the state-update channel, within `1..=MAX_UPDATE_CAPACITY`.
    pub update_capacity: usize,

    /// Object prefix the update relay subscribes to (empty = all).
    pub subscription_prefix: String,

    /// Upper bound on a command round trip; `None` waits forever.
    pub command_timeout: Option<Duration>,

    /// Commands sent once the client is running, before input is read.
    pub startup_commands: Vec<String>,

    /// Prompt shown before each input line.
    pub prompt: String,

    /// Whether console lines are styled.
    pub color: ColorMode,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            radio: RadioAddress::Discover,
            update_capacity: DEFAULT_UPDATE_CAPACITY,
            subscription_prefix: String::new(),
            command_timeout: None,
            startup_commands: vec!["sub slice all".to_string()],
            prompt: "flex> ".to_string(),
            color: ColorMode::Auto,
        }
    }
}

impl ConsoleConfig {
    /// Loads configuration for `radio` from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ConsoleError::Config`] if
    /// `FLEX_CONSOLE_COLOR` is set to an unknown mode.
    pub fn from_env(radio: RadioAddress) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(radio, |key| std::env::var(key).ok())
    }

    /// Loads configuration using `lookup` to resolve variables.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ConsoleError::Config`] if the color mode is
    /// not recognized.
    pub fn from_lookup<F>(radio: RadioAddress, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let update_capacity =
            parse_var(&lookup, "FLEX_CONSOLE_UPDATE_CAPACITY", defaults.update_capacity)
                .clamp(1, MAX_UPDATE_CAPACITY);

        let subscription_prefix =
            lookup("FLEX_CONSOLE_SUBSCRIPTION_PREFIX").unwrap_or(defaults.subscription_prefix);

        let timeout_ms: u64 = parse_var(&lookup, "FLEX_CONSOLE_COMMAND_TIMEOUT_MS", 0);
        let command_timeout = (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms));

        let startup_commands = lookup("FLEX_CONSOLE_STARTUP_COMMANDS")
            .map(|raw| split_commands(&raw))
            .unwrap_or(defaults.startup_commands);

        let prompt = lookup("FLEX_CONSOLE_PROMPT").unwrap_or(defaults.prompt);

        let color = match lookup("FLEX_CONSOLE_COLOR") {
            Some(raw) => raw.parse()?,
            None => defaults.color,
        };

        Ok(Self {
            radio,
            update_capacity,
            subscription_prefix,
            command_timeout,
            startup_commands,
            prompt,
            color,
        })
    }
}

/// Parses a variable as `T`, returning `default` on missing or invalid
/// values.
fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Splits a `;`-separated command list, skipping blank entries.
fn split_commands(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}
