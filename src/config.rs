use chrono::{FixedOffset, Offset, Utc};
use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::analytics::ReferenceData;
use crate::board::{AppMapping, ListRef, Member};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  /// Local UTC offset used for hours and shifts (e.g. "+07:00")
  #[serde(default = "utc", deserialize_with = "deserialize_offset")]
  pub timezone: FixedOffset,
  #[serde(default)]
  pub log: LogConfig,
  #[serde(default)]
  pub members: Vec<Member>,
  #[serde(default)]
  pub lists: Vec<ListRef>,
  #[serde(default)]
  pub apps: Vec<AppMapping>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
  /// Default filter when RUST_LOG is not set
  #[serde(default = "default_log_level")]
  pub level: String,
  /// Write daily log files here instead of stderr
  pub directory: Option<PathBuf>,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      directory: None,
    }
  }
}

fn default_log_level() -> String {
  "warn".to_string()
}

fn utc() -> FixedOffset {
  Utc.fix()
}

fn deserialize_offset<'de, D>(deserializer: D) -> Result<FixedOffset, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let raw = String::deserialize(deserializer)?;
  parse_offset(&raw).map_err(serde::de::Error::custom)
}

/// Parse "+07:00", "-0530", "+7" or "Z"
pub fn parse_offset(raw: &str) -> std::result::Result<FixedOffset, String> {
  let raw = raw.trim();
  if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
    return Ok(utc());
  }

  let (sign, rest) = if let Some(rest) = raw.strip_prefix('+') {
    (1, rest)
  } else if let Some(rest) = raw.strip_prefix('-') {
    (-1, rest)
  } else {
    return Err(format!("invalid UTC offset '{}', expected e.g. +07:00", raw));
  };

  let digits: String = rest.chars().filter(|c| *c != ':').collect();
  let (hours, minutes) = match digits.len() {
    1 | 2 => (digits.as_str(), "0"),
    4 => digits.split_at(2),
    _ => return Err(format!("invalid UTC offset '{}', expected e.g. +07:00", raw)),
  };

  let hours: i32 = hours
    .parse()
    .map_err(|_| format!("invalid UTC offset hours in '{}'", raw))?;
  let minutes: i32 = minutes
    .parse()
    .map_err(|_| format!("invalid UTC offset minutes in '{}'", raw))?;

  FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
    .ok_or_else(|| format!("UTC offset out of range: '{}'", raw))
}

impl Default for Config {
  fn default() -> Self {
    Self {
      timezone: utc(),
      log: LogConfig::default(),
      members: Vec::new(),
      lists: Vec::new(),
      apps: Vec::new(),
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./cardpulse.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/cardpulse/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/cardpulse/config.yaml\n\
                 See cardpulse.example.yaml for the format."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("cardpulse.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("cardpulse").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn from_yaml(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents).map_err(|e| eyre!("{}", e))?;
    Ok(config)
  }

  /// Reference tables and clock for the analytics engine
  pub fn reference_data(&self) -> ReferenceData {
    ReferenceData::new(
      self.members.clone(),
      self.lists.clone(),
      &self.apps,
      self.timezone,
    )
  }
}
