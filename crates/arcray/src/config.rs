use derive_more::{Deref, Display};
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use palette::Srgba;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;
use uigeom::Size;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseValueError {
    #[error("'{0}' is not a number")]
    Number(String),
    #[error("'{0}' must be positive")]
    NotPositive(String),
    #[error("'{0}' has an unknown unit")]
    Unit(String),
    #[error("'{0}' is not a #RRGGBB or #RRGGBBAA color")]
    Color(String),
}

/// Dimension a ratio radius is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, StrumDisplay)]
#[strum(ascii_case_insensitive)]
pub enum Basis {
    #[strum(to_string = "w", serialize = "width")]
    Width,
    #[strum(to_string = "h", serialize = "height")]
    Height,
}

/// Radius of the arc children are projected onto.
///
/// Written as `"240"` (pixels), `"0.7w"` (ratio of the layout width) or `"0.5h"`.
#[derive(Debug, Clone, Copy, PartialEq, Display, SerializeDisplay, DeserializeFromStr)]
pub enum Radius {
    #[display("{_0}")]
    Absolute(f64),
    #[display("{_0}{_1}")]
    Ratio(f64, Basis),
}

impl Radius {
    pub fn value(&self) -> f64 {
        match self {
            Self::Absolute(v) | Self::Ratio(v, _) => *v,
        }
    }

    pub fn resolve(&self, size: Size) -> f64 {
        match self {
            Self::Absolute(px) => *px,
            Self::Ratio(ratio, Basis::Width) => ratio * size.width,
            Self::Ratio(ratio, Basis::Height) => ratio * size.height,
        }
    }
}

impl Default for Radius {
    fn default() -> Self {
        Self::Ratio(0.7, Basis::Width)
    }
}

impl FromStr for Radius {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (value, unit) = split_quantity(s)?;
        match unit {
            "" | "px" => Ok(Self::Absolute(value)),
            unit => unit
                .parse::<Basis>()
                .map(|basis| Self::Ratio(value, basis))
                .map_err(|_| ParseValueError::Unit(s.to_string())),
        }
    }
}

/// Distance between the centers of two adjacent children.
///
/// `"60"` spaces children 60 px apart along the x axis, `"15deg"` spaces them
/// 15 degrees apart along the arc.
#[derive(Debug, Clone, Copy, PartialEq, Display, SerializeDisplay, DeserializeFromStr)]
pub enum Spacing {
    #[display("{_0}")]
    Linear(f64),
    #[display("{_0}deg")]
    Angular(f64),
}

impl Spacing {
    pub fn value(&self) -> f64 {
        match self {
            Self::Linear(v) | Self::Angular(v) => *v,
        }
    }
}

impl Default for Spacing {
    fn default() -> Self {
        Self::Linear(60.0)
    }
}

impl FromStr for Spacing {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (value, unit) = split_quantity(s)?;
        match unit.to_ascii_lowercase().as_str() {
            "" | "px" => Ok(Self::Linear(value)),
            "deg" | "degrees" => Ok(Self::Angular(value)),
            _ => Err(ParseValueError::Unit(s.to_string())),
        }
    }
}

fn split_quantity(s: &str) -> Result<(f64, &str), ParseValueError> {
    let s = s.trim();
    let split = s
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| ParseValueError::Number(s.to_string()))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(ParseValueError::NotPositive(s.to_string()));
    }
    Ok((value, unit.trim()))
}

#[derive(Debug, Clone, Copy, PartialEq, Deref, SerializeDisplay, DeserializeFromStr)]
pub struct HexColor(Srgba<f64>);

impl HexColor {
    pub fn new(color: Srgba<f64>) -> Self {
        Self(color)
    }
}

impl std::fmt::Display for HexColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let to_byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b, a) = self.0.into_components();
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            to_byte(r),
            to_byte(g),
            to_byte(b),
            to_byte(a)
        )
    }
}

impl FromStr for HexColor {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseValueError::Color(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
            return Err(err());
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map(|v| v as f64 / 255.0)
                .map_err(|_| err())
        };
        let alpha = if hex.len() == 8 { channel(6)? } else { 1.0 };
        Ok(Self(Srgba::new(channel(0)?, channel(2)?, channel(4)?, alpha)))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ArcConfig {
    pub spacing: Spacing,
    pub radius: Radius,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Pointer travel, in px, before a press turns into a drag.
    pub touch_slop: f64,
    /// Release speed (px/s) below which the carousel settles instead of flinging.
    pub min_fling_velocity: f64,
    pub max_fling_velocity: f64,
    pub settle_duration_ms: u64,
    /// Fraction of fling velocity kept per millisecond.
    pub fling_deceleration: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            touch_slop: 8.0,
            min_fling_velocity: 150.0,
            max_fling_velocity: 8000.0,
            settle_duration_ms: 250,
            fling_deceleration: 0.998,
        }
    }
}

impl GestureConfig {
    /// Rejects values the drag and fling physics cannot run with, NaN included.
    pub fn check(&self) -> Result<(), &'static str> {
        if !(self.touch_slop >= 0.0 && self.touch_slop.is_finite()) {
            return Err("gesture.touch_slop must be a finite, non-negative number");
        }
        if !(self.min_fling_velocity >= 0.0
            && self.max_fling_velocity.is_finite()
            && self.max_fling_velocity > self.min_fling_velocity)
        {
            return Err("gesture fling velocities must satisfy 0 <= min < max");
        }
        if self.settle_duration_ms == 0 {
            return Err("gesture.settle_duration_ms must be positive");
        }
        if !(self.fling_deceleration > 0.0 && self.fling_deceleration < 1.0) {
            return Err("gesture.fling_deceleration must be in (0, 1)");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RayConfig {
    pub image: Size,
    pub duration_ms: u64,
}

impl Default for RayConfig {
    fn default() -> Self {
        Self {
            image: Size::new(24.0, 256.0),
            duration_ms: 600,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GlowConfig {
    pub border_width: f64,
    pub glow_width: f64,
    pub border_color: HexColor,
    pub glow_color: HexColor,
}

impl Default for GlowConfig {
    fn default() -> Self {
        Self {
            border_width: 3.0,
            glow_width: 20.0,
            border_color: HexColor::new(Srgba::new(0.74, 1.0, 0.03, 1.0)),
            glow_color: HexColor::new(Srgba::new(0.74, 1.0, 0.0, 0.2)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub arc: ArcConfig,
    pub gesture: GestureConfig,
    pub ray: RayConfig,
    pub glow: GlowConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));
        if let Err(msg) = self.gesture.check() {
            return invalid(msg);
        }
        if self.ray.image.is_empty() {
            return invalid("ray.image must have a positive width and height");
        }
        if self.glow.border_width < 0.0 || self.glow.glow_width < 0.0 {
            return invalid("glow widths must not be negative");
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "antiless", "arcray").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(
            config::Environment::with_prefix("ARCRAY")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let config: Config = s.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

pub fn load_or_default() -> Config {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Falling back to default config: {}", e);
            Config::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<std::path::PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::Sender;

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    // nothing to watch until the user writes a config
    if !config_dir.exists() {
        log::debug!("Config directory {} missing, not watching", config_dir.display());
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}
