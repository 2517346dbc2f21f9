use crossterm::style::{Color, StyledContent, Stylize};
use serde::Deserialize;
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Always,
    Never,
}

impl FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "always" | "color" => Ok(ColorMode::Always),
            "never" | "nocolor" => Ok(ColorMode::Never),
            _ => Err(format!("Invalid color mode: {}", s)),
        }
    }
}

impl ColorMode {
    /// Resolve the effective mode.
    ///
    /// Priority order:
    /// 1. `FORCE_COLOR` (if present)
    /// 2. `NO_COLOR` (if present)
    /// 3. Config file setting
    /// 4. Default (colored)
    pub fn resolve(no_color: bool, force_color: bool, configured: Option<ColorMode>) -> Self {
        if force_color {
            return ColorMode::Always;
        }
        if no_color {
            return ColorMode::Never;
        }
        configured.unwrap_or_default()
    }

    pub fn from_env(configured: Option<ColorMode>) -> Self {
        Self::resolve(
            std::env::var_os("NO_COLOR").is_some(),
            std::env::var_os("FORCE_COLOR").is_some(),
            configured,
        )
    }

    pub fn warn_tag(&self) -> String {
        match self {
            ColorMode::Never => "[WARNING] ".to_string(),
            ColorMode::Always => format!("{} ", badge(" WARNING ", Color::DarkYellow)),
        }
    }

    pub fn err_tag(&self) -> String {
        match self {
            ColorMode::Never => "[ERROR] ".to_string(),
            ColorMode::Always => format!("{} ", badge(" ERROR ", Color::DarkRed)),
        }
    }
}

fn badge(label: &'static str, background: Color) -> StyledContent<&'static str> {
    label.with(Color::White).on(background)
}
