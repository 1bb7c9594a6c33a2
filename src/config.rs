// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration of the process-wide logger.

use std::fmt;
use std::ops::BitOr;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

use crate::Error;
use crate::LevelFilter;
use crate::layout::Layout;
use crate::layout::TextLayout;

const DEFAULT_DIR: &str = "./logs";
const DEFAULT_PREFIX: &str = "app";
const DEFAULT_RETAIN_DAYS: u32 = 30;

/// Where records go. A bit set: `FILE | TERMINAL == BOTH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Output(u8);

impl Output {
    pub const NONE: Output = Output(0);
    pub const FILE: Output = Output(1);
    pub const TERMINAL: Output = Output(1 << 1);
    pub const BOTH: Output = Output(Self::FILE.0 | Self::TERMINAL.0);

    /// Whether every target in `other` is selected.
    pub fn contains(self, other: Output) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl Default for Output {
    fn default() -> Self {
        Output::TERMINAL
    }
}

impl BitOr for Output {
    type Output = Output;

    fn bitor(self, rhs: Output) -> Output {
        Output(self.0 | rhs.0)
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            Output::NONE => "none",
            Output::FILE => "file",
            Output::TERMINAL => "terminal",
            _ => "both",
        };
        f.write_str(s)
    }
}

impl FromStr for Output {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Output::NONE),
            "file" => Ok(Output::FILE),
            "terminal" => Ok(Output::TERMINAL),
            "both" => Ok(Output::BOTH),
            _ => Err(Error::config("unsupported log output").with_context("output", s)),
        }
    }
}

impl TryFrom<String> for Output {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The layout of the file sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Text,
    Json,
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "text" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            _ => Err(Error::config("unsupported log format").with_context("format", s)),
        }
    }
}

/// Configuration of the process-wide logger.
///
/// Missing fields take their defaults, so the struct can be embedded in a host's own config
/// file:
///
/// ```
/// # #[cfg(feature = "layout-json")] {
/// use agentlog::Config;
/// use agentlog::Output;
///
/// let config: Config =
///     serde_json::from_str(r#"{"output": "both", "format": "json", "level": "debug"}"#).unwrap();
/// assert_eq!(config.output, Output::BOTH);
/// assert_eq!(config.retain_days, 30);
/// # }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub output: Output,
    pub dir: PathBuf,
    pub filename_prefix: String,
    /// Days to keep day files. `0` falls back to the default.
    pub retain_days: u32,
    pub format: Format,
    pub level: LevelFilter,
    /// Whether records carry the source file and line.
    pub add_source: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output: Output::default(),
            dir: PathBuf::from(DEFAULT_DIR),
            filename_prefix: DEFAULT_PREFIX.to_owned(),
            retain_days: DEFAULT_RETAIN_DAYS,
            format: Format::default(),
            level: LevelFilter::Info,
            add_source: false,
        }
    }
}

impl Config {
    /// A terminal-only config at `level`.
    pub fn terminal(level: LevelFilter) -> Config {
        Config {
            output: Output::TERMINAL,
            level,
            ..Config::default()
        }
    }

    /// Check the config and fill blank file settings with defaults.
    ///
    /// # Errors
    ///
    /// Return a [`Config`](crate::ErrorKind::Config) error if no output is selected, or if the
    /// JSON format is requested without the `layout-json` feature.
    pub fn validate(mut self) -> Result<Config, Error> {
        if self.output.is_none() {
            return Err(Error::config("output target cannot be none"));
        }

        if self.output.contains(Output::FILE) {
            if self.dir.as_os_str().is_empty() {
                self.dir = PathBuf::from(DEFAULT_DIR);
            }
            if self.filename_prefix.is_empty() {
                self.filename_prefix = DEFAULT_PREFIX.to_owned();
            }
            if self.retain_days == 0 {
                self.retain_days = DEFAULT_RETAIN_DAYS;
            }
        }

        if cfg!(not(feature = "layout-json")) && self.format == Format::Json {
            return Err(
                Error::config("json format requires the layout-json feature")
                    .with_context("format", "json"),
            );
        }

        Ok(self)
    }

    /// The layout of the file sink.
    pub(crate) fn file_layout(&self) -> Layout {
        match self.format {
            #[cfg(feature = "layout-json")]
            Format::Json => crate::layout::JsonLayout::default()
                .add_source(self.add_source)
                .into(),
            _ => self.text_layout().into(),
        }
    }

    pub(crate) fn text_layout(&self) -> TextLayout {
        TextLayout::default().add_source(self.add_source)
    }
}
