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

//! Color utilities.

use std::io;
use std::io::Write;

use colored::Color;

use crate::Level;

/// The escape sequence that ends every colored record.
pub const RESET: &str = "\x1b[0m";

/// Colors for different log levels.
#[derive(Debug, Clone)]
pub struct LevelColor {
    /// Color for error level logs.
    pub error: Color,
    /// Color for warning level logs.
    pub warn: Color,
    /// Color for info level logs.
    pub info: Color,
    /// Color for everything below info: debug and trace.
    pub debug: Color,
}

impl Default for LevelColor {
    fn default() -> Self {
        Self {
            error: Color::Red,
            warn: Color::Yellow,
            info: Color::Blue,
            debug: Color::BrightBlack,
        }
    }
}

impl LevelColor {
    /// The color chosen for `level`.
    pub fn color(&self, level: Level) -> Color {
        match level {
            Level::Error => self.error,
            Level::Warn => self.warn,
            Level::Info => self.info,
            Level::Debug | Level::Trace => self.debug,
        }
    }

    /// Write the foreground escape sequence for `level`.
    pub fn write_prefix(&self, level: Level, w: &mut impl Write) -> io::Result<()> {
        write!(w, "\x1b[{}m", self.color(level).to_fg_str())
    }
}
