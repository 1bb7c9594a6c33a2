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

//! Appenders for log records.

use std::fmt;

use crate::Error;
use crate::Level;
use crate::Record;
use crate::kv::Attr;

pub mod daily_file;
mod dispatch;
mod pool;
mod terminal;

pub use self::daily_file::DailyFile;
pub use self::daily_file::DailyFileBuilder;
pub use self::dispatch::Dispatch;
pub use self::terminal::Terminal;

/// A sink that accepts log records.
///
/// Decorating an appender with [`with_attrs`](Append::with_attrs) or
/// [`with_group`](Append::with_group) never mutates it; a new appender is returned instead.
pub trait Append: fmt::Debug + Send + Sync + 'static {
    /// Whether a record at `level` would be accepted.
    fn enabled(&self, level: Level) -> bool;

    /// Dispatch a log record to the append target.
    ///
    /// Callers are expected to check [`enabled`](Append::enabled) first.
    fn append(&self, record: &Record) -> Result<(), Error>;

    /// Return a copy of this appender with `attrs` bound to every record.
    fn with_attrs(&self, attrs: &[Attr]) -> Box<dyn Append>;

    /// Return a copy of this appender that qualifies subsequent attributes with `name`.
    fn with_group(&self, name: &str) -> Box<dyn Append>;

    /// Flush any buffered records.
    ///
    /// Default to a no-op.
    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}

impl<T: Append> From<T> for Box<dyn Append> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}
