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

use std::io::Write;
use std::panic::Location;

use crate::Error;
use crate::Level;
use crate::Record;
use crate::append::Append;
use crate::kv::Attr;

/// A logger that hands records to one appender.
///
/// The appender is usually a [`Dispatch`](crate::append::Dispatch) over a terminal and a daily
/// file. [`Logger::with_attrs`] and [`Logger::with_group`] derive a new logger and leave this one
/// untouched.
///
/// This struct also implements [`log::Log`] to bridge the [`log`] crate macros.
///
/// # Examples
///
/// ```
/// use agentlog::Attr;
/// use agentlog::Logger;
/// use agentlog::append::Terminal;
///
/// let logger = Logger::new(Terminal::stderr().no_color());
/// let collector = logger.with_group("collector");
/// collector.info("probe done", &[Attr::new("ms", 12)]);
/// ```
#[derive(Debug)]
pub struct Logger {
    append: Box<dyn Append>,
}

impl Logger {
    /// Create a logger writing to `append`.
    pub fn new(append: impl Into<Box<dyn Append>>) -> Self {
        Self {
            append: append.into(),
        }
    }

    /// Whether a record at `level` would reach any appender.
    pub fn enabled(&self, level: Level) -> bool {
        self.append.enabled(level)
    }

    /// Hand a prepared record to the appender if its level is enabled.
    pub fn handle(&self, record: &Record) -> Result<(), Error> {
        if !self.enabled(record.level()) {
            return Ok(());
        }
        self.append.append(record)
    }

    /// Log `message` with `attrs` at `level`, recording the caller's location.
    ///
    /// Unlike the level helpers, failures are returned to the caller.
    #[track_caller]
    pub fn log(&self, level: Level, message: impl Into<String>, attrs: &[Attr]) -> Result<(), Error> {
        if !self.enabled(level) {
            return Ok(());
        }

        let location = Location::caller();
        let record = Record::builder()
            .level(level)
            .file(location.file())
            .line(location.line())
            .message(message)
            .attrs(attrs.iter().cloned())
            .build();
        self.append.append(&record)
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>, attrs: &[Attr]) {
        report(self.log(Level::Error, message, attrs));
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>, attrs: &[Attr]) {
        report(self.log(Level::Warn, message, attrs));
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>, attrs: &[Attr]) {
        report(self.log(Level::Info, message, attrs));
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>, attrs: &[Attr]) {
        report(self.log(Level::Debug, message, attrs));
    }

    #[track_caller]
    pub fn trace(&self, message: impl Into<String>, attrs: &[Attr]) {
        report(self.log(Level::Trace, message, attrs));
    }

    /// Derive a logger that binds `attrs` to every record.
    pub fn with_attrs(&self, attrs: &[Attr]) -> Logger {
        Logger {
            append: self.append.with_attrs(attrs),
        }
    }

    /// Derive a logger that qualifies later attributes with `name`.
    pub fn with_group(&self, name: &str) -> Logger {
        Logger {
            append: self.append.with_group(name),
        }
    }

    pub fn flush(&self) -> Result<(), Error> {
        self.append.flush()
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.append.enabled(metadata.level())
    }

    fn log(&self, record: &log::Record) {
        if !self.append.enabled(record.level()) {
            return;
        }

        let record = Record::from_log(record);
        if let Err(err) = self.append.append(&record) {
            handle_log_error(&record, &err);
        }
    }

    fn flush(&self) {
        if let Err(err) = self.append.flush() {
            let _ = writeln!(std::io::stderr(), "failed to flush logger: {err}");
        }
    }
}

// Logging must never take the host down, so failures end on stderr.
fn report(result: Result<(), Error>) {
    if let Err(err) = result {
        let _ = writeln!(std::io::stderr(), "failed to log: {err}");
    }
}

fn handle_log_error(record: &Record, error: &Error) {
    let _ = write!(
        std::io::stderr(),
        r###"
Error perform logging.
    Attempted to log: {message}
    Record: {record:?}
    Error: {error}
"###,
        message = record.message(),
    );
}
