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

//! Appender for writing log records to one file per calendar day.
//!
//! # Example
//!
//! ```
//! use agentlog::LevelFilter;
//! use agentlog::append::DailyFileBuilder;
//! use agentlog::layout::TextLayout;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let daily_file = DailyFileBuilder::new(dir.path(), "agent")
//!     .retain_days(7)
//!     .level(LevelFilter::Debug)
//!     .layout(TextLayout::default())
//!     .build()
//!     .unwrap();
//!
//! daily_file.close().unwrap();
//! ```

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use jiff::Timestamp;
use jiff::civil::Date;
use jiff::tz::TimeZone;

use self::retention::Retention;
use self::retention::Sweeper;
use crate::Error;
use crate::ErrorKind;
use crate::Level;
use crate::LevelFilter;
use crate::Record;
use crate::append::Append;
use crate::kv::Attr;
use crate::layout::Layout;
use crate::scope::Scope;

mod retention;

const DEFAULT_RETAIN_DAYS: u32 = 30;
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// A builder to configure and create a [`DailyFile`] appender.
#[derive(Debug)]
pub struct DailyFileBuilder {
    dir: PathBuf,
    prefix: String,
    retain_days: u32,
    layout: Layout,
    level: LevelFilter,
    tz: Option<TimeZone>,
    sweep_interval: Duration,
}

impl DailyFileBuilder {
    /// Create a new builder writing `{prefix}-{YYYY-MM-DD}.log` files under `dir`.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            retain_days: DEFAULT_RETAIN_DAYS,
            layout: Layout::default(),
            level: LevelFilter::Info,
            tz: None,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    /// Keep day files for this many days. `0` disables the retention sweep.
    ///
    /// Default to 30 days.
    pub fn retain_days(mut self, days: u32) -> Self {
        self.retain_days = days;
        self
    }

    /// Set the layout for the logs.
    pub fn layout(mut self, layout: impl Into<Layout>) -> Self {
        self.layout = layout.into();
        self
    }

    /// Set the minimum severity. Default to [`LevelFilter::Info`].
    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// The timezone deciding which calendar day a record belongs to.
    ///
    /// Default to the system timezone. This does not change the timezone the layout prints.
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }

    /// How often the retention sweep runs after the initial one. Default to one day.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Build the [`DailyFile`] appender.
    ///
    /// # Errors
    ///
    /// Return a [`Resource`](ErrorKind::Resource) error if either:
    ///
    /// * The configured prefix is empty.
    /// * The log directory or today's file cannot be created.
    /// * The retention sweeper cannot be started.
    pub fn build(self) -> Result<DailyFile, Error> {
        let DailyFileBuilder {
            dir,
            prefix,
            retain_days,
            layout,
            level,
            tz,
            sweep_interval,
        } = self;

        if prefix.is_empty() {
            return Err(Error::new(
                ErrorKind::Resource,
                "log filename prefix must not be empty",
            ));
        }

        let tz = tz.unwrap_or_else(TimeZone::system);
        let today = Timestamp::now().to_zoned(tz.clone()).date();
        let file = open_day_file(&dir, &prefix, today)?;

        let sweeper = if retain_days > 0 {
            let retention = Retention {
                dir: dir.clone(),
                prefix: prefix.clone(),
                retain_days,
                tz: tz.clone(),
            };
            Some(Sweeper::spawn(retention, sweep_interval)?)
        } else {
            None
        };

        let core = Core {
            dir,
            prefix,
            tz,
            layout,
            level,
            state: Mutex::new(State::Open { day: today, file }),
            sweeper: Mutex::new(sweeper),
        };
        Ok(DailyFile {
            core: Arc::new(core),
            scope: Scope::default(),
        })
    }
}

/// An appender that writes log records to `{prefix}-{YYYY-MM-DD}.log`, switching files when a
/// record falls on another day.
///
/// The day is taken from each record's own timestamp, so backfilled records land in the file
/// of their day. Decorated copies share the same file, lock and sweeper.
#[derive(Debug, Clone)]
pub struct DailyFile {
    core: Arc<Core>,
    scope: Scope,
}

impl DailyFile {
    /// Stop the retention sweep, then sync and release the current file.
    ///
    /// Calling it more than once is fine. Records appended afterwards fail with
    /// [`Uninitialized`](ErrorKind::Uninitialized).
    pub fn close(&self) -> Result<(), Error> {
        self.core.close()
    }

    /// The path of the file records for `day` go to.
    pub fn path_for(&self, day: Date) -> PathBuf {
        day_file_path(&self.core.dir, &self.core.prefix, day)
    }
}

impl Append for DailyFile {
    fn enabled(&self, level: Level) -> bool {
        level <= self.core.level
    }

    fn append(&self, record: &Record) -> Result<(), Error> {
        // formatting needs no file state; the file order is still the lock order
        let mut bytes = self.core.layout.format(record, &self.scope)?;
        bytes.push(b'\n');

        let day = record.time().to_zoned(self.core.tz.clone()).date();
        let mut state = self.core.lock_state();
        self.core.rotate(&mut state, day)?;
        match &mut *state {
            State::Open { file, .. } => file.write_all(&bytes).map_err(Error::from_io_error),
            _ => Err(Error::uninitialized("daily file is not open")),
        }
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Box<dyn Append> {
        Box::new(DailyFile {
            core: self.core.clone(),
            scope: self.scope.with_attrs(attrs),
        })
    }

    fn with_group(&self, name: &str) -> Box<dyn Append> {
        Box::new(DailyFile {
            core: self.core.clone(),
            scope: self.scope.with_group(name),
        })
    }

    fn flush(&self) -> Result<(), Error> {
        let mut state = self.core.lock_state();
        match &mut *state {
            State::Open { file, .. } => file.flush().map_err(Error::from_io_error),
            _ => Ok(()),
        }
    }
}

#[derive(Debug)]
enum State {
    /// Opening the file of a new day failed; the next record retries.
    Unopened,
    Open {
        day: Date,
        file: File,
    },
    Closed,
}

#[derive(Debug)]
struct Core {
    dir: PathBuf,
    prefix: String,
    tz: TimeZone,
    layout: Layout,
    level: LevelFilter,
    state: Mutex<State>,
    sweeper: Mutex<Option<Sweeper>>,
}

impl Core {
    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make sure `state` holds the file of `day`.
    fn rotate(&self, state: &mut State, day: Date) -> Result<(), Error> {
        match state {
            State::Closed => return Err(Error::uninitialized("daily file is closed")),
            State::Open { day: current, .. } if *current == day => return Ok(()),
            State::Open { file, .. } => {
                // still holding the lock, so report to stderr rather than through the logger
                if let Err(err) = file.flush() {
                    eprintln!("failed to flush previous log file: {err}");
                }
            }
            State::Unopened => {}
        }

        // release the old handle before opening the new one
        *state = State::Unopened;
        let file = open_day_file(&self.dir, &self.prefix, day)?;
        *state = State::Open { day, file };
        Ok(())
    }

    fn close(&self) -> Result<(), Error> {
        // the sweeper may log through this very appender, so join it before taking the lock
        let sweeper = self
            .sweeper
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(sweeper) = sweeper {
            sweeper.stop();
        }

        let mut state = self.lock_state();
        match std::mem::replace(&mut *state, State::Closed) {
            State::Open { file, .. } => file.sync_all().map_err(|err| {
                Error::new(ErrorKind::Resource, "failed to sync log file").with_source(err)
            }),
            State::Unopened | State::Closed => Ok(()),
        }
    }
}

fn day_file_path(dir: &Path, prefix: &str, day: Date) -> PathBuf {
    dir.join(format!("{prefix}-{day}.log"))
}

fn open_day_file(dir: &Path, prefix: &str, day: Date) -> Result<File, Error> {
    fs::create_dir_all(dir).map_err(|err| {
        Error::new(ErrorKind::Resource, "failed to create log directory")
            .with_context("dir", dir.display())
            .with_source(err)
    })?;

    let path = day_file_path(dir, prefix, day);
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(&path)
        .map_err(|err| {
            Error::new(ErrorKind::Resource, "failed to open log file")
                .with_context("path", path.display())
                .with_source(err)
        })
}
