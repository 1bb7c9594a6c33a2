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

use std::fs;
use std::path::PathBuf;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use crossbeam_channel::bounded;
use crossbeam_channel::select;
use crossbeam_channel::tick;
use jiff::Span;
use jiff::Timestamp;
use jiff::civil::Date;
use jiff::tz::TimeZone;

use crate::Error;
use crate::ErrorKind;

/// Deletes day files that fell out of the retention window.
#[derive(Debug, Clone)]
pub(crate) struct Retention {
    pub(crate) dir: PathBuf,
    pub(crate) prefix: String,
    pub(crate) retain_days: u32,
    pub(crate) tz: TimeZone,
}

impl Retention {
    /// Delete every `{prefix}-{date}.log` strictly older than `today - retain_days`.
    ///
    /// Return the number of removed files. Failures are logged and skipped.
    pub(crate) fn sweep(&self, today: Date) -> usize {
        let cutoff = Span::new()
            .try_days(i64::from(self.retain_days))
            .and_then(|span| today.checked_sub(span))
            .unwrap_or(Date::MIN);

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!(dir:% = self.dir.display(), err:% = err; "failed to read log dir");
                return 0;
            }
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let filename = entry.file_name();
            let Some(filename) = filename.to_str() else {
                continue;
            };
            let Some(date) = self.parse_date(filename) else {
                continue;
            };
            if date >= cutoff {
                continue;
            }
            // never delete a dir or symlink that happens to match
            if !entry.file_type().is_ok_and(|t| t.is_file()) {
                continue;
            }

            match fs::remove_file(entry.path()) {
                Ok(()) => {
                    removed += 1;
                    log::info!(file = filename; "removed expired log file");
                }
                Err(err) => {
                    log::warn!(file = filename, err:% = err; "failed to remove expired log file");
                }
            }
        }
        removed
    }

    fn parse_date(&self, filename: &str) -> Option<Date> {
        let date = filename
            .strip_prefix(self.prefix.as_str())?
            .strip_prefix('-')?
            .strip_suffix(".log")?;
        if date.len() != 10 {
            return None;
        }
        let parsed = date.parse::<Date>().ok()?;
        (parsed.to_string() == date).then_some(parsed)
    }

    fn today(&self) -> Date {
        Timestamp::now().to_zoned(self.tz.clone()).date()
    }
}

/// The background thread running [`Retention::sweep`] on a fixed period.
///
/// Dropping the sweeper signals the thread to stop without waiting for it.
#[derive(Debug)]
pub(crate) struct Sweeper {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Spawn the sweeper. The first sweep runs right away.
    pub(crate) fn spawn(retention: Retention, interval: Duration) -> Result<Sweeper, Error> {
        let (stop, stopped) = bounded::<()>(0);
        let handle = std::thread::Builder::new()
            .name(format!("agentlog-retention-{}", retention.prefix))
            .spawn(move || run(retention, interval, stopped))
            .map_err(|err| {
                Error::new(ErrorKind::Resource, "failed to spawn retention sweeper").with_source(err)
            })?;

        Ok(Sweeper {
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    /// Signal the thread and wait for it to exit.
    pub(crate) fn stop(mut self) {
        drop(self.stop.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                eprintln!("retention sweeper panicked");
            }
        }
    }
}

fn run(retention: Retention, interval: Duration, stopped: Receiver<()>) {
    retention.sweep(retention.today());

    let ticker = tick(interval);
    loop {
        select! {
            recv(ticker) -> _ => {
                retention.sweep(retention.today());
            }
            // disconnected once the sweeper handle is stopped or dropped
            recv(stopped) -> _ => break,
        }
    }
}
