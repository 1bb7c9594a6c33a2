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

use std::sync::OnceLock;

use crate::Config;
use crate::Error;
use crate::LevelFilter;
use crate::Output;
use crate::append::Append;
use crate::append::DailyFile;
use crate::append::DailyFileBuilder;
use crate::append::Dispatch;
use crate::append::Terminal;
use crate::logger::Logger;

#[derive(Debug)]
struct Global {
    logger: &'static Logger,
    file: Option<DailyFile>,
}

static GLOBAL: OnceLock<Result<Global, Error>> = OnceLock::new();
static FALLBACK: OnceLock<Logger> = OnceLock::new();

/// Set up the process-wide logger from `config`.
///
/// Only the first call builds anything. Its outcome, the logger or the error, is returned to
/// every caller afterwards, whatever config they pass. On success the logger is also installed
/// for the [`log`] crate macros and [`log::max_level`] is set to `config.level`.
///
/// # Errors
///
/// * [`Config`](crate::ErrorKind::Config) if the config is rejected.
/// * [`Resource`](crate::ErrorKind::Resource) if the daily file cannot be opened.
///
/// # Examples
///
/// ```
/// use agentlog::Config;
/// use agentlog::LevelFilter;
///
/// let logger = agentlog::init(Config::terminal(LevelFilter::Info)).unwrap();
/// logger.info("agent started", &[]);
/// log::info!(version = "1.2.0"; "reported through the log facade");
/// ```
pub fn init(config: Config) -> Result<&'static Logger, Error> {
    match GLOBAL.get_or_init(|| build(config)) {
        Ok(global) => Ok(global.logger),
        Err(err) => Err(err.clone()),
    }
}

/// The process-wide logger. Never fails.
///
/// If [`init`] has not run yet, a terminal-only logger is set up first. If the process-wide
/// logger could not be built, an uncolored stderr logger is returned instead.
pub fn get() -> &'static Logger {
    if let Some(Ok(global)) = GLOBAL.get() {
        return global.logger;
    }
    if let Ok(logger) = init(Config::terminal(LevelFilter::Info)) {
        return logger;
    }
    FALLBACK.get_or_init(|| Logger::new(Terminal::stderr().no_color()))
}

/// Close the daily file of the process-wide logger, if there is one.
///
/// Calling it more than once is fine.
pub fn close() -> Result<(), Error> {
    match GLOBAL.get() {
        Some(Ok(Global {
            file: Some(file), ..
        })) => file.close(),
        _ => Ok(()),
    }
}

fn build(config: Config) -> Result<Global, Error> {
    let config = config.validate()?;

    let mut appends: Vec<Box<dyn Append>> = vec![];
    let mut file = None;
    if config.output.contains(Output::FILE) {
        let daily_file = DailyFileBuilder::new(&config.dir, &config.filename_prefix)
            .retain_days(config.retain_days)
            .layout(config.file_layout())
            .level(config.level)
            .build()?;
        file = Some(daily_file.clone());
        appends.push(daily_file.into());
    }
    if config.output.contains(Output::TERMINAL) {
        let terminal = Terminal::stderr()
            .level(config.level)
            .layout(config.text_layout());
        appends.push(terminal.into());
    }

    let append: Box<dyn Append> = if appends.len() == 1 {
        appends.remove(0)
    } else {
        Dispatch::from(appends).into()
    };

    // lives for the rest of the process, as the log crate requires
    let logger: &'static Logger = Box::leak(Box::new(Logger::new(append)));
    match log::set_logger(logger) {
        Ok(()) => log::set_max_level(config.level),
        Err(err) => eprintln!("agentlog: log macros keep their current logger: {err}"),
    }

    Ok(Global { logger, file })
}
