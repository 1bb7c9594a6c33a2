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

//! Agentlog is the process-wide structured logging facility of a long-running agent.
//!
//! # Overview
//!
//! Records fan out to a colored terminal and to one log file per calendar day. Old day files
//! are removed by a background retention sweep. Loggers derived with
//! [`Logger::with_attrs`] and [`Logger::with_group`] keep following the daily rotation. It
//! integrates with the `log` crate: once [`init`] succeeds, the `log` macros route through the
//! same logger.
//!
//! # Examples
//!
//! Set up the process-wide logger once, then fetch it anywhere:
//!
//! ```
//! use agentlog::Attr;
//! use agentlog::Config;
//! use agentlog::LevelFilter;
//! use agentlog::Output;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let config = Config {
//!     output: Output::FILE | Output::TERMINAL,
//!     dir: dir.path().to_path_buf(),
//!     filename_prefix: "agent".to_owned(),
//!     level: LevelFilter::Debug,
//!     ..Config::default()
//! };
//! agentlog::init(config).unwrap();
//!
//! let collector = agentlog::get().with_group("collector");
//! collector.info("probe done", &[Attr::new("ms", 12)]);
//! log::warn!(device = "sda"; "disk is slow");
//!
//! agentlog::close().unwrap();
//! ```
//!
//! Appenders can also be composed by hand:
//!
//! ```
//! use agentlog::LevelFilter;
//! use agentlog::Logger;
//! use agentlog::append::DailyFileBuilder;
//! use agentlog::append::Dispatch;
//! use agentlog::append::Terminal;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let daily_file = DailyFileBuilder::new(dir.path(), "agent")
//!     .retain_days(7)
//!     .build()
//!     .unwrap();
//! let logger = Logger::new(
//!     Dispatch::new()
//!         .chain(daily_file.clone())
//!         .chain(Terminal::stderr().level(LevelFilter::Warn)),
//! );
//!
//! logger.warn("written to both", &[]);
//! daily_file.close().unwrap();
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod append;
pub mod color;
pub mod layout;

mod config;
mod error;
mod kv;
mod logger;
mod record;
mod scope;

pub use self::append::Append;
pub use self::config::Config;
pub use self::config::Format;
pub use self::config::Output;
pub use self::error::Error;
pub use self::error::ErrorKind;
pub use self::kv::Attr;
pub use self::kv::Value;
pub use self::layout::Layout;
pub use self::logger::Logger;
pub use self::logger::close;
pub use self::logger::get;
pub use self::logger::init;
pub use self::record::Level;
pub use self::record::LevelFilter;
pub use self::record::Record;
pub use self::record::RecordBuilder;
pub use self::scope::Scope;
