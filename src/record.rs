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

use std::borrow::Cow;

use jiff::Timestamp;
pub use log::Level;
pub use log::LevelFilter;

use crate::kv::Attr;
use crate::kv::Value;
use crate::kv::collect_log_kvs;

/// One log event.
///
/// Records are immutable once built and are never persisted as a standalone entity.
#[derive(Clone, Debug)]
pub struct Record {
    // the observed time
    time: Timestamp,

    // the metadata
    level: Level,
    target: Cow<'static, str>,
    file: Option<Cow<'static, str>>,
    line: Option<u32>,

    // the payload
    message: String,

    // structural logging
    attrs: Vec<Attr>,
}

impl Record {
    /// Create a [`RecordBuilder`] stamped with the current time.
    pub fn builder() -> RecordBuilder {
        RecordBuilder::default()
    }

    /// The observed time. Rotation is decided on this value, not on the wall clock.
    pub fn time(&self) -> Timestamp {
        self.time
    }

    /// The verbosity level of the message.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The name of the target of the directive. May be empty.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The source file containing the message.
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// The line containing the message.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// The message body.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The attributes attached at the call site, in order.
    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    pub(crate) fn from_log(record: &log::Record) -> Record {
        let message = match record.args().as_str() {
            Some(s) => s.to_owned(),
            None => record.args().to_string(),
        };

        Record {
            time: Timestamp::now(),
            level: record.level(),
            target: Cow::Owned(record.target().to_owned()),
            file: match record.file_static() {
                Some(file) => Some(Cow::Borrowed(file)),
                None => record.file().map(|file| Cow::Owned(file.to_owned())),
            },
            line: record.line(),
            message,
            attrs: collect_log_kvs(record.key_values()),
        }
    }
}

/// A builder for [`Record`].
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl Default for RecordBuilder {
    fn default() -> Self {
        RecordBuilder {
            record: Record {
                time: Timestamp::now(),
                level: Level::Info,
                target: Cow::Borrowed(""),
                file: None,
                line: None,
                message: String::new(),
                attrs: vec![],
            },
        }
    }
}

impl RecordBuilder {
    /// Set [`time`](Record::time).
    pub fn time(mut self, time: Timestamp) -> Self {
        self.record.time = time;
        self
    }

    /// Set [`level`](Record::level).
    pub fn level(mut self, level: Level) -> Self {
        self.record.level = level;
        self
    }

    /// Set [`target`](Record::target).
    pub fn target(mut self, target: impl Into<Cow<'static, str>>) -> Self {
        self.record.target = target.into();
        self
    }

    /// Set [`file`](Record::file).
    pub fn file(mut self, file: impl Into<Cow<'static, str>>) -> Self {
        self.record.file = Some(file.into());
        self
    }

    /// Set [`line`](Record::line).
    pub fn line(mut self, line: u32) -> Self {
        self.record.line = Some(line);
        self
    }

    /// Set [`message`](Record::message).
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.record.message = message.into();
        self
    }

    /// Append one attribute.
    pub fn attr(mut self, key: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        self.record.attrs.push(Attr::new(key, value));
        self
    }

    /// Append many attributes.
    pub fn attrs(mut self, attrs: impl IntoIterator<Item = Attr>) -> Self {
        self.record.attrs.extend(attrs);
        self
    }

    /// Invoke the builder and return a `Record`
    pub fn build(self) -> Record {
        self.record
    }
}
