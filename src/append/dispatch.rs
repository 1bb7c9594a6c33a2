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

use crate::Error;
use crate::ErrorKind;
use crate::Level;
use crate::Record;
use crate::append::Append;
use crate::kv::Attr;

/// An appender that fans records out to an ordered set of appenders.
///
/// A record is delivered to every member that is enabled for its level, even when an earlier
/// member failed. Failures are collected into one error.
///
/// # Examples
///
/// ```
/// use agentlog::append::Dispatch;
/// use agentlog::append::Terminal;
///
/// let dispatch = Dispatch::new()
///     .chain(Terminal::stderr())
///     .chain(Terminal::stdout().no_color());
/// ```
#[derive(Debug, Default)]
pub struct Dispatch {
    appends: Vec<Box<dyn Append>>,
}

impl Dispatch {
    /// Create an empty [`Dispatch`].
    pub fn new() -> Self {
        Self { appends: vec![] }
    }

    /// Add an [`Append`] after the existing ones.
    pub fn chain(mut self, append: impl Into<Box<dyn Append>>) -> Self {
        self.appends.push(append.into());
        self
    }
}

impl From<Vec<Box<dyn Append>>> for Dispatch {
    fn from(appends: Vec<Box<dyn Append>>) -> Self {
        Self { appends }
    }
}

impl Append for Dispatch {
    fn enabled(&self, level: Level) -> bool {
        self.appends.iter().any(|append| append.enabled(level))
    }

    fn append(&self, record: &Record) -> Result<(), Error> {
        let failures = self
            .appends
            .iter()
            .enumerate()
            .filter(|(_, append)| append.enabled(record.level()))
            .filter_map(|(i, append)| append.append(record).err().map(|err| (i, err)))
            .collect::<Vec<_>>();
        aggregate("failed to append record", self.appends.len(), failures)
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Box<dyn Append> {
        let appends = self
            .appends
            .iter()
            .map(|append| append.with_attrs(attrs))
            .collect();
        Box::new(Dispatch { appends })
    }

    fn with_group(&self, name: &str) -> Box<dyn Append> {
        let appends = self
            .appends
            .iter()
            .map(|append| append.with_group(name))
            .collect();
        Box::new(Dispatch { appends })
    }

    fn flush(&self) -> Result<(), Error> {
        let failures = self
            .appends
            .iter()
            .enumerate()
            .filter_map(|(i, append)| append.flush().err().map(|err| (i, err)))
            .collect::<Vec<_>>();
        aggregate("failed to flush appenders", self.appends.len(), failures)
    }
}

fn aggregate(message: &str, total: usize, failures: Vec<(usize, Error)>) -> Result<(), Error> {
    let Some((_, first)) = failures.first() else {
        return Ok(());
    };

    let kind = if failures.iter().all(|(_, err)| err.kind() == first.kind()) {
        first.kind()
    } else {
        ErrorKind::Write
    };
    let failed = failures
        .iter()
        .map(|(i, _)| i.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let mut error = Error::new(kind, message)
        .with_context("failed", format!("{}/{total}", failures.len()))
        .with_context("appenders", failed);
    for (_, err) in failures {
        error = error.with_source(err);
    }
    Err(error)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;
    use crate::LevelFilter;
    use crate::scope::Scope;

    #[derive(Debug, Clone)]
    struct Probe {
        level: LevelFilter,
        fail: Option<ErrorKind>,
        scope: Scope,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl Probe {
        fn new(level: LevelFilter, fail: Option<ErrorKind>) -> Self {
            Self {
                level,
                fail,
                scope: Scope::default(),
                seen: Arc::default(),
            }
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Append for Probe {
        fn enabled(&self, level: Level) -> bool {
            level <= self.level
        }

        fn append(&self, record: &Record) -> Result<(), Error> {
            if let Some(kind) = self.fail {
                return Err(Error::new(kind, "probe failed"));
            }
            let mut line = record.message().to_owned();
            self.scope.visit(record.attrs(), |groups, attr| {
                let prefix = groups.iter().map(|g| format!("{g}.")).collect::<String>();
                line.push_str(&format!(" {prefix}{}={}", attr.key(), attr.value()));
                Ok(())
            })?;
            self.seen.lock().unwrap().push(line);
            Ok(())
        }

        fn with_attrs(&self, attrs: &[Attr]) -> Box<dyn Append> {
            let mut probe = self.clone();
            probe.scope = self.scope.with_attrs(attrs);
            Box::new(probe)
        }

        fn with_group(&self, name: &str) -> Box<dyn Append> {
            let mut probe = self.clone();
            probe.scope = self.scope.with_group(name);
            Box::new(probe)
        }
    }

    #[test]
    fn test_enabled_is_any() {
        let dispatch = Dispatch::new()
            .chain(Probe::new(LevelFilter::Error, None))
            .chain(Probe::new(LevelFilter::Debug, None));

        assert!(dispatch.enabled(Level::Debug));
        assert!(!dispatch.enabled(Level::Trace));
        assert!(!Dispatch::new().enabled(Level::Error));
    }

    #[test]
    fn test_only_enabled_members_receive_records() {
        let quiet = Probe::new(LevelFilter::Error, None);
        let chatty = Probe::new(LevelFilter::Trace, None);
        let dispatch = Dispatch::new().chain(quiet.clone()).chain(chatty.clone());

        let record = Record::builder().level(Level::Info).message("hi").build();
        dispatch.append(&record).unwrap();

        assert!(quiet.seen().is_empty());
        assert_eq!(chatty.seen(), ["hi"]);
    }

    #[test]
    fn test_failures_are_aggregated_after_delivery() {
        let ok = Probe::new(LevelFilter::Trace, None);
        let dispatch = Dispatch::new()
            .chain(Probe::new(LevelFilter::Trace, Some(ErrorKind::Uninitialized)))
            .chain(ok.clone())
            .chain(Probe::new(LevelFilter::Trace, Some(ErrorKind::Uninitialized)));

        let record = Record::builder().message("hi").build();
        let err = dispatch.append(&record).unwrap_err();

        assert_eq!(ok.seen(), ["hi"]);
        assert_eq!(err.kind(), ErrorKind::Uninitialized);
        assert_eq!(err.context("failed"), Some("2/3"));
        assert_eq!(err.context("appenders"), Some("0, 2"));
        assert_eq!(err.sources().len(), 2);
    }

    #[test]
    fn test_mixed_failure_kinds_report_write() {
        let dispatch = Dispatch::new()
            .chain(Probe::new(LevelFilter::Trace, Some(ErrorKind::Uninitialized)))
            .chain(Probe::new(LevelFilter::Trace, Some(ErrorKind::Resource)));

        let record = Record::builder().message("hi").build();
        assert_eq!(dispatch.append(&record).unwrap_err().kind(), ErrorKind::Write);
    }

    #[test]
    fn test_decoration_distributes_over_members() {
        let a = Probe::new(LevelFilter::Trace, None);
        let b = Probe::new(LevelFilter::Trace, None);
        let dispatch = Dispatch::new().chain(a.clone()).chain(b.clone());

        let decorated = dispatch
            .with_group("net")
            .with_attrs(&[Attr::new("iface", "eth0")]);
        decorated
            .append(&Record::builder().message("up").build())
            .unwrap();
        dispatch
            .append(&Record::builder().message("plain").build())
            .unwrap();

        assert_eq!(a.seen(), ["up net.iface=eth0", "plain"]);
        assert_eq!(a.seen(), b.seen());
    }
}
