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

use jiff::tz::TimeZone;

use crate::Error;
use crate::Record;
use crate::kv::Value;
use crate::scope::Scope;

/// A layout that formats log record as text.
///
/// Output format:
///
/// ```text
/// 2024-08-11T22:44:57.172105+08:00 ERROR collector: disk probe failed device=/dev/sda
/// 2024-08-11T22:44:57.172219+08:00  WARN collector: src/collect.rs:52 slow probe pci.slot=3
/// 2024-08-11T22:44:57.172276+08:00  INFO published batch size=16
/// ```
///
/// The target is omitted when empty. The source location is only written when
/// [`TextLayout::add_source`] is enabled and the record carries one. Attributes bound inside
/// groups are written with dotted keys.
///
/// You can customize the timezone of the timestamp by setting the `tz` field with a [`TimeZone`]
/// instance. Otherwise, the system timezone is used.
#[derive(Default, Debug, Clone)]
pub struct TextLayout {
    tz: Option<TimeZone>,
    add_source: bool,
}

impl TextLayout {
    /// Sets the timezone for timestamps.
    ///
    /// # Examples
    ///
    /// ```
    /// use agentlog::layout::TextLayout;
    /// use jiff::tz::TimeZone;
    ///
    /// let text_layout = TextLayout::default().timezone(TimeZone::UTC);
    /// ```
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }

    /// Whether to write the source file and line.
    pub fn add_source(mut self, add_source: bool) -> Self {
        self.add_source = add_source;
        self
    }

    pub(crate) fn format_into(
        &self,
        record: &Record,
        scope: &Scope,
        buf: &mut Vec<u8>,
    ) -> Result<(), Error> {
        let tz = self.tz.clone().unwrap_or_else(TimeZone::system);
        let time = record.time().to_zoned(tz);
        write!(
            buf,
            "{} {:>5}",
            time.strftime("%Y-%m-%dT%H:%M:%S.%6f%:z"),
            record.level()
        )
        .map_err(Error::from_io_error)?;

        let target = record.target();
        if !target.is_empty() {
            write!(buf, " {target}:").map_err(Error::from_io_error)?;
        }
        if self.add_source {
            if let Some(file) = record.file() {
                let line = record.line().unwrap_or_default();
                write!(buf, " {file}:{line}").map_err(Error::from_io_error)?;
            }
        }
        write!(buf, " {}", record.message()).map_err(Error::from_io_error)?;

        scope.visit(record.attrs(), |groups, attr| {
            buf.push(b' ');
            for group in groups {
                buf.extend_from_slice(group.as_bytes());
                buf.push(b'.');
            }
            buf.extend_from_slice(attr.key().as_bytes());
            buf.push(b'=');
            match attr.value() {
                Value::Str(s) if needs_quoting(s) => write!(buf, "{s:?}"),
                value => write!(buf, "{value}"),
            }
            .map_err(Error::from_io_error)
        })
    }
}

fn needs_quoting(s: &str) -> bool {
    s.is_empty()
        || s
            .chars()
            .any(|c| c.is_whitespace() || c == '=' || c == '"' || c.is_control())
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::Level;
    use crate::kv::Attr;

    fn format(layout: &TextLayout, record: &Record, scope: &Scope) -> String {
        let mut buf = vec![];
        layout.format_into(record, scope, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_layout() {
        let layout = TextLayout::default().timezone(TimeZone::UTC);
        let record = Record::builder()
            .time("2024-01-01T23:59:00Z".parse::<Timestamp>().unwrap())
            .level(Level::Warn)
            .target("collector")
            .file("src/collect.rs")
            .line(7)
            .message("probe slow")
            .attr("device", "pci 0000:3b:00.0")
            .attr("ms", 1500u64)
            .build();
        let scope = Scope::default()
            .with_attrs(&[Attr::new("host", "node-1")])
            .with_group("probe");

        assert_eq!(
            format(&layout, &record, &scope),
            "2024-01-01T23:59:00.000000+00:00  WARN collector: probe slow host=node-1 \
             probe.device=\"pci 0000:3b:00.0\" probe.ms=1500"
        );
    }

    #[test]
    fn test_text_layout_with_source() {
        let layout = TextLayout::default()
            .timezone(TimeZone::UTC)
            .add_source(true);
        let record = Record::builder()
            .time("2024-01-02T00:01:00Z".parse::<Timestamp>().unwrap())
            .level(Level::Error)
            .file("src/collect.rs")
            .line(7)
            .message("probe failed")
            .attr("reason", "")
            .build();

        assert_eq!(
            format(&layout, &record, &Scope::default()),
            "2024-01-02T00:01:00.000000+00:00 ERROR src/collect.rs:7 probe failed reason=\"\""
        );
    }
}
