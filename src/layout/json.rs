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

use jiff::Zoned;
use jiff::tz::TimeZone;
use serde::Serialize;
use serde_json::Map;
use serde_json::Number;

use crate::Error;
use crate::ErrorKind;
use crate::Record;
use crate::kv::Value;
use crate::scope::Scope;

/// A JSON layout for formatting log records.
///
/// Output format:
///
/// ```json
/// {"time":"2024-08-11T22:44:57.172051+08:00","level":"ERROR","target":"collector","msg":"disk probe failed","device":"/dev/sda"}
/// {"time":"2024-08-11T22:44:57.172187+08:00","level":"INFO","source":{"file":"src/collect.rs","line":52},"msg":"probe done","probe":{"ms":12}}
/// ```
///
/// Groups become nested objects. Keys inside one object are sorted. An attribute named like a
/// record field (`time`, `level`, `target`, `source`, `msg`) is written with a leading `_`. An
/// attribute sharing its key with a group is written inside the group object as `_value`.
///
/// # Examples
///
/// ```
/// use agentlog::layout::JsonLayout;
///
/// let json_layout = JsonLayout::default();
/// ```
#[derive(Default, Debug, Clone)]
pub struct JsonLayout {
    tz: Option<TimeZone>,
    add_source: bool,
}

impl JsonLayout {
    /// Sets the timezone for timestamps.
    ///
    /// # Examples
    ///
    /// ```
    /// use agentlog::layout::JsonLayout;
    /// use jiff::tz::TimeZone;
    ///
    /// let json_layout = JsonLayout::default().timezone(TimeZone::UTC);
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
}

const RECORD_FIELDS: [&str; 5] = ["time", "level", "target", "source", "msg"];
const SHADOWED_VALUE: &str = "_value";

#[derive(Debug, Clone, Serialize)]
struct RecordLine<'a> {
    #[serde(serialize_with = "serialize_time")]
    time: Zoned,
    level: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<Source<'a>>,
    msg: &'a str,
    #[serde(flatten)]
    attrs: Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
struct Source<'a> {
    file: &'a str,
    line: u32,
}

fn serialize_time<S>(time: &Zoned, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&time.strftime("%Y-%m-%dT%H:%M:%S.%6f%:z"))
}

impl JsonLayout {
    pub(crate) fn format_into(
        &self,
        record: &Record,
        scope: &Scope,
        buf: &mut Vec<u8>,
    ) -> Result<(), Error> {
        let mut attrs = Map::new();
        scope.visit(record.attrs(), |groups, attr| {
            insert_at(&mut attrs, groups, attr.key(), to_json(attr.value()));
            Ok(())
        })?;
        for field in RECORD_FIELDS {
            if let Some(value) = attrs.remove(field) {
                attrs.insert(format!("_{field}"), value);
            }
        }

        let tz = self.tz.clone().unwrap_or_else(TimeZone::system);
        let source = match (self.add_source, record.file()) {
            (true, Some(file)) => Some(Source {
                file,
                line: record.line().unwrap_or_default(),
            }),
            _ => None,
        };
        let target = Some(record.target()).filter(|target| !target.is_empty());

        let record_line = RecordLine {
            time: record.time().to_zoned(tz),
            level: record.level().as_str(),
            target,
            source,
            msg: record.message(),
            attrs,
        };

        serde_json::to_writer(&mut *buf, &record_line).map_err(|err| {
            Error::new(ErrorKind::Write, "failed to serialize record").with_source(err)
        })
    }
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(v) => serde_json::Value::Bool(*v),
        Value::I64(v) => serde_json::Value::Number(Number::from(*v)),
        Value::U64(v) => serde_json::Value::Number(Number::from(*v)),
        Value::F64(v) => match Number::from_f64(*v) {
            Some(n) => serde_json::Value::Number(n),
            None => serde_json::Value::String(v.to_string()),
        },
        Value::Str(v) => serde_json::Value::String(v.to_string()),
    }
}

fn insert_at(
    map: &mut Map<String, serde_json::Value>,
    path: &[String],
    key: &str,
    value: serde_json::Value,
) {
    match path.split_first() {
        None => {
            map.insert(key.to_owned(), value);
        }
        Some((group, rest)) => {
            let entry = map
                .entry(group.as_str())
                .or_insert_with(|| serde_json::Value::Object(Map::new()));
            // an attribute bound before the group keeps its value inside the group object
            if !entry.is_object() {
                let shadowed = std::mem::replace(entry, serde_json::Value::Object(Map::new()));
                if let serde_json::Value::Object(inner) = entry {
                    inner.insert(SHADOWED_VALUE.to_owned(), shadowed);
                }
            }
            if let serde_json::Value::Object(inner) = entry {
                insert_at(inner, rest, key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use serde_json::json;

    use super::*;
    use crate::Level;
    use crate::kv::Attr;

    #[test]
    fn test_json_layout_nests_groups() {
        let layout = JsonLayout::default()
            .timezone(TimeZone::UTC)
            .add_source(true);
        let record = Record::builder()
            .time("2024-01-01T23:59:00Z".parse::<Timestamp>().unwrap())
            .level(Level::Info)
            .file("src/collect.rs")
            .line(52)
            .message("probe done")
            .attr("ms", 12)
            .build();
        let scope = Scope::default()
            .with_attrs(&[Attr::new("host", "node-1")])
            .with_group("probe")
            .with_attrs(&[Attr::new("ok", true)]);

        let mut buf = vec![];
        layout.format_into(&record, &scope, &mut buf).unwrap();
        let line: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(
            line,
            json!({
                "time": "2024-01-01T23:59:00.000000+00:00",
                "level": "INFO",
                "source": {"file": "src/collect.rs", "line": 52},
                "msg": "probe done",
                "host": "node-1",
                "probe": {"ok": true, "ms": 12},
            })
        );
    }

    fn format_line(record: &Record, scope: &Scope) -> serde_json::Value {
        let layout = JsonLayout::default().timezone(TimeZone::UTC);
        let mut buf = vec![];
        layout.format_into(record, scope, &mut buf).unwrap();
        serde_json::from_slice(&buf).unwrap()
    }

    #[test]
    fn test_json_layout_keeps_attr_shadowed_by_group() {
        let record = Record::builder()
            .time("2024-01-01T00:00:00Z".parse::<Timestamp>().unwrap())
            .message("disk checked")
            .attr("k", 1)
            .build();
        let scope = Scope::default()
            .with_attrs(&[Attr::new("disk", "bound")])
            .with_group("disk");

        let line = format_line(&record, &scope);
        assert_eq!(line["disk"], json!({"_value": "bound", "k": 1}));
    }

    #[test]
    fn test_json_layout_renames_attrs_named_like_record_fields() {
        let record = Record::builder()
            .time("2024-01-01T00:00:00Z".parse::<Timestamp>().unwrap())
            .level(Level::Warn)
            .target("collector")
            .message("real")
            .attr("msg", "fake")
            .attr("level", "debug")
            .build();
        let scope = Scope::default().with_attrs(&[Attr::new("time", "yesterday")]);

        let layout = JsonLayout::default().timezone(TimeZone::UTC);
        let mut buf = vec![];
        layout.format_into(&record, &scope, &mut buf).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert_eq!(text.matches("\"msg\":").count(), 1, "{text}");

        let line: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(line["msg"], "real");
        assert_eq!(line["_msg"], "fake");
        assert_eq!(line["level"], "WARN");
        assert_eq!(line["_level"], "debug");
        assert_eq!(line["time"], "2024-01-01T00:00:00.000000+00:00");
        assert_eq!(line["_time"], "yesterday");
        assert_eq!(line["target"], "collector");
    }
}
