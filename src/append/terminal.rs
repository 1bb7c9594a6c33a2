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

use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;

use crate::Error;
use crate::Level;
use crate::LevelFilter;
use crate::Record;
use crate::append::Append;
use crate::append::pool::BufferPool;
use crate::color::LevelColor;
use crate::color::RESET;
use crate::kv::Attr;
use crate::layout::TextLayout;
use crate::scope::Scope;

const POOL_CAPACITY: usize = 16;

#[derive(Clone)]
enum Stream {
    Stderr,
    Stdout,
    Writer(Arc<Mutex<Box<dyn Write + Send>>>),
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Stderr => f.write_str("Stderr"),
            Stream::Stdout => f.write_str("Stdout"),
            Stream::Writer(_) => f.write_str("Writer"),
        }
    }
}

impl Stream {
    fn write_all(&self, bytes: &[u8]) -> std::io::Result<()> {
        match self {
            Stream::Stderr => std::io::stderr().write_all(bytes),
            Stream::Stdout => std::io::stdout().write_all(bytes),
            Stream::Writer(w) => {
                let mut w = w.lock().unwrap_or_else(|e| e.into_inner());
                w.write_all(bytes)
            }
        }
    }

    fn flush(&self) -> std::io::Result<()> {
        match self {
            Stream::Stderr => std::io::stderr().flush(),
            Stream::Stdout => std::io::stdout().flush(),
            Stream::Writer(w) => w.lock().unwrap_or_else(|e| e.into_inner()).flush(),
        }
    }
}

/// An appender that prints colored log records to a terminal stream.
///
/// Each record is written as the level's color, the formatted text, a color reset and a
/// newline, with a single write so that lines from concurrent callers never interleave.
///
/// # Examples
///
/// ```
/// use agentlog::LevelFilter;
/// use agentlog::append::Terminal;
///
/// let terminal = Terminal::stderr().level(LevelFilter::Debug);
/// ```
#[derive(Debug, Clone)]
pub struct Terminal {
    level: LevelFilter,
    layout: TextLayout,
    colors: LevelColor,
    colorize: bool,
    stream: Stream,
    pool: Arc<BufferPool>,
    scope: Scope,
}

impl Default for Terminal {
    fn default() -> Self {
        Self::stderr()
    }
}

impl Terminal {
    fn new(stream: Stream) -> Self {
        Self {
            level: LevelFilter::Info,
            layout: TextLayout::default(),
            colors: LevelColor::default(),
            colorize: true,
            stream,
            pool: Arc::new(BufferPool::new(POOL_CAPACITY)),
            scope: Scope::default(),
        }
    }

    /// Write to the standard error.
    pub fn stderr() -> Self {
        Self::new(Stream::Stderr)
    }

    /// Write to the standard output.
    pub fn stdout() -> Self {
        Self::new(Stream::Stdout)
    }

    /// Write to an arbitrary writer.
    pub fn writer(writer: impl Write + Send + 'static) -> Self {
        Self::new(Stream::Writer(Arc::new(Mutex::new(Box::new(writer)))))
    }

    /// Set the minimum severity. Defaults to [`LevelFilter::Info`].
    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Write plain text without escape sequences.
    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    pub fn colors(mut self, colors: LevelColor) -> Self {
        self.colors = colors;
        self
    }

    pub fn layout(mut self, layout: TextLayout) -> Self {
        self.layout = layout;
        self
    }
}

impl Append for Terminal {
    fn enabled(&self, level: Level) -> bool {
        level <= self.level
    }

    fn append(&self, record: &Record) -> Result<(), Error> {
        let mut buf = self.pool.get();
        if self.colorize {
            self.colors
                .write_prefix(record.level(), &mut *buf)
                .map_err(Error::from_io_error)?;
        }
        self.layout.format_into(record, &self.scope, &mut buf)?;
        if self.colorize {
            buf.extend_from_slice(RESET.as_bytes());
        }
        buf.push(b'\n');
        self.stream.write_all(&buf).map_err(Error::from_io_error)
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Box<dyn Append> {
        let mut terminal = self.clone();
        terminal.scope = self.scope.with_attrs(attrs);
        Box::new(terminal)
    }

    fn with_group(&self, name: &str) -> Box<dyn Append> {
        let mut terminal = self.clone();
        terminal.scope = self.scope.with_group(name);
        Box::new(terminal)
    }

    fn flush(&self) -> Result<(), Error> {
        self.stream.flush().map_err(Error::from_io_error)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use jiff::tz::TimeZone;

    use super::*;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn record(level: Level, message: &str) -> Record {
        Record::builder()
            .time("2024-01-01T23:59:00Z".parse::<Timestamp>().unwrap())
            .level(level)
            .message(message.to_owned())
            .build()
    }

    fn utc() -> TextLayout {
        TextLayout::default().timezone(TimeZone::UTC)
    }

    #[test]
    fn test_colored_record_is_wrapped_in_color_and_reset() {
        let capture = Capture::default();
        let terminal = Terminal::writer(capture.clone()).layout(utc());

        terminal.append(&record(Level::Error, "disk gone")).unwrap();

        let text = capture.text();
        assert_eq!(
            text,
            "\x1b[31m2024-01-01T23:59:00.000000+00:00 ERROR disk gone\x1b[0m\n"
        );
        assert_eq!(text.matches(RESET).count(), 1);
    }

    #[test]
    fn test_each_level_uses_its_color() {
        let capture = Capture::default();
        let terminal = Terminal::writer(capture.clone())
            .layout(utc())
            .level(LevelFilter::Trace);

        for level in [Level::Warn, Level::Info, Level::Debug, Level::Trace] {
            terminal.append(&record(level, "m")).unwrap();
        }

        let prefixes = capture
            .text()
            .lines()
            .map(|line| line[..line.find('m').unwrap() + 1].to_owned())
            .collect::<Vec<_>>();
        assert_eq!(prefixes, ["\x1b[33m", "\x1b[34m", "\x1b[90m", "\x1b[90m"]);
    }

    #[test]
    fn test_no_color_and_decoration() {
        let capture = Capture::default();
        let terminal = Terminal::writer(capture.clone()).layout(utc()).no_color();

        let decorated = terminal
            .with_attrs(&[Attr::new("host", "node-1")])
            .with_group("req");
        decorated
            .append(
                &Record::builder()
                    .time("2024-01-01T23:59:00Z".parse::<Timestamp>().unwrap())
                    .message("served")
                    .attr("id", 7)
                    .build(),
            )
            .unwrap();

        assert_eq!(
            capture.text(),
            "2024-01-01T23:59:00.000000+00:00  INFO served host=node-1 req.id=7\n"
        );
    }

    #[test]
    fn test_level_threshold() {
        let terminal = Terminal::stderr().level(LevelFilter::Warn);
        assert!(terminal.enabled(Level::Error));
        assert!(terminal.enabled(Level::Warn));
        assert!(!terminal.enabled(Level::Info));
        assert!(!Terminal::stderr().level(LevelFilter::Off).enabled(Level::Error));
    }
}
