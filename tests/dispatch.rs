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
use std::sync::Arc;
use std::sync::Mutex;

use agentlog::Append;
use agentlog::Attr;
use agentlog::ErrorKind;
use agentlog::LevelFilter;
use agentlog::Logger;
use agentlog::Record;
use agentlog::append::DailyFileBuilder;
use agentlog::append::Dispatch;
use agentlog::append::Terminal;
use agentlog::layout::TextLayout;
use jiff::tz::TimeZone;
use tempfile::TempDir;

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

#[test]
fn test_failing_member_does_not_block_the_others() {
    let dir = TempDir::new().unwrap();
    let broken = DailyFileBuilder::new(dir.path(), "agent")
        .retain_days(0)
        .build()
        .unwrap();
    broken.close().unwrap();

    let capture = Capture::default();
    let dispatch = Dispatch::new().chain(broken).chain(
        Terminal::writer(capture.clone())
            .no_color()
            .layout(TextLayout::default().timezone(TimeZone::UTC)),
    );

    let err = dispatch
        .append(&Record::builder().message("still delivered").build())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Uninitialized);
    assert_eq!(err.context("failed"), Some("1/2"));
    assert_eq!(err.context("appenders"), Some("0"));
    assert!(capture.text().ends_with(" INFO still delivered\n"));
}

#[test]
fn test_levels_are_checked_per_member() {
    let errors = Capture::default();
    let everything = Capture::default();
    let logger = Logger::new(
        Dispatch::new()
            .chain(
                Terminal::writer(errors.clone())
                    .no_color()
                    .level(LevelFilter::Error),
            )
            .chain(
                Terminal::writer(everything.clone())
                    .no_color()
                    .level(LevelFilter::Trace),
            ),
    );

    logger.trace("fine grained", &[]);
    logger.error("broken", &[Attr::new("code", 7)]);

    assert_eq!(errors.text().lines().count(), 1);
    assert!(errors.text().contains("broken code=7"));
    assert_eq!(everything.text().lines().count(), 2);
}

#[test]
fn test_decorating_a_dispatch_decorates_every_member() {
    let a = Capture::default();
    let b = Capture::default();
    let logger = Logger::new(
        Dispatch::new()
            .chain(Terminal::writer(a.clone()).no_color())
            .chain(Terminal::writer(b.clone()).no_color()),
    )
    .with_group("net")
    .with_attrs(&[Attr::new("iface", "eth0")]);

    logger.info("link up", &[Attr::new("speed", 1000)]);

    for capture in [&a, &b] {
        assert!(
            capture
                .text()
                .ends_with("link up net.iface=eth0 net.speed=1000\n"),
            "{}",
            capture.text()
        );
    }
}
