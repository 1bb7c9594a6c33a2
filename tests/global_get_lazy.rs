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


// The process-wide logger is set up once per process, so this binary holds a single test.

use std::ptr;

use agentlog::Config;
use agentlog::Level;
use agentlog::LevelFilter;
use agentlog::Output;

#[test]
fn test_get_before_init_sets_up_terminal_logger() {
    let first = agentlog::get();
    assert!(first.enabled(Level::Info));
    assert!(!first.enabled(Level::Debug));

    // the lazily built logger wins over any later config
    let config = Config {
        output: Output::FILE,
        level: LevelFilter::Trace,
        ..Config::default()
    };
    let logger = agentlog::init(config).unwrap();
    assert!(ptr::eq(logger, first));
    assert!(ptr::eq(agentlog::get(), first));

    first.info("terminal only", &[]);
    agentlog::close().unwrap();
}
