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

use std::thread;

use agentlog::Config;
use agentlog::ErrorKind;
use agentlog::LevelFilter;
use agentlog::Output;

#[test]
fn test_failed_init_is_memoized() {
    let errors = thread::scope(|s| {
        let handles = (0..8)
            .map(|_| {
                s.spawn(|| {
                    let config = Config {
                        output: Output::NONE,
                        ..Config::default()
                    };
                    agentlog::init(config).unwrap_err()
                })
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>()
    });

    for err in &errors {
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(err.to_string(), errors[0].to_string());
    }

    // a valid config later on does not retry
    let err = agentlog::init(Config::terminal(LevelFilter::Info)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);

    // logging is still obtainable
    let logger = agentlog::get();
    assert!(std::ptr::eq(logger, agentlog::get()));
    logger.warn("fallback logger", &[]);
    agentlog::close().unwrap();
}
