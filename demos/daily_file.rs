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

use agentlog::Attr;
use agentlog::Config;
use agentlog::Format;
use agentlog::LevelFilter;
use agentlog::Output;

fn main() {
    let config = Config {
        output: Output::BOTH,
        dir: "logs".into(),
        filename_prefix: "agent".to_owned(),
        retain_days: 7,
        format: Format::Json,
        level: LevelFilter::Debug,
        add_source: true,
    };
    if let Err(err) = agentlog::init(config) {
        eprintln!("file logging disabled: {err}");
    }

    let logger = agentlog::get().with_attrs(&[Attr::new("host", "node-1")]);
    logger.info("agent started", &[Attr::new("version", "1.2.0")]);

    let collector = logger.with_group("collector");
    collector.debug("probing devices", &[Attr::new("count", 4)]);
    collector.warn("probe slow", &[Attr::new("device", "sda"), Attr::new("ms", 1500)]);

    log::error!(topic = "hw-inventory"; "failed to publish batch");

    if let Err(err) = agentlog::close() {
        eprintln!("failed to close logger: {err}");
    }
}
