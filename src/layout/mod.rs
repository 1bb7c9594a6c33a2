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

//! Layouts for formatting log records.

#[cfg(feature = "layout-json")]
pub use json::JsonLayout;
pub use text::TextLayout;

use crate::Error;
use crate::Record;
use crate::scope::Scope;

#[cfg(feature = "layout-json")]
mod json;
mod text;

/// Represents a layout for formatting log records.
#[derive(Debug, Clone)]
pub enum Layout {
    Text(TextLayout),
    #[cfg(feature = "layout-json")]
    Json(JsonLayout),
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Text(TextLayout::default())
    }
}

impl Layout {
    /// Append the formatted record to `buf`, without a trailing newline.
    pub fn format_into(
        &self,
        record: &Record,
        scope: &Scope,
        buf: &mut Vec<u8>,
    ) -> Result<(), Error> {
        match self {
            Layout::Text(layout) => layout.format_into(record, scope, buf),
            #[cfg(feature = "layout-json")]
            Layout::Json(layout) => layout.format_into(record, scope, buf),
        }
    }

    /// Format the record into a fresh buffer, without a trailing newline.
    pub fn format(&self, record: &Record, scope: &Scope) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        self.format_into(record, scope, &mut buf)?;
        Ok(buf)
    }
}

impl From<TextLayout> for Layout {
    fn from(layout: TextLayout) -> Self {
        Layout::Text(layout)
    }
}

#[cfg(feature = "layout-json")]
impl From<JsonLayout> for Layout {
    fn from(layout: JsonLayout) -> Self {
        Layout::Json(layout)
    }
}
