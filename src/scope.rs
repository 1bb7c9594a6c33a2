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
use crate::kv::Attr;

/// Attributes and groups bound to a decorated appender.
///
/// A bound attribute is qualified by the groups that were open when it was bound. Record
/// attributes are qualified by every group opened so far.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    groups: Vec<String>,
    attrs: Vec<BoundAttr>,
}

#[derive(Debug, Clone)]
struct BoundAttr {
    depth: usize,
    attr: Attr,
}

impl Scope {
    /// Return a new scope with `attrs` bound under the currently open groups.
    pub fn with_attrs(&self, attrs: &[Attr]) -> Scope {
        let mut scope = self.clone();
        let depth = scope.groups.len();
        scope.attrs.extend(attrs.iter().map(|attr| BoundAttr {
            depth,
            attr: attr.clone(),
        }));
        scope
    }

    /// Return a new scope with `name` opened as the innermost group.
    ///
    /// An empty name leaves the scope unchanged.
    pub fn with_group(&self, name: &str) -> Scope {
        let mut scope = self.clone();
        if !name.is_empty() {
            scope.groups.push(name.to_owned());
        }
        scope
    }

    /// The currently open groups, outermost first.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.attrs.is_empty()
    }

    /// Visit the bound attributes, then `record_attrs`, each with its group path.
    pub fn visit<F>(&self, record_attrs: &[Attr], mut f: F) -> Result<(), Error>
    where
        F: FnMut(&[String], &Attr) -> Result<(), Error>,
    {
        for bound in &self.attrs {
            f(&self.groups[..bound.depth], &bound.attr)?;
        }
        for attr in record_attrs {
            f(&self.groups, attr)?;
        }
        Ok(())
    }
}
