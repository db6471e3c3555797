// Copyright 2025 the snmpscope authors
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

pub mod error;
pub mod mib;
pub mod oid;
pub mod poller;
pub mod series;
pub mod session;
pub mod tree;
pub mod value;
pub mod walk;

// Re-export just the config module from common for library users
pub mod common {
    pub mod config;
}

pub use error::{Error, Result};
pub use mib::{MibIndex, ScanReport};
pub use poller::{PollEvent, Poller};
pub use series::{Sample, SeriesEngine, SeriesMode};
pub use session::{SnmpEndpoint, SnmpSession, SnmpVersion, WalkStep};
pub use tree::TreeNode;
pub use value::{MetricValue, SnmpValue};
pub use walk::WalkResult;
