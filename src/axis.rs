// Copyright 2025 Chisomo Makombo Sakala
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
//! Closed categorical axes and the value-to-bucket lookup.
use crate::error::AxisError;
use std::collections::HashSet;

/// Thread-count columns of the counter (five-sample) log.
pub const COUNTER_THREADS: Axis = Axis::new(
  "threads",
  &[1, 2, 4, 6, 8, 12, 16, 24, 32, 48, 64, 80, 96],
);

/// Instance-count rows of the syscall perf log.
pub const SYSCALL_INSTANCES: Axis = Axis::new("instances", &[96, 128, 192, 256, 384]);

/// Thread-count columns of the syscall perf log.
pub const SYSCALL_THREADS: Axis = Axis::new(
  "threads",
  &[1, 2, 4, 6, 8, 12, 16, 24, 32, 48, 64, 96, 128, 192],
);

/// Label used for the unmapped bucket wherever one has to be named.
pub const OTHER_LABEL: &str = "other";

/// An ordered, closed list of admissible raw values.
///
/// Every axis has one extra bucket past the last admissible value which
/// collects anything not in the list. That bucket is never exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Axis {
  name: &'static str,
  values: &'static [u64],
}

impl Axis {
  pub const fn new(name: &'static str, values: &'static [u64]) -> Self {
    Axis { name, values }
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  /// Number of labelled buckets.
  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// Number of buckets including the unmapped one.
  pub fn width(&self) -> usize {
    self.values.len() + 1
  }

  /// Index of the unmapped bucket.
  pub fn sentinel(&self) -> usize {
    self.values.len()
  }

  pub fn is_sentinel(&self, bucket: usize) -> bool {
    bucket >= self.sentinel()
  }

  /// Maps a raw value to its bucket, or to [`Axis::sentinel`] when the value
  /// is not admissible.
  pub fn bucket_of(&self, raw: u64) -> usize {
    self
      .values
      .iter()
      .position(|&v| v == raw)
      .unwrap_or_else(|| self.sentinel())
  }

  /// Header label of a labelled bucket.
  pub fn label(&self, bucket: usize) -> Option<String> {
    self.values.get(bucket).map(u64::to_string)
  }

  /// Header labels in declared order, without the unmapped bucket.
  pub fn labels(&self) -> Vec<String> {
    self.values.iter().map(u64::to_string).collect()
  }

  /// Checks the table is non-empty and free of duplicates.
  pub fn validate(&self) -> Result<(), AxisError> {
    if self.values.is_empty() {
      return Err(AxisError::Empty { axis: self.name });
    }
    let mut seen = HashSet::new();
    for &value in self.values {
      if !seen.insert(value) {
        return Err(AxisError::DuplicateValue {
          axis: self.name,
          value,
        });
      }
    }
    Ok(())
  }
}
