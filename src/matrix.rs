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
//! Row-keyed result matrices.
use crate::axis::Axis;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Identity of a result row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RowKey(String);

impl RowKey {
  /// `<tag>:<max>/<a>-<b>`, the row of one counter-log scenario.
  pub fn scenario(tag: &str, max: u64, a: u64, b: u64) -> Self {
    RowKey(format!("{}:{max}/{a}-{b}", tag.trim()))
  }

  /// `<set>:<label>`, the row of one bucket of a fixed row axis.
  pub fn labelled(set: &str, label: &str) -> Self {
    RowKey(format!("{set}:{label}"))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for RowKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// One row of a [`ResultMatrix`].
///
/// Cells that were never written hold `None` and read back as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
  key: RowKey,
  cells: Vec<Option<u64>>,
  visible: bool,
}

impl Row {
  pub fn key(&self) -> &RowKey {
    &self.key
  }

  pub fn cells(&self) -> &[Option<u64>] {
    &self.cells
  }

  pub fn value(&self, bucket: usize) -> u64 {
    self.cells.get(bucket).copied().flatten().unwrap_or(0)
  }

  /// Whether the row belongs in exported tables.
  pub fn is_visible(&self) -> bool {
    self.visible
  }
}

/// Scalars keyed by row, one cell per bucket of a column axis.
///
/// Rows are discovered, not declared: they appear in first-seen order.
/// Every row is as wide as the axis including its unmapped bucket, so a
/// write for an unexpected value never lands on a labelled column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultMatrix {
  columns: Axis,
  rows: Vec<Row>,
  index: HashMap<RowKey, usize>,
}

impl ResultMatrix {
  pub fn new(columns: Axis) -> Self {
    ResultMatrix {
      columns,
      rows: Vec::new(),
      index: HashMap::new(),
    }
  }

  pub fn columns(&self) -> Axis {
    self.columns
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  pub fn rows(&self) -> impl Iterator<Item = &Row> {
    self.rows.iter()
  }

  pub fn row(&self, key: &RowKey) -> Option<&Row> {
    self.index.get(key).map(|&idx| &self.rows[idx])
  }

  /// Returns the position of `key`, inserting an unwritten row if absent.
  pub fn row_index(&mut self, key: &RowKey) -> usize {
    if let Some(&idx) = self.index.get(key) {
      return idx;
    }
    let idx = self.rows.len();
    self.rows.push(Row {
      key: key.clone(),
      cells: vec![None; self.columns.width()],
      visible: true,
    });
    self.index.insert(key.clone(), idx);
    idx
  }

  /// Overwrites one cell. Buckets past the axis fold into the unmapped one.
  pub fn write(&mut self, key: &RowKey, bucket: usize, value: u64) {
    let bucket = bucket.min(self.columns.sentinel());
    let idx = self.row_index(key);
    self.rows[idx].cells[bucket] = Some(value);
  }

  pub fn get(&self, key: &RowKey, bucket: usize) -> Option<u64> {
    self.row(key).and_then(|row| row.cells.get(bucket).copied().flatten())
  }

  /// Keeps the row (inserting it if needed) but excludes it from exports.
  pub fn hide(&mut self, key: &RowKey) {
    let idx = self.row_index(key);
    self.rows[idx].visible = false;
  }

  /// Folds `other` into `self` as if its input had been mined after ours.
  ///
  /// New rows are appended in `other`'s order; every cell `other` wrote
  /// overwrites ours.
  pub fn absorb(&mut self, other: ResultMatrix) {
    debug_assert_eq!(self.columns, other.columns);
    for row in other.rows {
      let known = self.index.contains_key(&row.key);
      let idx = self.row_index(&row.key);
      if !known {
        self.rows[idx].visible = row.visible;
      }
      let target = &mut self.rows[idx].cells;
      for (bucket, cell) in row.cells.into_iter().enumerate() {
        if let (Some(value), Some(slot)) = (cell, target.get_mut(bucket)) {
          *slot = Some(value);
        }
      }
    }
  }
}

/// The two parallel matrices produced for one table: representative values
/// and missed counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
  pub values: ResultMatrix,
  pub missed: ResultMatrix,
}

impl Tables {
  pub fn new(columns: Axis) -> Self {
    Tables {
      values: ResultMatrix::new(columns),
      missed: ResultMatrix::new(columns),
    }
  }

  pub fn columns(&self) -> Axis {
    self.values.columns()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// Inserts `key` in both matrices without writing any cell.
  pub fn ensure_row(&mut self, key: &RowKey) {
    self.values.row_index(key);
    self.missed.row_index(key);
  }

  pub fn hide(&mut self, key: &RowKey) {
    self.values.hide(key);
    self.missed.hide(key);
  }

  /// Writes the same cell of both matrices.
  pub fn record(&mut self, key: &RowKey, bucket: usize, value: u64, missed: u64) {
    self.values.write(key, bucket, value);
    self.missed.write(key, bucket, missed);
  }

  pub fn absorb(&mut self, other: Tables) {
    self.values.absorb(other.values);
    self.missed.absorb(other.missed);
  }
}
