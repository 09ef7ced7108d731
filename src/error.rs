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
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a log for mining.
#[derive(Error, Debug)]
pub enum BenchmineError {
  #[error("Failed to read log file: {path}")]
  ReadLog {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// A single line did not match the grammar it was expected to follow.
///
/// Always scoped to the offending line; never aborts a whole file.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
  #[error("Line does not match the {grammar} grammar: {line:?}")]
  NoMatch { grammar: &'static str, line: String },

  #[error("Field '{field}' is not a valid integer: {value:?}")]
  Integer {
    field: &'static str,
    value: String,
    #[source]
    source: std::num::ParseIntError,
  },

  #[error("Field '{field}' is not a valid number: {value:?}")]
  Float {
    field: &'static str,
    value: String,
    #[source]
    source: std::num::ParseFloatError,
  },

  #[error("Record has a zero delta and cannot be turned into a rate: {line:?}")]
  ZeroDelta { line: String },

  #[error("Measurement interval {index} is not positive ({elapsed}s)")]
  NonPositiveInterval { index: usize, elapsed: f64 },
}

/// No sample of a section satisfied the order-statistic rule.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
  #[error("No sample satisfies the selection rule among {samples} samples")]
  Ambiguous { samples: usize },

  #[error("Expected {expected} samples, found {found}")]
  Insufficient { expected: usize, found: usize },
}

/// Errors in the construction of a bucket axis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AxisError {
  #[error("Axis '{axis}' lists value {value} more than once")]
  DuplicateValue { axis: &'static str, value: u64 },

  #[error("Axis '{axis}' has no admissible values")]
  Empty { axis: &'static str },
}

/// Errors related to configuration resolution (src/config.rs).
#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Failed to load configuration")]
  Load(#[from] Box<figment::Error>),

  #[error("Configuration file not found: {0}")]
  NotFound(PathBuf),

  #[error("Configuration defines no jobs")]
  NoJobs,

  #[error("Job '{job}' lists no log files")]
  NoLogs { job: String },

  #[error("Invalid log spec {spec:?}: expected SET=PATH or PATH")]
  LogSpec { spec: String },
}

/// Errors raised while emitting result tables (src/report.rs).
#[derive(Error, Debug)]
pub enum ReportError {
  #[error("Failed to create output directory: {path}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to write CSV table: {path}")]
  Csv {
    path: PathBuf,
    #[source]
    source: csv::Error,
  },

  #[error("Failed to create CSV table: {path}")]
  Create {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}
