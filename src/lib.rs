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

//! # Benchmine
//!
//! `benchmine` turns the plain-text output of repeated kernel micro-benchmark
//! runs into two-dimensional result tables: one row per scenario (or instance
//! count), one column per thread-count bucket.
//!
//! Each log is cut into sections, a handful of noisy samples is parsed out of
//! every section, and an order-statistic rule collapses them into one robust
//! value. This crate contains the library logic for the `bmine` CLI; the
//! mining modules can be used on their own.
//!
//! ## Core Modules
//!
//! * [`scan`]: Forward line search and section location.
//! * [`record`]: Whole-line grammars producing typed records.
//! * [`rate`]: Normalization of raw counters to per-10-second rates.
//! * [`select`]: Rank-3-of-5 and median-of-three sample selection.
//! * [`axis`]: Closed categorical axes and the value-to-bucket lookup.
//! * [`matrix`]: Row-keyed result matrices and their merge.
//! * [`miner`]: Drives all of the above over a whole log.
//!
//! ## Around the core
//!
//! * [`report`]: Writes finished tables as CSV.
//! * [`driver`]: Reads logs, mines them concurrently and merges the results.
//! * [`config`]: Resolves jobs from the command line or a sweep file.
//! * [`cli`]: Defines the `clap`-based command-line interface.
//! * [`error`]: Defines the custom error types for the library.
//! * [`logging`]: Provides the `setup_tracing` utility.

pub mod axis;
pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod matrix;
pub mod miner;
pub mod rate;
pub mod record;
pub mod report;
pub mod scan;
pub mod select;
