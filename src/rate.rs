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
//! Normalization of raw counters into per-10-second rates.
use crate::error::ParseError;
use crate::record::CounterRecord;
use crate::record::PerfSample;

/// Ten seconds, in nanoseconds.
pub const TIME_BASE_NANOS: u128 = 10_000_000_000;

/// Scale applied to per-second syscall rates.
pub const TIME_BASE_SECS: f64 = 10.0;

/// Hits and misses of one counter record, per ten seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterRate {
  pub hits: u64,
  pub missed: u64,
}

fn per_time_base(count: u64, delta_nanos: u64) -> u64 {
  let scaled = TIME_BASE_NANOS * u128::from(count) / u128::from(delta_nanos.max(1));
  u64::try_from(scaled).unwrap_or(u64::MAX)
}

impl From<&CounterRecord> for CounterRate {
  fn from(record: &CounterRecord) -> Self {
    CounterRate {
      hits: per_time_base(record.hits, record.delta_nanos),
      missed: per_time_base(record.missed, record.delta_nanos),
    }
  }
}

/// Rates of three successive `perf stat -I` intervals.
///
/// Each count is divided by the time elapsed since the previous sample (or
/// since zero for the first one). Intervals must be strictly positive.
pub fn interval_rates(samples: &[PerfSample; 3]) -> Result<[f64; 3], ParseError> {
  let mut rates = [0.0; 3];
  let mut previous = 0.0;
  for (index, sample) in samples.iter().enumerate() {
    let elapsed = sample.elapsed_secs - previous;
    if elapsed.partial_cmp(&0.0) != Some(std::cmp::Ordering::Greater) {
      return Err(ParseError::NonPositiveInterval { index, elapsed });
    }
    rates[index] = sample.count as f64 * TIME_BASE_SECS / elapsed;
    previous = sample.elapsed_secs;
  }
  Ok(rates)
}
