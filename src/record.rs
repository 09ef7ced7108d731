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
//! Line grammars of the two log variants.
//!
//! Every grammar is anchored to the whole line and case-insensitive. A line
//! either yields a complete typed value or a [`ParseError`]; partial records
//! are never produced.
use crate::error::ParseError;
use crate::matrix::RowKey;
use regex::Captures;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

/// Delimits sections of the counter log (one module load per run).
pub const COUNTER_DELIMITER: &str = "insmod";

/// Present on every counter record line.
pub const COUNTER_RECORD_MARKER: &str = "threads:";

/// Present on every syscall measurement line.
pub const MEASUREMENT_MARKER: &str = "syscalls:sys_enter_flock";

/// Present on the syscall missed-count line.
pub const MISSED_MARKER: &str = "sys_flock: missed: ";

/// Any line mentioning the benchmarked syscall.
pub const SYSCALL_MARKER: &str = "flock";

static COUNTER_RECORD: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(concat!(
    r"(?i)^.*\[\d+\.\d+\]\s+(?P<tag>.+?)\s*:\sthreads:\s*(?P<threads>\d+)",
    r"\spreempt:\s*(?P<preempt>\d+)\smax:\s*(?P<max>\d+)\scycle:\s*(?P<cycle>\d+)",
    r"\sa:(?P<a>\d+)\sb:(?P<b>\d+)\sdelta:\s*(?P<delta>\d+)",
    r"\s+hits:\s*(?P<hits>\d+)\smissed:\s*(?P<missed>\d+).*$",
  ))
  .expect("counter record grammar is valid")
});

static MEASUREMENT: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)^\s+(?P<elapsed>\d+\.\d+)\s+(?P<count>\d[\d,]*)\s+.*$")
    .expect("measurement grammar is valid")
});

static MISSED: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)^.*_sys_flock: missed:\s+(?P<missed>\d+).*$").expect("missed grammar is valid")
});

/// Opens a section of the syscall log and carries its instance count.
pub static SECTION_TAG: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)^\s*krp_insts=(?P<insts>\d+).*$").expect("section tag grammar is valid")
});

fn int_field(caps: &Captures<'_>, field: &'static str) -> Result<u64, ParseError> {
  let value = &caps[field];
  value.parse().map_err(|source| ParseError::Integer {
    field,
    value: value.to_string(),
    source,
  })
}

fn no_match(grammar: &'static str, line: &str) -> ParseError {
  ParseError::NoMatch {
    grammar,
    line: line.to_string(),
  }
}

/// One interval report of the counter log.
///
/// ```text
/// [1294614.893791] fl  : threads:96 preempt:0 max: 384 cycle: 0 a:0 b:1 delta: 10005563711  hits:       4294672 missed: 0
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterRecord {
  pub tag: String,
  pub threads: u64,
  pub preempt: u64,
  pub max: u64,
  pub cycle: u64,
  pub a: u64,
  pub b: u64,
  pub delta_nanos: u64,
  pub hits: u64,
  pub missed: u64,
}

impl CounterRecord {
  /// Identity of the result row this record belongs to.
  pub fn row_key(&self) -> RowKey {
    RowKey::scenario(&self.tag, self.max, self.a, self.b)
  }
}

impl FromStr for CounterRecord {
  type Err = ParseError;

  fn from_str(line: &str) -> Result<Self, Self::Err> {
    let caps = COUNTER_RECORD
      .captures(line)
      .ok_or_else(|| no_match("counter record", line))?;

    let delta_nanos = int_field(&caps, "delta")?;
    if delta_nanos == 0 {
      return Err(ParseError::ZeroDelta {
        line: line.to_string(),
      });
    }

    Ok(CounterRecord {
      tag: caps["tag"].trim().to_string(),
      threads: int_field(&caps, "threads")?,
      preempt: int_field(&caps, "preempt")?,
      max: int_field(&caps, "max")?,
      cycle: int_field(&caps, "cycle")?,
      a: int_field(&caps, "a")?,
      b: int_field(&caps, "b")?,
      delta_nanos,
      hits: int_field(&caps, "hits")?,
      missed: int_field(&caps, "missed")?,
    })
  }
}

/// One interval line of `perf stat -I` output for the syscall tracepoint.
///
/// ```text
///     20.014119528          1,249,626      syscalls:sys_enter_flock
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerfSample {
  /// Seconds since the start of the measurement.
  pub elapsed_secs: f64,
  /// Events counted during this interval.
  pub count: u64,
}

impl FromStr for PerfSample {
  type Err = ParseError;

  fn from_str(line: &str) -> Result<Self, Self::Err> {
    let caps = MEASUREMENT
      .captures(line)
      .ok_or_else(|| no_match("measurement", line))?;

    let elapsed = &caps["elapsed"];
    let elapsed_secs = elapsed.parse().map_err(|source| ParseError::Float {
      field: "elapsed",
      value: elapsed.to_string(),
      source,
    })?;

    let raw_count = &caps["count"];
    let count = raw_count
      .replace(',', "")
      .parse()
      .map_err(|source| ParseError::Integer {
        field: "count",
        value: raw_count.to_string(),
        source,
      })?;

    Ok(PerfSample {
      elapsed_secs,
      count,
    })
  }
}

/// Extracts the trailing counter of a `..._sys_flock: missed: N` line.
pub fn parse_missed(line: &str) -> Result<u64, ParseError> {
  let caps = MISSED
    .captures(line)
    .ok_or_else(|| no_match("missed", line))?;
  int_field(&caps, "missed")
}

/// Extracts the instance count of a `krp_insts=N` section tag line.
pub fn parse_instances(line: &str) -> Result<u64, ParseError> {
  let caps = SECTION_TAG
    .captures(line)
    .ok_or_else(|| no_match("section tag", line))?;
  int_field(&caps, "insts")
}

/// A bare thread-count line, as echoed by the syscall benchmark driver.
pub fn parse_thread_count(line: &str) -> Result<u64, ParseError> {
  let value = line.trim();
  value.parse().map_err(|source| ParseError::Integer {
    field: "threads",
    value: value.to_string(),
    source,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  const FL_LINE: &str = "[1294614.893791] fl  : threads:96 preempt:0 max: 384 cycle: 0 a:0 b:1 delta: 10005563711  hits:       4294672 missed: 0";

  #[test]
  fn parses_counter_record() {
    let rec: CounterRecord = FL_LINE.parse().unwrap();
    assert_eq!(
      rec,
      CounterRecord {
        tag: "fl".into(),
        threads: 96,
        preempt: 0,
        max: 384,
        cycle: 0,
        a: 0,
        b: 1,
        delta_nanos: 10005563711,
        hits: 4294672,
        missed: 0,
      }
    );
    assert_eq!(rec.row_key().as_str(), "fl:384/0-1");
  }

  #[test]
  fn counter_record_tolerates_prefix_and_case() {
    let line = "  kernel: [12.5] SACA: THREADS:8 PREEMPT:1 MAX: 16 CYCLE: 2 A:3 B:4 DELTA: 100 HITS: 7 MISSED: 2  ";
    let rec: CounterRecord = line.parse().unwrap();
    assert_eq!(rec.tag, "SACA");
    assert_eq!((rec.threads, rec.preempt, rec.max, rec.cycle), (8, 1, 16, 2));
    assert_eq!((rec.a, rec.b, rec.delta_nanos, rec.hits, rec.missed), (3, 4, 100, 7, 2));
  }

  #[test]
  fn counter_record_rejects_partial_lines() {
    let truncated = "[1.0] fl  : threads:96 preempt:0 max: 384 cycle: 0 a:0 b:1 delta: 100";
    assert!(matches!(
      truncated.parse::<CounterRecord>(),
      Err(ParseError::NoMatch { .. })
    ));
    assert!(matches!(
      "insmod fl.ko".parse::<CounterRecord>(),
      Err(ParseError::NoMatch { .. })
    ));
  }

  #[test]
  fn counter_record_rejects_zero_delta() {
    let line = FL_LINE.replace("delta: 10005563711", "delta: 0");
    assert!(matches!(
      line.parse::<CounterRecord>(),
      Err(ParseError::ZeroDelta { .. })
    ));
  }

  #[test]
  fn counter_record_rejects_overflowing_fields() {
    let line = FL_LINE.replace("hits:       4294672", "hits: 99999999999999999999999");
    assert!(matches!(
      line.parse::<CounterRecord>(),
      Err(ParseError::Integer { field: "hits", .. })
    ));
  }

  #[test]
  fn parses_measurement_with_thousands_separators() {
    let line = "    20.014119528          1,249,626      syscalls:sys_enter_flock     ";
    let sample: PerfSample = line.parse().unwrap();
    assert_eq!(sample.count, 1_249_626);
    assert!((sample.elapsed_secs - 20.014119528).abs() < 1e-12);
  }

  #[test]
  fn measurement_requires_leading_whitespace() {
    assert!("20.0 100 syscalls:sys_enter_flock".parse::<PerfSample>().is_err());
  }

  #[test]
  fn parses_missed_and_tag_lines() {
    assert_eq!(parse_missed("krp_sys_flock: missed: 17").unwrap(), 17);
    assert_eq!(parse_missed("[3.2] kretprobe_sys_flock: missed:   0 (total)").unwrap(), 0);
    assert!(parse_missed("sys_flock: missed: none").is_err());

    assert_eq!(parse_instances("krp_insts=192 nonblocking").unwrap(), 192);
    assert_eq!(parse_instances("KRP_INSTS=96").unwrap(), 96);
    assert!(parse_instances("insts=96").is_err());
  }

  #[test]
  fn parses_thread_count_lines() {
    assert_eq!(parse_thread_count(" 16 ").unwrap(), 16);
    assert!(parse_thread_count("threads 16").is_err());
  }
}
