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
//! Section-by-section mining of a whole log into result tables.
//!
//! Mining never fails as a whole. Every section ends in exactly one
//! [`SectionOutcome`]; sections that cannot be read are skipped and sections
//! whose samples admit no robust pick are recorded as zero.
use crate::axis::Axis;
use crate::axis::COUNTER_THREADS;
use crate::axis::OTHER_LABEL;
use crate::axis::SYSCALL_INSTANCES;
use crate::axis::SYSCALL_THREADS;
use crate::error::ParseError;
use crate::error::SelectionError;
use crate::matrix::RowKey;
use crate::matrix::Tables;
use crate::rate::CounterRate;
use crate::rate::interval_rates;
use crate::record::COUNTER_DELIMITER;
use crate::record::COUNTER_RECORD_MARKER;
use crate::record::CounterRecord;
use crate::record::MEASUREMENT_MARKER;
use crate::record::MISSED_MARKER;
use crate::record::PerfSample;
use crate::record::SECTION_TAG;
use crate::record::SYSCALL_MARKER;
use crate::record::parse_instances;
use crate::record::parse_missed;
use crate::record::parse_thread_count;
use crate::scan::Section;
use crate::scan::Sections;
use crate::scan::find_until;
use crate::select::COUNTER_SAMPLES;
use crate::select::median_of_three;
use crate::select::rank_select;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Counter-log sections must span more lines than this to be mined.
pub const COUNTER_MIN_SPAN: usize = 5;

/// The two supported log layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
  /// Five counter records per `insmod` section, rank-3-of-5 selection.
  Counter,
  /// `perf stat` intervals per `krp_insts=` section, median-of-three selection.
  Syscall,
}

impl Variant {
  /// Column axis of the tables this variant produces.
  pub fn columns(&self) -> Axis {
    match self {
      Variant::Counter => COUNTER_THREADS,
      Variant::Syscall => SYSCALL_THREADS,
    }
  }

  /// Label of the first header cell.
  pub fn corner_label(&self) -> &'static str {
    match self {
      Variant::Counter => " ",
      Variant::Syscall => "data",
    }
  }
}

/// Why a section contributed nothing to the tables.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipReason {
  #[error("no record lines in section")]
  NoRecords,

  #[error("no '{marker}' line in section")]
  MissingLine { marker: &'static str },

  #[error("thread-count lines disagree: {first:?} vs {second:?}")]
  ThreadMismatch { first: String, second: String },

  #[error(transparent)]
  Parse(#[from] ParseError),

  #[error(transparent)]
  Selection(#[from] SelectionError),
}

/// What happened to one section.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionOutcome {
  /// A representative sample was selected and written.
  ///
  /// `unmapped_row` marks a row key that fell outside the row axis.
  Recorded {
    row: RowKey,
    bucket: usize,
    value: u64,
    missed: u64,
    unmapped_row: bool,
  },
  /// Samples were found but none could be selected; zeros were written.
  Degenerate {
    row: RowKey,
    bucket: usize,
    reason: SelectionError,
  },
  /// Nothing was written.
  Skipped(SkipReason),
}

/// Per-log counters of section outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MineSummary {
  pub sections: usize,
  pub recorded: usize,
  pub degenerate: usize,
  pub skipped: usize,
  /// Sections whose samples admitted no robust pick, degenerate or skipped.
  pub ambiguous: usize,
  /// Writes that landed in an unmapped column bucket or row.
  pub out_of_range: usize,
}

impl MineSummary {
  fn tally(&mut self, outcome: &SectionOutcome, columns: Axis) {
    self.sections += 1;
    match outcome {
      SectionOutcome::Recorded {
        bucket,
        unmapped_row,
        ..
      } => {
        self.recorded += 1;
        if columns.is_sentinel(*bucket) || *unmapped_row {
          self.out_of_range += 1;
        }
      }
      SectionOutcome::Degenerate { bucket, .. } => {
        self.degenerate += 1;
        self.ambiguous += 1;
        if columns.is_sentinel(*bucket) {
          self.out_of_range += 1;
        }
      }
      SectionOutcome::Skipped(reason) => {
        self.skipped += 1;
        if matches!(reason, SkipReason::Selection(_)) {
          self.ambiguous += 1;
        }
      }
    }
  }
}

/// Mines one or more logs of a single variant into one pair of tables.
///
/// Feeding several logs to the same miner processes them strictly in call
/// order: later sections overwrite cells written by earlier ones.
#[derive(Debug, Clone)]
pub struct LogMiner {
  variant: Variant,
  set: String,
  tables: Tables,
}

impl LogMiner {
  /// Creates a miner whose rows will be labelled with `set` where the
  /// variant labels rows by set.
  pub fn new(variant: Variant, set: &str) -> Self {
    let mut tables = Tables::new(variant.columns());
    if variant == Variant::Syscall {
      for label in SYSCALL_INSTANCES.labels() {
        tables.ensure_row(&RowKey::labelled(set, &label));
      }
      tables.hide(&RowKey::labelled(set, OTHER_LABEL));
    }
    LogMiner {
      variant,
      set: set.to_string(),
      tables,
    }
  }

  pub fn variant(&self) -> Variant {
    self.variant
  }

  pub fn tables(&self) -> &Tables {
    &self.tables
  }

  pub fn into_tables(self) -> Tables {
    self.tables
  }

  /// Mines every section of `lines`.
  pub fn run(&mut self, lines: &[String]) -> MineSummary {
    let mut summary = MineSummary::default();
    let columns = self.variant.columns();

    let sections: Box<dyn Iterator<Item = Section> + '_> = match self.variant {
      Variant::Counter => Box::new(Sections::new(lines, COUNTER_DELIMITER, COUNTER_MIN_SPAN)),
      Variant::Syscall => Box::new(Sections::new(lines, &*SECTION_TAG, 0)),
    };

    for section in sections {
      let _span =
        tracing::debug_span!("section", start = section.start, end = section.end).entered();

      let outcome = match self.variant {
        Variant::Counter => mine_counter_section(lines, section),
        Variant::Syscall => mine_syscall_section(lines, section, &self.set),
      };
      summary.tally(&outcome, columns);
      self.apply(outcome);
    }

    tracing::debug!(?summary, "Log mined");
    summary
  }

  fn apply(&mut self, outcome: SectionOutcome) {
    let columns = self.variant.columns();
    match outcome {
      SectionOutcome::Recorded {
        row,
        bucket,
        value,
        missed,
        unmapped_row,
      } => {
        if columns.is_sentinel(bucket) {
          tracing::warn!(%row, "Thread count outside the column axis");
        }
        if unmapped_row {
          tracing::warn!(%row, "Instance count outside the row axis");
        }
        tracing::debug!(%row, bucket, value, missed, "Section recorded");
        self.tables.record(&row, bucket, value, missed);
      }
      SectionOutcome::Degenerate {
        row,
        bucket,
        reason,
      } => {
        tracing::warn!(%row, error = %reason, "No robust sample; recording zero");
        self.tables.record(&row, bucket, 0, 0);
      }
      SectionOutcome::Skipped(reason) => {
        tracing::warn!(error = %reason, "Skipping section");
      }
    }
  }
}

/// Up to five records of one counter section, in file order.
///
/// Collection stops at the first line that fails the grammar.
fn counter_records(lines: &[String], section: Section) -> Result<Vec<CounterRecord>, ParseError> {
  let mut records = Vec::with_capacity(COUNTER_SAMPLES);
  let mut cursor = section.start;

  while records.len() < COUNTER_SAMPLES {
    let Some(idx) = find_until(lines, cursor, section.end, COUNTER_RECORD_MARKER) else {
      break;
    };
    match lines[idx].parse::<CounterRecord>() {
      Ok(record) => records.push(record),
      Err(e) if records.is_empty() => return Err(e),
      Err(e) => {
        tracing::warn!(line = idx, error = %e, "Malformed record line");
        break;
      }
    }
    cursor = idx + 1;
  }
  Ok(records)
}

/// Mines one `insmod`-delimited section of the counter log.
pub fn mine_counter_section(lines: &[String], section: Section) -> SectionOutcome {
  let records = match counter_records(lines, section) {
    Ok(records) if records.is_empty() => return SectionOutcome::Skipped(SkipReason::NoRecords),
    Ok(records) => records,
    Err(e) => return SectionOutcome::Skipped(e.into()),
  };
  let rates: Vec<CounterRate> = records.iter().map(CounterRate::from).collect();
  let hits: Vec<u64> = rates.iter().map(|r| r.hits).collect();

  match rank_select(&hits) {
    Ok(idx) => {
      let record = &records[idx];
      SectionOutcome::Recorded {
        row: record.row_key(),
        bucket: COUNTER_THREADS.bucket_of(record.threads),
        value: rates[idx].hits,
        missed: rates[idx].missed,
        unmapped_row: false,
      }
    }
    Err(reason) => {
      let first = &records[0];
      SectionOutcome::Degenerate {
        row: first.row_key(),
        bucket: COUNTER_THREADS.bucket_of(first.threads),
        reason,
      }
    }
  }
}

/// Finds the echoed thread-count pair following a syscall section tag.
///
/// Advances from the tag until the next syscall line is at least two lines
/// ahead; those two lines must be identical integers.
fn thread_pair(lines: &[String], section: Section) -> Result<(usize, u64), SkipReason> {
  let mut cursor = section.start;
  loop {
    match find_until(lines, cursor, section.end, SYSCALL_MARKER) {
      None => return Err(SkipReason::MissingLine { marker: SYSCALL_MARKER }),
      Some(next) if next >= cursor + 2 => break,
      Some(_) => cursor += 1,
    }
  }

  let (first, second) = (&lines[cursor], &lines[cursor + 1]);
  if first.is_empty() || first != second {
    return Err(SkipReason::ThreadMismatch {
      first: first.clone(),
      second: second.clone(),
    });
  }
  Ok((cursor, parse_thread_count(first)?))
}

fn require(
  lines: &[String],
  from: usize,
  section: Section,
  marker: &'static str,
) -> Result<usize, SkipReason> {
  find_until(lines, from, section.end, marker).ok_or(SkipReason::MissingLine { marker })
}

fn syscall_sample(
  lines: &[String],
  section: Section,
  set: &str,
) -> Result<SectionOutcome, SkipReason> {
  let instances = parse_instances(&lines[section.start])?;
  let (cursor, threads) = thread_pair(lines, section)?;

  let v1 = require(lines, cursor + 2, section, MEASUREMENT_MARKER)?;
  let v2 = require(lines, v1 + 1, section, MEASUREMENT_MARKER)?;
  let v3 = require(lines, v2 + 1, section, MEASUREMENT_MARKER)?;
  let mi = require(lines, v3 + 1, section, MISSED_MARKER)?;

  let samples: [PerfSample; 3] = [lines[v1].parse()?, lines[v2].parse()?, lines[v3].parse()?];
  let missed = parse_missed(&lines[mi])?;
  let rates = interval_rates(&samples)?;
  let idx = median_of_three(&rates)?;
  tracing::debug!(?rates, picked = idx, "Interval rates");

  let row_bucket = SYSCALL_INSTANCES.bucket_of(instances);
  let label = SYSCALL_INSTANCES
    .label(row_bucket)
    .unwrap_or_else(|| OTHER_LABEL.to_string());

  Ok(SectionOutcome::Recorded {
    row: RowKey::labelled(set, &label),
    bucket: SYSCALL_THREADS.bucket_of(threads),
    value: rates[idx] as u64,
    missed,
    unmapped_row: SYSCALL_INSTANCES.is_sentinel(row_bucket),
  })
}

/// Mines one `krp_insts=`-tagged section of the syscall log.
///
/// Rows are labelled `<set>:<instances>`; instance counts outside the row
/// axis go to a `<set>:other` row that is kept but never exported.
pub fn mine_syscall_section(lines: &[String], section: Section, set: &str) -> SectionOutcome {
  syscall_sample(lines, section, set).unwrap_or_else(SectionOutcome::Skipped)
}
