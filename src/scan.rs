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
//! Forward line scanning and section location.
use regex::Regex;

/// Something a log line can be tested against.
pub trait Marker {
  fn matches(&self, line: &str) -> bool;
}

/// Plain substring match, case-sensitive.
impl Marker for str {
  fn matches(&self, line: &str) -> bool {
    line.contains(self)
  }
}

impl Marker for Regex {
  fn matches(&self, line: &str) -> bool {
    self.is_match(line)
  }
}

/// Returns the index of the first line at or after `from` that matches
/// `marker`, or `None` when no remaining line does.
pub fn find<M: Marker + ?Sized>(lines: &[String], from: usize, marker: &M) -> Option<usize> {
  lines
    .iter()
    .enumerate()
    .skip(from)
    .find(|(_, line)| marker.matches(line))
    .map(|(idx, _)| idx)
}

/// Like [`find`], but gives up once the scan passes `last` (inclusive).
pub fn find_until<M: Marker + ?Sized>(
  lines: &[String],
  from: usize,
  last: usize,
  marker: &M,
) -> Option<usize> {
  lines
    .iter()
    .enumerate()
    .take(last.saturating_add(1))
    .skip(from)
    .find(|(_, line)| marker.matches(line))
    .map(|(idx, _)| idx)
}

/// One benchmark run inside a log.
///
/// `start` is the delimiter line that opens the section. `end` is the next
/// delimiter, or the last line of the input when the section runs to the end
/// of the file. Lines are scanned up to and including `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
  pub start: usize,
  pub end: usize,
}

impl Section {
  pub fn span(&self) -> usize {
    self.end.saturating_sub(self.start)
  }
}

/// Locates the section opening at or after `from`.
///
/// Returns `None` once no further delimiter exists.
pub fn next_section<M: Marker + ?Sized>(
  lines: &[String],
  from: usize,
  marker: &M,
) -> Option<Section> {
  let start = find(lines, from, marker)?;
  let end = find(lines, start + 1, marker).unwrap_or_else(|| lines.len().saturating_sub(1));
  Some(Section { start, end })
}

/// Iterates over the non-degenerate sections of a log in file order.
///
/// Sections whose span does not exceed `min_span` are skipped and scanning
/// resumes at their end.
pub struct Sections<'a, M: ?Sized> {
  lines: &'a [String],
  marker: &'a M,
  min_span: usize,
  cursor: usize,
}

impl<'a, M: Marker + ?Sized> Sections<'a, M> {
  pub fn new(lines: &'a [String], marker: &'a M, min_span: usize) -> Self {
    Sections {
      lines,
      marker,
      min_span,
      cursor: 0,
    }
  }
}

impl<M: Marker + ?Sized> Iterator for Sections<'_, M> {
  type Item = Section;

  fn next(&mut self) -> Option<Section> {
    loop {
      let section = next_section(self.lines, self.cursor, self.marker)?;
      // The last section may end on its own delimiter; always make progress.
      self.cursor = section.end.max(section.start + 1);

      if section.span() > self.min_span {
        return Some(section);
      }
      tracing::debug!(
        start = section.start,
        end = section.end,
        "Skipping degenerate section"
      );
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
  }

  #[test]
  fn find_is_inclusive_of_start_and_forward_only() {
    let log = lines("a\ninsmod x\nb\ninsmod y");
    assert_eq!(find(&log, 0, "insmod"), Some(1));
    assert_eq!(find(&log, 1, "insmod"), Some(1));
    assert_eq!(find(&log, 2, "insmod"), Some(3));
    assert_eq!(find(&log, 4, "insmod"), None);
    assert_eq!(find(&log, 99, "insmod"), None);
  }

  #[test]
  fn find_accepts_regex_markers() {
    let log = lines("noise\nKRP_INSTS=96\n");
    let re = Regex::new(r"(?i)^krp_insts=").unwrap();
    assert_eq!(find(&log, 0, &re), Some(1));
  }

  #[test]
  fn find_until_respects_bound() {
    let log = lines("a\nb\nhit");
    assert_eq!(find_until(&log, 0, 1, "hit"), None);
    assert_eq!(find_until(&log, 0, 2, "hit"), Some(2));
  }

  #[test]
  fn find_until_handles_degenerate_bounds() {
    let log = lines("hit\nb\nhit");
    assert_eq!(find_until(&log, 1, 0, "hit"), None);
    assert_eq!(find_until(&log, 1, usize::MAX, "hit"), Some(2));
    assert_eq!(find_until(&log, 5, 9, "hit"), None);
  }

  #[test]
  fn last_section_runs_to_last_line() {
    let log = lines("insmod\n1\n2\n3");
    assert_eq!(
      next_section(&log, 0, "insmod"),
      Some(Section { start: 0, end: 3 })
    );
    assert_eq!(next_section(&lines("nothing here"), 0, "insmod"), None);
  }

  #[test]
  fn sections_skip_degenerate_spans() {
    let mut text = String::from("insmod a\nx\ninsmod b\n");
    for i in 0..6 {
      text.push_str(&format!("line {i}\n"));
    }
    text.push_str("insmod c\n");
    let log = lines(&text);

    let found: Vec<Section> = Sections::new(&log, "insmod", 5).collect();
    assert_eq!(found, vec![Section { start: 2, end: 9 }]);
  }

  #[test]
  fn sections_terminate_when_delimiter_is_last_line() {
    let log = lines("x\ninsmod");
    assert_eq!(Sections::new(&log, "insmod", 0).count(), 0);
  }

  #[test]
  fn no_delimiters_no_sections() {
    let log = lines("a\nb\nc");
    assert_eq!(Sections::new(&log, "insmod", 0).count(), 0);
  }
}
