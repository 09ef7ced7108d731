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
//! Order-statistic selection of one representative sample per section.
//!
//! Both rules return the *position* of the chosen sample so callers can
//! recover the full record it came from.
use crate::error::SelectionError;

/// Samples per section in the counter log.
pub const COUNTER_SAMPLES: usize = 5;

/// Number of samples that must rank strictly below the chosen one.
pub const COUNTER_RANK: usize = 3;

/// Picks the sample ranked second-highest of five.
///
/// For each sample, counts how many others are strictly smaller; the first
/// sample with exactly [`COUNTER_RANK`] smaller peers wins. This drops the
/// single highest sample as a likely outlier and ignores the bottom three.
pub fn rank_select<T: PartialOrd>(samples: &[T]) -> Result<usize, SelectionError> {
  if samples.len() != COUNTER_SAMPLES {
    return Err(SelectionError::Insufficient {
      expected: COUNTER_SAMPLES,
      found: samples.len(),
    });
  }

  samples
    .iter()
    .position(|candidate| {
      samples.iter().filter(|other| candidate > *other).count() == COUNTER_RANK
    })
    .ok_or(SelectionError::Ambiguous {
      samples: samples.len(),
    })
}

/// Picks whichever of three samples lies strictly between the other two.
///
/// Ties (and NaNs) leave no sample strictly in the middle, which is reported
/// as ambiguous rather than resolved by position.
pub fn median_of_three<T: PartialOrd>(samples: &[T; 3]) -> Result<usize, SelectionError> {
  let between = |x: &T, lo: &T, hi: &T| (lo < x && x < hi) || (hi < x && x < lo);
  let [a, b, c] = samples;

  if between(a, b, c) {
    Ok(0)
  } else if between(b, a, c) {
    Ok(1)
  } else if between(c, a, b) {
    Ok(2)
  } else {
    Err(SelectionError::Ambiguous { samples: 3 })
  }
}
