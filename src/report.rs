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
//! CSV emission of finished tables.
use crate::error::ReportError;
use crate::matrix::ResultMatrix;
use crate::matrix::Tables;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

/// Where the two tables of a job were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePaths {
  pub values: PathBuf,
  pub missed: PathBuf,
}

/// Writes one matrix as CSV: a header of `corner` followed by the labelled
/// buckets, then one line per visible row.
pub fn write_matrix<W: Write>(
  writer: W,
  corner: &str,
  matrix: &ResultMatrix,
) -> Result<(), csv::Error> {
  let columns = matrix.columns();
  let mut wtr = csv::WriterBuilder::new().from_writer(writer);

  let mut header = vec![corner.to_string()];
  header.extend(columns.labels());
  wtr.write_record(&header)?;

  for row in matrix.rows().filter(|row| row.is_visible()) {
    let mut record = Vec::with_capacity(columns.len() + 1);
    record.push(row.key().to_string());
    record.extend((0..columns.len()).map(|bucket| row.value(bucket).to_string()));
    wtr.write_record(&record)?;
  }

  wtr.flush()?;
  Ok(())
}

fn write_file(path: &Path, corner: &str, matrix: &ResultMatrix) -> Result<(), ReportError> {
  let file = File::create(path).map_err(|source| ReportError::Create {
    path: path.to_path_buf(),
    source,
  })?;
  write_matrix(file, corner, matrix).map_err(|source| ReportError::Csv {
    path: path.to_path_buf(),
    source,
  })
}

/// Writes `<name>.perf.csv` and `<name>.miss.csv` under `out_dir`.
pub fn write_tables(
  out_dir: &Path,
  name: &str,
  corner: &str,
  tables: &Tables,
) -> Result<TablePaths, ReportError> {
  fs::create_dir_all(out_dir).map_err(|source| ReportError::CreateDir {
    path: out_dir.to_path_buf(),
    source,
  })?;

  let paths = TablePaths {
    values: out_dir.join(format!("{name}.perf.csv")),
    missed: out_dir.join(format!("{name}.miss.csv")),
  };
  write_file(&paths.values, corner, &tables.values)?;
  write_file(&paths.missed, corner, &tables.missed)?;
  Ok(paths)
}
