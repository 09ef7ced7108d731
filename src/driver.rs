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
use crate::config::Config;
use crate::config::JobConfig;
use crate::config::LogSpec;
use crate::error::BenchmineError;
use crate::matrix::Tables;
use crate::miner::LogMiner;
use crate::miner::MineSummary;
use crate::miner::Variant;
use crate::report::TablePaths;
use crate::report::write_tables;
use anyhow::Context;
use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::Instrument;

/// One line of the per-log report printed on stdout.
#[derive(Debug, Serialize)]
struct LogReport<'a> {
  job: &'a str,
  set: &'a str,
  path: String,
  #[serde(flatten)]
  summary: MineSummary,
}

/// Reads a log as newline-stripped lines. Invalid UTF-8 is replaced rather
/// than rejected; kernel logs are not always clean.
pub fn read_lines(path: &Path) -> Result<Vec<String>, BenchmineError> {
  let bytes = fs::read(path).map_err(|source| BenchmineError::ReadLog {
    path: path.to_path_buf(),
    source,
  })?;
  Ok(
    String::from_utf8_lossy(&bytes)
      .lines()
      .map(str::to_string)
      .collect(),
  )
}

/// Reads and mines a single log into its own tables.
pub fn mine_log(
  variant: Variant,
  log: &LogSpec,
) -> Result<(Tables, MineSummary), BenchmineError> {
  let lines = read_lines(&log.path)?;
  tracing::debug!(lines = lines.len(), "Log read");

  let mut miner = LogMiner::new(variant, &log.set);
  let summary = miner.run(&lines);
  Ok((miner.into_tables(), summary))
}

/// Main job runner. Failed jobs are logged and counted; the others still run.
pub async fn run_jobs(config: Config) -> Result<()> {
  let span = tracing::info_span!("run_jobs", out = %config.output_dir.display());

  async {
    tracing::info!("--- Starting Mining Run ---");
    let mut failed = 0usize;

    for job in &config.jobs {
      let job_span = tracing::info_span!("job", name = %job.name, variant = ?job.variant);
      match run_job(job, &config.output_dir).instrument(job_span).await {
        Ok(paths) => tracing::info!(
          values = %paths.values.display(),
          missed = %paths.missed.display(),
          "Finished job: {}",
          job.name
        ),
        Err(e) => {
          failed += 1;
          tracing::error!(error = ?e, "Job failed: {}", job.name);
        }
      }
    }

    tracing::info!("--- Mining run complete ---");
    if failed > 0 {
      anyhow::bail!("{failed} of {} job(s) failed", config.jobs.len());
    }
    Ok(())
  }
  .instrument(span)
  .await
}

/// Mines every log of `job` concurrently, then merges them in declared order
/// and writes the job's tables.
pub async fn run_job(job: &JobConfig, out_dir: &Path) -> Result<TablePaths> {
  let variant = job.variant;

  let handles: Vec<_> = job
    .logs
    .iter()
    .cloned()
    .map(|log| {
      let log_span = tracing::info_span!("log", set = %log.set, path = %log.path.display());
      tokio::task::spawn_blocking(move || log_span.in_scope(|| mine_log(variant, &log)))
    })
    .collect();

  let mut tables = Tables::new(variant.columns());
  for (log, handle) in job.logs.iter().zip(handles) {
    let (log_tables, summary) = handle
      .await
      .context("Mining task failed")?
      .with_context(|| format!("Failed to mine {}", log.path.display()))?;

    let report = LogReport {
      job: &job.name,
      set: &log.set,
      path: log.path.display().to_string(),
      summary,
    };
    println!("{}", serde_json::to_string(&report)?);

    tables.absorb(log_tables);
  }

  let paths = write_tables(out_dir, &job.name, variant.corner_label(), &tables)?;
  Ok(paths)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::matrix::RowKey;
  use std::path::PathBuf;

  fn syscall_log(insts: u64, threads: u64, counts: [u64; 3]) -> String {
    let mut text =
      format!("krp_insts={insts}\ninsmod krp_flock.ko\n{threads}\n{threads}\nstats:\n");
    for (i, count) in counts.iter().enumerate() {
      let ts = (i + 1) * 10;
      text.push_str(&format!("    {ts}.000000000    {count}    syscalls:sys_enter_flock\n"));
    }
    text.push_str("krp_sys_flock: missed: 3\n");
    text
  }

  #[test]
  fn read_lines_strips_newlines_and_tolerates_bad_utf8() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raw.log");
    fs::write(&path, b"one\r\ntw\xffo\nthree").unwrap();
    let lines = read_lines(&path).unwrap();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "one");
    assert_eq!(lines[2], "three");
  }

  #[test]
  fn missing_log_names_the_path() {
    let log = LogSpec {
      set: "fl".into(),
      path: PathBuf::from("/definitely/not/here.log"),
    };
    let err = mine_log(Variant::Counter, &log).unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.log"));
  }

  #[tokio::test]
  async fn job_merges_logs_in_declared_order() {
    let dir = tempfile::tempdir().unwrap();
    let fl = dir.path().join("fl.log");
    let sa = dir.path().join("sa.log");
    fs::write(&fl, syscall_log(96, 16, [100, 300, 200])).unwrap();
    fs::write(&sa, syscall_log(128, 4, [10, 30, 20])).unwrap();

    let job = JobConfig {
      name: "arm64.n".into(),
      variant: Variant::Syscall,
      logs: vec![
        LogSpec { set: "fl".into(), path: fl },
        LogSpec { set: "sa".into(), path: sa },
      ],
    };
    let out = dir.path().join("out");
    let paths = run_job(&job, &out).await.unwrap();

    let values = fs::read_to_string(&paths.values).unwrap();
    let rows: Vec<&str> = values.lines().map(|l| l.split(',').next().unwrap()).collect();
    assert_eq!(
      rows,
      vec![
        "data", "fl:96", "fl:128", "fl:192", "fl:256", "fl:384", "sa:96", "sa:128", "sa:192",
        "sa:256", "sa:384",
      ]
    );
    assert!(values.contains("\nfl:96,0,0,0,0,0,0,200,"));
    assert!(values.contains("\nsa:128,0,0,20,"));
  }

  #[tokio::test]
  async fn job_fails_on_unreadable_log() {
    let dir = tempfile::tempdir().unwrap();
    let job = JobConfig {
      name: "x".into(),
      variant: Variant::Counter,
      logs: vec![LogSpec {
        set: "x".into(),
        path: dir.path().join("missing.log"),
      }],
    };
    assert!(run_job(&job, dir.path()).await.is_err());
  }

  #[test]
  fn mine_log_keeps_set_label() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("op.log");
    fs::write(&path, syscall_log(192, 1, [1, 3, 2])).unwrap();
    let (tables, summary) = mine_log(
      Variant::Syscall,
      &LogSpec {
        set: "op".into(),
        path,
      },
    )
    .unwrap();
    assert_eq!(summary.recorded, 1);
    assert_eq!(tables.values.get(&RowKey::labelled("op", "192"), 0), Some(2));
    assert_eq!(tables.missed.get(&RowKey::labelled("op", "192"), 0), Some(3));
  }
}
