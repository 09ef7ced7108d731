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
use assert_cmd::cargo;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

use serde_json::Value;

fn fixture(name: &str) -> String {
  Path::new(env!("CARGO_MANIFEST_DIR"))
    .join("tests/fixtures")
    .join(name)
    .display()
    .to_string()
}

fn bmine() -> Command {
  let mut cmd = Command::new(cargo::cargo_bin!("bmine"));
  cmd.env("CLICOLOR", "0").env_remove("BMINE_LOG_FILE").env_remove("BMINE_OUT_DIR");
  cmd
}

#[test]
fn test_mine_requires_logs() {
  bmine()
    .arg("mine")
    .assert()
    .failure()
    .stderr(predicate::str::contains("<LOGS>"));
}

#[test]
fn test_mine_missing_log_fails() {
  let temp = tempdir().unwrap();

  bmine()
    .arg("mine")
    .arg("--out-dir")
    .arg(temp.path())
    .arg("fl=does_not_exist.log")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to read log file"));
}

#[test]
fn test_mine_counter_log_e2e() {
  let temp = tempdir().unwrap();

  let output = bmine()
    .arg("mine")
    .arg("--variant")
    .arg("counter")
    .arg("--name")
    .arg("perf.arm64")
    .arg("--out-dir")
    .arg(temp.path())
    .arg(format!("arm64={}", fixture("perf.arm64.log")))
    .assert()
    .success()
    .stderr(predicate::str::contains("Finished job: perf.arm64"))
    .get_output()
    .stdout
    .clone();

  // One JSON summary line per log.
  let summary: Value = serde_json::from_slice(&output).unwrap();
  assert_eq!(summary["set"], "arm64");
  assert_eq!(summary["sections"], 3);
  assert_eq!(summary["recorded"], 3);
  assert_eq!(summary["ambiguous"], 0);

  let values = fs::read_to_string(temp.path().join("perf.arm64.perf.csv")).unwrap();
  let rows: Vec<&str> = values.lines().skip(1).collect();
  assert_eq!(
    rows,
    vec![
      "fl:384/0-1,0,0,0,0,0,0,0,0,0,0,0,0,4282276",
      "saca:384/0-1,0,0,0,0,0,0,0,0,0,0,0,0,384506637",
      "sapc:384/0-1,0,0,0,0,0,0,0,0,0,0,0,0,644995965",
    ]
  );
  assert!(values.lines().next().unwrap().ends_with(",1,2,4,6,8,12,16,24,32,48,64,80,96"));

  let missed = fs::read_to_string(temp.path().join("perf.arm64.miss.csv")).unwrap();
  assert_eq!(missed.lines().count(), 4);
}

#[test]
fn test_mine_syscall_logs_e2e() {
  let temp = tempdir().unwrap();
  let empty = temp.path().join("arm64.sa.n.log");
  fs::write(&empty, "no sections in here\n").unwrap();

  bmine()
    .arg("mine")
    .arg("--variant")
    .arg("syscall")
    .arg("--name")
    .arg("arm64.n")
    .arg("--out-dir")
    .arg(temp.path())
    .arg(format!("fl={}", fixture("arm64.fl.n.log")))
    .arg(format!("sa={}", empty.display()))
    .assert()
    .success()
    .stdout(predicate::str::contains(r#""set":"fl""#))
    .stdout(predicate::str::contains(r#""set":"sa""#));

  let values = fs::read_to_string(temp.path().join("arm64.n.perf.csv")).unwrap();
  let lines: Vec<&str> = values.lines().collect();
  assert_eq!(lines[0], "data,1,2,4,6,8,12,16,24,32,48,64,96,128,192");
  assert_eq!(lines[1], "fl:96,0,0,0,0,0,0,1285812,0,0,0,0,0,0,0");
  assert_eq!(lines[2], "fl:128,0,0,0,0,0,0,0,0,2003622,0,0,0,0,0");
  // Five declared rows per set, even for a log without sections.
  assert_eq!(lines.len(), 11);
  assert_eq!(lines[6], "sa:96,0,0,0,0,0,0,0,0,0,0,0,0,0,0");

  let missed = fs::read_to_string(temp.path().join("arm64.n.miss.csv")).unwrap();
  assert!(missed.contains("\nfl:96,0,0,0,0,0,0,12,0,0,0,0,0,0,0\n"));
}

#[test]
fn test_sweep_from_config() {
  let temp = tempdir().unwrap();
  let config = temp.path().join("sweep.toml");
  fs::write(
    &config,
    format!(
      r#"
output_dir = "{out}"

[[jobs]]
name = "perf.arm64"
variant = "counter"
logs = [{{ set = "arm64", path = "{counter}" }}]

[[jobs]]
name = "arm64.n"
variant = "syscall"
logs = [{{ set = "fl", path = "{syscall}" }}]
"#,
      out = temp.path().join("tables").display(),
      counter = fixture("perf.arm64.log"),
      syscall = fixture("arm64.fl.n.log"),
    ),
  )
  .unwrap();

  bmine()
    .arg("sweep")
    .arg("--config")
    .arg(&config)
    .assert()
    .success()
    .stderr(predicate::str::contains("Mining run complete"));

  assert!(temp.path().join("tables/perf.arm64.perf.csv").exists());
  assert!(temp.path().join("tables/arm64.n.miss.csv").exists());
}

#[test]
fn test_sweep_without_jobs_fails() {
  let temp = tempdir().unwrap();
  let config = temp.path().join("sweep.toml");
  fs::write(&config, "output_dir = \"x\"\n").unwrap();

  bmine()
    .arg("sweep")
    .arg("--config")
    .arg(&config)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Configuration defines no jobs"));
}
