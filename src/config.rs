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
use crate::cli::MineArgs;
use crate::error::ConfigError;
use crate::miner::Variant;
use figment::Figment;
use figment::providers::Env;
use figment::providers::Format;
use figment::providers::Json;
use figment::providers::Toml;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

/// Prefix of environment overrides for sweep configurations.
pub const ENV_PREFIX: &str = "BMINE_";

// --- Default Values ---
fn default_output_dir() -> PathBuf {
  PathBuf::from(".")
}

/// One log file and the set label its rows carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSpec {
  pub set: String,
  pub path: PathBuf,
}

impl FromStr for LogSpec {
  type Err = ConfigError;

  /// Accepts `SET=PATH`, or a bare `PATH` whose file stem becomes the set.
  fn from_str(spec: &str) -> Result<Self, Self::Err> {
    let invalid = || ConfigError::LogSpec {
      spec: spec.to_string(),
    };

    let (set, path) = match spec.split_once('=') {
      Some((set, path)) => (set.trim().to_string(), PathBuf::from(path.trim())),
      None => {
        let path = PathBuf::from(spec.trim());
        let set = path
          .file_stem()
          .map(|stem| stem.to_string_lossy().into_owned())
          .ok_or_else(invalid)?;
        (set, path)
      }
    };

    if set.is_empty() || path.as_os_str().is_empty() {
      return Err(invalid());
    }
    Ok(LogSpec { set, path })
  }
}

/// One output table pair and the logs feeding it, in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
  pub name: String,
  pub variant: Variant,
  pub logs: Vec<LogSpec>,
}

/// Fully validated and resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
  #[serde(default = "default_output_dir")]
  pub output_dir: PathBuf,
  #[serde(default)]
  pub jobs: Vec<JobConfig>,
}

impl Config {
  /// Layers a TOML (or `.json`) file under `BMINE_` environment overrides.
  pub fn figment(path: &Path) -> Figment {
    let file = if path.extension().is_some_and(|ext| ext == "json") {
      Figment::new().merge(Json::file(path))
    } else {
      Figment::new().merge(Toml::file(path))
    };
    file.merge(Env::prefixed(ENV_PREFIX).only(&["output_dir"]))
  }

  /// Loads and validates a sweep configuration file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    if !path.exists() {
      return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let config: Config = Config::figment(path).extract().map_err(Box::new)?;
    config.validate()
  }

  fn validate(self) -> Result<Self, ConfigError> {
    if self.jobs.is_empty() {
      return Err(ConfigError::NoJobs);
    }
    if let Some(job) = self.jobs.iter().find(|job| job.logs.is_empty()) {
      return Err(ConfigError::NoLogs {
        job: job.name.clone(),
      });
    }
    Ok(self)
  }
}

impl TryFrom<MineArgs> for Config {
  type Error = ConfigError;

  fn try_from(
    MineArgs {
      variant,
      name,
      out_dir,
      logs,
    }: MineArgs,
  ) -> Result<Self, Self::Error> {
    let logs = logs
      .iter()
      .map(|spec| spec.parse())
      .collect::<Result<Vec<LogSpec>, _>>()?;

    Config {
      output_dir: out_dir,
      jobs: vec![JobConfig {
        name,
        variant,
        logs,
      }],
    }
    .validate()
  }
}
