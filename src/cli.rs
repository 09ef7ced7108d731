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
use crate::miner::Variant;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about = "Miner of kernel micro-benchmark logs")]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
  /// Mine a set of logs given on the command line into one table pair.
  Mine(MineArgs),

  /// Mine every job listed in a configuration file.
  Sweep {
    /// TOML (or .json) file listing the jobs to run.
    #[arg(long, short)]
    config: PathBuf,
  },
}

#[derive(Debug, Args)]
pub struct MineArgs {
  /// Layout of the input logs.
  #[arg(long, value_enum, default_value_t = Variant::Counter)]
  pub variant: Variant,

  /// Base name of the output tables (`<name>.perf.csv`, `<name>.miss.csv`).
  #[arg(long, default_value = "results")]
  pub name: String,

  /// Directory the tables are written to.
  #[arg(long, env = "BMINE_OUT_DIR", default_value = ".")]
  pub out_dir: PathBuf,

  /// Logs to mine, in order, as SET=PATH or PATH.
  /// Example: fl=arm64.fl.n.log sa=arm64.sa.n.log
  #[arg(required = true)]
  pub logs: Vec<String>,
}
