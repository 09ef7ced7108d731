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
use Commands::Mine;
use Commands::Sweep;
use anyhow::Result;
use benchmine::cli::Cli;
use benchmine::cli::Commands;
use benchmine::config::Config;
use benchmine::driver::run_jobs;
use benchmine::logging::setup_tracing;
use clap::Parser;
use tracing::Instrument;

#[tokio::main]
async fn main() -> Result<()> {
  let _guard = setup_tracing()?;

  let Cli { command } = Cli::parse();
  let main_span = tracing::info_span!("bmine");

  async {
    let config = match command {
      Mine(mine_args) => {
        tracing::info!("Resolving jobs from command line...");
        Config::try_from(mine_args)?
      }
      Sweep { config } => {
        tracing::info!("Loading jobs from {}...", config.display());
        Config::load(&config)?
      }
    };

    run_jobs(config).await
  }
  .instrument(main_span)
  .await
}
