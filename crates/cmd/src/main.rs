// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use duraq_app::{AppConfig, User};
use duraq_storage_sqlite::SqliteStoreConfig;
use snafu::{ResultExt, Whatever};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[clap(name = "duraq", about = "duraq-cmd", version)]
struct Cli {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Demo(DemoArgs),
}

#[derive(Debug, Clone, Args)]
#[command(flatten_help = true)]
#[command(long_about = r"

Runs the demo scenario against a SQLite-backed user queue: enqueue two
users, log a snapshot, purge the queue, log another snapshot, shut down.
Examples:

duraq demo
duraq demo --db ./duraq.db --keep-data

")]
struct DemoArgs {
    /// Path to the SQLite database file.
    #[arg(long, default_value = "./duraq.db")]
    db: PathBuf,

    /// Keep the queue table on shutdown instead of dropping it.
    #[arg(long)]
    keep_data: bool,
}

impl DemoArgs {
    fn run(&self) -> Result<(), Whatever> {
        let mut config = AppConfig::new(SqliteStoreConfig::new(&self.db));
        config.drop_data_on_shutdown = !self.keep_data;

        let mut app = config.open().whatever_context("failed to open the app")?;
        app.add(User::new(1, "a1", "Robert"))
            .whatever_context("failed to enqueue")?;
        app.add(User::new(2, "a2", "Martin"))
            .whatever_context("failed to enqueue")?;
        app.snapshot().whatever_context("failed to snapshot")?;
        app.purge().whatever_context("failed to purge")?;
        app.snapshot().whatever_context("failed to snapshot")?;
        app.shutdown().whatever_context("shutdown failed")?;
        Ok(())
    }
}

fn main() -> Result<(), Whatever> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.commands {
        Commands::Demo(da) => da.run(),
    }
}
