//! Command-line configuration.

use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, Level};

use crate::cluster_file::ClusterFile;
use crate::commands::Command;

/// Inspect node-set selection for a cluster description.
#[derive(Debug, Parser)]
#[command(name = "nodeset", version, about)]
pub struct CliConfig {
    /// Cluster description (JSON).
    #[arg(short, long, value_name = "PATH")]
    pub config: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        tracing_subscriber::fmt()
            .with_max_level(self.log_level())
            .with_writer(std::io::stderr)
            .init();

        let cluster = ClusterFile::load(&self.config)?.into_config()?;
        debug!(
            nodes = cluster.nodes().len(),
            storage_nodes = cluster.storage_node_count(),
            logs = cluster.log_ids().count(),
            "loaded cluster"
        );

        let result = self.command.execute(&cluster)?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        CliConfig::command().debug_assert();
    }

    #[test]
    fn test_parse_select() {
        let cli = CliConfig::parse_from([
            "nodeset", "-c", "cluster.json", "-vv", "select", "--log", "3", "--seed", "9",
            "--exclude", "1,2", "--previous", "4,5,6",
        ]);
        assert_eq!(cli.log_level(), Level::TRACE);
        match cli.command {
            Command::Select {
                log,
                seed,
                exclude,
                previous,
                ..
            } => {
                assert_eq!(log, 3);
                assert_eq!(seed, Some(9));
                assert_eq!(exclude, vec![1, 2]);
                assert_eq!(previous, Some(vec![4, 5, 6]));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
