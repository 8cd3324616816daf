//! CLI subcommands.

use anyhow::Context;
use clap::Subcommand;
use corelib::{ClusterConfig, LogId, NodeId};
use nodeset::{Decision, Options, SelectorKind};
use serde::Serialize;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Compute the storage-set size of a log.
    Size {
        /// Log id.
        #[arg(long)]
        log: u64,
        /// Size target; defaults to the log's configured nodeset_size.
        #[arg(long)]
        target: Option<usize>,
        #[arg(long, default_value_t = SelectorKind::RandomCrossDomain)]
        selector: SelectorKind,
        /// Nodes to leave out, comma separated.
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<u32>,
    },
    /// Select the storage set of a log.
    Select {
        /// Log id.
        #[arg(long)]
        log: u64,
        /// Seed for the random draws.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = SelectorKind::RandomCrossDomain)]
        selector: SelectorKind,
        /// Nodes to leave out, comma separated.
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<u32>,
        /// Current storage set, comma separated.
        #[arg(long, value_delimiter = ',')]
        previous: Option<Vec<u32>>,
    },
}

/// Output of a command, printed as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CommandResult {
    Size { log_id: LogId, nodeset_size: usize },
    Selection {
        log_id: LogId,
        #[serde(flatten)]
        decision: Decision,
    },
}

fn options(exclude: &[u32], seed: Option<u64>) -> Options {
    Options {
        exclude_nodes: exclude.iter().copied().map(NodeId).collect(),
        rng_seed: seed,
    }
}

impl Command {
    pub fn execute(&self, config: &ClusterConfig) -> anyhow::Result<CommandResult> {
        match self {
            Command::Size {
                log,
                target,
                selector,
                exclude,
            } => {
                let log_id = LogId(*log);
                let attrs = config
                    .log_attributes(log_id)
                    .with_context(|| format!("log {log_id} not found"))?;
                let nodeset_size = selector
                    .create()
                    .get_storage_set_size(
                        log_id,
                        config,
                        target.or(attrs.nodeset_size),
                        &attrs.replication,
                        &options(exclude, None),
                    )
                    .with_context(|| format!("sizing storage set of log {log_id}"))?;
                Ok(CommandResult::Size {
                    log_id,
                    nodeset_size,
                })
            }
            Command::Select {
                log,
                seed,
                selector,
                exclude,
                previous,
            } => {
                let log_id = LogId(*log);
                let previous: Option<Vec<NodeId>> = previous.as_ref().map(|ids| {
                    let mut ids: Vec<NodeId> = ids.iter().copied().map(NodeId).collect();
                    ids.sort_unstable();
                    ids
                });
                let decision = selector
                    .create()
                    .get_storage_set(
                        log_id,
                        config,
                        previous.as_deref(),
                        &options(exclude, *seed),
                    )
                    .with_context(|| format!("selecting storage set of log {log_id}"))?;
                Ok(CommandResult::Selection { log_id, decision })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster_file::ClusterFile;

    fn config() -> ClusterConfig {
        let mut nodes = Vec::new();
        for rack in 0..3 {
            for i in 0..3 {
                nodes.push(format!(
                    r#"{{ "id": {}, "location": "rg.dc.cl.ro.rk{rack}" }}"#,
                    rack * 3 + i
                ));
            }
        }
        let raw = format!(
            r#"{{ "nodes": [{}], "logs": [ {{ "id": 1, "replication": {{ "rack": 3 }}, "nodeset_size": 7 }} ] }}"#,
            nodes.join(",")
        );
        ClusterFile::parse(&raw).unwrap().into_config().unwrap()
    }

    #[test]
    fn test_size_command() {
        let cmd = Command::Size {
            log: 1,
            target: None,
            selector: SelectorKind::RandomCrossDomain,
            exclude: vec![],
        };
        let result = cmd.execute(&config()).unwrap();
        assert_eq!(
            result,
            CommandResult::Size {
                log_id: LogId(1),
                nodeset_size: 6
            }
        );
    }

    #[test]
    fn test_select_then_keep() {
        let cfg = config();
        let select = |previous| Command::Select {
            log: 1,
            seed: Some(11),
            selector: SelectorKind::RandomCrossDomain,
            exclude: vec![4],
            previous,
        };

        let CommandResult::Selection {
            decision: Decision::NeedsChange(set),
            ..
        } = select(None).execute(&cfg).unwrap()
        else {
            panic!("expected a new storage set");
        };
        assert_eq!(set.len(), 6);
        assert!(!set.contains(&NodeId(4)));

        // Order of --previous does not matter.
        let mut previous: Vec<u32> = set.iter().map(|id| id.0).collect();
        previous.reverse();
        let result = select(Some(previous)).execute(&cfg).unwrap();
        assert_eq!(
            result,
            CommandResult::Selection {
                log_id: LogId(1),
                decision: Decision::Keep
            }
        );
    }

    #[test]
    fn test_selection_json() {
        let result = CommandResult::Selection {
            log_id: LogId(1),
            decision: Decision::NeedsChange(vec![NodeId(0), NodeId(3)]),
        };
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"log_id":1,"decision":"needs_change","storage_set":[0,3]}"#
        );
    }

    #[test]
    fn test_unknown_log() {
        let cmd = Command::Size {
            log: 9,
            target: None,
            selector: SelectorKind::Random,
            exclude: vec![],
        };
        assert!(cmd.execute(&config()).is_err());
    }
}
