//! Composite processes that expand into a subgraph at setup.
//!
//! Clusters are owned by the pipeline like any process; their expanded
//! children become additional pipeline-owned processes under derived
//! names (`cluster_name/sub_name`), per the ownership-over-cycles
//! design note: no shared-ownership back-reference from child to
//! cluster is needed, the pipeline simply grows its process map.

use std::collections::HashMap;

use crate::connection::{Connection, PortAddr};
use crate::error::Result;
use crate::process::Process;

/// A composite process. `expand` yields the sub-processes (named
/// relative to the cluster) and the connections among them, addressed
/// with those relative names; [`expand_all`] grafts both into the
/// pipeline under `cluster_name/sub_name`.
pub trait Cluster: Send {
    fn expand(&mut self, cluster_name: &str) -> (Vec<(String, Box<dyn Process>)>, Vec<Connection>);
}

pub const CHILD_SEP: char = '/';

/// Grafts every cluster's expansion into the top-level process/connection
/// lists. Boundary wiring (connections made *to the cluster itself* from
/// outside) is cluster-specific and out of scope here, same as upstream:
/// a cluster that wants external connections to reach a particular child
/// should add that child directly under the top-level name it exposes.
pub(crate) fn expand_all(
    clusters: &mut HashMap<String, Box<dyn Cluster>>,
    processes: &mut HashMap<String, Box<dyn Process>>,
    connections: &mut Vec<Connection>,
) -> Result<()> {
    for (cluster_name, cluster) in clusters.drain() {
        let (children, internal) = cluster.expand(&cluster_name);
        for (child_name, child_proc) in children {
            let qualified = format!("{cluster_name}{CHILD_SEP}{child_name}");
            processes.insert(qualified, child_proc);
        }
        for conn in internal {
            connections.push(Connection::new(
                qualify(&cluster_name, &conn.up),
                qualify(&cluster_name, &conn.down),
            ));
        }
    }
    Ok(())
}

fn qualify(cluster_name: &str, addr: &PortAddr) -> PortAddr {
    PortAddr::new(format!("{cluster_name}{CHILD_SEP}{}", addr.process), addr.port.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    struct PassthroughCluster;

    impl Cluster for PassthroughCluster {
        fn expand(&mut self, _cluster_name: &str) -> (Vec<(String, Box<dyn Process>)>, Vec<Connection>) {
            let children: Vec<(String, Box<dyn Process>)> = vec![
                ("src".to_string(), Box::new(fixtures::numbers::Numbers::new(1))),
                ("sink".to_string(), Box::new(fixtures::print_number::PrintNumber::new())),
            ];
            let internal = vec![Connection::new(
                PortAddr::new("src", "number"),
                PortAddr::new("sink", "number"),
            )];
            (children, internal)
        }
    }

    #[test]
    fn cluster_children_are_qualified_by_name() {
        let mut clusters: HashMap<String, Box<dyn Cluster>> = HashMap::new();
        clusters.insert("grp".to_string(), Box::new(PassthroughCluster));
        let mut processes: HashMap<String, Box<dyn Process>> = HashMap::new();
        let mut connections = Vec::new();

        expand_all(&mut clusters, &mut processes, &mut connections).unwrap();

        assert!(processes.contains_key("grp/src"));
        assert!(processes.contains_key("grp/sink"));
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].up.process, "grp/src");
        assert_eq!(connections[0].down.process, "grp/sink");
    }
}
