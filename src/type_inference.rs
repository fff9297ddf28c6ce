//! The type inference engine (C7): resolves flow-dependent and
//! data-dependent port types across connected components, with
//! cascade/reject error distinction.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::connection::{Connection, PortAddr};
use crate::error::{Error, Result};
use crate::port::{PortSpec, PortType};
use crate::process::Process;

/// Disjoint-set union over an indexed vertex list.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        DisjointSet { parent: (0..n).collect() }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

/// Resolves all flow-dependent/`any` ports reachable from a concrete
/// type, inviting processes via `set_input_port_type`/
/// `set_output_port_type`. Returns the map of newly-resolved concrete
/// types (callers merge this into the pipeline's type cache).
pub fn resolve(
    processes: &mut HashMap<String, Box<dyn Process>>,
    connections: &[Connection],
) -> Result<HashMap<PortAddr, PortType>> {
    // Snapshot every declared port, keyed by address.
    let mut specs: HashMap<PortAddr, PortSpec> = HashMap::new();
    for (pname, proc) in processes.iter() {
        for spec in proc.input_ports() {
            specs.insert(PortAddr::new(pname.clone(), spec.name.clone()), spec);
        }
        for spec in proc.output_ports() {
            specs.insert(PortAddr::new(pname.clone(), spec.name.clone()), spec);
        }
    }

    let mut addrs: Vec<PortAddr> = specs.keys().cloned().collect();
    addrs.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
    let index: HashMap<PortAddr, usize> =
        addrs.iter().enumerate().map(|(i, a)| (a.clone(), i)).collect();

    let mut dsu = DisjointSet::new(addrs.len());
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); addrs.len()];
    let mut link = |dsu: &mut DisjointSet, adj: &mut Vec<Vec<usize>>, a: usize, b: usize| {
        dsu.union(a, b);
        adj[a].push(b);
        adj[b].push(a);
    };

    for conn in connections {
        if let (Some(&u), Some(&d)) = (index.get(&conn.up), index.get(&conn.down)) {
            link(&mut dsu, &mut adjacency, u, d);
        }
    }

    // Within-process flow_dependent:<tag> grouping.
    let mut groups: HashMap<(&str, &str), Vec<usize>> = HashMap::new();
    for addr in &addrs {
        if let Some(tag) = specs[addr].port_type.flow_group() {
            groups
                .entry((addr.process.as_str(), tag))
                .or_default()
                .push(index[addr]);
        }
    }
    for members in groups.values() {
        for w in members.windows(2) {
            link(&mut dsu, &mut adjacency, w[0], w[1]);
        }
    }

    // Group vertices by component root.
    let mut components: HashMap<usize, Vec<usize>> = HashMap::new();
    for i in 0..addrs.len() {
        let root = dsu.find(i);
        components.entry(root).or_default().push(i);
    }
    let mut component_list: Vec<Vec<usize>> = components.into_values().collect();
    for members in component_list.iter_mut() {
        members.sort_by(|a, b| addrs[*a].to_string().cmp(&addrs[*b].to_string()));
    }
    component_list.sort_by(|a, b| addrs[a[0]].to_string().cmp(&addrs[b[0]].to_string()));

    let mut resolved: HashMap<PortAddr, PortType> = HashMap::new();

    for members in &component_list {
        let concrete_types: HashSet<&str> = members
            .iter()
            .filter_map(|&i| specs[&addrs[i]].port_type.as_concrete())
            .collect();

        if concrete_types.len() > 1 {
            let names: Vec<String> = members.iter().map(|&i| addrs[i].to_string()).collect();
            return Err(Error::ConnectionTypeMismatch(format!(
                "component {{{}}} carries conflicting types: {:?}",
                names.join(", "),
                concrete_types
            )));
        }

        if concrete_types.is_empty() {
            continue;
        }

        let target = (*concrete_types.iter().next().unwrap()).to_string();
        for &i in members {
            if specs[&addrs[i]].port_type.as_concrete().is_some() {
                resolved.insert(addrs[i].clone(), PortType::concrete(target.clone()));
            }
        }

        // BFS distance from any already-concrete vertex in the component.
        let mut dist: HashMap<usize, usize> = HashMap::new();
        let mut queue = VecDeque::new();
        for &i in members {
            if specs[&addrs[i]].port_type.as_concrete().is_some() {
                dist.insert(i, 0);
                queue.push_back(i);
            }
        }
        while let Some(i) = queue.pop_front() {
            let d = dist[&i];
            for &n in &adjacency[i] {
                if !dist.contains_key(&n) {
                    dist.insert(n, d + 1);
                    queue.push_back(n);
                }
            }
        }

        // Invite flow-dependent/any ports in ascending distance order so
        // a rejection can be classified as direct (distance 1) vs a
        // multi-hop cascade (distance > 1).
        let mut pending: Vec<usize> = members
            .iter()
            .copied()
            .filter(|&i| matches!(specs[&addrs[i]].port_type, PortType::Any | PortType::FlowDependent(_)))
            .collect();
        pending.sort_by_key(|i| dist.get(i).copied().unwrap_or(usize::MAX));

        for i in pending {
            let addr = &addrs[i];
            let proc = processes
                .get_mut(&addr.process)
                .ok_or_else(|| Error::NoSuchProcess(addr.process.clone()))?;
            let accepted = match specs[addr].direction {
                crate::port::PortDirection::Input => proc.set_input_port_type(&addr.port, &target),
                crate::port::PortDirection::Output => proc.set_output_port_type(&addr.port, &target),
            };
            if !accepted {
                let hop = dist.get(&i).copied().unwrap_or(usize::MAX);
                return if hop <= 1 {
                    Err(Error::ConnectionDependentType {
                        process: addr.process.clone(),
                        port: addr.port.clone(),
                    })
                } else {
                    Err(Error::ConnectionDependentTypeCascade {
                        process: addr.process.clone(),
                        port: addr.port.clone(),
                    })
                };
            }
            resolved.insert(addr.clone(), PortType::concrete(target.clone()));
        }
    }

    // Final check: every connection endpoint must now be resolved.
    for conn in connections {
        for addr in [&conn.up, &conn.down] {
            let declared = &specs[addr];
            let is_resolved = declared.port_type.is_resolved() || resolved.contains_key(addr);
            if !is_resolved {
                if matches!(declared.port_type, PortType::DataDependent) {
                    return Err(Error::UntypedDataDependent {
                        process: addr.process.clone(),
                        port: addr.port.clone(),
                    });
                }
                return Err(Error::UntypedConnection {
                    process: addr.process.clone(),
                    port: addr.port.clone(),
                });
            }
        }
    }

    Ok(resolved)
}
