//! The frequency analyzer (C8): assigns a rational process-rate to
//! every process by BFS propagation from an arbitrary root, failing
//! when independent paths through a fan-out/fan-in disagree.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::connection::{Connection, PortAddr};
use crate::error::{Error, Result};
use crate::port::{PortFlags, PortSpec};
use crate::process::Process;
use crate::rational::Rational;

pub struct FrequencyReport {
    pub process_rates: HashMap<String, Rational>,
    pub port_frequencies: HashMap<PortAddr, Rational>,
}

pub fn analyze(
    processes: &HashMap<String, Box<dyn Process>>,
    connections: &[Connection],
) -> Result<FrequencyReport> {
    let mut specs: HashMap<PortAddr, PortSpec> = HashMap::new();
    for (pname, proc) in processes.iter() {
        for spec in proc.input_ports() {
            specs.insert(PortAddr::new(pname.clone(), spec.name.clone()), spec);
        }
        for spec in proc.output_ports() {
            specs.insert(PortAddr::new(pname.clone(), spec.name.clone()), spec);
        }
    }

    // adjacency[process] = Vec<(neighbor_process, rate_ratio_to_neighbor)>
    let mut adjacency: HashMap<String, Vec<(String, Rational)>> = HashMap::new();
    for name in processes.keys() {
        adjacency.entry(name.clone()).or_default();
    }

    for conn in connections {
        if conn.is_self_loop() {
            continue;
        }
        let down_flags = specs
            .get(&conn.down)
            .map(|s| s.flags)
            .unwrap_or(PortFlags::empty());
        if down_flags.contains(PortFlags::NODEP) {
            continue;
        }
        let up_freq = specs.get(&conn.up).map(|s| s.frequency).unwrap_or(Rational::ONE);
        let down_freq = specs.get(&conn.down).map(|s| s.frequency).unwrap_or(Rational::ONE);

        adjacency
            .entry(conn.up.process.clone())
            .or_default()
            .push((conn.down.process.clone(), up_freq * down_freq.recip()));
        adjacency
            .entry(conn.down.process.clone())
            .or_default()
            .push((conn.up.process.clone(), down_freq * up_freq.recip()));
    }

    let mut names: Vec<&String> = processes.keys().collect();
    names.sort();

    let mut rates: HashMap<String, Rational> = HashMap::new();
    let mut visited: HashSet<String> = HashSet::new();

    for root in &names {
        if visited.contains(root.as_str()) {
            continue;
        }
        rates.insert((*root).clone(), Rational::ONE);
        visited.insert((*root).clone());
        let mut queue = VecDeque::new();
        queue.push_back((*root).clone());
        while let Some(u) = queue.pop_front() {
            let r_u = rates[&u];
            let edges = adjacency.get(&u).cloned().unwrap_or_default();
            for (v, ratio) in edges {
                let r_v = r_u * ratio;
                if let Some(existing) = rates.get(&v) {
                    if *existing != r_v {
                        return Err(Error::FrequencyMismatch {
                            process: v.clone(),
                            expected: existing.to_string(),
                            got: r_v.to_string(),
                        });
                    }
                } else {
                    rates.insert(v.clone(), r_v);
                    visited.insert(v.clone());
                    queue.push_back(v);
                }
            }
        }
    }

    let mut port_frequencies = HashMap::new();
    for (addr, spec) in &specs {
        if let Some(rate) = rates.get(&addr.process) {
            port_frequencies.insert(addr.clone(), *rate * spec.frequency);
        }
    }
    Ok(FrequencyReport { process_rates: rates, port_frequencies })
}
