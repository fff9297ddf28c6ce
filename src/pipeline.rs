//! The pipeline graph (C6): holds processes and connections, validates
//! topology/types/flags/frequencies at setup, and exposes queries.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::cluster::{self, Cluster};
use crate::config::{ConfigBlock, BLOCK_SEP};
use crate::connection::{Connection, PortAddr};
use crate::edge::{self, DEFAULT_CAPACITY};
use crate::error::{Error, Result};
use crate::frequency::{self, FrequencyReport};
use crate::port::{PortDirection, PortFlags, PortType};
use crate::process::Process;
use crate::type_inference;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Initial,
    Setup,
    Running,
    Stopped,
    SetupFailed,
}

#[derive(Debug, Clone, Copy)]
pub struct EdgeMeta {
    pub capacity: usize,
    pub blocking: bool,
}

pub struct Pipeline {
    config: ConfigBlock,
    processes: HashMap<String, Box<dyn Process>>,
    clusters: HashMap<String, Box<dyn Cluster>>,
    connections: Vec<Connection>,
    edges: HashMap<PortAddr, EdgeMeta>,
    state: PipelineState,
    resolved_types: HashMap<PortAddr, PortType>,
    frequencies: Option<FrequencyReport>,
}

impl Pipeline {
    pub fn new(config: ConfigBlock) -> Self {
        Pipeline {
            config,
            processes: HashMap::new(),
            clusters: HashMap::new(),
            connections: Vec::new(),
            edges: HashMap::new(),
            state: PipelineState::Initial,
            resolved_types: HashMap::new(),
            frequencies: None,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn config(&self) -> &ConfigBlock {
        &self.config
    }

    pub fn add_process(&mut self, name: impl Into<String>, process: Box<dyn Process>) -> Result<()> {
        if !matches!(self.state, PipelineState::Initial) {
            return Err(Error::AddAfterSetup);
        }
        let name = name.into();
        if self.processes.contains_key(&name) || self.clusters.contains_key(&name) {
            return Err(Error::DuplicateProcessName(name));
        }
        tracing::debug!(process = %name, "process added to pipeline");
        self.processes.insert(name, process);
        Ok(())
    }

    pub fn add_cluster(&mut self, name: impl Into<String>, cluster: Box<dyn Cluster>) -> Result<()> {
        if !matches!(self.state, PipelineState::Initial) {
            return Err(Error::AddAfterSetup);
        }
        let name = name.into();
        if self.processes.contains_key(&name) || self.clusters.contains_key(&name) {
            return Err(Error::DuplicateProcessName(name));
        }
        tracing::debug!(cluster = %name, "cluster added to pipeline");
        self.clusters.insert(name, cluster);
        Ok(())
    }

    pub fn remove_process(&mut self, name: &str) -> Result<()> {
        if !matches!(self.state, PipelineState::Initial) {
            return Err(Error::RemoveAfterSetup);
        }
        if self.processes.remove(name).is_none() {
            return Err(Error::NoSuchProcess(name.to_string()));
        }
        self.connections.retain(|c| c.up.process != name && c.down.process != name);
        Ok(())
    }

    fn port_direction_type_flags(
        &self,
        addr: &PortAddr,
        want: PortDirection,
    ) -> Result<(PortType, PortFlags)> {
        let proc = self
            .processes
            .get(&addr.process)
            .ok_or_else(|| Error::NoSuchProcess(addr.process.clone()))?;
        let specs = match want {
            PortDirection::Input => proc.input_ports(),
            PortDirection::Output => proc.output_ports(),
        };
        specs
            .into_iter()
            .find(|s| s.name == addr.port)
            .map(|s| (s.port_type, s.flags))
            .ok_or_else(|| Error::NoSuchPort { process: addr.process.clone(), port: addr.port.clone() })
    }

    pub fn connect(&mut self, up: PortAddr, down: PortAddr) -> Result<()> {
        if !matches!(self.state, PipelineState::Initial) {
            return Err(Error::ConnectionAfterSetup);
        }
        let (up_type, up_flags) = self.port_direction_type_flags(&up, PortDirection::Output)?;
        let (down_type, down_flags) = self.port_direction_type_flags(&down, PortDirection::Input)?;

        if self.connections.iter().any(|c| c.down == down) {
            return Err(Error::ConnectionFlagMismatch(format!(
                "{down} already has an incoming connection"
            )));
        }

        if let (Some(a), Some(b)) = (up_type.as_concrete(), down_type.as_concrete()) {
            if a != b {
                return Err(Error::ConnectionTypeMismatch(format!(
                    "{up} ({a}) -> {down} ({b})"
                )));
            }
        }

        let existing_output_connections = self.connections.iter().filter(|c| c.up == up).count();
        if !crate::port::flags_compatible(up_flags, down_flags, existing_output_connections) {
            return Err(Error::ConnectionFlagMismatch(format!("{up} -> {down}")));
        }

        self.connections.push(Connection::new(up, down));
        Ok(())
    }

    pub fn disconnect(&mut self, up: &PortAddr, down: &PortAddr) -> Result<()> {
        if !matches!(self.state, PipelineState::Initial) {
            return Err(Error::DisconnectionAfterSetup);
        }
        let before = self.connections.len();
        self.connections.retain(|c| !(&c.up == up && &c.down == down));
        if self.connections.len() == before {
            return Err(Error::NoSuchPort { process: down.process.clone(), port: down.port.clone() });
        }
        Ok(())
    }

    /// A disconnected process is only an orphan when the pipeline has
    /// other processes it could have been wired to. A lone process
    /// with an unconnected required port is not orphaned; it's reported
    /// by `check_required_ports` as a missing connection instead.
    fn check_orphans(&self) -> Result<()> {
        let multi = self.processes.len() > 1;
        if !multi {
            return Ok(());
        }
        for name in self.processes.keys() {
            let connected = self
                .connections
                .iter()
                .any(|c| c.up.process == *name || c.down.process == *name);
            if connected {
                continue;
            }
            return Err(Error::OrphanedProcesses(name.clone()));
        }
        Ok(())
    }

    fn check_dag(&self) -> Result<()> {
        let mut indegree: HashMap<&str, usize> = self.processes.keys().map(|k| (k.as_str(), 0)).collect();
        let mut adjacency: HashMap<&str, Vec<&str>> = self.processes.keys().map(|k| (k.as_str(), Vec::new())).collect();
        for c in &self.connections {
            if c.is_self_loop() {
                continue;
            }
            adjacency.entry(c.up.process.as_str()).or_default().push(c.down.process.as_str());
            *indegree.entry(c.down.process.as_str()).or_default() += 1;
        }
        let mut queue: VecDeque<&str> = indegree
            .iter()
            .filter(|(_, &d)| d == 0)
            .map(|(&n, _)| n)
            .collect();
        let mut visited = 0usize;
        while let Some(n) = queue.pop_front() {
            visited += 1;
            if let Some(neighbors) = adjacency.get(n) {
                for &m in neighbors {
                    let d = indegree.get_mut(m).unwrap();
                    *d -= 1;
                    if *d == 0 {
                        queue.push_back(m);
                    }
                }
            }
        }
        if visited != self.processes.len() {
            return Err(Error::NotADag);
        }
        Ok(())
    }

    fn check_required_ports(&self) -> Result<()> {
        for (name, proc) in &self.processes {
            for spec in proc.input_ports() {
                if spec.required() {
                    let satisfied = self
                        .connections
                        .iter()
                        .any(|c| c.down.process == *name && c.down.port == spec.name);
                    if !satisfied {
                        return Err(Error::MissingConnection { process: name.clone(), port: spec.name.clone() });
                    }
                }
            }
            for spec in proc.output_ports() {
                if spec.required() {
                    let satisfied = self
                        .connections
                        .iter()
                        .any(|c| c.up.process == *name && c.up.port == spec.name);
                    if !satisfied {
                        return Err(Error::MissingConnection { process: name.clone(), port: spec.name.clone() });
                    }
                }
            }
        }
        Ok(())
    }

    fn edge_config_for(&self, conn: &Connection) -> (usize, bool) {
        let default_capacity = self
            .config
            .get_as_or::<usize>("_pipeline:_edge:capacity", DEFAULT_CAPACITY);
        let default_blocking = self.config.get_as_or::<bool>("_pipeline:_edge:blocking", true);
        let override_prefix = format!(
            "_pipeline:_edge:{}:{}:{}:{}",
            conn.up.process, conn.up.port, conn.down.process, conn.down.port
        );
        let capacity = self
            .config
            .get_as_or::<usize>(&format!("{override_prefix}{BLOCK_SEP}capacity"), default_capacity);
        let blocking = self
            .config
            .get_as_or::<bool>(&format!("{override_prefix}{BLOCK_SEP}blocking"), default_blocking);
        (capacity, blocking)
    }

    pub fn setup_pipeline(&mut self) -> Result<()> {
        if !matches!(self.state, PipelineState::Initial) {
            return Err(Error::PipelineDuplicateSetup);
        }

        let result = self.try_setup();
        if let Err(e) = result {
            tracing::warn!(error = %e, "pipeline setup failed");
            self.state = PipelineState::SetupFailed;
            return Err(e);
        }
        tracing::info!(processes = self.processes.len(), "pipeline setup complete");
        self.state = PipelineState::Setup;
        Ok(())
    }

    fn try_setup(&mut self) -> Result<()> {
        cluster::expand_all(&mut self.clusters, &mut self.processes, &mut self.connections)?;

        for (name, proc) in self.processes.iter_mut() {
            let sub = self.config.subblock(name).unwrap_or_else(|_| ConfigBlock::empty(name));
            proc.configure(&sub)?;
        }

        self.check_orphans()?;

        let resolved = type_inference::resolve(&mut self.processes, &self.connections)?;
        self.resolved_types = resolved;

        let freq = frequency::analyze(&self.processes, &self.connections)?;
        self.frequencies = Some(freq);

        self.check_dag()?;
        self.check_required_ports()?;

        let conns = self.connections.clone();
        for conn in &conns {
            let (capacity, blocking) = self.edge_config_for(conn);
            let (writer, reader) = edge::channel(capacity, blocking);
            self.edges.insert(conn.down.clone(), EdgeMeta { capacity, blocking });

            let down_proc = self
                .processes
                .get_mut(&conn.down.process)
                .ok_or_else(|| Error::NoSuchProcess(conn.down.process.clone()))?;
            down_proc.connect_input_port(&conn.down.port, reader)?;

            let up_proc = self
                .processes
                .get_mut(&conn.up.process)
                .ok_or_else(|| Error::NoSuchProcess(conn.up.process.clone()))?;
            up_proc.connect_output_port(&conn.up.port, writer)?;
        }

        for proc in self.processes.values_mut() {
            proc.init()?;
        }

        Ok(())
    }

    pub fn reset(&mut self) -> Result<()> {
        match self.state {
            PipelineState::Running => return Err(Error::ResetRunningPipeline),
            PipelineState::Setup | PipelineState::Stopped | PipelineState::SetupFailed => {}
            PipelineState::Initial => return Ok(()),
        }
        for proc in self.processes.values_mut() {
            proc.reset()?;
        }
        self.edges.clear();
        self.resolved_types.clear();
        self.frequencies = None;
        self.state = PipelineState::Initial;
        Ok(())
    }

    pub fn reconfigure(&mut self, conf: &ConfigBlock) -> Result<()> {
        if matches!(self.state, PipelineState::Initial) {
            return Err(Error::ReconfigureBeforeSetup);
        }
        for (name, proc) in self.processes.iter_mut() {
            let sub = conf.subblock(name).unwrap_or_else(|_| ConfigBlock::empty(name));
            proc.reconfigure(&sub)?;
        }
        Ok(())
    }

    pub fn process_by_name(&self, name: &str) -> Option<&dyn Process> {
        self.processes.get(name).map(|b| b.as_ref())
    }

    pub fn process_mut(&mut self, name: &str) -> Option<&mut Box<dyn Process>> {
        self.processes.get_mut(name)
    }

    /// Hands every process to the caller (a scheduler driving them on
    /// dedicated threads), leaving the pipeline's map empty until
    /// [`Pipeline::restore_processes`] puts them back.
    pub fn take_processes(&mut self) -> HashMap<String, Box<dyn Process>> {
        std::mem::take(&mut self.processes)
    }

    pub fn restore_processes(&mut self, processes: HashMap<String, Box<dyn Process>>) {
        self.processes = processes;
    }

    pub fn process_names(&self) -> HashSet<String> {
        self.processes.keys().cloned().collect()
    }

    pub fn connections_from_addr(&self, addr: &PortAddr) -> Vec<&Connection> {
        self.connections.iter().filter(|c| &c.up == addr).collect()
    }

    pub fn connections_to_addr(&self, addr: &PortAddr) -> Vec<&Connection> {
        self.connections.iter().filter(|c| &c.down == addr).collect()
    }

    pub fn edge_for_connection(&self, down: &PortAddr) -> Option<EdgeMeta> {
        self.edges.get(down).copied()
    }

    pub fn resolved_type(&self, addr: &PortAddr) -> Option<&PortType> {
        self.resolved_types.get(addr)
    }

    pub fn frequencies(&self) -> Option<&FrequencyReport> {
        self.frequencies.as_ref()
    }

    pub(crate) fn set_running(&mut self) {
        self.state = PipelineState::Running;
    }

    pub(crate) fn set_stopped(&mut self) {
        self.state = PipelineState::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn basic_pipeline_setup_succeeds() {
        let mut p = Pipeline::new(ConfigBlock::empty("root"));
        p.add_process("up1", Box::new(fixtures::numbers::Numbers::new(1))).unwrap();
        p.add_process("up2", Box::new(fixtures::numbers::Numbers::new(2))).unwrap();
        p.add_process("down", Box::new(fixtures::multiplication::Multiplication::new())).unwrap();
        p.add_process("sink", Box::new(fixtures::print_number::PrintNumber::new())).unwrap();

        p.connect(PortAddr::new("up1", "number"), PortAddr::new("down", "factor1")).unwrap();
        p.connect(PortAddr::new("up2", "number"), PortAddr::new("down", "factor2")).unwrap();
        p.connect(PortAddr::new("down", "product"), PortAddr::new("sink", "number")).unwrap();

        p.setup_pipeline().unwrap();
        assert_eq!(p.state(), PipelineState::Setup);
    }

    #[test]
    fn self_loop_setup_succeeds() {
        let mut p = Pipeline::new(ConfigBlock::empty("root"));
        p.add_process("feedback", Box::new(fixtures::feedback::Feedback::new())).unwrap();
        p.connect(PortAddr::new("feedback", "output"), PortAddr::new("feedback", "input")).unwrap();
        p.setup_pipeline().unwrap();
    }

    #[test]
    fn cycle_across_processes_rejected() {
        let mut p = Pipeline::new(ConfigBlock::empty("root"));
        p.add_process("flow", Box::new(fixtures::flow::Flow::new())).unwrap();
        p.add_process("flow2", Box::new(fixtures::flow::Flow::new())).unwrap();
        p.add_process("mult", Box::new(fixtures::multiplication::Multiplication::new())).unwrap();

        p.connect(PortAddr::new("flow", "output"), PortAddr::new("mult", "factor1")).unwrap();
        p.connect(PortAddr::new("flow2", "output"), PortAddr::new("mult", "factor2")).unwrap();
        p.connect(PortAddr::new("mult", "product"), PortAddr::new("flow", "input")).unwrap();
        p.connect(PortAddr::new("mult", "product"), PortAddr::new("flow2", "input")).unwrap();

        let err = p.setup_pipeline().unwrap_err();
        assert_eq!(err, Error::NotADag);
    }

    #[test]
    fn duplicate_setup_fails() {
        let mut p = Pipeline::new(ConfigBlock::empty("root"));
        p.add_process("orphan", Box::new(fixtures::orphan::Orphan::new())).unwrap();
        p.setup_pipeline().unwrap();
        assert_eq!(p.setup_pipeline().unwrap_err(), Error::PipelineDuplicateSetup);
    }

    #[test]
    fn reset_running_pipeline_fails() {
        let mut p = Pipeline::new(ConfigBlock::empty("root"));
        p.add_process("orphan", Box::new(fixtures::orphan::Orphan::new())).unwrap();
        p.setup_pipeline().unwrap();
        p.set_running();
        assert_eq!(p.reset().unwrap_err(), Error::ResetRunningPipeline);
    }

    #[test]
    fn lone_process_with_unconnected_required_input_is_a_missing_connection() {
        let mut p = Pipeline::new(ConfigBlock::empty("root"));
        p.add_process("take", Box::new(fixtures::take_string::TakeString::new())).unwrap();
        let err = p.setup_pipeline().unwrap_err();
        assert!(matches!(err, Error::MissingConnection { .. }), "expected MissingConnection, got {err:?}");
    }

    #[test]
    fn lone_process_with_unconnected_required_output_is_a_missing_connection() {
        let mut p = Pipeline::new(ConfigBlock::empty("root"));
        p.add_process("up1", Box::new(fixtures::numbers::Numbers::new(1))).unwrap();
        let err = p.setup_pipeline().unwrap_err();
        assert!(matches!(err, Error::MissingConnection { .. }), "expected MissingConnection, got {err:?}");
    }
}
