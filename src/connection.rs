//! A single wiring between one output port and one input port.

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortAddr {
    pub process: String,
    pub port: String,
}

impl PortAddr {
    pub fn new(process: impl Into<String>, port: impl Into<String>) -> Self {
        PortAddr { process: process.into(), port: port.into() }
    }
}

impl std::fmt::Display for PortAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.process, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Connection {
    pub up: PortAddr,
    pub down: PortAddr,
}

impl Connection {
    pub fn new(up: PortAddr, down: PortAddr) -> Self {
        Connection { up, down }
    }

    /// A self-loop: both endpoints on the same process. These
    /// implement feedback and don't participate in DAG/frequency
    /// constraints.
    pub fn is_self_loop(&self) -> bool {
        self.up.process == self.down.process
    }
}
