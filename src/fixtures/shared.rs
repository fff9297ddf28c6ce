//! Upstream output flagged `SHARED`: its value may fan out to several
//! downstream inputs, but at most one of them may be `MUTATE`.

use crate::datum::Datum;
use crate::edge::{EdgeReader, EdgeWriter};
use crate::error::{Error, Result};
use crate::port::{PortDirection, PortFlags, PortSpec, PortType};
use crate::process::Process;
use crate::stamp::Stamp;

pub struct Shared {
    name: String,
    stamp: Stamp,
    outputs: Vec<EdgeWriter>,
}

impl Shared {
    pub fn new() -> Self {
        Shared { name: "shared".to_string(), stamp: Stamp::new_default(), outputs: Vec::new() }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Process for Shared {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_type(&self) -> &str {
        "shared"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        Vec::new()
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("shared", PortDirection::Output, PortType::Any).with_flags(PortFlags::SHARED)]
    }

    fn connect_input_port(&mut self, port: &str, _edge: EdgeReader) -> Result<()> {
        Err(Error::NoSuchPort { process: self.name.clone(), port: port.to_string() })
    }

    fn connect_output_port(&mut self, port: &str, edge: EdgeWriter) -> Result<()> {
        if port != "shared" {
            return Err(Error::NoSuchPort { process: self.name.clone(), port: port.to_string() });
        }
        self.outputs.push(edge);
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        self.stamp = self.stamp.increment();
        for out in &self.outputs {
            out.push(self.stamp, Datum::new(0i64))?;
        }
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.stamp = Stamp::new_default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::{channel, DEFAULT_CAPACITY};

    #[test]
    fn output_port_carries_shared_flag() {
        let ports = Shared::new().output_ports();
        assert_eq!(ports.len(), 1);
        assert!(ports[0].flags.contains(PortFlags::SHARED));
    }

    #[test]
    fn step_fans_out_to_every_connected_output() {
        let mut proc = Shared::new();
        let (w1, r1) = channel(DEFAULT_CAPACITY, true);
        let (w2, r2) = channel(DEFAULT_CAPACITY, true);
        proc.connect_output_port("shared", w1).unwrap();
        proc.connect_output_port("shared", w2).unwrap();
        proc.step().unwrap();
        assert_eq!(r1.pop().1.kind(), crate::datum::DatumKind::Data);
        assert_eq!(r2.pop().1.kind(), crate::datum::DatumKind::Data);
    }
}
