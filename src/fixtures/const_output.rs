//! Upstream output flagged `CONST`: consumers must not request `MUTATE`
//! access to it.

use crate::datum::Datum;
use crate::edge::{EdgeReader, EdgeWriter};
use crate::error::{Error, Result};
use crate::port::{PortDirection, PortFlags, PortSpec, PortType};
use crate::process::Process;
use crate::stamp::Stamp;

pub struct ConstOutput {
    name: String,
    stamp: Stamp,
    outputs: Vec<EdgeWriter>,
}

impl ConstOutput {
    pub fn new() -> Self {
        ConstOutput { name: "const".to_string(), stamp: Stamp::new_default(), outputs: Vec::new() }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Process for ConstOutput {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_type(&self) -> &str {
        "const"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        Vec::new()
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("const", PortDirection::Output, PortType::Any).with_flags(PortFlags::CONST)]
    }

    fn connect_input_port(&mut self, port: &str, _edge: EdgeReader) -> Result<()> {
        Err(Error::NoSuchPort { process: self.name.clone(), port: port.to_string() })
    }

    fn connect_output_port(&mut self, port: &str, edge: EdgeWriter) -> Result<()> {
        if port != "const" {
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

    #[test]
    fn output_port_carries_const_flag() {
        let ports = ConstOutput::new().output_ports();
        assert_eq!(ports.len(), 1);
        assert!(ports[0].flags.contains(PortFlags::CONST));
    }

    #[test]
    fn rejects_connection_on_unknown_port_name() {
        let mut proc = ConstOutput::new();
        let (w, _r) = crate::edge::channel(crate::edge::DEFAULT_CAPACITY, true);
        assert!(proc.connect_output_port("nope", w).is_err());
    }
}
