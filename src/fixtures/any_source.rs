//! Upstream source whose single output never claims a concrete type,
//! used to exercise type inference where the upstream side of a
//! coupling is `any` rather than flow-dependent or concrete.

use crate::datum::Datum;
use crate::edge::{EdgeReader, EdgeWriter};
use crate::error::{Error, Result};
use crate::port::{PortDirection, PortSpec, PortType};
use crate::process::Process;
use crate::stamp::Stamp;

pub struct AnySource {
    name: String,
    stamp: Stamp,
    outputs: Vec<EdgeWriter>,
}

impl AnySource {
    pub fn new() -> Self {
        AnySource { name: "any_source".to_string(), stamp: Stamp::new_default(), outputs: Vec::new() }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Process for AnySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_type(&self) -> &str {
        "any_source"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        Vec::new()
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("data", PortDirection::Output, PortType::Any)]
    }

    fn connect_input_port(&mut self, port: &str, _edge: EdgeReader) -> Result<()> {
        Err(Error::NoSuchPort { process: self.name.clone(), port: port.to_string() })
    }

    fn connect_output_port(&mut self, port: &str, edge: EdgeWriter) -> Result<()> {
        if port != "data" {
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
    fn only_output_port_is_untyped_any() {
        let src = AnySource::new();
        let ports = src.output_ports();
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].port_type, PortType::Any);
        assert!(src.input_ports().is_empty());
    }

    #[test]
    fn step_pushes_a_datum_on_every_connected_output() {
        let mut src = AnySource::new();
        let (w, r) = channel(DEFAULT_CAPACITY, true);
        src.connect_output_port("data", w).unwrap();
        src.step().unwrap();
        let (_stamp, datum) = r.pop();
        assert_eq!(datum.kind(), crate::datum::DatumKind::Data);
    }
}
