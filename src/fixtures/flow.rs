//! A pass-through with a single `input`/`output` flow-dependent group:
//! connecting either side to a concrete type resolves both.
//!
//! `reject` makes the process refuse whatever type inference invites it
//! to adopt, exercising the direct/cascade rejection paths.

use crate::config::ConfigBlock;
use crate::datum::Datum;
use crate::edge::{EdgeReader, EdgeWriter};
use crate::error::{Error, Result};
use crate::port::{PortDirection, PortFlags, PortSpec, PortType};
use crate::process::Process;
use crate::stamp::Stamp;

pub struct Flow {
    name: String,
    reject: bool,
    input: Option<EdgeReader>,
    outputs: Vec<EdgeWriter>,
    stamp: Stamp,
}

impl Flow {
    pub fn new() -> Self {
        Self::new_with_reject(false)
    }

    pub fn new_with_reject(reject: bool) -> Self {
        Flow { name: "flow".to_string(), reject, input: None, outputs: Vec::new(), stamp: Stamp::new_default() }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Process for Flow {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_type(&self) -> &str {
        "flow_dependent"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        vec![
            PortSpec::new("input", PortDirection::Input, PortType::FlowDependent("value".to_string()))
                .with_flags(PortFlags::REQUIRED),
        ]
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        vec![
            PortSpec::new("output", PortDirection::Output, PortType::FlowDependent("value".to_string()))
                .with_flags(PortFlags::REQUIRED),
        ]
    }

    fn configure(&mut self, config: &ConfigBlock) -> Result<()> {
        self.reject = config.get_as_or::<bool>("reject", self.reject);
        Ok(())
    }

    fn set_input_port_type(&mut self, _port: &str, _type_tag: &str) -> bool {
        !self.reject
    }

    fn set_output_port_type(&mut self, _port: &str, _type_tag: &str) -> bool {
        !self.reject
    }

    fn connect_input_port(&mut self, port: &str, edge: EdgeReader) -> Result<()> {
        if port != "input" {
            return Err(Error::NoSuchPort { process: self.name.clone(), port: port.to_string() });
        }
        self.input = Some(edge);
        Ok(())
    }

    fn connect_output_port(&mut self, port: &str, edge: EdgeWriter) -> Result<()> {
        if port != "output" {
            return Err(Error::NoSuchPort { process: self.name.clone(), port: port.to_string() });
        }
        self.outputs.push(edge);
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        let datum = match &self.input {
            Some(input) => input.pop().1,
            None => Datum::complete(),
        };
        self.stamp = self.stamp.increment();
        for out in &self.outputs {
            out.push(self.stamp, datum.clone())?;
        }
        Ok(())
    }
}
