//! A process with no ports at all: valid only alone in a pipeline,
//! used to exercise the orphan rule.

use crate::edge::{EdgeReader, EdgeWriter};
use crate::error::{Error, Result};
use crate::port::PortSpec;
use crate::process::Process;

pub struct Orphan {
    name: String,
}

impl Orphan {
    pub fn new() -> Self {
        Orphan { name: "orphan".to_string() }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Process for Orphan {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_type(&self) -> &str {
        "orphan"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        Vec::new()
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        Vec::new()
    }

    fn connect_input_port(&mut self, port: &str, _edge: EdgeReader) -> Result<()> {
        Err(Error::NoSuchPort { process: self.name.clone(), port: port.to_string() })
    }

    fn connect_output_port(&mut self, port: &str, _edge: EdgeWriter) -> Result<()> {
        Err(Error::NoSuchPort { process: self.name.clone(), port: port.to_string() })
    }

    fn step(&mut self) -> Result<()> {
        Ok(())
    }
}
