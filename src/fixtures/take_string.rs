//! Sink requiring a concrete `string` input; used to exercise
//! connection type mismatches against numeric upstreams.

use crate::edge::{EdgeReader, EdgeWriter};
use crate::error::{Error, Result};
use crate::port::{PortDirection, PortFlags, PortSpec, PortType};
use crate::process::Process;

pub struct TakeString {
    name: String,
    input: Option<EdgeReader>,
}

impl TakeString {
    pub fn new() -> Self {
        TakeString { name: "take_string".to_string(), input: None }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Process for TakeString {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_type(&self) -> &str {
        "take_string"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("string", PortDirection::Input, PortType::concrete("string"))
            .with_flags(PortFlags::REQUIRED)]
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        Vec::new()
    }

    fn connect_input_port(&mut self, port: &str, edge: EdgeReader) -> Result<()> {
        if port != "string" {
            return Err(Error::NoSuchPort { process: self.name.clone(), port: port.to_string() });
        }
        self.input = Some(edge);
        Ok(())
    }

    fn connect_output_port(&mut self, port: &str, _edge: EdgeWriter) -> Result<()> {
        Err(Error::NoSuchPort { process: self.name.clone(), port: port.to_string() })
    }

    fn step(&mut self) -> Result<()> {
        if let Some(input) = &self.input {
            let (_, datum) = input.pop();
            if datum.kind() == crate::datum::DatumKind::Data {
                let _ = datum.get::<String>()?;
            }
        }
        Ok(())
    }
}
