//! Sink: consumes `i64` values on `number`, logging each one.

use crate::config::ConfigBlock;
use crate::edge::{EdgeReader, EdgeWriter};
use crate::error::{Error, Result};
use crate::port::{PortDirection, PortFlags, PortSpec, PortType};
use crate::process::Process;

pub struct PrintNumber {
    name: String,
    output: String,
    input: Option<EdgeReader>,
}

impl PrintNumber {
    pub fn new() -> Self {
        PrintNumber { name: "print_number".to_string(), output: String::new(), input: None }
    }

    pub fn new_with_output(output: String) -> Self {
        PrintNumber { name: "print_number".to_string(), output, input: None }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Process for PrintNumber {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_type(&self) -> &str {
        "print_number"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("number", PortDirection::Input, PortType::concrete("i64"))
            .with_flags(PortFlags::REQUIRED)]
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        Vec::new()
    }

    fn configure(&mut self, config: &ConfigBlock) -> Result<()> {
        self.output = config.get_as_or::<String>("output", self.output.clone());
        Ok(())
    }

    fn connect_input_port(&mut self, port: &str, edge: EdgeReader) -> Result<()> {
        if port != "number" {
            return Err(Error::NoSuchPort { process: self.name.clone(), port: port.to_string() });
        }
        self.input = Some(edge);
        Ok(())
    }

    fn connect_output_port(&mut self, port: &str, _edge: EdgeWriter) -> Result<()> {
        Err(Error::NoSuchPort { process: self.name.clone(), port: port.to_string() })
    }

    fn step(&mut self) -> Result<()> {
        let input = self
            .input
            .as_ref()
            .ok_or_else(|| Error::NoSuchPort { process: self.name.clone(), port: "number".to_string() })?;
        let (_, datum) = input.pop();
        if datum.kind() == crate::datum::DatumKind::Data {
            let value = *datum.get::<i64>()?;
            if self.output.is_empty() {
                tracing::info!(process = %self.name, value, "print_number");
            } else {
                tracing::info!(process = %self.name, value, destination = %self.output, "print_number");
            }
        }
        Ok(())
    }
}
