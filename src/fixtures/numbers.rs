//! Upstream source: emits an incrementing `i64` sequence on `number`.

use crate::config::ConfigBlock;
use crate::datum::Datum;
use crate::edge::{EdgeReader, EdgeWriter};
use crate::error::{Error, Result};
use crate::port::{PortDirection, PortFlags, PortSpec, PortType};
use crate::process::Process;
use crate::stamp::Stamp;

pub struct Numbers {
    name: String,
    start: i64,
    current: i64,
    stamp: Stamp,
    outputs: Vec<EdgeWriter>,
}

impl Numbers {
    pub fn new(start: i64) -> Self {
        Numbers {
            name: "numbers".to_string(),
            start,
            current: start,
            stamp: Stamp::new_default(),
            outputs: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Process for Numbers {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_type(&self) -> &str {
        "numbers"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        Vec::new()
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("number", PortDirection::Output, PortType::concrete("i64"))
            .with_flags(PortFlags::REQUIRED)]
    }

    fn configure(&mut self, config: &ConfigBlock) -> Result<()> {
        self.current = config.get_as_or::<i64>("start", self.start);
        Ok(())
    }

    fn connect_input_port(&mut self, port: &str, _edge: EdgeReader) -> Result<()> {
        Err(Error::NoSuchPort { process: self.name.clone(), port: port.to_string() })
    }

    fn connect_output_port(&mut self, port: &str, edge: EdgeWriter) -> Result<()> {
        if port != "number" {
            return Err(Error::NoSuchPort { process: self.name.clone(), port: port.to_string() });
        }
        self.outputs.push(edge);
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        let value = self.current;
        self.current += 1;
        self.stamp = self.stamp.increment();
        for out in &self.outputs {
            out.push(self.stamp, Datum::new(value))?;
        }
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.current = self.start;
        self.stamp = Stamp::new_default();
        Ok(())
    }
}
