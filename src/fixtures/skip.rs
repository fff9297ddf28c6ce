//! Forwards every `skip + 1`-th received value, lowering the process
//! rate relative to upstream by that factor.

use crate::config::ConfigBlock;
use crate::edge::{EdgeReader, EdgeWriter};
use crate::error::{Error, Result};
use crate::port::{PortDirection, PortFlags, PortSpec, PortType};
use crate::process::Process;
use crate::rational::Rational;
use crate::stamp::Stamp;

pub struct Skip {
    name: String,
    skip: usize,
    input: Option<EdgeReader>,
    outputs: Vec<EdgeWriter>,
    stamp: Stamp,
}

impl Skip {
    pub fn new(skip: usize) -> Self {
        Skip { name: "skip".to_string(), skip, input: None, outputs: Vec::new(), stamp: Stamp::new_default() }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Process for Skip {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_type(&self) -> &str {
        "skip"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        vec![
            PortSpec::new("input", PortDirection::Input, PortType::FlowDependent("value".to_string()))
                .with_flags(PortFlags::REQUIRED)
                .with_frequency(Rational::from_int((self.skip + 1) as i64)),
        ]
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("output", PortDirection::Output, PortType::FlowDependent("value".to_string()))
            .with_flags(PortFlags::REQUIRED)]
    }

    fn configure(&mut self, config: &ConfigBlock) -> Result<()> {
        self.skip = config.get_as_or::<usize>("skip", self.skip);
        Ok(())
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
        let input = self
            .input
            .as_ref()
            .ok_or_else(|| Error::NoSuchPort { process: self.name.clone(), port: "input".to_string() })?;
        // Drain and discard `skip` upstream items, forward the next one.
        for _ in 0..self.skip {
            input.pop();
        }
        let (_, datum) = input.pop();
        self.stamp = self.stamp.increment();
        for out in &self.outputs {
            out.push(self.stamp, datum.clone())?;
        }
        Ok(())
    }
}
