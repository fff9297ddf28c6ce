//! Emits each received value once plus `copies` additional times,
//! raising the downstream rate relative to upstream by a factor of
//! `copies + 1`.

use crate::config::ConfigBlock;
use crate::edge::{EdgeReader, EdgeWriter};
use crate::error::{Error, Result};
use crate::port::{PortDirection, PortFlags, PortSpec, PortType};
use crate::process::Process;
use crate::rational::Rational;
use crate::stamp::Stamp;

pub struct Duplicate {
    name: String,
    copies: usize,
    input: Option<EdgeReader>,
    outputs: Vec<EdgeWriter>,
    stamp: Stamp,
}

impl Duplicate {
    pub fn new(copies: usize) -> Self {
        Duplicate {
            name: "duplicate".to_string(),
            copies,
            input: None,
            outputs: Vec::new(),
            stamp: Stamp::new_default(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Process for Duplicate {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_type(&self) -> &str {
        "duplicate"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("input", PortDirection::Input, PortType::FlowDependent("value".to_string()))
            .with_flags(PortFlags::REQUIRED)]
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        vec![
            PortSpec::new("duplicate", PortDirection::Output, PortType::FlowDependent("value".to_string()))
                .with_flags(PortFlags::REQUIRED)
                .with_frequency(Rational::from_int((self.copies + 1) as i64)),
        ]
    }

    fn configure(&mut self, config: &ConfigBlock) -> Result<()> {
        self.copies = config.get_as_or::<usize>("copies", self.copies);
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
        if port != "duplicate" {
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
        let (_, datum) = input.pop();
        for _ in 0..=self.copies {
            self.stamp = self.stamp.increment();
            for out in &self.outputs {
                out.push(self.stamp, datum.clone())?;
            }
        }
        Ok(())
    }
}
