//! Self-loop fixture: `output` feeds back into its own `input`.

use crate::datum::Datum;
use crate::edge::{EdgeReader, EdgeWriter};
use crate::error::{Error, Result};
use crate::port::{PortDirection, PortFlags, PortSpec, PortType};
use crate::process::Process;
use crate::stamp::Stamp;

pub struct Feedback {
    name: String,
    input: Option<EdgeReader>,
    outputs: Vec<EdgeWriter>,
    stamp: Stamp,
    seeded: bool,
}

impl Feedback {
    pub fn new() -> Self {
        Feedback {
            name: "feedback".to_string(),
            input: None,
            outputs: Vec::new(),
            stamp: Stamp::new_default(),
            seeded: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Process for Feedback {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_type(&self) -> &str {
        "feedback"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("input", PortDirection::Input, PortType::concrete("i64"))
            .with_flags(PortFlags::REQUIRED)]
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("output", PortDirection::Output, PortType::concrete("i64"))
            .with_flags(PortFlags::REQUIRED)]
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
        let value = if !self.seeded {
            self.seeded = true;
            0i64
        } else {
            let input = self.input.as_ref().ok_or_else(|| Error::NoSuchPort {
                process: self.name.clone(),
                port: "input".to_string(),
            })?;
            let (_, datum) = input.pop();
            if datum.kind() != crate::datum::DatumKind::Data {
                return Ok(());
            }
            *datum.get::<i64>()? + 1
        };
        self.stamp = self.stamp.increment();
        for out in &self.outputs {
            out.push(self.stamp, Datum::new(value))?;
        }
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.seeded = false;
        self.stamp = Stamp::new_default();
        Ok(())
    }
}
