//! Joins two `i64` streams by multiplying them pairwise.

use crate::datum::Datum;
use crate::edge::{EdgeReader, EdgeWriter};
use crate::error::{Error, Result};
use crate::port::{PortDirection, PortFlags, PortSpec, PortType};
use crate::process::Process;
use crate::stamp::Stamp;

pub struct Multiplication {
    name: String,
    factor1: Option<EdgeReader>,
    factor2: Option<EdgeReader>,
    outputs: Vec<EdgeWriter>,
    stamp: Stamp,
}

impl Multiplication {
    pub fn new() -> Self {
        Multiplication {
            name: "multiplication".to_string(),
            factor1: None,
            factor2: None,
            outputs: Vec::new(),
            stamp: Stamp::new_default(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Process for Multiplication {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_type(&self) -> &str {
        "multiplication"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        vec![
            PortSpec::new("factor1", PortDirection::Input, PortType::concrete("i64"))
                .with_flags(PortFlags::REQUIRED),
            PortSpec::new("factor2", PortDirection::Input, PortType::concrete("i64"))
                .with_flags(PortFlags::REQUIRED),
        ]
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("product", PortDirection::Output, PortType::concrete("i64"))
            .with_flags(PortFlags::REQUIRED)]
    }

    fn connect_input_port(&mut self, port: &str, edge: EdgeReader) -> Result<()> {
        match port {
            "factor1" => self.factor1 = Some(edge),
            "factor2" => self.factor2 = Some(edge),
            _ => return Err(Error::NoSuchPort { process: self.name.clone(), port: port.to_string() }),
        }
        Ok(())
    }

    fn connect_output_port(&mut self, port: &str, edge: EdgeWriter) -> Result<()> {
        if port != "product" {
            return Err(Error::NoSuchPort { process: self.name.clone(), port: port.to_string() });
        }
        self.outputs.push(edge);
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        let f1 = self.factor1.as_ref().ok_or_else(|| Error::NoSuchPort {
            process: self.name.clone(),
            port: "factor1".to_string(),
        })?;
        let f2 = self.factor2.as_ref().ok_or_else(|| Error::NoSuchPort {
            process: self.name.clone(),
            port: "factor2".to_string(),
        })?;
        let (_, a) = f1.pop();
        let (_, b) = f2.pop();
        if a.kind() != crate::datum::DatumKind::Data || b.kind() != crate::datum::DatumKind::Data {
            return Ok(());
        }
        let product = *a.get::<i64>()? * *b.get::<i64>()?;
        self.stamp = self.stamp.increment();
        for out in &self.outputs {
            out.push(self.stamp, Datum::new(product))?;
        }
        Ok(())
    }
}
