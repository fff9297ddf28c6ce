//! Generic terminal consumer: a plain, unflagged input that accepts
//! any upstream, used as the downstream partner in port-flag
//! compatibility tests.

use crate::edge::{EdgeReader, EdgeWriter};
use crate::error::{Error, Result};
use crate::port::{PortDirection, PortSpec, PortType};
use crate::process::Process;

pub struct Sink {
    name: String,
    input: Option<EdgeReader>,
}

impl Sink {
    pub fn new() -> Self {
        Sink { name: "sink".to_string(), input: None }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Process for Sink {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_type(&self) -> &str {
        "sink"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("sink", PortDirection::Input, PortType::Any)]
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        Vec::new()
    }

    fn connect_input_port(&mut self, port: &str, edge: EdgeReader) -> Result<()> {
        if port != "sink" {
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
            let _ = input.pop();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::Datum;
    use crate::edge::{channel, DEFAULT_CAPACITY};
    use crate::stamp::Stamp;

    #[test]
    fn input_port_is_untyped_any_and_unflagged() {
        let ports = Sink::new().input_ports();
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].port_type, PortType::Any);
        assert!(ports[0].flags.is_empty());
    }

    #[test]
    fn step_consumes_one_item_per_call() {
        let mut proc = Sink::new();
        let (w, r) = channel(DEFAULT_CAPACITY, true);
        w.push(Stamp::new_default(), Datum::new(1i64)).unwrap();
        proc.connect_input_port("sink", r).unwrap();
        proc.step().unwrap();
        drop(w);
        assert!(proc.step().is_ok());
    }
}
