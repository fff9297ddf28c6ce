//! Downstream input flagged `MUTATE`: it intends to modify the value it
//! receives in place, which is incompatible with a `CONST` upstream and
//! limited to a single consumer of a `SHARED` one.

use crate::edge::{EdgeReader, EdgeWriter};
use crate::error::{Error, Result};
use crate::port::{PortDirection, PortFlags, PortSpec, PortType};
use crate::process::Process;

pub struct Mutate {
    name: String,
    input: Option<EdgeReader>,
}

impl Mutate {
    pub fn new() -> Self {
        Mutate { name: "mutate".to_string(), input: None }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Process for Mutate {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_type(&self) -> &str {
        "mutate"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("mutate", PortDirection::Input, PortType::Any).with_flags(PortFlags::MUTATE)]
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        Vec::new()
    }

    fn connect_input_port(&mut self, port: &str, edge: EdgeReader) -> Result<()> {
        if port != "mutate" {
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
    fn input_port_carries_mutate_flag() {
        let ports = Mutate::new().input_ports();
        assert_eq!(ports.len(), 1);
        assert!(ports[0].flags.contains(PortFlags::MUTATE));
        assert!(Mutate::new().output_ports().is_empty());
    }

    #[test]
    fn step_drains_the_connected_input() {
        let mut proc = Mutate::new();
        let (w, r) = channel(DEFAULT_CAPACITY, true);
        w.push(Stamp::new_default(), Datum::new(1i64)).unwrap();
        proc.connect_input_port("mutate", r).unwrap();
        proc.step().unwrap();
        drop(w);
        assert!(proc.step().is_ok());
    }
}
