//! Output type is resolved by the process itself rather than declared
//! up front. `set_on_configure` (default `true`) controls whether it
//! resolves during `configure`; leaving it unresolved exercises the
//! untyped-data-dependent rejection.

use crate::config::ConfigBlock;
use crate::datum::Datum;
use crate::edge::{EdgeReader, EdgeWriter};
use crate::error::{Error, Result};
use crate::port::{PortDirection, PortFlags, PortSpec, PortType};
use crate::process::Process;
use crate::stamp::Stamp;

pub struct DataDependent {
    name: String,
    set_on_configure: bool,
    resolved: Option<String>,
    outputs: Vec<EdgeWriter>,
    stamp: Stamp,
}

impl DataDependent {
    pub fn new(set_on_configure: bool) -> Self {
        DataDependent {
            name: "data_dependent".to_string(),
            set_on_configure,
            resolved: None,
            outputs: Vec::new(),
            stamp: Stamp::new_default(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Process for DataDependent {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_type(&self) -> &str {
        "data_dependent"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        Vec::new()
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        let port_type = match &self.resolved {
            Some(t) => PortType::concrete(t.clone()),
            None => PortType::DataDependent,
        };
        vec![PortSpec::new("output", PortDirection::Output, port_type).with_flags(PortFlags::REQUIRED)]
    }

    fn configure(&mut self, config: &ConfigBlock) -> Result<()> {
        self.set_on_configure = config.get_as_or::<bool>("set_on_configure", self.set_on_configure);
        if self.set_on_configure {
            self.resolved = Some("i64".to_string());
        }
        Ok(())
    }

    fn connect_input_port(&mut self, port: &str, _edge: EdgeReader) -> Result<()> {
        Err(Error::NoSuchPort { process: self.name.clone(), port: port.to_string() })
    }

    fn connect_output_port(&mut self, port: &str, edge: EdgeWriter) -> Result<()> {
        if port != "output" {
            return Err(Error::NoSuchPort { process: self.name.clone(), port: port.to_string() });
        }
        self.outputs.push(edge);
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        self.stamp = self.stamp.increment();
        for out in &self.outputs {
            out.push(self.stamp, Datum::new(0i64))?;
        }
        Ok(())
    }
}
