//! The abstract process contract (C5): a node in the dataflow graph
//! with typed, flagged ports.
//!
//! Modeled as a plain blocking trait rather than the teacher's
//! `#[async_trait]` `Processor`: the concurrency model (thread-per-
//! process, blocking edges) has no cooperative scheduling points other
//! than edge push/pop, so an async runtime has nothing to multiplex.

use crate::config::ConfigBlock;
use crate::edge::{EdgeReader, EdgeWriter};
use crate::error::Result;
use crate::port::PortSpec;

pub trait Process: Send {
    fn name(&self) -> &str;
    fn process_type(&self) -> &str;

    /// Declared input ports. Called by the pipeline after `configure`,
    /// so a data-dependent output resolved during `configure` is
    /// already reflected here.
    fn input_ports(&self) -> Vec<PortSpec>;
    fn output_ports(&self) -> Vec<PortSpec>;

    /// After construction, before `init`. May consult `config` and
    /// register/resolve ports (e.g. a data-dependent output type).
    fn configure(&mut self, _config: &ConfigBlock) -> Result<()> {
        Ok(())
    }

    /// After all port types are resolved and edges are attached.
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Drive one unit of work. Must be callable repeatedly and must
    /// terminate without indefinite internal work.
    fn step(&mut self) -> Result<()>;

    /// Return to pre-`init` state.
    fn reset(&mut self) -> Result<()> {
        Ok(())
    }

    /// Adopt updated configuration; unspecified keys may be ignored.
    fn reconfigure(&mut self, _config: &ConfigBlock) -> Result<()> {
        Ok(())
    }

    /// An input port accepts at most one edge.
    fn connect_input_port(&mut self, port: &str, edge: EdgeReader) -> Result<()>;

    /// An output port may accept many edges (one per downstream
    /// connection).
    fn connect_output_port(&mut self, port: &str, edge: EdgeWriter) -> Result<()>;

    /// Invited by type inference to adopt a concrete type for a
    /// flow-dependent/`any` input port. Default accepts.
    fn set_input_port_type(&mut self, _port: &str, _type_tag: &str) -> bool {
        true
    }

    /// As `set_input_port_type`, for output ports.
    fn set_output_port_type(&mut self, _port: &str, _type_tag: &str) -> bool {
        true
    }
}
