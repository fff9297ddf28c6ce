//! Upstream source: emits an `f64` sampled each step from a configured
//! distribution, on `value`. Grounded on the teacher's
//! `SimulatedSignalProcessor`, trimmed to this runtime's synchronous
//! step contract (no interval sleep, no async channel).

use rand_distr::{Distribution, Normal, Uniform};

use crate::config::ConfigBlock;
use crate::datum::Datum;
use crate::edge::{EdgeReader, EdgeWriter};
use crate::error::{Error, Result};
use crate::port::{PortDirection, PortFlags, PortSpec, PortType};
use crate::process::Process;
use crate::stamp::Stamp;

pub struct SimulatedSignal {
    name: String,
    distribution: String,
    min_value: f64,
    max_value: f64,
    stamp: Stamp,
    outputs: Vec<EdgeWriter>,
}

impl SimulatedSignal {
    pub fn new() -> Self {
        SimulatedSignal {
            name: "simulated_signal".to_string(),
            distribution: "uniform".to_string(),
            min_value: 0.0,
            max_value: 1.0,
            stamp: Stamp::new_default(),
            outputs: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn sample(&self) -> f64 {
        let mut rng = rand::rng();
        match self.distribution.as_str() {
            "normal" => {
                let mean = (self.min_value + self.max_value) / 2.0;
                let stddev = (self.max_value - self.min_value) / 6.0;
                let normal = Normal::new(mean, stddev).unwrap_or_else(|_| Normal::new(0.0, 1.0).unwrap());
                normal.sample(&mut rng).clamp(self.min_value, self.max_value)
            }
            _ => {
                let uniform = Uniform::new(self.min_value, self.max_value)
                    .unwrap_or_else(|_| Uniform::new(0.0, 1.0).unwrap());
                uniform.sample(&mut rng)
            }
        }
    }
}

impl Process for SimulatedSignal {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_type(&self) -> &str {
        "simulated_signal"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        Vec::new()
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("value", PortDirection::Output, PortType::concrete("f64"))
            .with_flags(PortFlags::REQUIRED)]
    }

    fn configure(&mut self, config: &ConfigBlock) -> Result<()> {
        self.distribution = config.get_as_or::<String>("distribution", self.distribution.clone());
        self.min_value = config.get_as_or::<f64>("min_value", self.min_value);
        self.max_value = config.get_as_or::<f64>("max_value", self.max_value);
        Ok(())
    }

    fn connect_input_port(&mut self, port: &str, _edge: EdgeReader) -> Result<()> {
        Err(Error::NoSuchPort { process: self.name.clone(), port: port.to_string() })
    }

    fn connect_output_port(&mut self, port: &str, edge: EdgeWriter) -> Result<()> {
        if port != "value" {
            return Err(Error::NoSuchPort { process: self.name.clone(), port: port.to_string() });
        }
        self.outputs.push(edge);
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        let value = self.sample();
        self.stamp = self.stamp.increment();
        for out in &self.outputs {
            out.push(self.stamp, Datum::new(value))?;
        }
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.stamp = Stamp::new_default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::{channel, DEFAULT_CAPACITY};

    #[test]
    fn configure_reads_distribution_and_bounds() {
        let mut proc = SimulatedSignal::new();
        let config = ConfigBlock::empty("root");
        config.set("distribution", "normal").unwrap();
        config.set("min_value", "10").unwrap();
        config.set("max_value", "20").unwrap();
        proc.configure(&config).unwrap();
        assert_eq!(proc.distribution, "normal");
        assert_eq!(proc.min_value, 10.0);
        assert_eq!(proc.max_value, 20.0);
    }

    #[test]
    fn step_emits_a_value_within_the_configured_range() {
        let mut proc = SimulatedSignal::new();
        let config = ConfigBlock::empty("root");
        config.set("min_value", "5").unwrap();
        config.set("max_value", "6").unwrap();
        proc.configure(&config).unwrap();

        let (w, r) = channel(DEFAULT_CAPACITY, true);
        proc.connect_output_port("value", w).unwrap();
        proc.step().unwrap();

        let (_stamp, datum) = r.pop();
        let value = *datum.get::<f64>().unwrap();
        assert!((5.0..=6.0).contains(&value));
    }
}
