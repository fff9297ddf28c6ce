//! Port declarations: name, direction, type, flags and frequency.

use crate::rational::Rational;

bitflags::bitflags! {
    /// Constraints a port participates in. See module docs on
    /// [`crate::process`] for the compatibility rules between them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PortFlags: u8 {
        /// Input must be connected; output must have >=1 connection.
        const REQUIRED = 0b0000_0001;
        /// Output value must not be mutated by consumers.
        const CONST    = 0b0000_0010;
        /// Output value is shared across multiple consumers.
        const SHARED   = 0b0000_0100;
        /// Input intends to mutate the value it receives.
        const MUTATE   = 0b0000_1000;
        /// Input does not participate in frequency constraints.
        const NODEP    = 0b0001_0000;
    }
}

impl Default for PortFlags {
    fn default() -> Self {
        PortFlags::empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
}

pub const TYPE_ANY: &str = "any";
pub const TYPE_DATA_DEPENDENT: &str = "data_dependent";
pub const FLOW_DEPENDENT_PREFIX: &str = "flow_dependent:";

/// The type tag carried by a port: a concrete name, the `any`
/// wildcard, a `flow_dependent:<tag>` co-resolution group, or
/// `data_dependent` (resolved by the process itself, usually at
/// `configure` time).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PortType {
    Concrete(String),
    Any,
    FlowDependent(String),
    DataDependent,
}

impl PortType {
    pub fn parse(tag: &str) -> PortType {
        if tag == TYPE_ANY {
            PortType::Any
        } else if tag == TYPE_DATA_DEPENDENT {
            PortType::DataDependent
        } else if let Some(group) = tag.strip_prefix(FLOW_DEPENDENT_PREFIX) {
            PortType::FlowDependent(group.to_string())
        } else {
            PortType::Concrete(tag.to_string())
        }
    }

    pub fn concrete(tag: impl Into<String>) -> PortType {
        PortType::Concrete(tag.into())
    }

    pub fn as_concrete(&self) -> Option<&str> {
        match self {
            PortType::Concrete(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, PortType::Concrete(_))
    }

    pub fn flow_group(&self) -> Option<&str> {
        match self {
            PortType::FlowDependent(g) => Some(g),
            _ => None,
        }
    }
}

impl std::fmt::Display for PortType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortType::Concrete(t) => write!(f, "{t}"),
            PortType::Any => write!(f, "{TYPE_ANY}"),
            PortType::FlowDependent(g) => write!(f, "{FLOW_DEPENDENT_PREFIX}{g}"),
            PortType::DataDependent => write!(f, "{TYPE_DATA_DEPENDENT}"),
        }
    }
}

/// A process's declaration of a single port, as reported to the
/// pipeline via [`crate::process::Process::input_ports`] /
/// `output_ports`.
#[derive(Debug, Clone)]
pub struct PortSpec {
    pub name: String,
    pub direction: PortDirection,
    pub port_type: PortType,
    pub flags: PortFlags,
    pub frequency: Rational,
    pub description: Option<String>,
}

impl PortSpec {
    pub fn new(name: impl Into<String>, direction: PortDirection, port_type: PortType) -> Self {
        PortSpec {
            name: name.into(),
            direction,
            port_type,
            flags: PortFlags::empty(),
            frequency: Rational::ONE,
            description: None,
        }
    }

    pub fn with_flags(mut self, flags: PortFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_frequency(mut self, frequency: Rational) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(&self) -> bool {
        self.flags.contains(PortFlags::REQUIRED)
    }
}

/// Checks flag compatibility between an upstream output and a
/// downstream input of one connection. `existing_output_connections`
/// is the count of connections the output already has (before this
/// one is added).
pub fn flags_compatible(
    output_flags: PortFlags,
    input_flags: PortFlags,
    existing_output_connections: usize,
) -> bool {
    if input_flags.contains(PortFlags::MUTATE) {
        if output_flags.contains(PortFlags::CONST) {
            return false;
        }
        if output_flags.contains(PortFlags::SHARED) && existing_output_connections > 0 {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flow_dependent_tag() {
        let t = PortType::parse("flow_dependent:numeric");
        assert_eq!(t.flow_group(), Some("numeric"));
    }

    #[test]
    fn const_output_rejects_mutate_input() {
        assert!(!flags_compatible(PortFlags::CONST, PortFlags::MUTATE, 0));
    }

    #[test]
    fn shared_output_allows_single_mutate_consumer_only() {
        assert!(flags_compatible(PortFlags::SHARED, PortFlags::MUTATE, 0));
        assert!(!flags_compatible(PortFlags::SHARED, PortFlags::MUTATE, 1));
    }

    #[test]
    fn plain_output_allows_mutate() {
        assert!(flags_compatible(PortFlags::empty(), PortFlags::MUTATE, 3));
    }
}
