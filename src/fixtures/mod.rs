//! Example processes used in tests and as a starter catalog for the CLI.
//!
//! Named and shaped after the end-to-end scenarios in the historical
//! `test_pipeline` suite this runtime's semantics are grounded on:
//! `numbers`/`multiplication`/`print_number` for a basic arithmetic
//! pipeline, `duplicate`/`skip` for frequency propagation, `flow`/
//! `take_string`/`data_dependent`/`any_source` for type inference,
//! `shared`/`const_output`/`mutate`/`sink` for port-flag compatibility,
//! `orphan` for the orphan rule, `feedback` for self-loops, and
//! `simulated_signal` as a jittered-signal source exercising the
//! `rand`/`rand_distr` stack.

pub mod any_source;
pub mod const_output;
pub mod data_dependent;
pub mod duplicate;
pub mod feedback;
pub mod flow;
pub mod multiplication;
pub mod mutate;
pub mod numbers;
pub mod orphan;
pub mod print_number;
pub mod shared;
pub mod simulated_signal;
pub mod sink;
pub mod skip;
pub mod take_string;
