//! Process and scheduler factory registries: name -> constructor.
//!
//! Grounded in the teacher's `processors::factory` registry (an
//! `OnceLock<Mutex<HashMap<...>>>` singleton) generalized from a single
//! registry of `Processor`s into two registries (processes,
//! schedulers) matching the external interface §6 describes
//! (`registry.create_process`, `registry.create_scheduler`).

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use crate::config::ConfigBlock;
use crate::error::{Error, Result};
use crate::pipeline::Pipeline;
use crate::process::Process;
use crate::scheduler::RunnableScheduler;

pub type ProcessConstructor = fn(name: &str, config: &ConfigBlock) -> Result<Box<dyn Process>>;
pub type SchedulerConstructor =
    fn(pipeline: Pipeline, config: &ConfigBlock) -> Result<Box<dyn RunnableScheduler>>;

fn process_registry() -> &'static Mutex<HashMap<String, ProcessConstructor>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, ProcessConstructor>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

fn scheduler_registry() -> &'static Mutex<HashMap<String, SchedulerConstructor>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, SchedulerConstructor>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

pub fn register_process(type_name: impl Into<String>, ctor: ProcessConstructor) {
    process_registry()
        .lock()
        .expect("process registry poisoned")
        .insert(type_name.into(), ctor);
}

pub fn register_scheduler(type_name: impl Into<String>, ctor: SchedulerConstructor) {
    scheduler_registry()
        .lock()
        .expect("scheduler registry poisoned")
        .insert(type_name.into(), ctor);
}

pub fn process_type_exists(type_name: &str) -> bool {
    process_registry()
        .lock()
        .expect("process registry poisoned")
        .contains_key(type_name)
}

pub fn list_process_types() -> Vec<String> {
    let mut names: Vec<String> = process_registry()
        .lock()
        .expect("process registry poisoned")
        .keys()
        .cloned()
        .collect();
    names.sort();
    names
}

pub fn list_scheduler_types() -> Vec<String> {
    let mut names: Vec<String> = scheduler_registry()
        .lock()
        .expect("scheduler registry poisoned")
        .keys()
        .cloned()
        .collect();
    names.sort();
    names
}

pub fn create_process(type_name: &str, name: &str, config: &ConfigBlock) -> Result<Box<dyn Process>> {
    let ctor = {
        let registry = process_registry().lock().expect("process registry poisoned");
        *registry
            .get(type_name)
            .ok_or_else(|| Error::NoSuchProcess(type_name.to_string()))?
    };
    let process = ctor(name, config)?;
    tracing::debug!(process_type = %type_name, name = %name, "process instantiated from registry");
    Ok(process)
}

pub fn create_scheduler(
    type_name: &str,
    pipeline: Pipeline,
    config: &ConfigBlock,
) -> Result<Box<dyn RunnableScheduler>> {
    let ctor = {
        let registry = scheduler_registry().lock().expect("scheduler registry poisoned");
        *registry
            .get(type_name)
            .ok_or_else(|| Error::NoSuchProcess(type_name.to_string()))?
    };
    ctor(pipeline, config)
}

/// Registers every fixture process/scheduler this crate ships. The
/// core itself never calls this; it's how the CLI (and tests that go
/// through the registry rather than constructing fixtures directly)
/// bootstrap the catalog.
pub fn ensure_default_catalog() {
    use crate::fixtures;
    use crate::schedulers;

    register_process("numbers", |name, config| {
        let start = config.get_as_or::<i64>("start", 0);
        Ok(Box::new(fixtures::numbers::Numbers::new(start).named(name)))
    });
    register_process("multiplication", |name, _config| {
        Ok(Box::new(fixtures::multiplication::Multiplication::new().named(name)))
    });
    register_process("print_number", |name, config| {
        Ok(Box::new(
            fixtures::print_number::PrintNumber::new_with_output(config.get_as_or::<String>("output", String::new()))
                .named(name),
        ))
    });
    register_process("duplicate", |name, config| {
        Ok(Box::new(
            fixtures::duplicate::Duplicate::new(config.get_as_or::<usize>("copies", 0)).named(name),
        ))
    });
    register_process("skip", |name, config| {
        Ok(Box::new(fixtures::skip::Skip::new(config.get_as_or::<usize>("skip", 0)).named(name)))
    });
    register_process("flow_dependent", |name, config| {
        Ok(Box::new(
            fixtures::flow::Flow::new_with_reject(config.get_as_or::<bool>("reject", false)).named(name),
        ))
    });
    register_process("take_string", |name, _config| {
        Ok(Box::new(fixtures::take_string::TakeString::new().named(name)))
    });
    register_process("orphan", |name, _config| Ok(Box::new(fixtures::orphan::Orphan::new().named(name))));
    register_process("feedback", |name, _config| {
        Ok(Box::new(fixtures::feedback::Feedback::new().named(name)))
    });
    register_process("data_dependent", |name, config| {
        Ok(Box::new(
            fixtures::data_dependent::DataDependent::new(config.get_as_or::<bool>("set_on_configure", false))
                .named(name),
        ))
    });
    register_process("any_source", |name, _config| {
        Ok(Box::new(fixtures::any_source::AnySource::new().named(name)))
    });
    register_process("shared", |name, _config| Ok(Box::new(fixtures::shared::Shared::new().named(name))));
    register_process("const", |name, _config| {
        Ok(Box::new(fixtures::const_output::ConstOutput::new().named(name)))
    });
    register_process("mutate", |name, _config| Ok(Box::new(fixtures::mutate::Mutate::new().named(name))));
    register_process("sink", |name, _config| Ok(Box::new(fixtures::sink::Sink::new().named(name))));
    register_process("simulated_signal", |name, _config| {
        Ok(Box::new(fixtures::simulated_signal::SimulatedSignal::new().named(name)))
    });

    register_scheduler("thread_per_process", |pipeline, _config| {
        Ok(Box::new(crate::scheduler::Scheduler::new(
            pipeline,
            schedulers::thread_per_process::ThreadPerProcessScheduler::new(),
        )))
    });
    register_scheduler("synchronous", |pipeline, _config| {
        Ok(Box::new(crate::scheduler::Scheduler::new(
            pipeline,
            schedulers::synchronous::SynchronousScheduler::new(),
        )))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_round_trips_through_registry() {
        ensure_default_catalog();
        assert!(process_type_exists("numbers"));
        let config = ConfigBlock::empty("root");
        let proc = create_process("numbers", "up1", &config).unwrap();
        assert_eq!(proc.process_type(), "numbers");
    }

    #[test]
    fn unknown_process_type_fails() {
        ensure_default_catalog();
        let config = ConfigBlock::empty("root");
        assert!(create_process("does-not-exist", "x", &config).is_err());
    }

    #[test]
    fn flag_compatibility_fixtures_are_registered() {
        ensure_default_catalog();
        let config = ConfigBlock::empty("root");
        for type_name in ["any_source", "shared", "const", "mutate", "sink", "flow_dependent"] {
            assert!(process_type_exists(type_name), "{type_name} should be registered");
            let proc = create_process(type_name, "x", &config).unwrap();
            assert_eq!(proc.process_type(), type_name);
        }
    }
}
