//! End-to-end scenarios mirroring the historical `test_pipeline` suite
//! this runtime's pipeline-setup semantics are grounded on.

use streamgraph::config::ConfigBlock;
use streamgraph::connection::PortAddr;
use streamgraph::error::Error;
use streamgraph::fixtures;
use streamgraph::pipeline::Pipeline;
use streamgraph::scheduler::Scheduler;
use streamgraph::schedulers::synchronous::SynchronousScheduler;

fn addr(process: &str, port: &str) -> PortAddr {
    PortAddr::new(process, port)
}

#[test]
fn connect_then_setup_basic_pipeline() {
    let mut p = Pipeline::new(ConfigBlock::empty("root"));
    p.add_process("up1", Box::new(fixtures::numbers::Numbers::new(0))).unwrap();
    p.add_process("up2", Box::new(fixtures::numbers::Numbers::new(0))).unwrap();
    p.add_process("down", Box::new(fixtures::multiplication::Multiplication::new())).unwrap();
    p.add_process(
        "sink",
        Box::new(fixtures::print_number::PrintNumber::new_with_output("test.txt".to_string())),
    )
    .unwrap();

    p.connect(addr("up1", "number"), addr("down", "factor1")).unwrap();
    p.connect(addr("up2", "number"), addr("down", "factor2")).unwrap();
    p.connect(addr("down", "product"), addr("sink", "number")).unwrap();

    p.setup_pipeline().unwrap();
}

#[test]
fn type_cascades_upward_through_flow_dependent_chain() {
    let mut p = Pipeline::new(ConfigBlock::empty("root"));
    p.add_process("flow", Box::new(fixtures::flow::Flow::new())).unwrap();
    p.add_process("flow2", Box::new(fixtures::flow::Flow::new())).unwrap();
    p.add_process("take", Box::new(fixtures::take_string::TakeString::new())).unwrap();

    p.connect(addr("flow", "output"), addr("flow2", "input")).unwrap();
    p.connect(addr("flow2", "output"), addr("take", "string")).unwrap();

    p.setup_pipeline().unwrap();

    let resolved = p.resolved_type(&addr("flow", "output")).expect("flow.output resolved");
    assert_eq!(resolved.as_concrete(), Some("string"));
}

#[test]
fn frequency_conflict_between_direct_and_duplicated_inputs() {
    let mut p = Pipeline::new(ConfigBlock::empty("root"));
    p.add_process("numbers", Box::new(fixtures::numbers::Numbers::new(0))).unwrap();
    p.add_process("dup", Box::new(fixtures::duplicate::Duplicate::new(1))).unwrap();
    p.add_process("mult", Box::new(fixtures::multiplication::Multiplication::new())).unwrap();
    p.add_process("sink", Box::new(fixtures::print_number::PrintNumber::new())).unwrap();

    p.connect(addr("numbers", "number"), addr("dup", "input")).unwrap();
    p.connect(addr("dup", "duplicate"), addr("mult", "factor1")).unwrap();
    p.connect(addr("numbers", "number"), addr("mult", "factor2")).unwrap();
    p.connect(addr("mult", "product"), addr("sink", "number")).unwrap();

    let err = p.setup_pipeline().unwrap_err();
    assert!(matches!(err, Error::FrequencyMismatch { .. }));
}

#[test]
fn cycle_across_four_processes_is_rejected() {
    let mut p = Pipeline::new(ConfigBlock::empty("root"));
    p.add_process("flow", Box::new(fixtures::flow::Flow::new())).unwrap();
    p.add_process("flow2", Box::new(fixtures::flow::Flow::new())).unwrap();
    p.add_process("mult", Box::new(fixtures::multiplication::Multiplication::new())).unwrap();

    p.connect(addr("flow", "output"), addr("mult", "factor1")).unwrap();
    p.connect(addr("flow2", "output"), addr("mult", "factor2")).unwrap();
    p.connect(addr("mult", "product"), addr("flow", "input")).unwrap();
    p.connect(addr("mult", "product"), addr("flow2", "input")).unwrap();

    assert_eq!(p.setup_pipeline().unwrap_err(), Error::NotADag);
}

#[test]
fn self_loop_on_a_single_process_is_accepted() {
    let mut p = Pipeline::new(ConfigBlock::empty("root"));
    p.add_process("feedback", Box::new(fixtures::feedback::Feedback::new())).unwrap();
    p.connect(addr("feedback", "output"), addr("feedback", "input")).unwrap();
    p.setup_pipeline().unwrap();
}

#[test]
fn scheduler_state_machine_rejects_out_of_order_transitions() {
    let mut p = Pipeline::new(ConfigBlock::empty("root"));
    p.add_process("orphan", Box::new(fixtures::orphan::Orphan::new())).unwrap();
    p.setup_pipeline().unwrap();

    let mut scheduler = Scheduler::new(p, SynchronousScheduler::new());

    scheduler.start().unwrap();
    assert_eq!(scheduler.start().unwrap_err(), Error::RestartScheduler);

    scheduler.pause().unwrap();
    assert_eq!(scheduler.pause().unwrap_err(), Error::RepauseScheduler);

    scheduler.resume().unwrap();
    scheduler.stop().unwrap();

    assert_eq!(scheduler.start().unwrap_err(), Error::RestartScheduler);
}
