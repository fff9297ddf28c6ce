//! Stable, named error kinds surfaced at every public operation boundary.
//!
//! One variant per identifier in the core's error taxonomy; names match
//! the identifiers callers are expected to match on, not free prose.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // -- pipeline construction / topology --
    #[error("pipeline configuration argument missing")]
    NullPipelineConfig,
    #[error("process handle missing in add_process")]
    NullProcessAddition,
    #[error("duplicate process name: {0}")]
    DuplicateProcessName(String),
    #[error("no such process: {0}")]
    NoSuchProcess(String),
    #[error("no such port: {process}.{port}")]
    NoSuchPort { process: String, port: String },
    #[error("connection type mismatch: {0}")]
    ConnectionTypeMismatch(String),
    #[error("connection flag mismatch: {0}")]
    ConnectionFlagMismatch(String),
    #[error("connection dependent type rejected at {process}.{port}")]
    ConnectionDependentType { process: String, port: String },
    #[error("connection dependent type rejected (cascade) at {process}.{port}")]
    ConnectionDependentTypeCascade { process: String, port: String },
    #[error("untyped connection: {process}.{port}")]
    UntypedConnection { process: String, port: String },
    #[error("untyped data-dependent output: {process}.{port}")]
    UntypedDataDependent { process: String, port: String },
    #[error("pipeline is not a DAG")]
    NotADag,
    #[error("required port unsatisfied: {process}.{port}")]
    MissingConnection { process: String, port: String },
    #[error("orphaned process: {0}")]
    OrphanedProcesses(String),
    #[error("frequency mismatch at process {process}: expected {expected}, got {got}")]
    FrequencyMismatch {
        process: String,
        expected: String,
        got: String,
    },
    #[error("setup_pipeline called a second time")]
    PipelineDuplicateSetup,
    #[error("add_process called after setup")]
    AddAfterSetup,
    #[error("remove_process called after setup")]
    RemoveAfterSetup,
    #[error("connect called after setup")]
    ConnectionAfterSetup,
    #[error("disconnect called after setup")]
    DisconnectionAfterSetup,
    #[error("reconfigure called before setup")]
    ReconfigureBeforeSetup,
    #[error("reset called while pipeline is running")]
    ResetRunningPipeline,

    // -- scheduler state machine --
    #[error("scheduler started before pipeline setup")]
    PipelineNotSetup,
    #[error("pipeline setup did not complete successfully")]
    PipelineNotReady,
    #[error("scheduler started more than once")]
    RestartScheduler,
    #[error("scheduler paused while already paused")]
    RepauseScheduler,
    #[error("scheduler paused before being started")]
    PauseBeforeStart,
    #[error("scheduler resumed while not paused")]
    ResumeUnpausedScheduler,
    #[error("scheduler resumed before being started")]
    ResumeBeforeStart,
    #[error("scheduler stopped before being started")]
    StopBeforeStart,
    #[error("scheduler waited on before being started")]
    WaitBeforeStart,
    #[error("scheduler configuration argument missing")]
    NullSchedulerConfig,
    #[error("scheduler pipeline argument missing")]
    NullSchedulerPipeline,

    // -- datum / configuration casts --
    #[error("bad datum cast: stored kind/tag does not match requested type")]
    BadDatumCast,
    #[error("bad configuration cast: key {key} value {value:?} could not become {target}")]
    BadConfigurationCast {
        key: String,
        value: String,
        target: &'static str,
    },
    #[error("set on read-only configuration key: {0}")]
    SetOnReadOnly(String),
    #[error("unset on read-only configuration key: {0}")]
    UnsetOnReadOnly(String),
    #[error("no such configuration value: {0}")]
    NoSuchConfigurationValue(String),

    // -- edge --
    #[error("edge is full")]
    EdgeFull,
    #[error("edge is empty")]
    EdgeEmpty,
    #[error("edge has been marked complete downstream")]
    EdgeComplete,
}
