//! The scheduler lifecycle contract (C9): a state machine over
//! `constructed -> started -> paused -> stopped` that never calls a
//! concrete scheduling policy's hooks out of order.

use crate::error::{Error, Result};
use crate::pipeline::{Pipeline, PipelineState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchedulerState {
    Constructed,
    Started,
    Paused,
    Stopped,
}

/// Hooks a concrete scheduling policy (thread-per-process, synchronous
/// round-robin, ...) supplies. The abstract [`Scheduler`] enforces
/// ordering; implementations only need to do the scheduling.
pub trait SchedulerImpl: Send {
    fn start(&mut self, pipeline: &mut Pipeline) -> Result<()>;
    fn wait(&mut self, pipeline: &mut Pipeline) -> Result<()>;
    fn pause(&mut self, pipeline: &mut Pipeline) -> Result<()>;
    fn resume(&mut self, pipeline: &mut Pipeline) -> Result<()>;
    fn stop(&mut self, pipeline: &mut Pipeline) -> Result<()>;
}

pub struct Scheduler<S: SchedulerImpl> {
    pipeline: Pipeline,
    imp: S,
    state: SchedulerState,
}

impl<S: SchedulerImpl> Scheduler<S> {
    pub fn new(pipeline: Pipeline, imp: S) -> Self {
        Scheduler { pipeline, imp, state: SchedulerState::Constructed }
    }

    pub fn start(&mut self) -> Result<()> {
        if !matches!(self.state, SchedulerState::Constructed) {
            return Err(Error::RestartScheduler);
        }
        match self.pipeline.state() {
            PipelineState::SetupFailed => return Err(Error::PipelineNotReady),
            PipelineState::Setup => {}
            _ => return Err(Error::PipelineNotSetup),
        }
        self.imp.start(&mut self.pipeline)?;
        self.pipeline.set_running();
        self.state = SchedulerState::Started;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        match self.state {
            SchedulerState::Started => {}
            SchedulerState::Paused => return Err(Error::RepauseScheduler),
            SchedulerState::Constructed | SchedulerState::Stopped => {
                return Err(Error::PauseBeforeStart);
            }
        }
        self.imp.pause(&mut self.pipeline)?;
        self.state = SchedulerState::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        match self.state {
            SchedulerState::Paused => {}
            SchedulerState::Started => return Err(Error::ResumeUnpausedScheduler),
            SchedulerState::Constructed | SchedulerState::Stopped => {
                return Err(Error::ResumeBeforeStart);
            }
        }
        self.imp.resume(&mut self.pipeline)?;
        self.state = SchedulerState::Started;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        match self.state {
            SchedulerState::Started | SchedulerState::Paused => {}
            SchedulerState::Stopped => return Ok(()),
            SchedulerState::Constructed => return Err(Error::StopBeforeStart),
        }
        self.imp.stop(&mut self.pipeline)?;
        self.pipeline.set_stopped();
        self.state = SchedulerState::Stopped;
        Ok(())
    }

    pub fn wait(&mut self) -> Result<()> {
        if matches!(self.state, SchedulerState::Constructed) {
            return Err(Error::WaitBeforeStart);
        }
        self.imp.wait(&mut self.pipeline)
    }

    /// Idempotent teardown, safe to call regardless of state.
    pub fn shutdown(&mut self) -> Result<()> {
        if !matches!(self.state, SchedulerState::Stopped) {
            let _ = self.imp.stop(&mut self.pipeline);
            self.pipeline.set_stopped();
            self.state = SchedulerState::Stopped;
        }
        Ok(())
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }
}

/// Type-erased handle over `Scheduler<S>` for registries and CLIs that
/// need to hold "some scheduler" without naming its policy type.
pub trait RunnableScheduler: Send {
    fn start(&mut self) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
    fn resume(&mut self) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
    fn wait(&mut self) -> Result<()>;
    fn shutdown(&mut self) -> Result<()>;
    fn pipeline(&self) -> &Pipeline;
}

impl<S: SchedulerImpl + 'static> RunnableScheduler for Scheduler<S> {
    fn start(&mut self) -> Result<()> {
        Scheduler::start(self)
    }
    fn pause(&mut self) -> Result<()> {
        Scheduler::pause(self)
    }
    fn resume(&mut self) -> Result<()> {
        Scheduler::resume(self)
    }
    fn stop(&mut self) -> Result<()> {
        Scheduler::stop(self)
    }
    fn wait(&mut self) -> Result<()> {
        Scheduler::wait(self)
    }
    fn shutdown(&mut self) -> Result<()> {
        Scheduler::shutdown(self)
    }
    fn pipeline(&self) -> &Pipeline {
        Scheduler::pipeline(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBlock;
    use crate::fixtures;

    struct NoopImpl;
    impl SchedulerImpl for NoopImpl {
        fn start(&mut self, _pipeline: &mut Pipeline) -> Result<()> {
            Ok(())
        }
        fn wait(&mut self, _pipeline: &mut Pipeline) -> Result<()> {
            Ok(())
        }
        fn pause(&mut self, _pipeline: &mut Pipeline) -> Result<()> {
            Ok(())
        }
        fn resume(&mut self, _pipeline: &mut Pipeline) -> Result<()> {
            Ok(())
        }
        fn stop(&mut self, _pipeline: &mut Pipeline) -> Result<()> {
            Ok(())
        }
    }

    fn minimal_scheduler() -> Scheduler<NoopImpl> {
        let mut pipeline = Pipeline::new(ConfigBlock::empty("root"));
        pipeline.add_process("orphan", Box::new(fixtures::orphan::Orphan::new())).unwrap();
        pipeline.setup_pipeline().unwrap();
        Scheduler::new(pipeline, NoopImpl)
    }

    #[test]
    fn full_lifecycle_state_machine() {
        let mut s = minimal_scheduler();
        s.start().unwrap();
        assert_eq!(s.start().unwrap_err(), Error::RestartScheduler);
        s.pause().unwrap();
        assert_eq!(s.pause().unwrap_err(), Error::RepauseScheduler);
        s.resume().unwrap();
        s.stop().unwrap();
        assert_eq!(s.start().unwrap_err(), Error::RestartScheduler);
    }

    #[test]
    fn cannot_pause_or_resume_before_start() {
        let mut s = minimal_scheduler();
        assert_eq!(s.pause().unwrap_err(), Error::PauseBeforeStart);
        assert_eq!(s.resume().unwrap_err(), Error::ResumeBeforeStart);
        assert_eq!(s.stop().unwrap_err(), Error::StopBeforeStart);
        assert_eq!(s.wait().unwrap_err(), Error::WaitBeforeStart);
    }

    #[test]
    fn start_before_setup_fails() {
        let pipeline = Pipeline::new(ConfigBlock::empty("root"));
        let mut s = Scheduler::new(pipeline, NoopImpl);
        assert_eq!(s.start().unwrap_err(), Error::PipelineNotSetup);
    }
}
