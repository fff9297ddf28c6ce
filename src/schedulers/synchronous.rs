//! Drives every process round-robin on a single background thread, in
//! deterministic name order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::process::Process;
use crate::scheduler::SchedulerImpl;

type Handle = JoinHandle<std::collections::HashMap<String, Box<dyn Process>>>;

pub struct SynchronousScheduler {
    handle: Option<Handle>,
    running: Arc<AtomicBool>,
    pause_gate: Arc<(Mutex<bool>, Condvar)>,
}

impl SynchronousScheduler {
    pub fn new() -> Self {
        SynchronousScheduler {
            handle: None,
            running: Arc::new(AtomicBool::new(false)),
            pause_gate: Arc::new((Mutex::new(false), Condvar::new())),
        }
    }
}

impl SchedulerImpl for SynchronousScheduler {
    fn start(&mut self, pipeline: &mut Pipeline) -> Result<()> {
        let mut processes = pipeline.take_processes();
        let mut order: Vec<String> = processes.keys().cloned().collect();
        order.sort();

        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();
        let pause_gate = self.pause_gate.clone();

        let handle = thread::spawn(move || {
            loop {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                {
                    let (lock, cvar) = &*pause_gate;
                    let mut paused = lock.lock().expect("scheduler pause gate poisoned");
                    while *paused && running.load(Ordering::SeqCst) {
                        paused = cvar.wait(paused).expect("scheduler pause gate poisoned");
                    }
                }
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                for name in &order {
                    if let Some(process) = processes.get_mut(name) {
                        if process.step().is_err() {
                            return processes;
                        }
                    }
                }
            }
            processes
        });
        self.handle = Some(handle);
        Ok(())
    }

    fn wait(&mut self, pipeline: &mut Pipeline) -> Result<()> {
        if let Some(handle) = self.handle.take() {
            if let Ok(processes) = handle.join() {
                pipeline.restore_processes(processes);
            }
        }
        Ok(())
    }

    fn pause(&mut self, _pipeline: &mut Pipeline) -> Result<()> {
        *self.pause_gate.0.lock().expect("scheduler pause gate poisoned") = true;
        Ok(())
    }

    fn resume(&mut self, _pipeline: &mut Pipeline) -> Result<()> {
        *self.pause_gate.0.lock().expect("scheduler pause gate poisoned") = false;
        self.pause_gate.1.notify_all();
        Ok(())
    }

    fn stop(&mut self, pipeline: &mut Pipeline) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        {
            let mut paused = self.pause_gate.0.lock().expect("scheduler pause gate poisoned");
            *paused = false;
        }
        self.pause_gate.1.notify_all();
        if let Some(handle) = self.handle.take() {
            if let Ok(processes) = handle.join() {
                pipeline.restore_processes(processes);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBlock;
    use crate::fixtures;
    use crate::scheduler::Scheduler;

    #[test]
    fn start_then_stop_returns_processes_to_pipeline() {
        let mut pipeline = Pipeline::new(ConfigBlock::empty("root"));
        pipeline.add_process("orphan", Box::new(fixtures::orphan::Orphan::new())).unwrap();
        pipeline.setup_pipeline().unwrap();

        let mut scheduler = Scheduler::new(pipeline, SynchronousScheduler::new());
        scheduler.start().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));
        scheduler.stop().unwrap();
        assert!(scheduler.pipeline().process_by_name("orphan").is_some());
    }
}
