//! Runs every process on its own OS thread, synchronized only through
//! the edges connecting them and a shared run/pause flag.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::process::Process;
use crate::scheduler::SchedulerImpl;

type ProcessHandle = JoinHandle<(String, Box<dyn Process>)>;

pub struct ThreadPerProcessScheduler {
    handles: Vec<ProcessHandle>,
    running: Arc<AtomicBool>,
    pause_gate: Arc<(Mutex<bool>, Condvar)>,
}

impl ThreadPerProcessScheduler {
    pub fn new() -> Self {
        ThreadPerProcessScheduler {
            handles: Vec::new(),
            running: Arc::new(AtomicBool::new(false)),
            pause_gate: Arc::new((Mutex::new(false), Condvar::new())),
        }
    }
}

impl SchedulerImpl for ThreadPerProcessScheduler {
    fn start(&mut self, pipeline: &mut Pipeline) -> Result<()> {
        let processes = pipeline.take_processes();
        self.running.store(true, Ordering::SeqCst);

        for (name, mut process) in processes {
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
                    if process.step().is_err() {
                        break;
                    }
                }
                (name, process)
            });
            self.handles.push(handle);
        }
        Ok(())
    }

    fn wait(&mut self, pipeline: &mut Pipeline) -> Result<()> {
        let mut processes = HashMap::new();
        for handle in self.handles.drain(..) {
            if let Ok((name, process)) = handle.join() {
                processes.insert(name, process);
            }
        }
        pipeline.restore_processes(processes);
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

        let mut processes = HashMap::new();
        for handle in self.handles.drain(..) {
            if let Ok((name, process)) = handle.join() {
                processes.insert(name, process);
            }
        }
        pipeline.restore_processes(processes);
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
        pipeline
            .add_process("source", Box::new(fixtures::numbers::Numbers::new(0)))
            .unwrap();
        pipeline
            .add_process("sink", Box::new(fixtures::print_number::PrintNumber::new()))
            .unwrap();
        pipeline
            .connect(
                crate::connection::PortAddr::new("source", "number"),
                crate::connection::PortAddr::new("sink", "number"),
            )
            .unwrap();
        pipeline.setup_pipeline().unwrap();

        let mut scheduler = Scheduler::new(pipeline, ThreadPerProcessScheduler::new());
        scheduler.start().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        scheduler.stop().unwrap();
        assert!(scheduler.pipeline().process_by_name("source").is_some());
    }
}
