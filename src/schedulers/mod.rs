//! Concrete scheduling policies implementing [`crate::scheduler::SchedulerImpl`].

pub mod synchronous;
pub mod thread_per_process;
