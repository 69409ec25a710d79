//! Per-step re-entrancy guards
//!
//! A step cannot be started again while it is running. Different steps are
//! independent: a model can be generated while an email is still pending.

use limbform_utils::error::FlowError;
use limbform_utils::types::FlowStep;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub(crate) struct StepGuards {
    describe: AtomicBool,
    model: AtomicBool,
    email: AtomicBool,
    view: AtomicBool,
}

impl StepGuards {
    fn flag(&self, step: FlowStep) -> &AtomicBool {
        match step {
            FlowStep::Describe => &self.describe,
            FlowStep::Model => &self.model,
            FlowStep::Email => &self.email,
            FlowStep::View => &self.view,
        }
    }

    /// Mark `step` as running until the returned guard drops
    pub fn acquire(&self, step: FlowStep) -> Result<StepGuard<'_>, FlowError> {
        let flag = self.flag(step);
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| FlowError::Busy(step))?;
        Ok(StepGuard { flag })
    }

    pub fn is_running(&self, step: FlowStep) -> bool {
        self.flag(step).load(Ordering::Acquire)
    }
}

pub(crate) struct StepGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for StepGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
