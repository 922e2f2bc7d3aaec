use std::sync::atomic::{AtomicBool, Ordering};

use crate::{error::Flow, ClientError};


/// Lets a single run of a flow through at a time.
#[derive(Debug)]
pub(crate) struct FlightGate {
    flow: Flow,
    busy: AtomicBool,
}

impl FlightGate {
    pub(crate) fn new(flow: Flow) -> Self {
        Self {
            flow,
            busy: AtomicBool::new(false),
        }
    }

    pub(crate) fn try_acquire(&self) -> Result<FlightPermit<'_>, ClientError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| FlightPermit { gate: self })
            .map_err(|_| ClientError::FlowInProgress(self.flow))
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Reopens the gate when dropped, whatever the outcome of the flow.
#[derive(Debug)]
pub(crate) struct FlightPermit<'a> {
    gate: &'a FlightGate,
}

impl Drop for FlightPermit<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}
