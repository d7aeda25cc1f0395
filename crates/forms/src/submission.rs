//! Per-form submission state: `Idle -> Submitting -> Idle`.

use client_core::ClientError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Submitting,
}

/// What a call to a form's `submit` ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved,
    /// Validation failed; the field errors are on the form.
    Invalid,
    /// A submission was already in flight.
    Ignored,
    Failed(ClientError),
}

/// Identifies one in-flight request and the form generation it was issued
/// for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmitTicket {
    generation: u64,
    sequence: u64,
}

#[derive(Debug, Default)]
pub struct SubmissionGate {
    generation: u64,
    sequence: u64,
    in_flight: Option<SubmitTicket>,
}

impl SubmissionGate {
    pub fn phase(&self) -> SubmitPhase {
        if self.in_flight.is_some() {
            SubmitPhase::Submitting
        } else {
            SubmitPhase::Idle
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Returns `None` while a request is already in flight.
    pub fn begin(&mut self) -> Option<SubmitTicket> {
        if self.in_flight.is_some() {
            return None;
        }
        self.sequence += 1;
        let ticket = SubmitTicket {
            generation: self.generation,
            sequence: self.sequence,
        };
        self.in_flight = Some(ticket);
        Some(ticket)
    }

    /// Returns `true` when `ticket` is the current in-flight request; the
    /// gate is back to idle. A stale ticket leaves the gate untouched.
    pub fn finish(&mut self, ticket: SubmitTicket) -> bool {
        if self.in_flight == Some(ticket) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    /// Starts a new generation; results of earlier tickets will be ignored.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.in_flight = None;
    }
}
