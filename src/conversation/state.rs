//! Send lifecycle: `Idle → Sending → {Delivered | Failed} → Idle`

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SendState {
    #[default]
    Idle,
    Sending,
    Delivered,
    Failed,
}

/// Tracks the send lifecycle and how many sends are in flight.
///
/// Concurrent sends are tolerated: loading stays on until the last one
/// settles.
#[derive(Debug, Default)]
pub struct SendTracker {
    state: SendState,
    in_flight: usize,
}

impl SendTracker {
    pub fn state(&self) -> SendState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// A send was accepted and is about to be dispatched
    pub fn begin(&mut self) {
        self.in_flight += 1;
        self.state = SendState::Sending;
    }

    /// The dispatch produced a result
    pub fn complete(&mut self, delivered: bool) {
        self.state = if delivered {
            SendState::Delivered
        } else {
            SendState::Failed
        };
    }

    /// The send is finished; returns to idle once nothing is in flight
    pub fn settle(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.state = if self.in_flight == 0 {
            SendState::Idle
        } else {
            SendState::Sending
        };
    }
}
