//! Load tickets for list views
//!
//! Every fetch takes a ticket from the view's [`Generation`]. When the
//! response arrives it is applied only if no newer fetch was started in the
//! meantime, so a slow response for a previously selected patient cannot
//! overwrite the current one.

/// Identifies one fetch of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Monotonic fetch counter of a view
#[derive(Debug, Default)]
pub struct Generation {
    current: u64,
}

impl Generation {
    /// Starts a new fetch, superseding every earlier ticket
    pub fn issue(&mut self) -> LoadTicket {
        self.current += 1;
        LoadTicket(self.current)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.current
    }

    pub fn current(&self) -> u64 {
        self.current
    }
}
