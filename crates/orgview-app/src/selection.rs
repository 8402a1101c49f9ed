/// Proof that a fetch was started for a particular selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionTicket {
    generation: u64,
    name: String,
}

impl SelectionTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Monotonic selection counter. Only the newest ticket is current, so a slow
/// response for an earlier person can never replace a newer diagram.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    current: u64,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, name: &str) -> SelectionTicket {
        self.current += 1;
        SelectionTicket {
            generation: self.current,
            name: name.to_string(),
        }
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn is_current(&self, ticket: &SelectionTicket) -> bool {
        ticket.generation == self.current
    }
}
