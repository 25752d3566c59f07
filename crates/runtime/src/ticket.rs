/// Identifies an outstanding asynchronous request.
///
/// Small and copyable so it can travel through host callbacks and come back
/// with the result.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Latest-wins request tracking.
///
/// Issuing a new ticket supersedes the previous one. A result is only
/// accepted for the ticket that is still current; everything else is stale.
#[derive(Debug)]
pub struct TicketIssuer {
    next: u64,
    current: Option<Ticket>,
}

impl Default for TicketIssuer {
    fn default() -> Self {
        Self {
            next: 1,
            current: None,
        }
    }
}

impl TicketIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> Ticket {
        let t = Ticket(self.next);
        self.next += 1;
        self.current = Some(t);
        t
    }

    pub fn current(&self) -> Option<Ticket> {
        self.current
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.current == Some(ticket)
    }

    /// Retires `ticket` if it is current. Returns `true` if it was.
    pub fn settle(&mut self, ticket: Ticket) -> bool {
        if self.is_current(ticket) {
            self.current = None;
            true
        } else {
            false
        }
    }

    /// Drops the outstanding ticket, making any in-flight result stale.
    pub fn cancel(&mut self) -> Option<Ticket> {
        self.current.take()
    }
}
