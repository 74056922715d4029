//! Request Dispatcher
//!
//! Submits requests through the [`DispatchGate`] on smol's executor and
//! hands completions back over a channel to the single thread that owns the
//! runtime. Completions arrive in response order, not submission order.

use crate::{DispatchGate, NetError, Request, Response, Transport};
use smol::channel::{Receiver, Sender};
use std::sync::Arc;

/// Handle identifying one submitted request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Finished request
#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    /// HTTP statuses outside 200..=399 arrive as [`NetError::HttpError`]
    pub result: Result<Response, NetError>,
}

/// Dispatches requests and collects their completions
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    gate: DispatchGate,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
    next_ticket: u64,
    outstanding: usize,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, gate: DispatchGate) -> Self {
        let (sender, receiver) = smol::channel::unbounded();
        Self {
            transport,
            gate,
            sender,
            receiver,
            next_ticket: 1,
            outstanding: 0,
        }
    }

    /// Queue a request; it runs as soon as the gate admits it
    pub fn submit(&mut self, request: Request) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.outstanding += 1;

        tracing::info!("HTTP {} {}", request.method, request.url);

        let transport = self.transport.clone();
        let gate = self.gate.clone();
        let sender = self.sender.clone();
        smol::spawn(async move {
            let result = gate
                .run(transport.execute(request))
                .await
                .and_then(Response::error_for_status);
            if let Err(err) = &result {
                tracing::debug!("request {:?} failed: {}", ticket, err);
            }
            // The receiver lives as long as the dispatcher
            let _ = sender.send(Completion { ticket, result }).await;
        })
        .detach();

        ticket
    }

    /// Take a finished request without waiting
    pub fn try_next(&mut self) -> Option<Completion> {
        let completion = self.receiver.try_recv().ok()?;
        self.outstanding = self.outstanding.saturating_sub(1);
        Some(completion)
    }

    /// Wait for the next finished request; `None` when nothing is outstanding
    pub async fn next(&mut self) -> Option<Completion> {
        if self.outstanding == 0 {
            return None;
        }
        let completion = self.receiver.recv().await.ok()?;
        self.outstanding -= 1;
        Some(completion)
    }

    /// Requests submitted but not yet taken back
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn gate(&self) -> &DispatchGate {
        &self.gate
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("gate", &self.gate)
            .field("outstanding", &self.outstanding)
            .finish()
    }
}
