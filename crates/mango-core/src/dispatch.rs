//! Runs client calls off the UI thread and queues their completions.
//!
//! Completions are only observed when the owner drains the queue with
//! [`Dispatcher::try_next`], so every result is handled exactly once, on the
//! thread that owns the dispatcher.

use crate::client::{ApiCall, ApiReply, CredentialClient};
use crate::transport::Transport;
use crate::ClientError;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

/// Identifies one submitted call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

/// A finished call, ready to be routed back to whoever submitted it.
#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub reply: ApiReply,
}

/// How submitted calls are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    /// One worker thread per call.
    #[default]
    Threaded,
    /// Run during `submit`; the reply is still delivered through the queue.
    Inline,
}

pub struct Dispatcher<T> {
    client: Arc<CredentialClient<T>>,
    execution: Execution,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
    next_ticket: u64,
    in_flight: usize,
}

impl<T: Transport + 'static> Dispatcher<T> {
    pub fn new(client: CredentialClient<T>, execution: Execution) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            client: Arc::new(client),
            execution,
            sender,
            receiver,
            next_ticket: 0,
            in_flight: 0,
        }
    }

    pub fn client(&self) -> &CredentialClient<T> {
        &self.client
    }

    /// Start `call` and return the ticket its completion will carry.
    pub fn submit(&mut self, call: ApiCall) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.in_flight += 1;
        tracing::debug!("Dispatching {:?} as {:?}", call, ticket);

        match self.execution {
            Execution::Inline => {
                let reply = self.client.execute(&call);
                let _ = self.sender.send(Completion { ticket, reply });
            }
            Execution::Threaded => {
                let client = Arc::clone(&self.client);
                let sender = self.sender.clone();
                let worker_call = call.clone();
                let spawned = std::thread::Builder::new()
                    .name("mango-request".into())
                    .spawn(move || {
                        let reply = client.execute(&worker_call);
                        // The receiver is gone once the session shuts down.
                        let _ = sender.send(Completion { ticket, reply });
                    });

                if let Err(e) = spawned {
                    tracing::warn!("Failed to spawn request thread: {}", e);
                    let reply = ApiReply::failed(&call, ClientError::Transport(e.to_string()));
                    let _ = self.sender.send(Completion { ticket, reply });
                }
            }
        }

        ticket
    }

    /// Take the next finished call without blocking.
    pub fn try_next(&mut self) -> Option<Completion> {
        let completion = self.receiver.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(completion)
    }

    /// Number of submitted calls whose completion has not been taken yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::InMemoryBackend;
    use std::time::{Duration, Instant};

    #[test]
    fn inline_delivers_through_queue() {
        let mut dispatcher =
            Dispatcher::new(CredentialClient::new(InMemoryBackend::new()), Execution::Inline);
        let ticket = dispatcher.submit(ApiCall::List);
        assert_eq!(dispatcher.in_flight(), 1);

        let completion = dispatcher.try_next().expect("completion");
        assert_eq!(completion.ticket, ticket);
        assert_eq!(completion.reply, ApiReply::Sites(Ok(Vec::new())));
        assert_eq!(dispatcher.in_flight(), 0);
        assert!(dispatcher.try_next().is_none());
    }

    #[test]
    fn tickets_are_unique() {
        let mut dispatcher =
            Dispatcher::new(CredentialClient::new(InMemoryBackend::new()), Execution::Inline);
        let first = dispatcher.submit(ApiCall::List);
        let second = dispatcher.submit(ApiCall::List);
        assert_ne!(first, second);
    }

    #[test]
    fn threaded_completion_arrives_once() {
        let backend = InMemoryBackend::new();
        backend.insert("example.com", "bob", "p@ss");
        let mut dispatcher = Dispatcher::new(CredentialClient::new(backend), Execution::Threaded);
        let ticket = dispatcher.submit(ApiCall::Get("example.com".into()));

        let deadline = Instant::now() + Duration::from_secs(5);
        let completion = loop {
            if let Some(completion) = dispatcher.try_next() {
                break completion;
            }
            assert!(Instant::now() < deadline, "no completion within 5s");
            std::thread::sleep(Duration::from_millis(5));
        };

        assert_eq!(completion.ticket, ticket);
        assert!(matches!(completion.reply, ApiReply::Credential(Ok(_))));
        std::thread::sleep(Duration::from_millis(20));
        assert!(dispatcher.try_next().is_none());
    }
}
