//! In-process message router between contexts.
//!
//! Each registered endpoint owns a bounded mailbox. A request carries a
//! one-shot reply slot, so every request that expects a reply resolves
//! exactly once: with the handler's reply, a typed error, or a timeout.
//! Nothing is ever redelivered.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use futures::future::join_all;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use inkcheck_config::RouterConfig;
use inkcheck_protocols::{Endpoint, MessageHandler, Request, Response, RouterError, TransportError};

type Reply = oneshot::Sender<Result<Response, RouterError>>;

struct Envelope {
    from: Endpoint,
    request: Request,
    reply: Option<Reply>,
}

struct Mailbox {
    generation: u64,
    sender: mpsc::Sender<Envelope>,
}

struct Inner {
    mailboxes: DashMap<Endpoint, Mailbox>,
    generation: AtomicU64,
    closed: AtomicBool,
    capacity: usize,
    ping_timeout: Duration,
    command_timeout: Duration,
}

/// Cloneable handle to the shared router.
#[derive(Clone)]
pub struct MessageRouter {
    inner: Arc<Inner>,
}

impl MessageRouter {
    pub fn new(config: &RouterConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                mailboxes: DashMap::new(),
                generation: AtomicU64::new(0),
                closed: AtomicBool::new(false),
                capacity: config.mailbox_capacity.max(1),
                ping_timeout: config.ping_timeout(),
                command_timeout: config.command_timeout(),
            }),
        }
    }

    /// Default timeout for liveness probes.
    pub fn ping_timeout(&self) -> Duration {
        self.inner.ping_timeout
    }

    /// Default timeout for command round trips.
    pub fn command_timeout(&self) -> Duration {
        self.inner.command_timeout
    }

    /// Bind `handler` to `endpoint`.
    ///
    /// A later registration for the same endpoint replaces this one; dropping
    /// the returned guard unbinds it. Messages queued for a replaced or
    /// dropped binding fail with a connection-lost error.
    pub fn register(&self, endpoint: Endpoint, handler: Arc<dyn MessageHandler>) -> Registration {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst);
        let (sender, mut receiver) = mpsc::channel::<Envelope>(self.inner.capacity);

        let task = tokio::spawn(async move {
            while let Some(envelope) = receiver.recv().await {
                let handler = handler.clone();
                tokio::spawn(async move {
                    let action = envelope.request.action();
                    let result = handler.handle(envelope.from, envelope.request).await;
                    match envelope.reply {
                        Some(reply) => {
                            // The requester may have timed out already.
                            let _ = reply.send(result);
                        }
                        None => {
                            if let Err(e) = result {
                                warn!(%endpoint, action, error = %e, "Notification handler failed");
                            }
                        }
                    }
                });
            }
            trace!(%endpoint, "Mailbox closed");
        });

        if let Some(previous) = self.inner.mailboxes.insert(
            endpoint,
            Mailbox {
                generation,
                sender,
            },
        ) {
            debug!(%endpoint, previous = previous.generation, "Replaced endpoint registration");
        } else {
            debug!(%endpoint, "Registered endpoint");
        }

        Registration {
            router: self.clone(),
            endpoint,
            generation,
            task,
        }
    }

    /// Whether a handler is bound to `endpoint`.
    pub fn is_registered(&self, endpoint: Endpoint) -> bool {
        self.inner.mailboxes.contains_key(&endpoint)
    }

    /// Registered page endpoints.
    pub fn page_endpoints(&self) -> Vec<Endpoint> {
        self.inner
            .mailboxes
            .iter()
            .map(|entry| *entry.key())
            .filter(|e| matches!(e, Endpoint::Page(_)))
            .collect()
    }

    /// Send a request and wait for its reply using the command timeout.
    pub async fn request(
        &self,
        from: Endpoint,
        to: Endpoint,
        request: Request,
    ) -> Result<Response, RouterError> {
        self.request_with_timeout(from, to, request, self.inner.command_timeout)
            .await
    }

    /// Send a request and wait at most `timeout` for its reply.
    pub async fn request_with_timeout(
        &self,
        from: Endpoint,
        to: Endpoint,
        request: Request,
        timeout: Duration,
    ) -> Result<Response, RouterError> {
        let sender = self.sender_for(to)?;
        let action = request.action();
        let (reply, receiver) = oneshot::channel();

        trace!(%from, %to, action, "Sending request");

        let exchange = async move {
            let envelope = Envelope {
                from,
                request,
                reply: Some(reply),
            };
            if sender.send(envelope).await.is_err() {
                return Err(RouterError::from(TransportError::ConnectionLost(format!(
                    "{} stopped receiving",
                    to
                ))));
            }

            match receiver.await {
                Ok(result) => result,
                Err(_) => Err(TransportError::ConnectionLost(format!("{} dropped the reply", to)).into()),
            }
        };

        match tokio::time::timeout(timeout, exchange).await {
            Ok(result) => result,
            Err(_) => {
                debug!(%to, action, "Request timed out");
                Err(TransportError::Timeout(timeout.as_millis() as u64).into())
            }
        }
    }

    /// Fire-and-forget delivery. Fails only if the message could not be
    /// queued; the handler's result is discarded.
    pub async fn notify(
        &self,
        from: Endpoint,
        to: Endpoint,
        request: Request,
    ) -> Result<(), TransportError> {
        let sender = self.sender_for(to).map_err(|e| match e {
            RouterError::Transport(t) => t,
            other => TransportError::Other(other.to_string()),
        })?;

        sender
            .send(Envelope {
                from,
                request,
                reply: None,
            })
            .await
            .map_err(|_| TransportError::ConnectionLost(format!("{} stopped receiving", to)))
    }

    /// Notify every registered page. Per-page failures are logged and
    /// skipped. Returns the number of pages reached.
    pub async fn broadcast_pages(&self, from: Endpoint, request: Request) -> usize {
        let targets = self.page_endpoints();
        let deliveries = targets.iter().map(|to| {
            let request = request.clone();
            async move {
                match self.notify(from, *to, request).await {
                    Ok(()) => true,
                    Err(e) => {
                        debug!(%to, error = %e, "Broadcast skipped page");
                        false
                    }
                }
            }
        });

        join_all(deliveries).await.into_iter().filter(|ok| *ok).count()
    }

    /// Decode a raw JSON message from a host transport and deliver it.
    pub async fn dispatch_raw(
        &self,
        from: Endpoint,
        to: Endpoint,
        raw: Value,
    ) -> Result<Option<Response>, RouterError> {
        let request = Request::decode(raw)?;
        if request.expects_reply() {
            self.request(from, to, request).await.map(Some)
        } else {
            self.notify(from, to, request).await?;
            Ok(None)
        }
    }

    /// Invalidate the router: every later send fails with
    /// [`TransportError::ExtensionInvalidated`].
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.mailboxes.clear();
        debug!("Router closed");
    }

    fn sender_for(&self, to: Endpoint) -> Result<mpsc::Sender<Envelope>, RouterError> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(TransportError::ExtensionInvalidated.into());
        }

        self.inner
            .mailboxes
            .get(&to)
            .map(|mailbox| mailbox.sender.clone())
            .ok_or_else(|| {
                TransportError::ConnectionLost(format!("no receiver at {}", to)).into()
            })
    }

    fn unregister(&self, endpoint: Endpoint, generation: u64) {
        let removed = self
            .inner
            .mailboxes
            .remove_if(&endpoint, |_, mailbox| mailbox.generation == generation);
        if removed.is_some() {
            debug!(%endpoint, "Unregistered endpoint");
        }
    }
}

/// Binding of a handler to an endpoint; unbinds on drop.
pub struct Registration {
    router: MessageRouter,
    endpoint: Endpoint,
    generation: u64,
    task: JoinHandle<()>,
}

impl Registration {
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.router.unregister(self.endpoint, self.generation);
        self.task.abort();
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
