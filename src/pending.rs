//! Single-shot delivery of a fetch result
//!
//! The worker task sends exactly one [`Delivery`] through a oneshot channel.
//! The in-flight guard travels with the result, so a fetch stays registered
//! until whoever consumes it has taken the value.

use crate::{context::PrimaryContext, error::CryptoApiError, inflight::InFlightGuard};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Terminal event of one fetch
pub(crate) struct Delivery<T> {
    pub(crate) result: Result<T, CryptoApiError>,
    pub(crate) guard: InFlightGuard,
}

/// A fetch that has been issued but not yet consumed
///
/// Await it for the result on the current task, or hand it a completion
/// handler with [`on_primary`](Self::on_primary). Dropping it does not cancel
/// the request; the result is discarded when it arrives.
pub struct PendingFetch<T> {
    id: Uuid,
    rx: oneshot::Receiver<Delivery<T>>,
    task: Option<JoinHandle<()>>,
    primary: PrimaryContext,
}

impl<T> PendingFetch<T> {
    pub(crate) fn new(
        id: Uuid,
        rx: oneshot::Receiver<Delivery<T>>,
        task: Option<JoinHandle<()>>,
        primary: PrimaryContext,
    ) -> Self {
        Self {
            id,
            rx,
            task,
            primary,
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.id
    }

    /// True once the worker has finished, whether or not the result was read
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

/// A fetch handed back by [`PendingFetch::on_primary`] because the primary
/// context had stopped
///
/// Neither half has run. Await `pending` and call `handler` yourself, or drop
/// both to discard the result.
pub struct Undelivered<T, F> {
    pub pending: PendingFetch<T>,
    pub handler: F,
}

impl<T, F> fmt::Debug for Undelivered<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Undelivered")
            .field("request_id", &self.pending.id)
            .finish_non_exhaustive()
    }
}

type Slot<T, F> = Arc<Mutex<Option<(oneshot::Receiver<Delivery<T>>, F)>>>;

fn take<T, F>(slot: &Slot<T, F>) -> Option<(oneshot::Receiver<Delivery<T>>, F)> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}

impl<T: Send + 'static> PendingFetch<T> {
    /// Delivers the result to `handler` on the primary context
    ///
    /// Once queued, the handler runs exactly once, on the primary thread.
    /// Queueing only fails when the primary thread has stopped, which happens
    /// at process teardown. The fetch and the handler are then returned in
    /// [`Undelivered`] instead of being run on the wrong thread.
    pub fn on_primary<F>(self, handler: F) -> Result<(), Undelivered<T, F>>
    where
        F: FnOnce(Result<T, CryptoApiError>) + Send + 'static,
    {
        let PendingFetch {
            id,
            rx,
            task,
            primary,
        } = self;

        let slot: Slot<T, F> = Arc::new(Mutex::new(Some((rx, handler))));
        let job_slot = slot.clone();

        let posted = primary.spawn_future(async move {
            let Some((rx, handler)) = take(&job_slot) else {
                return;
            };
            let delivery = rx.await;
            tracing::trace!(request_id = %id, "Delivering fetch result on primary context");
            match delivery {
                Ok(Delivery { result, guard }) => {
                    handler(result);
                    drop(guard);
                }
                Err(_) => handler(Err(CryptoApiError::AnyError)),
            }
        });

        if posted {
            return Ok(());
        }

        // The rejected job was dropped unpolled, so the slot is still full.
        match take(&slot) {
            Some((rx, handler)) => {
                tracing::warn!(request_id = %id, "Primary context has stopped, returning fetch to caller");
                Err(Undelivered {
                    pending: PendingFetch::new(id, rx, task, primary),
                    handler,
                })
            }
            None => Ok(()),
        }
    }
}

impl<T> Future for PendingFetch<T> {
    type Output = Result<T, CryptoApiError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(Delivery { result, guard })) => {
                drop(guard);
                Poll::Ready(result)
            }
            // Sender dropped without a value: the worker never finished.
            Poll::Ready(Err(_)) => Poll::Ready(Err(CryptoApiError::AnyError)),
            Poll::Pending => Poll::Pending,
        }
    }
}
