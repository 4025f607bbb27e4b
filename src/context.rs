//! Primary execution context
//!
//! A single dedicated thread that plays the role of a UI event loop. Fetch
//! completions hop onto it before reaching their handler, so handlers may
//! touch state owned by that thread without extra synchronization.
//!
//! ```no_run
//! use crypto_market_data::PrimaryContext;
//!
//! # fn example() -> std::io::Result<()> {
//! let primary = PrimaryContext::spawn("ui")?;
//! primary.post(|| println!("running on the primary thread"));
//! # Ok(())
//! # }
//! ```

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

type Job = BoxFuture<'static, ()>;

/// Handle to the primary context thread
///
/// Cheap to clone. The thread finishes outstanding jobs and exits once the
/// last handle is dropped.
#[derive(Clone)]
pub struct PrimaryContext {
    inner: Arc<Inner>,
}

struct Inner {
    jobs: mpsc::UnboundedSender<Job>,
    thread_id: ThreadId,
    name: String,
}

impl PrimaryContext {
    /// Starts the primary context on a new named thread
    pub fn spawn(name: &str) -> std::io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let (jobs, rx) = mpsc::unbounded_channel();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run(runtime, rx))?;

        tracing::debug!(thread = name, "Primary context started");

        Ok(Self {
            inner: Arc::new(Inner {
                jobs,
                thread_id: handle.thread().id(),
                name: name.to_string(),
            }),
        })
    }

    /// Queues a closure to run on the primary thread
    ///
    /// Returns false if the context has already shut down.
    pub fn post<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.spawn_future(async move { job() })
    }

    /// Queues a future to be driven on the primary thread
    ///
    /// Returns false, dropping the future unpolled, if the context has
    /// already shut down.
    pub fn spawn_future<F>(&self, future: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.inner.jobs.send(Box::pin(future)).is_ok()
    }

    /// Handle whose thread has already stopped
    #[cfg(test)]
    pub(crate) fn detached(name: &str) -> Self {
        let (jobs, _) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(Inner {
                jobs,
                thread_id: thread::current().id(),
                name: name.to_string(),
            }),
        }
    }

    /// True when called from the primary thread itself
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.inner.thread_id
    }

    pub fn thread_id(&self) -> ThreadId {
        self.inner.thread_id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }
}

fn run(runtime: Runtime, mut rx: mpsc::UnboundedReceiver<Job>) {
    runtime.block_on(async move {
        let mut tasks = JoinSet::new();

        while let Some(job) = rx.recv().await {
            tasks.spawn(job);
            // Reap finished jobs so the set does not grow unbounded.
            while tasks.try_join_next().is_some() {}
        }

        while tasks.join_next().await.is_some() {}
    });

    tracing::debug!("Primary context stopped");
}
