//! Streaming bulk ingestion.
//!
//! [`Client::bulk_create_stream`] consumes an unbounded stream of leads and submits
//! them through [`Client::bulk_create`] in batches. A batch is flushed when it
//! reaches [`BatchOptions::max_batch_size`], when no flush happened for
//! [`BatchOptions::flush_timeout`] since its first lead arrived, or when the input
//! ends. Cancelling the client abandons whatever is still pending.

use crate::{
    client::MAX_BATCH_SIZE,
    model::{BulkLeadResult, Lead},
    outlet::{self, Emitter, Outlets},
    Client, Error,
};
use futures::{Stream, StreamExt};
use std::time::Duration;
use tokio::time::Instant;

/// Default inactivity timeout before a partial batch is flushed.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Tuning for [`Client::bulk_create_stream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// How long a non-empty batch may wait for more leads.
    pub flush_timeout: Duration,
    /// Leads per request, clamped to `1..=100`.
    pub max_batch_size: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
            max_batch_size: MAX_BATCH_SIZE,
        }
    }
}

impl BatchOptions {
    /// Sets the inactivity flush timeout.
    pub fn flush_timeout(mut self, timeout: Duration) -> Self {
        self.flush_timeout = timeout;
        self
    }

    /// Sets the batch size.
    pub fn max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size;
        self
    }
}

impl Client {
    /// Creates leads from `leads` in batches, reporting per-lead outcomes.
    ///
    /// Created leads arrive on `results` in the order they were fed. A lead the
    /// server rejected arrives on `errors` as [`Error::BatchItem`] carrying its
    /// index within its batch. When a whole batch fails, its single error is sent on
    /// `errors` and none of its leads are reported or resubmitted.
    ///
    /// Both outlets close once the input has ended and the final batch is flushed,
    /// or as soon as the client is cancelled.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use leadsdb::{BatchOptions, Client, Lead};
    /// use tokio::sync::mpsc;
    /// use tokio_stream::wrappers::ReceiverStream;
    ///
    /// # async fn example() -> Result<(), leadsdb::Error> {
    /// let client = Client::builder().api_key("secret").build()?;
    /// let (tx, rx) = mpsc::channel(256);
    ///
    /// let outlets = client.bulk_create_stream(ReceiverStream::new(rx), BatchOptions::default());
    ///
    /// tokio::spawn(async move {
    ///     for i in 0..1_000 {
    ///         let _ = tx.send(Lead::new(format!("Lead {}", i), "import")).await;
    ///     }
    /// });
    ///
    /// let (created, failed) = outlets.collect().await;
    /// println!("{} created, {} failed", created.len(), failed.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn bulk_create_stream<S>(&self, leads: S, options: BatchOptions) -> Outlets<BulkLeadResult>
    where
        S: Stream<Item = Lead> + Send + 'static,
    {
        let (emitter, outlets) = outlet::channel(self.cancellation_token().clone());
        let max_batch_size = options.max_batch_size.clamp(1, MAX_BATCH_SIZE);

        let batcher = Batcher {
            client: self.clone(),
            emitter,
            flush_timeout: options.flush_timeout,
            max_batch_size,
            batch: Vec::with_capacity(max_batch_size),
        };
        tokio::spawn(batcher.run(leads));

        outlets
    }
}

struct Batcher {
    client: Client,
    emitter: Emitter<BulkLeadResult>,
    flush_timeout: Duration,
    max_batch_size: usize,
    batch: Vec<Lead>,
}

impl Batcher {
    async fn run<S>(mut self, leads: S)
    where
        S: Stream<Item = Lead>,
    {
        tokio::pin!(leads);

        let cancel = self.emitter.cancel_token().clone();
        let timer = tokio::time::sleep(self.flush_timeout);
        tokio::pin!(timer);
        let mut armed = false;

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::debug!(abandoned = self.batch.len(), "Bulk ingestion cancelled");
                    return;
                }

                _ = &mut timer, if armed => {
                    armed = false;
                    tracing::debug!(size = self.batch.len(), "Flush timeout reached");
                    if !self.flush().await {
                        return;
                    }
                }

                next = leads.next() => match next {
                    Some(lead) => {
                        self.batch.push(lead);

                        if self.batch.len() == 1 {
                            timer.as_mut().reset(Instant::now() + self.flush_timeout);
                            armed = true;
                        }

                        if self.batch.len() >= self.max_batch_size {
                            armed = false;
                            if !self.flush().await {
                                return;
                            }
                        }
                    }
                    None => {
                        tracing::debug!(size = self.batch.len(), "Input closed, flushing final batch");
                        self.flush().await;
                        return;
                    }
                },
            }
        }
    }

    /// Submits the pending batch and reports its outcomes. The batch is emptied
    /// whatever happens. Returns `false` once nothing more can be delivered.
    async fn flush(&mut self) -> bool {
        if self.batch.is_empty() {
            return true;
        }

        let batch = std::mem::replace(&mut self.batch, Vec::with_capacity(self.max_batch_size));
        tracing::debug!(size = batch.len(), "Submitting batch");

        let mut result = match self.client.bulk_create(&batch).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, size = batch.len(), "Batch submission failed");
                return self.emitter.emit_error(e).await;
            }
        };

        tracing::info!(
            size = batch.len(),
            created = result.created.len(),
            failed = result.errors.len(),
            "Batch submitted"
        );

        result.created.sort_by_key(|created| created.index);
        for created in result.created {
            if !self.emitter.emit(created).await {
                return false;
            }
        }

        result.errors.sort_by_key(|failed| failed.index);
        for failed in result.errors {
            let err = Error::BatchItem {
                index: failed.index,
                message: failed.message,
            };
            if !self.emitter.emit_error(err).await {
                return false;
            }
        }

        true
    }
}
