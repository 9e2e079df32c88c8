//! Cancellable fan-out channels.
//!
//! Background operations report to the caller through a pair of outlets: one for
//! results, one for errors. The producing task owns both senders, so both outlets
//! close exactly once, when that task returns.

use crate::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Capacity of the results outlet.
const RESULTS_CAPACITY: usize = 1;

/// Capacity of the errors outlet. At least one, so a final error can always be
/// parked before the producer exits.
const ERRORS_CAPACITY: usize = 1;

/// The receiving half of a background operation.
///
/// Both receivers must be polled concurrently: the producer blocks while either
/// outlet is full. [`Outlets::collect`] does this for callers that just want
/// everything.
///
/// # Examples
///
/// ```no_run
/// use leadsdb::{Client, ListOptions};
///
/// # async fn example() -> Result<(), leadsdb::Error> {
/// let client = Client::builder().api_key("secret").build()?;
/// let mut outlets = client.leads_outlets(ListOptions::default());
///
/// loop {
///     tokio::select! {
///         Some(lead) = outlets.results.recv() => println!("{}", lead.name),
///         Some(err) = outlets.errors.recv() => eprintln!("{}", err),
///         else => break,
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Outlets<T> {
    /// Successfully produced items, in production order.
    pub results: mpsc::Receiver<T>,
    /// Errors, in production order.
    pub errors: mpsc::Receiver<Error>,
}

impl<T> Outlets<T> {
    /// Drains both outlets until they are closed.
    pub async fn collect(mut self) -> (Vec<T>, Vec<Error>) {
        let mut results = Vec::new();
        let mut errors = Vec::new();
        let mut results_open = true;
        let mut errors_open = true;

        while results_open || errors_open {
            tokio::select! {
                item = self.results.recv(), if results_open => match item {
                    Some(item) => results.push(item),
                    None => results_open = false,
                },
                err = self.errors.recv(), if errors_open => match err {
                    Some(err) => errors.push(err),
                    None => errors_open = false,
                },
            }
        }

        (results, errors)
    }
}

/// The producing half. Dropping it closes both outlets.
#[derive(Debug)]
pub(crate) struct Emitter<T> {
    results: mpsc::Sender<T>,
    errors: mpsc::Sender<Error>,
    cancel: CancellationToken,
}

/// Creates a connected emitter/outlets pair bound to `cancel`.
pub(crate) fn channel<T>(cancel: CancellationToken) -> (Emitter<T>, Outlets<T>) {
    let (results_tx, results_rx) = mpsc::channel(RESULTS_CAPACITY);
    let (errors_tx, errors_rx) = mpsc::channel(ERRORS_CAPACITY);

    (
        Emitter {
            results: results_tx,
            errors: errors_tx,
            cancel,
        },
        Outlets {
            results: results_rx,
            errors: errors_rx,
        },
    )
}

impl<T> Emitter<T> {
    /// Sends a result. Returns `false` if cancelled or the receiver went away.
    pub(crate) async fn emit(&self, item: T) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.results.send(item) => sent.is_ok(),
        }
    }

    /// Sends an error. Returns `false` if cancelled or the receiver went away.
    pub(crate) async fn emit_error(&self, err: Error) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.errors.send(err) => sent.is_ok(),
        }
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }
}
