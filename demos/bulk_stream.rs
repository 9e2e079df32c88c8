//! Example demonstrating streaming bulk ingestion with cancellation.
//!
//! This example shows how to:
//! - Feed leads from a channel into `bulk_create_stream`
//! - Tune the batch size and the idle flush timeout
//! - Drain the result and error outlets concurrently
//! - Stop ingestion early with a cancellation token
//!
//! Run with: `LEADSDB_API_KEY=... cargo run --example bulk_stream`

use leadsdb::{BatchOptions, ClientBuilder, Error, Lead};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("leadsdb=debug,bulk_stream=info")
        .init();

    let shutdown = CancellationToken::new();
    let client = ClientBuilder::from_env()?
        .build()?
        .with_cancellation(shutdown.child_token());

    println!("=== Streaming 250 leads ===");
    let (tx, rx) = mpsc::channel(64);

    tokio::spawn(async move {
        for i in 0..250 {
            let mut lead = Lead::new(format!("Imported Lead {}", i), "csv_import");
            lead.city = Some("Berlin".to_string());
            if tx.send(lead).await.is_err() {
                break;
            }
            // A pause longer than the flush timeout splits a batch early
            if i == 120 {
                tokio::time::sleep(Duration::from_secs(3)).await;
            }
        }
        // Dropping the sender flushes the final partial batch
    });

    let outlets = client.bulk_create_stream(ReceiverStream::new(rx), BatchOptions::default());
    let (created, failed) = outlets.collect().await;

    println!("Created {} leads", created.len());
    for err in &failed {
        match err {
            Error::BatchItem { index, message } => {
                println!("  lead {} of its batch rejected: {}", index, message)
            }
            other => println!("  batch failed: {}", other),
        }
    }
    println!();

    println!("=== Cancelling an endless feed ===");
    let (tx, rx) = mpsc::channel(16);
    let options = BatchOptions::default()
        .max_batch_size(20)
        .flush_timeout(Duration::from_millis(500));
    let mut outlets = client.bulk_create_stream(ReceiverStream::new(rx), options);

    tokio::spawn(async move {
        let mut i = 0u64;
        loop {
            if tx.send(Lead::new(format!("Endless {}", i), "generator")).await.is_err() {
                break;
            }
            i += 1;
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    });

    let stop = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        println!("Cancelling ingestion");
        stop.cancel();
    });

    let mut created = 0;
    loop {
        tokio::select! {
            Some(_) = outlets.results.recv() => created += 1,
            Some(err) = outlets.errors.recv() => println!("  error: {}", err),
            else => break,
        }
    }
    println!("Created {} leads before cancellation; pending leads were abandoned", created);

    Ok(())
}
