//! Example demonstrating filtered listing and cursor pagination.
//!
//! This example shows how to:
//! - Compose filters and sorting into `ListOptions`
//! - Fetch a single page with `list`
//! - Walk every page lazily with the `leads` stream and stop early
//! - Walk every page in the background with `leads_outlets`
//! - Stream an export to stdout
//!
//! Run with: `LEADSDB_API_KEY=... cargo run --example iterate`

use futures::StreamExt;
use leadsdb::{ClientBuilder, Error, ExportFormat, Field, Filter, ListOptions, SortOrder};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("leadsdb=info,iterate=info")
        .init();

    let client = ClientBuilder::from_env()?.build()?;

    let options = ListOptions::builder()
        .filter(Filter::and(Field::Country).eq("US"))
        .filter(Filter::and(Field::Rating).gte(4))
        .filter(Filter::and(Field::Tags).array_contains("saas"))
        .filter(Filter::and(Field::Location).within_radius(37.7749, -122.4194, 50.0))
        .sort(Field::Rating, SortOrder::Desc)
        .limit(25)
        .build();

    println!("=== One page ===");
    let page = client.list(&options).await?;
    println!(
        "{} leads on the first page, more: {}",
        page.count, page.has_more
    );
    println!();

    println!("=== Lazy stream, first 10 leads ===");
    // Only the pages needed for 10 leads are requested
    let leads = client.leads(options.clone()).take(10);
    futures::pin_mut!(leads);
    while let Some(lead) = leads.next().await {
        let lead = lead?;
        println!("  {} ({:?})", lead.name, lead.rating);
    }
    println!();

    println!("=== Background walk ===");
    let mut outlets = client.leads_outlets(options);
    let mut total = 0;
    loop {
        tokio::select! {
            Some(lead) = outlets.results.recv() => {
                total += 1;
                if total % 100 == 0 {
                    println!("  ... {} so far, latest {}", total, lead.name);
                }
            }
            Some(err) = outlets.errors.recv() => {
                eprintln!("Iteration stopped: {}", err);
            }
            else => break,
        }
    }
    println!("Walked {} leads", total);
    println!();

    println!("=== CSV export ===");
    let mut export = client.export(ExportFormat::Csv).await?;
    let mut stdout = std::io::stdout();
    let mut bytes = 0;
    while let Some(chunk) = export.next().await {
        let chunk = chunk?;
        bytes += chunk.len();
        let _ = stdout.write_all(&chunk);
    }
    println!();
    println!("Exported {} bytes", bytes);

    Ok(())
}
