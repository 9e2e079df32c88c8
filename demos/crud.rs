//! Example walking through single-lead CRUD, notes and a bulk create.
//!
//! This example shows how to:
//! - Build a client from the environment
//! - Create, fetch, update and delete a lead
//! - Attach, list, edit and remove notes
//! - Create several leads in one call and read per-lead outcomes
//! - Tell error categories apart
//!
//! Run with: `LEADSDB_API_KEY=... cargo run --example crud`

use leadsdb::{Attribute, ClientBuilder, Coordinate, Error, ErrorKind, Lead, UpdateLead};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("leadsdb=info,crud=info")
        .init();

    // Reads LEADSDB_API_KEY, and LEADSDB_BASE_URL when set
    let client = ClientBuilder::from_env()?.build()?;

    println!("=== Create ===");
    let mut lead = Lead::new("Acme Corporation", "website");
    lead.city = Some("San Francisco".to_string());
    lead.country = Some("US".to_string());
    lead.email = Some("contact@acme.example".to_string());
    lead.rating = Some(4.5);
    lead.tags = vec!["enterprise".to_string(), "saas".to_string()];
    lead.coordinates = Some(Coordinate {
        latitude: 37.7749,
        longitude: -122.4194,
    });
    lead.attributes = vec![
        Attribute::text("industry", "Software"),
        Attribute::number("employees", 500.0),
        Attribute::bool("verified", true),
        Attribute::list("products", ["CRM", "ERP"]),
    ];

    let created = client.create_lead(&lead).await?;
    println!("Created lead {} ({})", created.id, created.name);
    println!();

    println!("=== Get ===");
    let fetched = client.get_lead(&created.id).await?;
    println!("Name: {}", fetched.name);
    println!("City: {:?}", fetched.city);
    println!("Created at: {:?}", fetched.created_at);
    println!();

    println!("=== Update ===");
    let update = UpdateLead {
        rating: Some(4.8),
        tags: Some(vec!["enterprise".to_string(), "priority".to_string()]),
        ..Default::default()
    };
    let updated = client.update_lead(&created.id, &update).await?;
    println!("Rating is now {:?}, tags {:?}", updated.rating, updated.tags);
    println!();

    println!("=== Notes ===");
    let note = client
        .create_note(&created.id, "Initial contact made via email")
        .await?;
    println!("Created note {}", note.id);

    client
        .update_note(&note.id, "Initial contact made, follow-up on Monday")
        .await?;

    for note in client.list_notes(&created.id).await? {
        println!("  - {}", note.content);
    }

    client.delete_note(&note.id).await?;
    println!("Deleted note {}", note.id);
    println!();

    println!("=== Bulk create ===");
    let batch = vec![
        Lead::new("Tech Startup Inc", "linkedin"),
        Lead::new("Global Services Ltd", "referral"),
        Lead::new("Local Bakery", "google_maps"),
    ];
    let result = client.bulk_create(&batch).await?;
    println!(
        "Submitted {}, created {}, failed {}",
        result.total, result.success, result.failed
    );
    for created in &result.created {
        println!("  [{}] created {}", created.index, created.id);
    }
    for failed in &result.errors {
        println!("  [{}] rejected: {}", failed.index, failed.message);
    }
    println!();

    println!("=== Validation happens before the network ===");
    match client.create_lead(&Lead::new("Nameless source", "")).await {
        Err(Error::Validation(msg)) => println!("Rejected locally: {}", msg),
        other => println!("Unexpected: {:?}", other),
    }
    println!();

    println!("=== Delete ===");
    client.delete_lead(&created.id).await?;
    match client.get_lead(&created.id).await {
        Err(e) if e.is(ErrorKind::NotFound) => println!("Lead {} is gone", created.id),
        Err(e) => println!("Unexpected error: {} (retryable: {})", e, e.is_retryable()),
        Ok(lead) => println!("Still there: {}", lead.name),
    }

    Ok(())
}
