//! # leadsdb - async client for the LeadsDB lead-management API
//!
//! Typed CRUD over leads and notes, a filter/sort query builder, cursor pagination,
//! streaming bulk ingestion with client-side batching, and a resilient transport
//! that retries transient failures with exponential backoff and jitter.
//!
//! ## Quick Start
//!
//! ```no_run
//! use futures::StreamExt;
//! use leadsdb::{Attribute, Client, Field, Filter, Lead, ListOptions, SortOrder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), leadsdb::Error> {
//!     // Reads LEADSDB_API_KEY (and optionally LEADSDB_BASE_URL)
//!     let client = leadsdb::ClientBuilder::from_env()?.build()?;
//!
//!     let mut lead = Lead::new("Acme Corporation", "website");
//!     lead.city = Some("Berlin".to_string());
//!     lead.attributes.push(Attribute::text("industry", "Software"));
//!     let created = client.create_lead(&lead).await?;
//!     println!("Created lead {}", created.id);
//!
//!     let options = ListOptions::builder()
//!         .filter(Filter::and(Field::City).eq("Berlin"))
//!         .filter(Filter::or(Field::Rating).gte(4))
//!         .sort(Field::CreatedAt, SortOrder::Desc)
//!         .build();
//!
//!     let leads = client.leads(options);
//!     futures::pin_mut!(leads);
//!     while let Some(lead) = leads.next().await {
//!         println!("{}", lead?.name);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! API failures carry the status code, the server error code and message, and can
//! be compared by category:
//!
//! ```no_run
//! use leadsdb::{Client, Error, ErrorKind};
//!
//! # async fn example(client: Client) {
//! match client.get_lead("lead_123").await {
//!     Ok(lead) => println!("{}", lead.name),
//!     Err(e) if e.is(ErrorKind::NotFound) => println!("gone"),
//!     Err(e) if e.is(ErrorKind::RateLimited) => {
//!         println!("throttled, server asked for {:?}s", e.retry_after())
//!     }
//!     Err(Error::Validation(msg)) => eprintln!("bad input: {}", msg),
//!     Err(e) => eprintln!("{}", e),
//! }
//! # }
//! ```
//!
//! ## Retries
//!
//! Network errors, timeouts and HTTP 429/500/502/503/504 are retried up to
//! `max_retries` attempts in total. The wait after attempt `a` is
//! `base_delay * 2^a` plus jitter, or the server's `Retry-After` seconds when a 429
//! carries one. The final error is returned as-is once attempts run out.
//!
//! ## Cancellation
//!
//! Every network round trip, backoff wait and outlet send races the client's
//! [`CancellationToken`](tokio_util::sync::CancellationToken). Scope a client to a
//! token with [`Client::with_cancellation`].

mod batch;
mod client;
mod descriptor;
mod error;
mod filter;
mod model;
mod outlet;
mod pager;
pub mod rate_limit;
mod response;
pub mod retry;

pub use batch::{BatchOptions, DEFAULT_FLUSH_TIMEOUT};
pub use client::{
    ByteStream, Client, ClientBuilder, API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL,
    DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT, MAX_BATCH_SIZE,
};
pub use descriptor::RequestDescriptor;
pub use error::{ApiError, Error, ErrorKind, Result};
pub use filter::{
    Condition, Field, Filter, FilterValue, ListOptions, ListOptionsBuilder, Logic, Operator,
    SortOrder,
};
pub use model::{
    Attribute, AttributeType, BulkCreateResult, BulkLeadError, BulkLeadResult, Coordinate,
    ExportFormat, Lead, Note, UpdateLead,
};
pub use outlet::Outlets;
pub use pager::ListResult;
pub use response::Response;
pub use retry::{Backoff, RetryPredicate};
