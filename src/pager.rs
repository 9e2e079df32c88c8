//! Cursor pagination over the lead listing.
//!
//! [`Client::list`] fetches one page. [`Client::leads`] follows the server cursor
//! lazily as a pull-based [`Stream`]; [`Client::leads_outlets`] runs the same walk
//! in a background task and pushes into [`Outlets`].

use crate::{
    descriptor::RequestDescriptor,
    filter::ListOptions,
    model::Lead,
    outlet::{self, Outlets},
    Client, Error, Result,
};
use futures::{Stream, StreamExt};
use http::Method;
use serde::{Deserialize, Serialize};

/// One page of leads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListResult {
    /// Leads of this page, in server order.
    pub leads: Vec<Lead>,
    /// Number of leads on this page.
    pub count: usize,
    /// Whether another page follows.
    pub has_more: bool,
    /// Cursor of the next page; meaningful only when `has_more` is set.
    pub next_cursor: Option<String>,
}

impl Client {
    /// Fetches a single page of leads.
    pub async fn list(&self, options: &ListOptions) -> Result<ListResult> {
        let descriptor =
            RequestDescriptor::new(Method::GET, ["leads"]).with_query_params(options.to_query());
        Ok(self.call::<ListResult>(descriptor).await?.into_data())
    }

    /// Walks every page matching `options`, yielding leads in server order.
    ///
    /// Pages are requested only as the stream is polled: dropping the stream early
    /// issues no further requests. A failed page ends the stream with that error as
    /// its last item. Each call starts again from the first page.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use futures::StreamExt;
    /// use leadsdb::{Client, Field, Filter, ListOptions};
    ///
    /// # async fn example() -> Result<(), leadsdb::Error> {
    /// let client = Client::builder().api_key("secret").build()?;
    /// let options = ListOptions::builder()
    ///     .filter(Filter::and(Field::City).eq("Berlin"))
    ///     .limit(100)
    ///     .build();
    ///
    /// let leads = client.leads(options);
    /// futures::pin_mut!(leads);
    /// while let Some(lead) = leads.next().await {
    ///     println!("{}", lead?.name);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn leads(&self, options: ListOptions) -> impl Stream<Item = Result<Lead>> + Send + 'static {
        let client = self.clone();

        async_stream::try_stream! {
            let mut page_options = options;
            let mut page_number: usize = 0;

            loop {
                let page = client.list(&page_options).await?;
                page_number += 1;

                tracing::debug!(
                    page = page_number,
                    count = page.leads.len(),
                    has_more = page.has_more,
                    "Fetched lead page"
                );

                let ListResult { leads, has_more, next_cursor, .. } = page;
                for lead in leads {
                    yield lead;
                }

                if !has_more {
                    break;
                }

                let cursor = match next_cursor.filter(|c| !c.is_empty()) {
                    Some(cursor) => cursor,
                    None => Err(Error::Protocol(
                        "page reported more results without a cursor".to_string(),
                    ))?,
                };
                page_options = page_options.with_cursor(cursor);
            }
        }
    }

    /// Walks every page matching `options` in a background task.
    ///
    /// Leads arrive on `results` in server order; a failed page sends its error on
    /// `errors` and ends the walk. Both outlets close when the walk is exhausted,
    /// fails, or the client is cancelled.
    pub fn leads_outlets(&self, options: ListOptions) -> Outlets<Lead> {
        let (emitter, outlets) = outlet::channel(self.cancellation_token().clone());
        let stream = self.leads(options);

        tokio::spawn(async move {
            futures::pin_mut!(stream);

            while let Some(item) = stream.next().await {
                match item {
                    Ok(lead) => {
                        if !emitter.emit(lead).await {
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Lead iteration failed");
                        emitter.emit_error(e).await;
                        return;
                    }
                }
            }
        });

        outlets
    }
}
