//! Integration tests for cursor pagination and streaming bulk ingestion.

use futures::StreamExt;
use leadsdb::retry::Backoff;
use leadsdb::{BatchOptions, Client, Error, Field, Filter, Lead, ListOptions, SortOrder};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn client_for(server: &MockServer) -> Client {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    Client::builder()
        .api_key("test-key")
        .base_url(server.uri())
        .unwrap()
        .backoff(Backoff {
            base_delay: Duration::from_millis(10),
            max_jitter: Duration::ZERO,
        })
        .build()
        .unwrap()
}

fn page(names: &[&str], next_cursor: Option<&str>) -> Value {
    let leads: Vec<Value> = names
        .iter()
        .map(|n| json!({"id": format!("id_{}", n), "name": n, "source": "maps"}))
        .collect();
    json!({
        "leads": leads,
        "count": names.len(),
        "has_more": next_cursor.is_some(),
        "next_cursor": next_cursor.unwrap_or(""),
    })
}

fn leads(count: usize) -> Vec<Lead> {
    (0..count)
        .map(|i| Lead::new(format!("Lead {}", i), "import"))
        .collect()
}

/// Answers a bulk create by creating every lead except the rejected indexes.
/// Entries are returned in reverse order to check the client restores it.
struct BulkResponder {
    reject: Vec<usize>,
}

impl Respond for BulkResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let submitted = body["leads"].as_array().unwrap().len();

        let mut created = Vec::new();
        let mut errors = Vec::new();
        for index in (0..submitted).rev() {
            if self.reject.contains(&index) {
                errors.push(json!({"index": index, "message": "duplicate lead"}));
            } else {
                created.push(json!({
                    "index": index,
                    "id": format!("created_{}", index),
                    "created_at": 1700000000
                }));
            }
        }

        ResponseTemplate::new(201).set_body_json(json!({
            "total": submitted,
            "success": created.len(),
            "failed": errors.len(),
            "created": created,
            "errors": errors,
        }))
    }
}

async fn batch_sizes(server: &MockServer) -> Vec<usize> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/leads/batch")
        .map(|r| {
            let body: Value = serde_json::from_slice(&r.body).unwrap();
            body["leads"].as_array().unwrap().len()
        })
        .collect()
}

#[tokio::test]
async fn test_list_encodes_options() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/leads"))
        .and(query_param("limit", "10"))
        .and(query_param("sort_by", "rating"))
        .and(query_param("sort_order", "DESC"))
        .and(query_param("filter", "and.eq.city.Berlin"))
        .and(query_param("filter", "or.gte.rating.4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["A"], None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let options = ListOptions::builder()
        .limit(10)
        .sort(Field::Rating, SortOrder::Desc)
        .filter(Filter::and(Field::City).eq("Berlin"))
        .filter(Filter::or(Field::Rating).gte(4))
        .build();

    let result = client.list(&options).await.unwrap();
    assert_eq!(result.leads.len(), 1);
    assert!(!result.has_more);
}

async fn mount_two_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/leads"))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["A", "B"], Some("X"))))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/leads"))
        .and(query_param("cursor", "X"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["C"], None)))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_leads_follows_cursor() {
    let mock_server = MockServer::start().await;
    mount_two_pages(&mock_server).await;

    let client = client_for(&mock_server);
    let names: Vec<String> = client
        .leads(ListOptions::builder().filter(Filter::and(Field::Source).eq("maps")).build())
        .map(|lead| lead.unwrap().name)
        .collect()
        .await;

    assert_eq!(names, ["A", "B", "C"]);
}

#[tokio::test]
async fn test_leads_early_exit_stops_paging() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/leads"))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["A", "B"], Some("X"))))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/leads"))
        .and(query_param("cursor", "X"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["C"], None)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let first_two: Vec<Lead> = client
        .leads(ListOptions::default())
        .take(2)
        .map(|lead| lead.unwrap())
        .collect()
        .await;

    assert_eq!(first_two.len(), 2);
}

#[tokio::test]
async fn test_leads_page_error_is_last_item() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/leads"))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["A", "B"], Some("X"))))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/leads"))
        .and(query_param("cursor", "X"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let items: Vec<Result<Lead, Error>> = client.leads(ListOptions::default()).collect().await;

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_ref().unwrap().name, "A");
    assert_eq!(items[1].as_ref().unwrap().name, "B");
    assert!(items[2]
        .as_ref()
        .unwrap_err()
        .is(leadsdb::ErrorKind::Forbidden));
}

#[tokio::test]
async fn test_leads_more_without_cursor_is_protocol_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "leads": [{"id": "a", "name": "A", "source": "s"}],
            "count": 1,
            "has_more": true,
            "next_cursor": ""
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let items: Vec<Result<Lead, Error>> = client.leads(ListOptions::default()).collect().await;

    assert_eq!(items.len(), 2);
    assert!(matches!(items[1], Err(Error::Protocol(_))));
}

#[tokio::test]
async fn test_leads_outlets_preserve_order_and_close() {
    let mock_server = MockServer::start().await;
    mount_two_pages(&mock_server).await;

    let client = client_for(&mock_server);
    let (results, errors) = tokio::time::timeout(
        Duration::from_secs(5),
        client.leads_outlets(ListOptions::default()).collect(),
    )
    .await
    .expect("outlets must close");

    let names: Vec<&str> = results.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["A", "B", "C"]);
    assert!(errors.is_empty());
}

#[tokio::test]
async fn test_leads_outlets_report_error_and_close() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/leads"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let (results, errors) = client.leads_outlets(ListOptions::default()).collect().await;

    assert!(results.is_empty());
    assert_eq!(errors.len(), 1);
    assert!(errors[0].is(leadsdb::ErrorKind::Unauthorized));
}

#[tokio::test]
async fn test_full_batch_flushes_without_timer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/leads/batch"))
        .respond_with(BulkResponder { reject: vec![] })
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let (tx, rx) = mpsc::channel(128);
    let options = BatchOptions::default().flush_timeout(Duration::from_millis(300));
    let collector = tokio::spawn(
        client
            .bulk_create_stream(ReceiverStream::new(rx), options)
            .collect(),
    );

    for lead in leads(100) {
        tx.send(lead).await.unwrap();
    }

    // Well past the flush timeout, with the input still open.
    tokio::time::sleep(Duration::from_millis(800)).await;
    assert_eq!(batch_sizes(&mock_server).await, vec![100]);

    drop(tx);
    let (results, errors) = collector.await.unwrap();

    assert_eq!(results.len(), 100);
    assert!(errors.is_empty());
    let indexes: Vec<usize> = results.iter().map(|r| r.index).collect();
    assert_eq!(indexes, (0..100).collect::<Vec<_>>());
    assert_eq!(batch_sizes(&mock_server).await, vec![100]);
}

#[tokio::test]
async fn test_idle_single_lead_flushes_on_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/leads/batch"))
        .respond_with(BulkResponder { reject: vec![] })
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let (tx, rx) = mpsc::channel(8);
    let options = BatchOptions::default().flush_timeout(Duration::from_millis(100));
    let mut outlets = client.bulk_create_stream(ReceiverStream::new(rx), options);

    tx.send(Lead::new("Solo", "import")).await.unwrap();

    let created = tokio::time::timeout(Duration::from_secs(5), outlets.results.recv())
        .await
        .expect("timer flush")
        .expect("one result");
    assert_eq!(created.index, 0);
    assert_eq!(created.id, "created_0");
    assert_eq!(batch_sizes(&mock_server).await, vec![1]);

    drop(tx);
    let (rest, errors) = outlets.collect().await;
    assert!(rest.is_empty());
    assert!(errors.is_empty());
}

#[tokio::test]
async fn test_closed_input_flushes_partial_batch_and_closes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/leads/batch"))
        .respond_with(BulkResponder { reject: vec![] })
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let options = BatchOptions::default().flush_timeout(Duration::from_secs(60));

    let (results, errors) = tokio::time::timeout(
        Duration::from_secs(5),
        client
            .bulk_create_stream(futures::stream::iter(leads(37)), options)
            .collect(),
    )
    .await
    .expect("outlets must close after the final flush");

    assert_eq!(results.len(), 37);
    assert!(errors.is_empty());
    assert_eq!(batch_sizes(&mock_server).await, vec![37]);
}

#[tokio::test]
async fn test_large_input_splits_into_bounded_batches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/leads/batch"))
        .respond_with(BulkResponder { reject: vec![] })
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let (results, errors) = client
        .bulk_create_stream(futures::stream::iter(leads(250)), BatchOptions::default())
        .collect()
        .await;

    assert_eq!(results.len(), 250);
    assert!(errors.is_empty());
    assert_eq!(batch_sizes(&mock_server).await, vec![100, 100, 50]);
}

#[tokio::test]
async fn test_partial_batch_failure_reports_each_lead() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/leads/batch"))
        .respond_with(BulkResponder { reject: vec![1] })
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let (results, errors) = client
        .bulk_create_stream(futures::stream::iter(leads(3)), BatchOptions::default())
        .collect()
        .await;

    let indexes: Vec<usize> = results.iter().map(|r| r.index).collect();
    assert_eq!(indexes, [0, 2]);
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        Error::BatchItem { index, message } => {
            assert_eq!(*index, 1);
            assert_eq!(message, "duplicate lead");
        }
        other => panic!("Expected BatchItem, got {:?}", other),
    }
    assert_eq!(errors[0].to_string(), "index 1: duplicate lead");
}

#[tokio::test]
async fn test_whole_batch_failure_discards_batch_and_continues() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/leads/batch"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "invalid_batch",
            "message": "malformed payload"
        })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/leads/batch"))
        .respond_with(BulkResponder { reject: vec![] })
        .with_priority(2)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let options = BatchOptions::default().max_batch_size(2);
    let (results, errors) = client
        .bulk_create_stream(futures::stream::iter(leads(4)), options)
        .collect()
        .await;

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].status().map(|s| s.as_u16()), Some(400));
    // Only the second batch is reported; the first is not resubmitted.
    assert_eq!(results.len(), 2);
    assert_eq!(batch_sizes(&mock_server).await, vec![2, 2]);
}

#[tokio::test]
async fn test_invalid_lead_fails_its_batch_without_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/leads/batch"))
        .respond_with(BulkResponder { reject: vec![] })
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let input = vec![Lead::new("Fine", "import"), Lead::new("No source", "")];
    let (results, errors) = client
        .bulk_create_stream(futures::stream::iter(input), BatchOptions::default())
        .collect()
        .await;

    assert!(results.is_empty());
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::Validation(_)));
}

#[tokio::test]
async fn test_cancellation_abandons_pending_leads() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/leads/batch"))
        .respond_with(BulkResponder { reject: vec![] })
        .expect(0)
        .mount(&mock_server)
        .await;

    let token = CancellationToken::new();
    let client = client_for(&mock_server).with_cancellation(token.clone());
    let (tx, rx) = mpsc::channel(16);
    let options = BatchOptions::default().flush_timeout(Duration::from_secs(60));
    let outlets = client.bulk_create_stream(ReceiverStream::new(rx), options);

    for lead in leads(5) {
        tx.send(lead).await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    token.cancel();

    let (results, errors) = tokio::time::timeout(Duration::from_secs(5), outlets.collect())
        .await
        .expect("outlets must close on cancellation");

    assert!(results.is_empty());
    assert!(errors.is_empty());
    drop(tx);
}

#[tokio::test]
async fn test_cancellation_unblocks_stalled_emit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/leads/batch"))
        .respond_with(BulkResponder { reject: vec![] })
        .mount(&mock_server)
        .await;

    let token = CancellationToken::new();
    let client = client_for(&mock_server).with_cancellation(token.clone());
    let mut outlets =
        client.bulk_create_stream(futures::stream::iter(leads(10)), BatchOptions::default());

    // Take one result and stop reading; the batcher blocks on the next send.
    let first = tokio::time::timeout(Duration::from_secs(5), outlets.results.recv())
        .await
        .unwrap();
    assert!(first.is_some());
    tokio::time::sleep(Duration::from_millis(50)).await;

    token.cancel();

    let (rest, _) = tokio::time::timeout(Duration::from_secs(5), outlets.collect())
        .await
        .expect("outlets must close on cancellation");
    assert!(rest.len() < 9);
}
