//! Tests for pagination module

use super::*;
use crate::error::{Error, Result};
use bytes::Bytes;
use futures::FutureExt;
use pretty_assertions::assert_eq;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use test_case::test_case;
use url::Url;

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

fn snapshot(url: &str, body: Value) -> ResponseSnapshot {
    ResponseSnapshot::new(Url::parse(url).unwrap(), json_headers(), Body::Json(body))
}

fn marker_page(url: &str, mark: &'static str) -> MarkerPage {
    MarkerPage::new(
        snapshot(url, json!({"items": []})),
        Arc::new(move |_: &dyn Page| -> Result<String> { Ok(mark.to_string()) }),
    )
}

/// Fetcher serving linked pages from memory, counting calls
fn linked_pages(
    pages: Vec<(&str, Value)>,
    calls: Arc<AtomicUsize>,
) -> impl Fn(String) -> PageFuture + Send + Sync + 'static {
    let pages: Arc<HashMap<String, Value>> = Arc::new(
        pages
            .into_iter()
            .map(|(url, body)| (url.to_string(), body))
            .collect(),
    );

    move |url: String| {
        let pages = Arc::clone(&pages);
        let calls = Arc::clone(&calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            let body = pages
                .get(&url)
                .cloned()
                .ok_or_else(|| Error::http_status(404, url.clone()))?;
            let page: Box<dyn Page> = Box::new(LinkedPage::new(snapshot(&url, body)));
            Ok::<_, Error>(page)
        }
        .boxed()
    }
}

fn three_linked_pages() -> Vec<(&'static str, Value)> {
    vec![
        (
            "https://x/1",
            json!({"items": [1, 2], "links": {"next": "https://x/2"}}),
        ),
        (
            "https://x/2",
            json!({"items": [3, 4], "links": {"next": "https://x/3"}}),
        ),
        ("https://x/3", json!({"items": [5], "links": {}})),
    ]
}

// ============================================================================
// ResponseSnapshot Tests
// ============================================================================

#[test]
fn test_snapshot_parses_json_body() {
    let snap = ResponseSnapshot::from_parts(
        Url::parse("https://api.example.com/items").unwrap(),
        json_headers(),
        Bytes::from_static(br#"{"links":{"next":"https://x/2"}}"#),
    )
    .unwrap();

    assert_eq!(snap.json(), Some(&json!({"links": {"next": "https://x/2"}})));
    assert_eq!(
        LinkedPage::new(snap).next_page_url().unwrap(),
        Some("https://x/2".to_string())
    );
}

#[test]
fn test_snapshot_keeps_non_json_body_raw() {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

    let snap = ResponseSnapshot::from_parts(
        Url::parse("https://api.example.com/items").unwrap(),
        headers,
        Bytes::from_static(b"{not json"),
    )
    .unwrap();

    assert_eq!(snap.body(), &Body::Raw(Bytes::from_static(b"{not json")));
    assert!(snap.json().is_none());
}

#[test]
fn test_snapshot_content_type_must_match_exactly() {
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );

    let snap = ResponseSnapshot::from_parts(
        Url::parse("https://api.example.com/items").unwrap(),
        headers,
        Bytes::from_static(b"{}"),
    )
    .unwrap();

    assert!(matches!(snap.body(), Body::Raw(_)));
}

#[test]
fn test_snapshot_invalid_json_is_decode_error() {
    let err = ResponseSnapshot::from_parts(
        Url::parse("https://api.example.com/items").unwrap(),
        json_headers(),
        Bytes::from_static(b"{\"items\": ["),
    )
    .unwrap_err();

    assert!(matches!(err, Error::JsonParse(_)));
    assert!(err.is_decode());
}

#[test]
fn test_snapshot_headers_case_insensitive_and_multi_valued() {
    let mut headers = json_headers();
    headers.append("X-Trace", HeaderValue::from_static("a"));
    headers.append("x-trace", HeaderValue::from_static("b"));

    let snap = ResponseSnapshot::new(
        Url::parse("https://api.example.com/items").unwrap(),
        headers,
        Body::Json(json!({})),
    );

    assert_eq!(snap.header("X-TRACE"), Some("a"));
    assert_eq!(snap.header_values("x-trace"), vec!["a", "b"]);
    assert_eq!(snap.header("missing"), None);
}

#[test]
fn test_snapshot_decode_json() {
    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct Server {
        id: String,
    }
    #[derive(Debug, serde::Deserialize)]
    struct Servers {
        servers: Vec<Server>,
    }

    let snap = snapshot(
        "https://api.example.com/servers",
        json!({"servers": [{"id": "a"}, {"id": "b"}]}),
    );
    let decoded: Servers = snap.decode_json().unwrap();
    assert_eq!(decoded.servers.len(), 2);
    assert_eq!(decoded.servers[1], Server { id: "b".to_string() });

    let raw = ResponseSnapshot::new(
        Url::parse("https://api.example.com/servers").unwrap(),
        HeaderMap::new(),
        Body::Raw(Bytes::new()),
    );
    assert!(raw.decode_json::<Servers>().unwrap_err().is_decode());
}

// ============================================================================
// SinglePage Tests
// ============================================================================

#[test]
fn test_single_page_has_no_next() {
    let page = SinglePage::new(snapshot("https://x/all", json!({"items": [1, 2, 3]})));
    assert_eq!(page.next_page_url().unwrap(), None);
    assert_eq!(page.snapshot().request_url().as_str(), "https://x/all");
}

// ============================================================================
// LinkedPage Tests
// ============================================================================

#[test_case(json!({"links": {"next": "https://x/2"}}), Some("https://x/2") ; "absolute next")]
#[test_case(json!({"links": {"next": ""}}), Some("") ; "empty next")]
#[test_case(json!({"links": {}}), None ; "next absent")]
#[test_case(json!({"links": {"next": null, "prev": "https://x/0"}}), None ; "next null")]
fn test_linked_page_next(body: Value, expected: Option<&str>) {
    let page = LinkedPage::new(snapshot("https://x/v2/items", body));
    assert_eq!(
        page.next_page_url().unwrap(),
        expected.map(ToString::to_string)
    );
}

#[test_case("/v2/items?page=2", "https://x/v2/items?page=2" ; "root relative")]
#[test_case("?page=2", "https://x/v2/items?page=2" ; "query only")]
#[test_case("servers", "https://x/v2/servers" ; "path relative")]
#[test_case("../v3/items", "https://x/v3/items" ; "parent relative")]
fn test_linked_page_resolves_relative_next(next: &str, expected: &str) {
    let page = LinkedPage::new(snapshot(
        "https://x/v2/items",
        json!({"links": {"next": next}}),
    ));
    assert_eq!(page.next_page_url().unwrap(), Some(expected.to_string()));
}

#[test_case(json!({"items": []}) ; "links missing")]
#[test_case(json!({"links": null}) ; "links null")]
#[test_case(json!({"links": ["https://x/2"]}) ; "links array")]
#[test_case(json!({"links": {"next": 2}}) ; "next not a string")]
#[test_case(json!({"links": {"next": "http://[::1"}}) ; "next not a url")]
#[test_case(json!([{"links": {}}]) ; "body is array")]
fn test_linked_page_malformed_is_decode_error(body: Value) {
    let page = LinkedPage::new(snapshot("https://x/1", body));
    let err = page.next_page_url().unwrap_err();
    assert!(err.is_decode(), "expected decode error, got {err:?}");
}

#[test]
fn test_linked_page_raw_body_is_decode_error() {
    let page = LinkedPage::new(ResponseSnapshot::new(
        Url::parse("https://x/1").unwrap(),
        HeaderMap::new(),
        Body::Raw(Bytes::from_static(b"<html/>")),
    ));
    assert!(page.next_page_url().unwrap_err().is_decode());
}

// ============================================================================
// MarkerPage Tests
// ============================================================================

#[test]
fn test_marker_page_appends_marker() {
    let page = marker_page("https://api.example.com/items?limit=10", "item-42");
    assert_eq!(
        page.next_page_url().unwrap(),
        Some("https://api.example.com/items?limit=10&marker=item-42".to_string())
    );
}

#[test]
fn test_marker_page_replaces_existing_marker() {
    let page = marker_page(
        "https://api.example.com/items?marker=old&limit=10&marker=older",
        "new",
    );
    assert_eq!(
        page.next_page_url().unwrap(),
        Some("https://api.example.com/items?limit=10&marker=new".to_string())
    );
}

#[test]
fn test_marker_page_canonicalizes_query() {
    let page = marker_page(
        "https://api.example.com/v2/items?sort=name&tag=b&tag=a&name=a%20b",
        "m 1",
    );
    assert_eq!(
        page.next_page_url().unwrap(),
        Some(
            "https://api.example.com/v2/items?marker=m+1&name=a+b&sort=name&tag=b&tag=a"
                .to_string()
        )
    );
}

#[test]
fn test_marker_page_form_encodes_marker() {
    let page = marker_page("https://api.example.com/items", "a~b*c/d");
    assert_eq!(
        page.next_page_url().unwrap(),
        Some("https://api.example.com/items?marker=a%7Eb*c%2Fd".to_string())
    );
}

#[test]
fn test_marker_page_propagates_extractor_error() {
    let page = MarkerPage::new(
        snapshot("https://api.example.com/items", json!({"items": []})),
        Arc::new(|_: &dyn Page| -> Result<String> { Err(Error::extraction("empty page")) }),
    );

    let err = page.next_page_url().unwrap_err();
    assert!(matches!(err, Error::Extraction { ref message } if message == "empty page"));
}

#[test]
fn test_marker_page_extractor_sees_page_body() {
    let page = MarkerPage::new(
        snapshot(
            "https://api.example.com/items?limit=2",
            json!({"items": [{"id": "a"}, {"id": "b"}]}),
        ),
        Arc::new(last_field("items", "id")),
    );

    assert_eq!(
        page.next_page_url().unwrap(),
        Some("https://api.example.com/items?limit=2&marker=b".to_string())
    );
}

// ============================================================================
// Collaborator helper Tests
// ============================================================================

#[test]
fn test_count_array() {
    let count = count_array("items");

    let page = SinglePage::new(snapshot("https://x/1", json!({"items": [1, 2, 3]})));
    assert_eq!(count(&page).unwrap(), 3);

    let empty = SinglePage::new(snapshot("https://x/1", json!({"items": []})));
    assert_eq!(count(&empty).unwrap(), 0);

    let missing = SinglePage::new(snapshot("https://x/1", json!({"other": []})));
    assert!(count(&missing).unwrap_err().is_decode());

    let wrong = SinglePage::new(snapshot("https://x/1", json!({"items": {}})));
    assert!(count(&wrong).unwrap_err().is_decode());
}

#[test]
fn test_count_array_empty_raw_body_is_zero() {
    let count = count_array("items");
    let no_content = SinglePage::new(ResponseSnapshot::new(
        Url::parse("https://x/1").unwrap(),
        HeaderMap::new(),
        Body::Raw(Bytes::new()),
    ));
    assert_eq!(count(&no_content).unwrap(), 0);
}

#[test]
fn test_last_field() {
    let mark = last_field("servers", "id");

    let page = SinglePage::new(snapshot(
        "https://x/1",
        json!({"servers": [{"id": "a"}, {"id": 17}]}),
    ));
    assert_eq!(mark(&page).unwrap(), "17");

    let empty = SinglePage::new(snapshot("https://x/1", json!({"servers": []})));
    assert!(matches!(mark(&empty), Err(Error::Extraction { .. })));

    let no_id = SinglePage::new(snapshot("https://x/1", json!({"servers": [{"name": "x"}]})));
    assert!(matches!(mark(&no_id), Err(Error::Extraction { .. })));
}

// ============================================================================
// Pager Tests
// ============================================================================

#[tokio::test]
async fn test_each_page_linked_three_pages() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pager = Pager::new(
        "https://x/1",
        linked_pages(three_linked_pages(), Arc::clone(&calls)),
        count_array("items"),
    );

    let mut seen = Vec::new();
    pager
        .each_page(|page| {
            seen.push(page.snapshot().request_url().to_string());
            Ok(true)
        })
        .await
        .unwrap();

    assert_eq!(seen, vec!["https://x/1", "https://x/2", "https://x/3"]);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_each_page_stops_on_empty_page_without_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pages = vec![
        ("https://x/1", json!({"items": [1], "links": {"next": "https://x/2"}})),
        ("https://x/2", json!({"items": [], "links": {"next": "https://x/3"}})),
    ];
    let pager = Pager::new(
        "https://x/1",
        linked_pages(pages, Arc::clone(&calls)),
        count_array("items"),
    );

    let mut handled = 0;
    pager
        .each_page(|_| {
            handled += 1;
            Ok(true)
        })
        .await
        .unwrap();

    assert_eq!(handled, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_each_page_handler_false_stops_immediately() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pager = Pager::new(
        "https://x/1",
        linked_pages(three_linked_pages(), Arc::clone(&calls)),
        count_array("items"),
    );

    let mut handled = 0;
    pager
        .each_page(|_| {
            handled += 1;
            Ok(false)
        })
        .await
        .unwrap();

    assert_eq!(handled, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_each_page_fetch_error_on_page_two() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut pages = three_linked_pages();
    pages.remove(1);
    let pager = Pager::new(
        "https://x/1",
        linked_pages(pages, Arc::clone(&calls)),
        count_array("items"),
    );

    let mut handled = 0;
    let err = pager
        .each_page(|_| {
            handled += 1;
            Ok(true)
        })
        .await
        .unwrap_err();

    assert_eq!(handled, 1);
    assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn test_each_page_handler_error_propagates() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pager = Pager::new(
        "https://x/1",
        linked_pages(three_linked_pages(), Arc::clone(&calls)),
        count_array("items"),
    );

    let err = pager
        .each_page(|_| Err(anyhow::anyhow!("disk full").into()))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "disk full");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_each_page_count_error_propagates() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pager = Pager::new(
        "https://x/1",
        linked_pages(three_linked_pages(), Arc::clone(&calls)),
        |_: &dyn Page| -> Result<usize> { Err(Error::decode("bad count")) },
    );

    let mut handled = 0;
    let err = pager
        .each_page(|_| {
            handled += 1;
            Ok(true)
        })
        .await
        .unwrap_err();

    assert_eq!(handled, 0);
    assert!(err.is_decode());
}

#[tokio::test]
async fn test_each_page_next_url_error_propagates() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pages = vec![("https://x/1", json!({"items": [1]}))];
    let pager = Pager::new(
        "https://x/1",
        linked_pages(pages, Arc::clone(&calls)),
        count_array("items"),
    );

    let mut handled = 0;
    let err = pager
        .each_page(|_| {
            handled += 1;
            Ok(true)
        })
        .await
        .unwrap_err();

    // page is handled before its successor is looked up
    assert_eq!(handled, 1);
    assert!(err.is_decode());
}

#[tokio::test]
async fn test_each_page_empty_next_string_terminates() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pages = vec![("https://x/1", json!({"items": [1], "links": {"next": ""}}))];
    let pager = Pager::new(
        "https://x/1",
        linked_pages(pages, Arc::clone(&calls)),
        count_array("items"),
    );

    pager.each_page(|_| Ok(true)).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_pager_is_reusable() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pager = Pager::new(
        "https://x/1",
        linked_pages(three_linked_pages(), Arc::clone(&calls)),
        count_array("items"),
    );

    let first = pager.all_pages().await.unwrap();
    let second = pager.clone().all_pages().await.unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(second.len(), 3);
    assert_eq!(second[0].request_url().as_str(), "https://x/1");
    assert_eq!(calls.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn test_max_pages_guard() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pager = Pager::new(
        "https://x/1",
        linked_pages(three_linked_pages(), Arc::clone(&calls)),
        count_array("items"),
    )
    .with_max_pages(2);
    assert_eq!(pager.max_pages(), Some(2));

    let mut handled = 0;
    let err = pager
        .each_page(|_| {
            handled += 1;
            Ok(true)
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::PageLimitExceeded { limit: 2 }));
    assert_eq!(handled, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_max_pages_not_hit_when_collection_ends() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pager = Pager::new(
        "https://x/1",
        linked_pages(three_linked_pages(), Arc::clone(&calls)),
        count_array("items"),
    )
    .with_max_pages(3);

    assert_eq!(pager.all_pages().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_marker_pager_in_memory() {
    // items 1..=5 served two at a time, keyed by marker
    let fetch = |url: String| {
        async move {
            let parsed = Url::parse(&url)?;
            let after: u32 = parsed
                .query_pairs()
                .find(|(k, _)| k == "marker")
                .map_or(0, |(_, v)| v.parse().unwrap_or(0));
            let items: Vec<Value> = (after + 1..=5)
                .take(2)
                .map(|id| json!({"id": id.to_string()}))
                .collect();
            let page: Box<dyn Page> = Box::new(MarkerPage::new(
                snapshot(&url, json!({"items": items})),
                Arc::new(last_field("items", "id")),
            ));
            Ok::<_, Error>(page)
        }
        .boxed()
    };

    let pager = Pager::new("https://x/items?limit=2", fetch, count_array("items"));

    let mut urls = Vec::new();
    pager
        .each_page(|page| {
            urls.push(page.snapshot().request_url().to_string());
            Ok(true)
        })
        .await
        .unwrap();

    // the fourth request returns an empty page, which ends iteration
    assert_eq!(
        urls,
        vec![
            "https://x/items?limit=2",
            "https://x/items?limit=2&marker=2",
            "https://x/items?limit=2&marker=4",
        ]
    );
}

#[test]
fn test_pager_debug() {
    let pager = Pager::new(
        "https://x/1",
        linked_pages(vec![], Arc::new(AtomicUsize::new(0))),
        count_array("items"),
    );
    let debug = format!("{pager:?}");
    assert!(debug.contains("Pager"));
    assert!(debug.contains("https://x/1"));
    assert_eq!(pager.initial_url(), "https://x/1");
}
