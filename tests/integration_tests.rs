//! Integration tests for hal-search
//!
//! These tests run the client against a local mock of the HAL search API.

use hal_search::client::{HalClient, HalError};
use hal_search::models::{Format, SearchParams, SortOrder};
use mockito::Matcher;
use std::time::{Duration, Instant};

const SAMPLE_BODY: &str = r#"{"response":{"numFound":1,"start":0,"docs":[{"docid":"123","label_s":"A paper"}]}}"#;

fn client_for(server: &mockito::Server) -> HalClient {
    HalClient::builder()
        .base_url(format!("{}/search/", server.url()))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_search_returns_response_unaltered() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(SAMPLE_BODY)
        .create_async()
        .await;

    let client = client_for(&server);
    let response = client
        .search(&SearchParams::new("python").rows(10))
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );
    assert_eq!(response.text().await.unwrap(), SAMPLE_BODY);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_search_sends_expected_query() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "python".into()),
            Matcher::UrlEncoded("wt".into(), "json".into()),
            Matcher::UrlEncoded("fl".into(), "docid,label_s,abstract_s".into()),
            Matcher::UrlEncoded("fq".into(), "submittedDateY_i:[2012 TO 2019]".into()),
            Matcher::UrlEncoded("rows".into(), "100".into()),
            Matcher::UrlEncoded("start".into(), "0".into()),
        ]))
        .with_status(200)
        .with_body(SAMPLE_BODY)
        .create_async()
        .await;

    let params = SearchParams::new("python")
        .include_fields(["docid", "label_s", "abstract_s"])
        .before(2019)
        .after(2012)
        .rows(100)
        .offset(0);

    let response = client_for(&server).search(&params).await.unwrap();
    assert!(response.status().is_success());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_search_sort_and_format() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("wt".into(), "bibtex".into()),
            Matcher::UrlEncoded("sort".into(), "producedDate_tdate desc".into()),
        ]))
        .with_status(200)
        .with_body("@article{x}")
        .create_async()
        .await;

    let params = SearchParams::new("rust")
        .format(Format::Bibtex)
        .sort_by("producedDate_tdate")
        .sort_order(SortOrder::Descending);

    let response = client_for(&server).search(&params).await.unwrap();
    assert_eq!(response.text().await.unwrap(), "@article{x}");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_search_collection_path() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search/TDS-MACS/")
        .match_query(Matcher::UrlEncoded("q".into(), "python".into()))
        .with_status(200)
        .with_body(SAMPLE_BODY)
        .create_async()
        .await;

    let client = HalClient::builder()
        .base_url(format!("{}/search/", server.url()))
        .collection("TDS-MACS")
        .build()
        .unwrap();

    let response = client.search(&SearchParams::new("python")).await.unwrap();
    assert!(response.url().path().ends_with("/search/TDS-MACS/"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_search_response_url_carries_query() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/search/")
        .match_query(Matcher::Any)
        .with_status(200)
        .create_async()
        .await;

    let response = client_for(&server)
        .search(&SearchParams::new("python").rows(5).offset(10))
        .await
        .unwrap();

    let pairs: Vec<(String, String)> = response
        .url()
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let names: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(names, vec!["q", "wt", "rows", "start"]);
    assert!(pairs.contains(&("start".to_string(), "10".to_string())));
}

#[tokio::test]
async fn test_search_http_error_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/search/")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body("undefined field foo_s")
        .create_async()
        .await;

    let err = client_for(&server)
        .search(&SearchParams::new("python").sort_by("foo_s"))
        .await
        .unwrap_err();

    match err {
        HalError::HttpStatus { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "undefined field foo_s");
        }
        other => panic!("expected HttpStatus, got {other}"),
    }
}

#[tokio::test]
async fn test_search_server_error_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/search/")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let err = client_for(&server)
        .search(&SearchParams::new("python"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn test_invalid_params_never_hit_the_network() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = client_for(&server)
        .search(&SearchParams::new(""))
        .await
        .unwrap_err();
    assert!(matches!(err, HalError::InvalidRequest(_)));

    let err = "pdf".parse::<Format>().unwrap_err();
    assert!(matches!(err, HalError::InvalidChoice { .. }));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_connection_failure_is_network_error() {
    let client = HalClient::builder()
        .base_url("http://127.0.0.1:1/search/")
        .build()
        .unwrap();

    let err = client
        .search(&SearchParams::new("python"))
        .await
        .unwrap_err();
    assert!(matches!(err, HalError::Network(_)));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_timeout_fails_instead_of_blocking() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Accept connections and hold them open without ever answering.
    let server = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let client = HalClient::builder()
        .base_url(format!("http://{}/search/", addr))
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap();

    let started = Instant::now();
    let err = client
        .search(&SearchParams::new("python"))
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "expected a timeout, got {err}");
    assert!(matches!(err, HalError::Network(_)));
    assert!(started.elapsed() < Duration::from_secs(5));

    server.abort();
}

#[tokio::test]
async fn test_error_status_with_truncated_body() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Answer with a 500 that promises more body than it sends, then hang up.
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\n\r\npartial")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    let client = HalClient::builder()
        .base_url(format!("http://{}/search/", addr))
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let err = client
        .search(&SearchParams::new("python"))
        .await
        .unwrap_err();

    match err {
        HalError::HttpStatus { status, body } => {
            assert_eq!(status, 500);
            assert!(body.is_empty());
        }
        other => panic!("expected HttpStatus, got {other}"),
    }

    server.await.unwrap();
}

#[test]
fn test_portal_and_collection_rejected() {
    let result = HalClient::builder()
        .portal("inria")
        .collection("TDS-MACS")
        .build();
    assert!(matches!(result, Err(HalError::Config(_))));
}

#[test]
fn test_client_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync + Clone>() {}
    assert_send_sync::<HalClient>();
}
