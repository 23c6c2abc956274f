//! Semantic Scholar client tests against a mock server.

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auto_survey::client::{SearchPage, SemanticScholarClient};
use auto_survey::config::{Config, fields};
use auto_survey::error::ClientError;
use auto_survey::models::{Author, UNKNOWN_YEAR};

fn setup_client(mock_server: &MockServer) -> SemanticScholarClient {
    SemanticScholarClient::new(Config::for_testing(&mock_server.uri())).unwrap()
}

#[tokio::test]
async fn test_search_sends_query_and_parses_records() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/graph/v1/paper/search"))
        .and(query_param("query", "graph neural networks"))
        .and(query_param("limit", "2"))
        .and(query_param("offset", "4"))
        .and(query_param("fields", fields::SEARCH.join(",")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 100,
            "offset": 4,
            "next": 6,
            "data": [
                {
                    "title": "Graph Attention Networks",
                    "authors": [{"name": "Petar Velickovic"}, {"name": null}, null],
                    "year": 2018,
                    "publicationVenue": {"name": "ICLR"},
                    "openAccessPdf": {"url": "https://arxiv.org/pdf/1710.10903"},
                    "abstract": "We present graph attention networks."
                },
                {
                    "title": null,
                    "authors": null,
                    "year": null,
                    "publicationVenue": null,
                    "openAccessPdf": null,
                    "abstract": null
                }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let papers = client.search_papers("graph neural networks", 2, 4).await.unwrap().into_papers();

    assert_eq!(papers.len(), 2);
    assert_eq!(papers[0].title, "Graph Attention Networks");
    assert_eq!(papers[0].authors, vec![Author::new("Petar", "Velickovic")]);
    assert_eq!(papers[0].venue, "ICLR");
    assert_eq!(papers[0].url, "https://arxiv.org/pdf/1710.10903");
    assert_eq!(papers[0].summary, "We present graph attention networks.");

    assert_eq!(papers[1].title, "");
    assert!(papers[1].authors.is_empty());
    assert_eq!(papers[1].year, UNKNOWN_YEAR);
    assert_eq!(papers[1].narrative_citation(), "Unknown Author (n.d.)");
}

#[tokio::test]
async fn test_search_null_data_is_an_empty_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/graph/v1/paper/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0, "data": null})))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let page = client.search_papers("nothing", 5, 0).await.unwrap();
    assert_eq!(page, SearchPage::Papers(Vec::new()));
    assert!(!page.is_exhausted());
}

#[tokio::test]
async fn test_search_offset_past_end_is_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/graph/v1/paper/search"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Requested data for This limit and/or offset is not available"
        })))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let page = client.search_papers("graphs", 5, 1000).await.unwrap();
    assert!(page.is_exhausted());
}

#[tokio::test]
async fn test_search_other_bad_request_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/graph/v1/paper/search"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Unrecognized field"})),
        )
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let err = client.search_papers("graphs", 5, 0).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::BadRequest { ref message } if message.contains("Unrecognized")
    ));
}

#[tokio::test]
async fn test_search_waits_out_rate_limiting() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/graph/v1/paper/search"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/graph/v1/paper/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"title": "Finally", "authors": [{"name": "Ann Smith"}], "year": 2020}]
        })))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let papers = client.search_papers("graphs", 5, 0).await.unwrap().into_papers();

    assert_eq!(papers.len(), 1);
    assert_eq!(papers[0].title, "Finally");
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_search_server_error_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/graph/v1/paper/search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let err = client.search_papers("graphs", 5, 0).await.unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 503, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_search_rejects_zero_limit_without_request() {
    let mock_server = MockServer::start().await;

    let client = setup_client(&mock_server);
    let err = client.search_papers("graphs", 0, 0).await.unwrap_err();

    assert!(matches!(err, ClientError::InvalidInput(_)));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_sends_api_key_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/graph/v1/paper/search"))
        .and(header("x-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = Config::for_testing(&mock_server.uri());
    config.api_key = Some("test-key".to_string());
    let client = SemanticScholarClient::new(config).unwrap();

    assert!(client.has_api_key());
    assert!(client.search_papers("graphs", 5, 0).await.unwrap().into_papers().is_empty());
}

#[test]
fn test_client_debug_hides_api_key() {
    let client = SemanticScholarClient::new(Config::new(Some("secret-key".to_string()))).unwrap();
    let debug = format!("{client:?}");
    assert!(!debug.contains("secret-key"));
}
