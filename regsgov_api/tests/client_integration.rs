use regsgov_api::types::{
    CommentAttributes, CommentDetailAttributes, DocketAttributes, DocumentAttributes,
    DocumentDetailAttributes, ObjectId, ResourceKind,
};
use regsgov_api::{Client, CommentQuery, DocketQuery, DocumentQuery, Error, Query};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

fn client(server: &MockServer) -> Client {
    Client::with_base_url(&server.uri(), "test-key".to_string()).unwrap()
}

#[tokio::test]
async fn list_documents_sends_key_and_filters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/documents"))
        .and(header("X-Api-Key", "test-key"))
        .and(query_param("filter[docketId]", "FDA-2021-N-0270"))
        .and(query_param("page[size]", "250"))
        .and(query_param("page[number]", "1"))
        .and(query_param("sort", "lastModifiedDate"))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("documents.json")))
        .mount(&mock_server)
        .await;

    let query = DocumentQuery::default()
        .with_docket_id("FDA-2021-N-0270")
        .with_page_size(250);
    let resp = client(&mock_server)
        .list::<DocumentAttributes, _>(&query)
        .await
        .unwrap();

    assert_eq!(resp.data.len(), 1);
    assert_eq!(resp.data[0].id, "FDA-2021-N-0270-0001");
    assert_eq!(
        resp.data[0].attributes.object_id.as_deref(),
        Some("0900006484b3c8a2")
    );
    assert!(resp.meta.last_page);
}

#[tokio::test]
async fn list_comments_filters_by_object_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/comments"))
        .and(query_param("filter[commentOnId]", "0900006484b3c8a2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("comments.json")))
        .mount(&mock_server)
        .await;

    let query = CommentQuery::default().with_comment_on(&ObjectId::new("0900006484b3c8a2"));
    let resp = client(&mock_server)
        .list::<CommentAttributes, _>(&query)
        .await
        .unwrap();

    assert_eq!(resp.data.len(), 2);
    assert_eq!(resp.data[1].attributes.object_id, "0900006484b6f1e1");
}

#[tokio::test]
async fn comment_detail_requests_attachments() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/comments/FDA-2021-N-0270-0003"))
        .and(query_param("include", "attachments"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(load_fixture("comment_detail.json")),
        )
        .mount(&mock_server)
        .await;

    let resp = client(&mock_server)
        .detail::<CommentDetailAttributes>(
            ResourceKind::Comment,
            "FDA-2021-N-0270-0003",
            Some("attachments"),
        )
        .await
        .unwrap();

    assert_eq!(resp.data.attributes.first_name.as_deref(), Some("Jane"));
    assert_eq!(resp.included.len(), 2);
}

#[tokio::test]
async fn status_429_is_quota_exceeded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/comments"))
        .respond_with(
            ResponseTemplate::new(429).set_body_string(load_fixture("over_rate_limit.json")),
        )
        .mount(&mock_server)
        .await;

    let result = client(&mock_server)
        .list::<CommentAttributes, _>(&CommentQuery::default())
        .await;
    assert!(matches!(result, Err(Error::QuotaExceeded)));
}

#[tokio::test]
async fn rejected_key_is_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(403).set_body_string(
            r#"{"error":{"code":"API_KEY_INVALID","message":"An invalid api_key was supplied."}}"#,
        ))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server)
        .list::<DocumentAttributes, _>(&DocumentQuery::default())
        .await;
    assert!(matches!(result, Err(Error::Unauthorized { status: 403 })));
}

#[tokio::test]
async fn server_error_keeps_status_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server)
        .list::<DocumentAttributes, _>(&DocumentQuery::default())
        .await;
    match result {
        Err(Error::HttpStatus { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "Internal Server Error");
        }
        other => panic!("expected HttpStatus, got {:?}", other.map(|r| r.data.len())),
    }
}

#[tokio::test]
async fn malformed_json_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/comments/BAD-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not valid json}"))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server)
        .detail::<CommentDetailAttributes>(ResourceKind::Comment, "BAD-1", None)
        .await;
    let err = result.unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
    assert!(err.is_item_scoped());
}

#[tokio::test]
async fn over_rate_limit_body_wins_over_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dockets"))
        .respond_with(
            ResponseTemplate::new(403).set_body_string(load_fixture("over_rate_limit.json")),
        )
        .mount(&mock_server)
        .await;

    let result = client(&mock_server)
        .list::<DocketAttributes, _>(&DocketQuery::default())
        .await;
    assert!(matches!(result, Err(Error::QuotaExceeded)));
}

#[tokio::test]
async fn missing_item_is_item_scoped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/documents/EPA-HQ-OAR-2021-0317-9999"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"errors":[{"status":"404"}]}"#))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server)
        .detail::<DocumentDetailAttributes>(ResourceKind::Document, "EPA-HQ-OAR-2021-0317-9999", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
    assert!(err.is_item_scoped());
}

#[tokio::test]
async fn detail_id_stays_one_path_segment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/documents/urn:X-1%2F2%3Fpage=3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"data":{"id":"urn:X-1/2?page=3","type":"documents","attributes":{"objectId":"0900006484b3c8a2"}}}"#,
        ))
        .mount(&mock_server)
        .await;

    let resp = client(&mock_server)
        .detail::<DocumentDetailAttributes>(ResourceKind::Document, "urn:X-1/2?page=3", None)
        .await
        .unwrap();
    assert_eq!(resp.data.id, "urn:X-1/2?page=3");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), None);
}
