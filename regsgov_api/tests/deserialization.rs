use regsgov_api::types::{
    CommentAttributes, CommentDetailAttributes, DetailResponse, DocketAttributes,
    DocumentAttributes, DocumentDetailAttributes, ListResponse,
};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[test]
fn deserialize_documents_page() {
    let json = load_fixture("documents.json");
    let resp: ListResponse<DocumentAttributes> = serde_json::from_str(&json).unwrap();
    assert_eq!(resp.data.len(), 1);
    assert_eq!(resp.meta.total_elements, 1);
    assert_eq!(resp.meta.page_size, 250);

    let doc = &resp.data[0];
    assert_eq!(doc.kind, "documents");
    assert_eq!(doc.attributes.docket_id.as_deref(), Some("FDA-2021-N-0270"));
    assert_eq!(doc.attributes.document_type.as_deref(), Some("Notice"));
    assert_eq!(doc.attributes.subtype, None);
    assert_eq!(
        doc.attributes.last_modified_date.to_rfc3339(),
        "2021-04-06T14:51:27+00:00"
    );
    assert!(!doc.attributes.withdrawn);
}

#[test]
fn deserialize_document_detail_file_formats() {
    let json = load_fixture("document_detail.json");
    let resp: DetailResponse<DocumentDetailAttributes> = serde_json::from_str(&json).unwrap();
    assert_eq!(resp.data.attributes.object_id, "0900006484b3c8a2");
    assert_eq!(resp.data.attributes.page_count, Some(4));
    let formats = resp.data.attributes.file_formats.unwrap();
    assert_eq!(formats.len(), 2);
    assert_eq!(formats[1].format.as_deref(), Some("htm"));
    assert!(resp.included.is_empty());
}

#[test]
fn deserialize_comments_page() {
    let json = load_fixture("comments.json");
    let resp: ListResponse<CommentAttributes> = serde_json::from_str(&json).unwrap();
    assert_eq!(resp.data.len(), 2);
    assert_eq!(resp.data[0].id, "FDA-2021-N-0270-0002");
    assert_eq!(resp.data[0].attributes.title.as_deref(), Some("Comment from Anonymous"));
}

#[test]
fn deserialize_comment_detail_with_included_attachments() {
    let json = load_fixture("comment_detail.json");
    let resp: DetailResponse<CommentDetailAttributes> = serde_json::from_str(&json).unwrap();
    let attrs = &resp.data.attributes;
    assert_eq!(attrs.comment.as_deref(), Some("See attached file(s)"));
    assert_eq!(attrs.organization, None);
    assert_eq!(attrs.duplicate_comments, Some(0));

    assert_eq!(resp.included.len(), 2);
    assert_eq!(resp.included[0].kind, "attachments");
    assert_eq!(resp.included[1].attributes.doc_order, Some(2));
    let formats = resp.included[1].attributes.file_formats.as_ref().unwrap();
    assert_eq!(formats.len(), 2);
}

#[test]
fn deserialize_dockets_page_without_previous_flag() {
    let json = load_fixture("dockets.json");
    let resp: ListResponse<DocketAttributes> = serde_json::from_str(&json).unwrap();
    assert_eq!(resp.data[0].attributes.docket_type.as_deref(), Some("Nonrulemaking"));
    assert!(!resp.meta.has_previous_page);
}

#[test]
fn comment_missing_object_id_fails() {
    let json = r#"{"data":[{"id":"X-1","type":"comments","attributes":{"lastModifiedDate":"2021-04-12T16:02:11Z"}}]}"#;
    let result: Result<ListResponse<CommentAttributes>, _> = serde_json::from_str(json);
    assert!(result.is_err());
}
