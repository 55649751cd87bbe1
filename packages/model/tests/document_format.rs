//! Persisted document format and validator behaviour seen from outside the crate

use blockpatch_model::{
    seed_document, validate_patch, Document, ModelError, Node, NodeKind, PatchOp,
};
use serde_json::json;

#[test]
fn test_seed_document_survives_persistence() {
    let doc = seed_document("report");
    let source = doc.to_json_pretty().unwrap();
    let back = Document::from_json(&source).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn test_undecodable_documents_are_errors() {
    assert!(matches!(Document::from_json("not json"), Err(ModelError::Json(_))));

    let duplicate = json!({
        "id": "d",
        "title": "t",
        "nodes": [
            {"type": "paragraph", "id": "p", "text": "a"},
            {"type": "columns", "id": "c", "columns": [
                {"id": "col", "nodes": [{"type": "divider", "id": "p"}]}
            ]}
        ]
    });
    assert_eq!(
        Document::from_json(&duplicate.to_string()),
        Err(ModelError::DuplicateId("p".to_string()))
    );
}

#[test]
fn test_validator_does_not_check_existence() {
    let doc = seed_document("report");
    let patch = validate_patch(&json!({"ops": [
        {"op": "delete_block", "id": "not-in-any-document"}
    ]}))
    .unwrap();

    assert!(!doc.contains_id(patch.ops[0].target_id()));
}

#[test]
fn test_replace_may_change_kind() {
    let patch = validate_patch(&json!({"ops": [
        {"op": "replace_block", "id": "intro", "block": {
            "type": "columns", "id": "intro", "columns": [
                {"id": "intro-a", "nodes": [{"type": "paragraph", "id": "intro-a-text", "text": "A"}]},
                {"id": "intro-b", "nodes": []}
            ]
        }}
    ]}))
    .unwrap();

    match &patch.ops[0] {
        PatchOp::ReplaceBlock { id, block } => {
            assert_eq!(id, "intro");
            assert_eq!(block.kind(), NodeKind::Columns);
            assert_eq!(block.children().map(Node::id).collect::<Vec<_>>(), vec!["intro-a-text"]);
        }
        other => panic!("Expected replace_block, got {:?}", other),
    }
}
