//! # Editing Pipeline
//!
//! Raw candidate → normalize → validate → scope → apply.
//!
//! Each stage can only reject; nothing is committed here. The caller decides
//! what to do with the new document (store it, push history).

use crate::apply::apply_patch;
use crate::errors::PipelineError;
use crate::scope::enforce_scope;
use blockpatch_common::collect_ids;
use blockpatch_model::{validate_patch, Document, Patch};
use blockpatch_normalizer::{Normalizer, Repair};
use serde_json::Value;

/// Runs a raw candidate against one document snapshot
pub struct Pipeline<'d> {
    document: &'d Document,
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// The document after the patch; the input is untouched
    pub document: Document,

    pub patch: Patch,

    /// What the normalizer changed in the raw candidate
    pub repairs: Vec<Repair>,
}

impl<'d> Pipeline<'d> {
    pub fn new(document: &'d Document) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Document {
        self.document
    }

    /// Normalizer seeded so generated ids never collide with existing ones
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(&self.document.id).with_reserved_ids(collect_ids(self.document))
    }

    /// Normalize and validate only
    pub fn prepare(&self, raw: &Value) -> Result<(Patch, Vec<Repair>), PipelineError> {
        let normalized = self.normalizer().normalize(raw);
        let patch = validate_patch(&normalized.candidate)?;
        Ok((patch, normalized.repairs))
    }

    pub fn run<S: AsRef<str>>(&self, raw: &Value, selected: &[S]) -> Result<PipelineResult, PipelineError> {
        let result = self.run_stages(raw, selected);

        if let Err(e) = &result {
            tracing::warn!(document_id = %self.document.id, error = %e, "rejected patch");
        }

        result
    }

    fn run_stages<S: AsRef<str>>(&self, raw: &Value, selected: &[S]) -> Result<PipelineResult, PipelineError> {
        let (patch, repairs) = self.prepare(raw)?;
        tracing::debug!(
            document_id = %self.document.id,
            op_count = patch.len(),
            repairs = repairs.len(),
            "validated patch"
        );

        enforce_scope(&patch, self.document, selected)?;
        let document = apply_patch(self.document, &patch)?;

        Ok(PipelineResult {
            document,
            patch,
            repairs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PatchError;
    use blockpatch_model::Node;
    use serde_json::json;

    fn doc() -> Document {
        Document::new(
            "doc",
            "Report",
            vec![Node::heading("h1", 1, "Title"), Node::paragraph("p1", "Hello")],
        )
    }

    #[test]
    fn test_scenario_in_scope_update() {
        let doc = doc();
        let result = Pipeline::new(&doc)
            .run(&json!({"ops": [{"op": "update_content", "id": "p1", "content": "Hi"}]}), &["p1"])
            .unwrap();

        assert!(matches!(&result.document.nodes[1], Node::Paragraph { text, .. } if text == "Hi"));
        assert!(result.repairs.is_empty());
        assert_eq!(doc.nodes[1], Node::paragraph("p1", "Hello"));
    }

    #[test]
    fn test_scenario_out_of_scope() {
        let doc = doc();
        let err = Pipeline::new(&doc)
            .run(&json!({"ops": [{"op": "update_content", "id": "h1", "content": "Hi"}]}), &["p1"])
            .unwrap_err();

        assert_eq!(err, PipelineError::OutOfScope { targets: vec!["h1".to_string()] });
    }

    #[test]
    fn test_structural_failure_comes_before_scope() {
        let doc = doc();
        let err = Pipeline::new(&doc)
            .run(&json!({"ops": [{"op": "update_content", "id": "p1"}]}), &["p1"])
            .unwrap_err();

        match err {
            PipelineError::Structural(e) => assert_eq!(e.path, "ops[0].content"),
            other => panic!("Expected structural error, got {:?}", other),
        }
    }

    #[test]
    fn test_repaired_candidate_applies() {
        let doc = doc();
        let result = Pipeline::new(&doc)
            .run(
                &json!("```json\n[{\"action\": \"insert\", \"afterId\": \"p1\", \"type\": \"paragraph\", \"text\": \"More\"}]\n```"),
                &["p1"],
            )
            .unwrap();

        assert_eq!(result.document.nodes.len(), 3);
        assert!(!result.repairs.is_empty());
        assert!(!doc.contains_id(result.document.nodes[2].id()));
    }

    #[test]
    fn test_unsupported_update_reported() {
        let doc = Document::new("doc", "t", vec![Node::divider("d1")]);
        let err = Pipeline::new(&doc)
            .run(&json!({"ops": [{"op": "edit", "id": "d1", "text": "x"}]}), &["d1"])
            .unwrap_err();

        assert!(matches!(err, PipelineError::Patch(PatchError::Unsupported { .. })));
    }
}
