use crate::visitor::{walk_column, walk_node, Visitor};
use blockpatch_model::ast::{Column, Document, Node, NodeKind};
use serde::Serialize;
use std::collections::BTreeMap;

/// Shape summary of a document, logged on load and commit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub nodes: usize,
    pub columns: usize,
    pub by_kind: BTreeMap<&'static str, usize>,
    /// Number of nested `columns` levels; 0 for a flat document
    pub max_depth: usize,
}

impl DocumentStats {
    pub fn of(doc: &Document) -> Self {
        let mut counter = StatsCounter::default();
        counter.visit_document(doc);
        counter.stats
    }

    pub fn count(&self, kind: NodeKind) -> usize {
        self.by_kind.get(kind.as_str()).copied().unwrap_or(0)
    }
}

#[derive(Default)]
struct StatsCounter {
    stats: DocumentStats,
    depth: usize,
}

impl<'a> Visitor<'a> for StatsCounter {
    fn visit_node(&mut self, node: &'a Node) {
        self.stats.nodes += 1;
        *self.stats.by_kind.entry(node.kind().as_str()).or_default() += 1;

        if node.kind() == NodeKind::Columns {
            self.depth += 1;
            self.stats.max_depth = self.stats.max_depth.max(self.depth);
            walk_node(self, node);
            self.depth -= 1;
        }
    }

    fn visit_column(&mut self, column: &'a Column) {
        self.stats.columns += 1;
        walk_column(self, column);
    }
}
