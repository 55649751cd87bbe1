use blockpatch_model::ast::{Column, Document, Node};
use std::collections::HashSet;

/// Visitor pattern for walking a document tree immutably
///
/// The default implementations descend through every `columns` node into
/// its columns and their nodes. Override a `visit_*` method to act on a
/// node; call the matching `walk_*` function to keep descending.
pub trait Visitor<'a>: Sized {
    fn visit_document(&mut self, doc: &'a Document) {
        walk_document(self, doc);
    }

    fn visit_node(&mut self, node: &'a Node) {
        walk_node(self, node);
    }

    fn visit_column(&mut self, column: &'a Column) {
        walk_column(self, column);
    }
}

pub fn walk_document<'a, V: Visitor<'a>>(visitor: &mut V, doc: &'a Document) {
    walk_nodes(visitor, &doc.nodes);
}

pub fn walk_nodes<'a, V: Visitor<'a>>(visitor: &mut V, nodes: &'a [Node]) {
    for node in nodes {
        visitor.visit_node(node);
    }
}

pub fn walk_node<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a Node) {
    for column in node.columns() {
        visitor.visit_column(column);
    }
}

pub fn walk_column<'a, V: Visitor<'a>>(visitor: &mut V, column: &'a Column) {
    walk_nodes(visitor, &column.nodes);
}

/// Gathers node and column ids in document order
#[derive(Default)]
struct IdCollector<'a> {
    ids: Vec<&'a str>,
}

impl<'a> Visitor<'a> for IdCollector<'a> {
    fn visit_node(&mut self, node: &'a Node) {
        self.ids.push(node.id());
        walk_node(self, node);
    }

    fn visit_column(&mut self, column: &'a Column) {
        self.ids.push(&column.id);
        walk_column(self, column);
    }
}

/// Every node and column id in the document, depth-first
pub fn collect_ids(doc: &Document) -> Vec<&str> {
    let mut collector = IdCollector::default();
    collector.visit_document(doc);
    collector.ids
}

/// The id of `node` plus the ids of everything nested under it
pub fn subtree_ids(node: &Node) -> Vec<&str> {
    let mut collector = IdCollector::default();
    collector.visit_node(node);
    collector.ids
}

/// Same as [`subtree_ids`] but rooted at a column
pub fn column_subtree_ids(column: &Column) -> Vec<&str> {
    let mut collector = IdCollector::default();
    collector.visit_column(column);
    collector.ids
}

/// Depth-first lookup of a column anywhere in the tree
pub fn find_column<'a>(doc: &'a Document, id: &str) -> Option<&'a Column> {
    struct Finder<'a, 'b> {
        id: &'b str,
        found: Option<&'a Column>,
    }

    impl<'a, 'b> Visitor<'a> for Finder<'a, 'b> {
        fn visit_node(&mut self, node: &'a Node) {
            if self.found.is_none() {
                walk_node(self, node);
            }
        }

        fn visit_column(&mut self, column: &'a Column) {
            if self.found.is_some() {
                return;
            }
            if column.id == self.id {
                self.found = Some(column);
            } else {
                walk_column(self, column);
            }
        }
    }

    let mut finder = Finder { id, found: None };
    finder.visit_document(doc);
    finder.found
}

/// Selection roots expanded to the full set of ids they cover
///
/// Selected ids that do not exist in the document contribute nothing. A
/// selected column covers itself and its nested nodes.
pub fn descendant_closure<'a, I, S>(doc: &'a Document, selected: I) -> HashSet<&'a str>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let roots: HashSet<String> = selected.into_iter().map(|id| id.as_ref().to_string()).collect();

    struct Closure<'a> {
        roots: HashSet<String>,
        allowed: HashSet<&'a str>,
    }

    impl<'a> Visitor<'a> for Closure<'a> {
        fn visit_node(&mut self, node: &'a Node) {
            if self.roots.contains(node.id()) {
                self.allowed.extend(subtree_ids(node));
            } else {
                walk_node(self, node);
            }
        }

        fn visit_column(&mut self, column: &'a Column) {
            if self.roots.contains(column.id.as_str()) {
                self.allowed.extend(column_subtree_ids(column));
            } else {
                walk_column(self, column);
            }
        }
    }

    let mut closure = Closure {
        roots,
        allowed: HashSet::new(),
    };
    closure.visit_document(doc);
    closure.allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpatch_model::ast::Column;

    fn nested() -> Document {
        Document::new(
            "doc",
            "t",
            vec![
                Node::heading("h1", 1, "Title"),
                Node::columns_of(
                    "cols",
                    vec![
                        Column::new("left", vec![Node::paragraph("p-left", "L")]),
                        Column::new(
                            "right",
                            vec![Node::columns_of(
                                "inner",
                                vec![Column::new("deep", vec![Node::divider("d1")])],
                            )],
                        ),
                    ],
                ),
                Node::paragraph("p1", "Hello"),
            ],
        )
    }

    #[test]
    fn test_collect_ids_in_document_order() {
        let doc = nested();
        assert_eq!(
            collect_ids(&doc),
            vec!["h1", "cols", "left", "p-left", "right", "inner", "deep", "d1", "p1"]
        );
    }

    #[test]
    fn test_subtree_ids() {
        let doc = nested();
        let cols = doc.find_node("cols").unwrap();
        assert_eq!(
            subtree_ids(cols),
            vec!["cols", "left", "p-left", "right", "inner", "deep", "d1"]
        );
        assert_eq!(subtree_ids(doc.find_node("p1").unwrap()), vec!["p1"]);
    }

    #[test]
    fn test_find_column() {
        let doc = nested();
        assert_eq!(find_column(&doc, "deep").map(|c| c.nodes.len()), Some(1));
        assert!(find_column(&doc, "d1").is_none());
    }

    #[test]
    fn test_descendant_closure() {
        let doc = nested();

        let allowed = descendant_closure(&doc, ["inner", "missing"]);
        let mut ids: Vec<_> = allowed.into_iter().collect();
        ids.sort();
        assert_eq!(ids, vec!["d1", "deep", "inner"]);

        let allowed = descendant_closure(&doc, ["left"]);
        assert!(allowed.contains("p-left"));
        assert!(!allowed.contains("cols"));

        assert!(descendant_closure(&doc, ["nope"]).is_empty());
    }
}
