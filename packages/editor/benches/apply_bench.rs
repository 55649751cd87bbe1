use blockpatch_editor::{apply_patch, find_location, Pipeline};
use blockpatch_model::{Column, Document, Node, Patch, PatchOp};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

/// `depth` levels of two-column blocks, each column holding a few paragraphs
fn nested_document(depth: usize) -> Document {
    fn level(prefix: &str, depth: usize) -> Vec<Node> {
        let mut nodes: Vec<Node> = (0..4)
            .map(|i| Node::paragraph(format!("{}-p{}", prefix, i), "Lorem ipsum dolor sit amet"))
            .collect();

        if depth > 0 {
            let columns = (0..2)
                .map(|c| {
                    let column_prefix = format!("{}-c{}", prefix, c);
                    Column::new(column_prefix.clone(), level(&column_prefix, depth - 1))
                })
                .collect();
            nodes.push(Node::columns_of(format!("{}-cols", prefix), columns));
        }

        nodes
    }

    Document::new("bench", "Benchmark", level("root", depth))
}

fn deepest_paragraph(depth: usize) -> String {
    let mut prefix = "root".to_string();
    for _ in 0..depth {
        prefix = format!("{}-c1", prefix);
    }
    format!("{}-p3", prefix)
}

fn locate_deep_block(c: &mut Criterion) {
    let doc = nested_document(5);
    let target = deepest_paragraph(5);

    c.bench_function("find_location_depth_5", |b| {
        b.iter(|| find_location(black_box(&doc.nodes), black_box(&target)))
    });
}

fn apply_mixed_patch(c: &mut Criterion) {
    let doc = nested_document(5);
    let target = deepest_paragraph(5);

    let patch = Patch::new(vec![
        PatchOp::UpdateContent {
            id: target.clone(),
            content: "Updated".to_string(),
            text_style: None,
        },
        PatchOp::InsertAfter {
            after_id: target,
            block: Node::divider("bench-divider"),
        },
        PatchOp::DeleteBlock {
            id: "root-p0".to_string(),
        },
    ]);

    c.bench_function("apply_mixed_patch_depth_5", |b| {
        b.iter(|| apply_patch(black_box(&doc), black_box(&patch)))
    });
}

fn run_full_pipeline(c: &mut Criterion) {
    let doc = nested_document(4);
    let target = deepest_paragraph(4);
    let raw = json!([{"action": "edit", "blockId": target, "text": "Updated", "style": {"align": "center"}}]);
    let selected = ["root-cols".to_string()];

    c.bench_function("pipeline_normalize_validate_apply", |b| {
        b.iter(|| Pipeline::new(black_box(&doc)).run(black_box(&raw), &selected))
    });
}

criterion_group!(benches, locate_deep_block, apply_mixed_patch, run_full_pipeline);
criterion_main!(benches);
