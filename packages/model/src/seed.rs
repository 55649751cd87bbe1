use crate::ast::{Column, Document, Node, RichItem, TextAlign, TextStyle};
use serde_json::json;

pub const SEED_TITLE: &str = "Quarterly Report";

/// The fixed example every new document starts from
///
/// Ids are readable on purpose so instructions in tests and the CLI can
/// select them by hand.
pub fn seed_document(id: &str) -> Document {
    let option = json!({
        "xAxis": {"type": "category", "data": ["Q1", "Q2", "Q3", "Q4"]},
        "yAxis": {"type": "value"},
        "series": [{"type": "bar", "data": [120, 200, 150, 80]}]
    });
    let option = option.as_object().cloned().unwrap_or_default();

    Document::new(
        id,
        SEED_TITLE,
        vec![
            Node::Heading {
                id: "title".to_string(),
                level: 1,
                text: SEED_TITLE.to_string(),
                text_style: Some(TextStyle {
                    text_align: Some(TextAlign::Center),
                    ..Default::default()
                }),
            },
            Node::paragraph(
                "intro",
                "This report summarises revenue, costs and outlook for the quarter.",
            ),
            Node::divider("divider-1"),
            Node::heading("summary-heading", 2, "Summary"),
            Node::Columns {
                id: "summary".to_string(),
                gap: Some(24),
                columns: vec![
                    Column::new(
                        "summary-left",
                        vec![
                            Node::paragraph("summary-text", "Revenue grew steadily through the first half."),
                            Node::Image {
                                id: "summary-image".to_string(),
                                src: "images/revenue.png".to_string(),
                                alt: Some("Revenue trend".to_string()),
                                caption: Some("Revenue by month".to_string()),
                                width_percent: Some(100),
                            },
                        ],
                    ),
                    Column::new(
                        "summary-right",
                        vec![Node::Chart {
                            id: "revenue-chart".to_string(),
                            title: Some("Revenue by quarter".to_string()),
                            height: Some(320),
                            option,
                        }],
                    ),
                ],
            },
            Node::Rich {
                id: "notes".to_string(),
                items: vec![
                    RichItem::Text {
                        text: "Figures are unaudited.".to_string(),
                        text_style: None,
                    },
                    RichItem::Image {
                        src: "images/logo.png".to_string(),
                        alt: Some("Logo".to_string()),
                        caption: None,
                        width_percent: Some(20),
                    },
                ],
            },
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_document_is_valid() {
        let doc = seed_document("report");
        assert_eq!(doc.id, "report");
        assert!(doc.check().is_ok());
        assert!(doc.find_node("revenue-chart").is_some());
        assert!(doc.contains_id("summary-right"));
    }
}
