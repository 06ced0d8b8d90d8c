//! Text measurement for labels.
//!
//! The geometry engine never measures text itself. The builder asks a
//! [`TextMeasure`] for the size of every label before the geometry stage
//! and hands the results over in the [`GeometryInput`](crate::layout::GeometryInput).

use tessera_core::{
    geometry::Size,
    semantic::{DocAttributes, Node},
};

/// Maps a label to the size it occupies when drawn.
///
/// Implemented for closures, so a custom measure can be passed inline:
///
/// ```
/// # use tessera::measure::TextMeasure;
/// # use tessera_core::{geometry::Size, semantic::{DocAttributes, Node, NodeId, NodeKind}};
/// let fixed = |_: &str, _: &Node, _: &DocAttributes| Size::new(40.0, 10.0);
/// let node = Node::new(NodeId::ROOT, NodeKind::Cell);
/// assert_eq!(fixed.measure("hi", &node, &DocAttributes::default()), Size::new(40.0, 10.0));
/// ```
pub trait TextMeasure {
    /// Size of `label` drawn for `node`.
    fn measure(&self, label: &str, node: &Node, doc: &DocAttributes) -> Size;
}

impl<F> TextMeasure for F
where
    F: Fn(&str, &Node, &DocAttributes) -> Size,
{
    fn measure(&self, label: &str, node: &Node, doc: &DocAttributes) -> Size {
        self(label, node, doc)
    }
}

/// Character-count heuristic: the widest line's characters times
/// `char_width` by the line count times `line_height`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharCountMeasure;

impl TextMeasure for CharCountMeasure {
    fn measure(&self, label: &str, _node: &Node, doc: &DocAttributes) -> Size {
        let (lines, widest) = label
            .lines()
            .fold((0usize, 0usize), |(lines, widest), line| {
                (lines + 1, widest.max(line.chars().count()))
            });
        Size::new(
            widest as f32 * doc.char_width,
            lines as f32 * doc.line_height,
        )
    }
}

/// The text a node shows: its label, else its name.
pub(crate) fn display_text(node: &Node) -> Option<&str> {
    node.label
        .as_deref()
        .or_else(|| (!node.name.is_empty()).then_some(node.name.as_str()))
}

#[cfg(test)]
mod tests {
    use tessera_core::semantic::{NodeId, NodeKind};

    use super::*;

    #[test]
    fn test_char_count_measure() {
        let doc = DocAttributes::default();
        let node = Node::new(NodeId::ROOT, NodeKind::Cell);

        let size = CharCountMeasure.measure("api\ngateway", &node, &doc);
        assert_eq!(size, Size::new(7.0 * doc.char_width, 2.0 * doc.line_height));
        assert!(CharCountMeasure.measure("", &node, &doc).is_zero());
    }

    #[test]
    fn test_display_text() {
        let mut node = Node::new(NodeId::new(1), NodeKind::Cell);
        assert_eq!(display_text(&node), None);
        node.name = "db".to_string();
        assert_eq!(display_text(&node), Some("db"));
        node.label = Some("Database".to_string());
        assert_eq!(display_text(&node), Some("Database"));
    }
}
