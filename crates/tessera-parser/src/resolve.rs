//! Tree resolution: raw document to [`Diagram`].
//!
//! The resolver walks the raw tree depth-first, assigning sequential ids,
//! typed attributes, compasses and boundary numbers. Name and tag indices
//! are filled during the walk; each container opens a child-name scope on
//! a scope stack passed down the recursion. Links are resolved last, once
//! the node graph is complete.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, trace};

use tessera_core::{
    compass::Compass,
    semantic::{
        DocAttributes, Diagram, Endpoint, FlexDirection, Link, LinkMarkers, Node, NodeGraph,
        NodeId, NodeKind,
    },
};

use crate::{
    access::path_to_access_name,
    attributes::{document_attributes, link_attributes, node_attributes},
    error::{Diagnostic, ErrorCode, Result},
    raw::{RawAccess, RawDocument, RawEndpoint, RawLink, RawNode},
    span::Span,
};

/// Deepest nesting the resolver walks into.
const MAX_DEPTH: usize = 1000;

/// Child names already used in one container, with their header spans.
type Scope = IndexMap<String, Span>;

/// Resolves a raw document into a diagram.
pub(crate) fn resolve_document(raw: RawDocument) -> Result<Diagram> {
    let doc = document_attributes(&raw.attributes)?;
    let mut resolver = Resolver::new(doc);

    let mut scopes: Vec<Scope> = Vec::new();
    let mut address = Vec::new();
    resolver.visit(&raw.root, None, &mut address, &mut scopes, Some(Vec::new()))?;

    let Resolver {
        doc,
        nodes,
        addresses,
        names,
        tags,
    } = resolver;

    let graph = NodeGraph::from_nodes(nodes).map_err(|err| {
        Diagnostic::error(format!("internal resolver error: {err}")).with_code(ErrorCode::E100)
    })?;

    let index = AccessIndex {
        root: &raw.root,
        addresses: &addresses,
        names: &names,
        tags: &tags,
    };
    let mut links = Vec::new();
    for raw_link in &raw.links {
        resolve_link(raw_link, &index, &graph, &mut links)?;
    }

    debug!(
        nodes = graph.len(),
        links = links.len(),
        names = names.len(),
        tags = tags.len();
        "Resolved diagram"
    );
    Ok(Diagram::new(doc, graph, links))
}

/// Boundary numbers of child `index` out of `count` inside `parent`.
///
/// Absolute slots are read through the parent frame: the child's main-axis
/// neighbours are its siblings, everything else is inherited plus one.
pub(crate) fn boundary_numbers(parent: &Node, index: usize, count: usize) -> [u32; 4] {
    let mut bn = parent.bn_parents.map(|b| b.saturating_add(1));
    if count > 1 {
        let [main_forward, _, main_reverse, _] =
            Compass::CANVAS.mapping_full(parent.compass_items);
        if index + 1 < count {
            bn[main_forward.index()] = 1;
        }
        if index > 0 {
            bn[main_reverse.index()] = 1;
        }
    }
    bn
}

struct Resolver {
    doc: DocAttributes,
    nodes: Vec<Node>,
    addresses: HashMap<Vec<usize>, NodeId>,
    names: IndexMap<String, NodeId>,
    tags: IndexMap<String, Vec<NodeId>>,
}

impl Resolver {
    fn new(doc: DocAttributes) -> Self {
        Self {
            doc,
            nodes: Vec::new(),
            addresses: HashMap::new(),
            names: IndexMap::new(),
            tags: IndexMap::new(),
        }
    }

    /// Visits `raw` and its subtree in pre-order; returns the new node id.
    ///
    /// `segments` is the named path to `raw`, `None` once an anonymous box
    /// was passed.
    fn visit(
        &mut self,
        raw: &RawNode,
        parent: Option<(NodeId, usize, usize)>,
        address: &mut Vec<usize>,
        scopes: &mut Vec<Scope>,
        segments: Option<Vec<String>>,
    ) -> Result<NodeId> {
        if address.len() > MAX_DEPTH {
            return Err(Diagnostic::error(format!(
                "boxes are nested more than {MAX_DEPTH} levels deep"
            ))
            .with_code(ErrorCode::E100)
            .with_label(raw.span, "too deep")
            .with_position(raw.position));
        }

        let id = NodeId::new(self.nodes.len());
        let node = self.build_node(id, raw, parent, segments.as_deref())?;
        trace!(id = id.index(), name = node.display_name(); "Visiting node");

        if !node.name.is_empty() {
            self.names.entry(node.name.clone()).or_insert(id);
        }
        for tag in &node.tags {
            let tagged = self.tags.entry(tag.clone()).or_default();
            if !tagged.contains(&id) {
                tagged.push(id);
            }
        }
        self.addresses.insert(address.clone(), id);
        self.nodes.push(node);

        if raw.kind.is_container() {
            let count = raw.children.len();
            let mut children = Vec::with_capacity(count);

            scopes.push(Scope::new());
            for (index, child) in raw.children.iter().enumerate() {
                if let Some(name) = &child.name {
                    Self::claim_name(scopes, name, child)?;
                }

                let child_segments = match (&segments, &child.name) {
                    (Some(path), Some(name)) => {
                        let mut path = path.clone();
                        path.push(name.clone());
                        Some(path)
                    }
                    _ => None,
                };

                address.push(index);
                let child_id = self.visit(
                    child,
                    Some((id, index, count)),
                    address,
                    scopes,
                    child_segments,
                )?;
                address.pop();
                children.push(child_id);
            }
            scopes.pop();

            self.nodes[id.index()].children = children;
        }

        Ok(id)
    }

    /// Records `name` in the innermost scope.
    fn claim_name(scopes: &mut [Scope], name: &str, child: &RawNode) -> Result<()> {
        let Some(scope) = scopes.last_mut() else {
            return Ok(());
        };
        if let Some(first_span) = scope.get(name) {
            return Err(Diagnostic::error(format!(
                "name `{name}` is declared twice in this container"
            ))
            .with_code(ErrorCode::E203)
            .with_label(child.span, "duplicate name")
            .with_secondary_label(*first_span, "first declared here")
            .with_position(child.position));
        }
        scope.insert(name.to_string(), child.span);
        Ok(())
    }

    fn build_node(
        &self,
        id: NodeId,
        raw: &RawNode,
        parent: Option<(NodeId, usize, usize)>,
        segments: Option<&[String]>,
    ) -> Result<Node> {
        let attrs = node_attributes(raw.kind, &raw.attributes)?;

        let mut node = Node::new(id, raw.kind);
        node.name = raw.name.clone().unwrap_or_default();
        node.path = segments.map(path_to_access_name);
        node.label = attrs.label;
        node.tags = attrs.tags;
        node.width = attrs.width;
        node.height = attrs.height;
        node.align = attrs.align;

        let mut spacing = self.doc.spacing_for(raw.kind);
        if let Some(margin) = attrs.margin {
            spacing.margin = margin;
        }
        if let Some(border) = attrs.border {
            spacing.border = border;
        }
        if let Some(padding) = attrs.padding {
            spacing.padding = padding;
        }
        node.spacing = spacing;

        match parent {
            None => {
                node.compass_self = Compass::CANVAS;
                node.compass_items = attrs
                    .direction
                    .or(self.doc.direction)
                    .unwrap_or(FlexDirection::Cross)
                    .compass(Compass::CANVAS);
                if node.align.is_none() {
                    node.align = self.doc.align;
                }
            }
            Some((parent_id, index, count)) => {
                let parent = &self.nodes[parent_id.index()];
                node.compass_self = parent.compass_items;
                node.compass_items = attrs
                    .direction
                    .unwrap_or(FlexDirection::Cross)
                    .compass(node.compass_self);
                node.parent = Some(parent_id);
                node.parents = parent.parents.clone();
                node.parents.push(parent_id);
                node.index = index;
                node.bn_parents = boundary_numbers(parent, index, count);
            }
        }

        Ok(node)
    }
}

/// Lookup tables used to resolve link endpoints.
struct AccessIndex<'a> {
    root: &'a RawNode,
    addresses: &'a HashMap<Vec<usize>, NodeId>,
    names: &'a IndexMap<String, NodeId>,
    tags: &'a IndexMap<String, Vec<NodeId>>,
}

impl AccessIndex<'_> {
    /// Every node an endpoint selects, in declaration order.
    fn select(&self, endpoint: &RawEndpoint) -> Vec<NodeId> {
        match &endpoint.access {
            RawAccess::Path { base, segments } => self
                .follow(base, segments)
                .and_then(|address| self.addresses.get(&address).copied())
                .into_iter()
                .collect(),
            RawAccess::Name(name) => self.names.get(name).copied().into_iter().collect(),
            RawAccess::Tag(tag) => self.tags.get(tag).cloned().unwrap_or_default(),
            RawAccess::Address(address) => {
                self.addresses.get(address).copied().into_iter().collect()
            }
        }
    }

    fn follow(&self, base: &[usize], segments: &[String]) -> Option<Vec<usize>> {
        let mut node = self.root.at(base)?;
        let mut address = base.to_vec();
        for segment in segments {
            let index = node.child_index(segment)?;
            node = node.children.get(index)?;
            address.push(index);
        }
        Some(address)
    }
}

fn describe_access(access: &RawAccess) -> String {
    match access {
        RawAccess::Path { base, segments } if base.is_empty() => path_to_access_name(segments),
        RawAccess::Path { segments, .. } => format!(".{}", path_to_access_name(segments)),
        RawAccess::Name(name) => format!("&{}", path_to_access_name(&[name])),
        RawAccess::Tag(tag) => format!("${}", path_to_access_name(&[tag])),
        RawAccess::Address(_) => "box".to_string(),
    }
}

fn select_endpoint(index: &AccessIndex<'_>, endpoint: &RawEndpoint) -> Result<Vec<NodeId>> {
    let selected = index.select(endpoint);
    if selected.is_empty() {
        return Err(Diagnostic::error(format!(
            "link endpoint `{}` matches no box",
            describe_access(&endpoint.access)
        ))
        .with_code(ErrorCode::E202)
        .with_label(endpoint.span, "unknown endpoint")
        .with_position(endpoint.position));
    }
    Ok(selected)
}

/// Expands one raw link into `from × to` concrete links.
fn resolve_link(
    raw: &RawLink,
    index: &AccessIndex<'_>,
    graph: &NodeGraph,
    links: &mut Vec<Link>,
) -> Result<()> {
    let attrs = link_attributes(&raw.attributes)?;
    let sources = select_endpoint(index, &raw.from)?;
    let targets = select_endpoint(index, &raw.to)?;

    let markers = LinkMarkers {
        start: raw.token.start_marker,
        end: raw.token.end_marker,
    };

    for &from in &sources {
        for &to in &targets {
            if graph.is_related(from, to) {
                return Err(Diagnostic::error(format!(
                    "cannot link `{}` to `{}`: one contains the other",
                    graph.node(from).display_name(),
                    graph.node(to).display_name()
                ))
                .with_code(ErrorCode::E205)
                .with_label(raw.span, "link between related boxes")
                .with_position(raw.position)
                .with_help("links must join boxes that do not contain each other"));
            }

            let mut link = Link::new(
                Endpoint::new(from, raw.token.from_edge),
                Endpoint::new(to, raw.token.to_edge),
                raw.token.kind.clone(),
            )
            .with_markers(markers)
            .with_label(attrs.label.clone());
            link.tags.clone_from(&attrs.tags);
            links.push(link);
        }
    }

    if sources.len() * targets.len() > 1 {
        debug!(
            from = describe_access(&raw.from.access),
            to = describe_access(&raw.to.access),
            count = sources.len() * targets.len();
            "Link expanded to several links"
        );
    }
    Ok(())
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{raw::RawAttribute, span::Position};

    type Level = (usize, Option<&'static str>);

    /// Nesting levels: the number of units on each level and the direction
    /// given to them.
    fn levels_strategy() -> impl Strategy<Value = Vec<Level>> {
        let direction = prop::option::of(prop::sample::select(vec![
            "row",
            "column",
            "row_reverse",
            "column_reverse",
            "main",
            "cross",
        ]));
        prop::collection::vec((1usize..4, direction), 1..5)
    }

    /// Builds nested units; the first unit of each level holds the next one.
    fn build_level(levels: &[Level]) -> Vec<RawNode> {
        let Some((&(count, direction), rest)) = levels.split_first() else {
            return Vec::new();
        };
        (0..count)
            .map(|i| {
                let mut node = RawNode::new(
                    NodeKind::Unit,
                    Some(format!("n{i}")),
                    Span::default(),
                    Position::default(),
                );
                if let Some(direction) = direction {
                    node.attributes.push(RawAttribute::new(
                        "direction",
                        Some(direction.to_string()),
                        Span::default(),
                        Position::default(),
                    ));
                }
                if i == 0 {
                    node.children = build_level(rest);
                }
                node
            })
            .collect()
    }

    /// Boundary numbers never drop below one, cross-axis slots always add
    /// one to the parent's, and main-axis slots reset to one exactly where
    /// a sibling follows or precedes.
    fn check_boundary_numbers(levels: Vec<Level>) -> std::result::Result<(), TestCaseError> {
        let mut raw = RawDocument::default();
        raw.root.children = build_level(&levels);
        let diagram =
            resolve_document(raw).map_err(|err| TestCaseError::fail(err.to_string()))?;
        let graph = diagram.graph();

        for node in graph.iter() {
            prop_assert!(node.bn_parents.iter().all(|&b| b >= 1));
            let Some(parent_id) = node.parent else {
                continue;
            };
            let parent = graph.node(parent_id);
            let count = parent.children.len();
            let [main_forward, cross, main_reverse, cross_reverse] =
                Compass::CANVAS.mapping_full(parent.compass_items);

            for slot in [cross, cross_reverse] {
                prop_assert_eq!(node.bn(slot), parent.bn(slot) + 1);
            }

            let followed = count > 1 && node.index + 1 < count;
            let preceded = count > 1 && node.index > 0;
            let expected_forward = if followed { 1 } else { parent.bn(main_forward) + 1 };
            let expected_reverse = if preceded { 1 } else { parent.bn(main_reverse) + 1 };
            prop_assert_eq!(node.bn(main_forward), expected_forward);
            prop_assert_eq!(node.bn(main_reverse), expected_reverse);
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn boundary_numbers_follow_siblings(levels in levels_strategy()) {
            check_boundary_numbers(levels)?;
        }
    }
}
