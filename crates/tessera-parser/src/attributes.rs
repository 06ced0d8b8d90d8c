//! Validation of raw attributes into typed values.
//!
//! The reader keeps attribute values as text. This module turns them into
//! the typed values of the semantic model: numbers, CSS-like inset lists,
//! directions, alignments and tag lists. Unknown keys are ignored.

use log::debug;
use winnow::{
    Parser as _,
    ascii::float,
    combinator::separated,
    error::ModalResult,
};

use tessera_core::{
    geometry::Insets,
    semantic::{Alignment, DocAttributes, FlexDirection, NodeKind},
};

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    raw::RawAttribute,
};

/// Typed attributes of a box header.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct NodeAttributes {
    pub direction: Option<FlexDirection>,
    pub align: Option<Alignment>,
    pub margin: Option<Insets>,
    pub border: Option<Insets>,
    pub padding: Option<Insets>,
    pub label: Option<String>,
    pub tags: Vec<String>,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

/// Typed attributes of a link.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct LinkAttributes {
    pub label: Option<String>,
    pub tags: Vec<String>,
}

fn number(input: &mut &str) -> ModalResult<f32> {
    float.parse_next(input)
}

fn number_list(input: &mut &str) -> ModalResult<Vec<f32>> {
    separated(1.., number, ',').parse_next(input)
}

fn invalid_value(attr: &RawAttribute, expected: &str) -> Diagnostic {
    let message = match &attr.value {
        Some(value) => format!("invalid value `{}` for `{}`", value, attr.key),
        None => format!("attribute `{}` needs a value", attr.key),
    };
    Diagnostic::error(message)
        .with_code(ErrorCode::E200)
        .with_label(attr.span, format!("expected {expected}"))
        .with_position(attr.position)
}

fn required_value<'a>(attr: &'a RawAttribute, expected: &str) -> Result<&'a str> {
    attr.value
        .as_deref()
        .ok_or_else(|| invalid_value(attr, expected))
}

fn parse_number(attr: &RawAttribute) -> Result<f32> {
    const EXPECTED: &str = "a non-negative number";
    let value = required_value(attr, EXPECTED)?;
    number
        .parse(value)
        .ok()
        .filter(|number| number.is_finite() && *number >= 0.0)
        .ok_or_else(|| invalid_value(attr, EXPECTED))
}

fn parse_count(attr: &RawAttribute) -> Result<usize> {
    const EXPECTED: &str = "a whole number";
    let value = required_value(attr, EXPECTED)?;
    value
        .parse::<usize>()
        .map_err(|_| invalid_value(attr, EXPECTED))
}

fn parse_insets(attr: &RawAttribute) -> Result<Insets> {
    const EXPECTED: &str = "1, 2 or 4 non-negative numbers separated by `,`";
    let value = required_value(attr, EXPECTED)?;
    number_list
        .parse(value)
        .ok()
        .filter(|numbers| numbers.iter().all(|n| n.is_finite() && *n >= 0.0))
        .and_then(|numbers| Insets::from_shorthand(&numbers))
        .ok_or_else(|| invalid_value(attr, EXPECTED))
}

fn parse_direction(attr: &RawAttribute) -> Result<FlexDirection> {
    const EXPECTED: &str = "row, column, row_reverse, column_reverse, main or cross";
    let value = required_value(attr, EXPECTED)?;
    FlexDirection::from_name(value).ok_or_else(|| invalid_value(attr, EXPECTED))
}

fn parse_align(attr: &RawAttribute) -> Result<Alignment> {
    const EXPECTED: &str = "start, center or end";
    let value = required_value(attr, EXPECTED)?;
    Alignment::from_name(value).ok_or_else(|| invalid_value(attr, EXPECTED))
}

fn parse_text(attr: &RawAttribute) -> Result<String> {
    required_value(attr, "text").map(str::to_string)
}

fn parse_tags(attr: &RawAttribute) -> Result<Vec<String>> {
    let value = required_value(attr, "a comma separated list of tags")?;
    let tags: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect();
    if tags.is_empty() {
        return Err(invalid_value(attr, "at least one tag"));
    }
    Ok(tags)
}

fn cell_only(attr: &RawAttribute, kind: NodeKind) -> Result<()> {
    if kind == NodeKind::Cell {
        return Ok(());
    }
    Err(
        Diagnostic::error(format!("`{}` is not allowed on a {}", attr.key, kind))
            .with_code(ErrorCode::E201)
            .with_label(attr.span, "only cells have an explicit content size")
            .with_position(attr.position),
    )
}

/// Validates the attributes of a box header.
pub(crate) fn node_attributes(kind: NodeKind, attrs: &[RawAttribute]) -> Result<NodeAttributes> {
    let mut typed = NodeAttributes::default();
    for attr in attrs {
        match attr.key.as_str() {
            "direction" => typed.direction = Some(parse_direction(attr)?),
            "align" => typed.align = Some(parse_align(attr)?),
            "margin" => typed.margin = Some(parse_insets(attr)?),
            "border" => typed.border = Some(parse_insets(attr)?),
            "padding" => typed.padding = Some(parse_insets(attr)?),
            "label" => typed.label = Some(parse_text(attr)?),
            "tag" => typed.tags.extend(parse_tags(attr)?),
            "width" => {
                cell_only(attr, kind)?;
                typed.width = Some(parse_number(attr)?);
            }
            "height" => {
                cell_only(attr, kind)?;
                typed.height = Some(parse_number(attr)?);
            }
            key => debug!(key, kind = kind.as_str(); "Ignoring unknown node attribute"),
        }
    }
    Ok(typed)
}

/// Validates the attributes of a link.
pub(crate) fn link_attributes(attrs: &[RawAttribute]) -> Result<LinkAttributes> {
    let mut typed = LinkAttributes::default();
    for attr in attrs {
        match attr.key.as_str() {
            "label" => typed.label = Some(parse_text(attr)?),
            "tag" => typed.tags.extend(parse_tags(attr)?),
            key => debug!(key; "Ignoring unknown link attribute"),
        }
    }
    Ok(typed)
}

/// Validates the document header into [`DocAttributes`].
pub(crate) fn document_attributes(attrs: &[RawAttribute]) -> Result<DocAttributes> {
    let mut doc = DocAttributes::default();
    for attr in attrs {
        match attr.key.as_str() {
            "unit_padding" => doc.unit.padding = parse_insets(attr)?,
            "unit_border" => doc.unit.border = parse_insets(attr)?,
            "unit_margin" => doc.unit.margin = parse_insets(attr)?,
            "group_padding" => doc.group.padding = parse_insets(attr)?,
            "group_border" => doc.group.border = parse_insets(attr)?,
            "group_margin" => doc.group.margin = parse_insets(attr)?,
            "cell_padding" => doc.cell.padding = parse_insets(attr)?,
            "cell_border" => doc.cell.border = parse_insets(attr)?,
            "cell_margin" => doc.cell.margin = parse_insets(attr)?,
            "char_width" => doc.char_width = parse_number(attr)?,
            "line_height" => doc.line_height = parse_number(attr)?,
            "lane_width" => doc.lane_width = parse_number(attr)?,
            "lane_min" => doc.lane_min = parse_count(attr)?,
            "gate_gap" => doc.gate_gap = parse_number(attr)?,
            "link_border" => doc.link_border = parse_number(attr)?,
            "direction" => doc.direction = Some(parse_direction(attr)?),
            "align" => doc.align = Some(parse_align(attr)?),
            "style" => doc.style = Some(parse_text(attr)?),
            key => debug!(key; "Ignoring unknown document attribute"),
        }
    }
    Ok(doc)
}
