//! Structured rich-text document tree.
//!
//! # Responsibility
//! - Mirror the editor engine's JSON document shape (`type/attrs/content/text/marks`).
//! - Normalize legacy plain-text slot values into structured documents.
//! - Provide the canonical serialization used for restore equality checks.
//! - Map plain-text offsets onto document positions.
//!
//! # Invariants
//! - Canonical serialization is deterministic: struct field order is fixed and
//!   `attrs` maps are ordered.
//! - Position arithmetic: entering/leaving a non-leaf node costs 1, each text
//!   char costs 1, leaf nodes cost 1. Root children start at position 0.
//! - Plain text separates text blocks with `\n`; hard breaks render as `\n`.

use crate::model::ModelError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const DOC: &str = "doc";
pub const PARAGRAPH: &str = "paragraph";
pub const HEADING: &str = "heading";
pub const CODE_BLOCK: &str = "codeBlock";
pub const TEXT: &str = "text";
pub const HARD_BREAK: &str = "hardBreak";
pub const IMAGE: &str = "image";
pub const HORIZONTAL_RULE: &str = "horizontalRule";

const TEXTBLOCK_KINDS: &[&str] = &[PARAGRAPH, HEADING, CODE_BLOCK];
const LEAF_KINDS: &[&str] = &[HARD_BREAK, IMAGE, HORIZONTAL_RULE];

/// Inline formatting mark attached to a text run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<BTreeMap<String, Value>>,
}

/// One node of a structured document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocNode {
    /// Serialized as `type` to match the editor engine schema.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<DocNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<Mark>>,
}

/// One contiguous run of plain text and where it lives in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSegment {
    /// Char offset of the run inside the plain-text projection.
    pub text_start: usize,
    /// Document position of the run's first char.
    pub pos_start: usize,
    /// Run length in chars.
    pub len: usize,
}

/// Plain-text projection of a document plus its position mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextLayout {
    pub text: String,
    pub segments: Vec<TextSegment>,
    text_len: usize,
    blocks: usize,
}

impl TextLayout {
    /// Maps a plain-text char offset to a document position.
    ///
    /// Offsets that land on a block separator resolve to the end of the
    /// preceding block. Returns `None` past the end of the text.
    pub fn position_of(&self, offset: usize) -> Option<usize> {
        self.segments
            .iter()
            .find(|segment| offset >= segment.text_start && offset <= segment.text_start + segment.len)
            .map(|segment| segment.pos_start + (offset - segment.text_start))
    }

    /// Length of the plain-text projection in chars.
    pub fn len(&self) -> usize {
        self.text_len
    }

    pub fn is_empty(&self) -> bool {
        self.text_len == 0
    }

    fn push_text(&mut self, value: &str, pos_start: usize) {
        let len = value.chars().count();
        self.segments.push(TextSegment {
            text_start: self.text_len,
            pos_start,
            len,
        });
        self.text.push_str(value);
        self.text_len += len;
    }

    fn begin_block(&mut self, pos_start: usize) {
        if self.blocks > 0 {
            self.text.push('\n');
            self.text_len += 1;
        }
        self.blocks += 1;
        // Zero-length anchor so offsets inside empty blocks still resolve.
        self.segments.push(TextSegment {
            text_start: self.text_len,
            pos_start,
            len: 0,
        });
    }
}

impl DocNode {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attrs: None,
            content: None,
            text: None,
            marks: None,
        }
    }

    /// Builds a `doc` root with the given block children.
    pub fn doc(children: Vec<DocNode>) -> Self {
        Self {
            content: Some(children),
            ..Self::new(DOC)
        }
    }

    /// Builds a paragraph; an empty child list yields a paragraph without `content`.
    pub fn paragraph(children: Vec<DocNode>) -> Self {
        Self {
            content: if children.is_empty() {
                None
            } else {
                Some(children)
            },
            ..Self::new(PARAGRAPH)
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self {
            text: Some(value.into()),
            ..Self::new(TEXT)
        }
    }

    pub fn image(src: &str, width: Option<u32>, height: Option<u32>) -> Self {
        let mut attrs = BTreeMap::new();
        attrs.insert("src".to_string(), Value::from(src));
        attrs.insert("width".to_string(), width.map_or(Value::Null, Value::from));
        attrs.insert("height".to_string(), height.map_or(Value::Null, Value::from));
        Self {
            attrs: Some(attrs),
            ..Self::new(IMAGE)
        }
    }

    /// The state an editor holds after being cleared: one empty paragraph.
    pub fn empty_doc() -> Self {
        Self::doc(vec![Self::paragraph(Vec::new())])
    }

    /// Wraps legacy plain text into `doc > paragraph > text`.
    pub fn from_plain_text(value: &str) -> Self {
        Self::doc(vec![Self::paragraph(vec![Self::text(value)])])
    }

    pub fn is_text(&self) -> bool {
        self.kind == TEXT
    }

    pub fn is_textblock(&self) -> bool {
        TEXTBLOCK_KINDS.contains(&self.kind.as_str())
    }

    pub fn is_leaf(&self) -> bool {
        LEAF_KINDS.contains(&self.kind.as_str())
    }

    pub fn children(&self) -> &[DocNode] {
        self.content.as_deref().unwrap_or(&[])
    }

    /// Returns whether this document is in the canonical empty state.
    ///
    /// Empty means: no content, empty content, or exactly one paragraph with
    /// no inline content.
    pub fn is_empty_document(&self) -> bool {
        match self.children() {
            [] => true,
            [only] => only.kind == PARAGRAPH && only.children().is_empty(),
            _ => false,
        }
    }

    /// Size of this node in document positions.
    pub fn node_size(&self) -> usize {
        if let Some(text) = &self.text {
            return text.chars().count();
        }
        if self.is_leaf() {
            return 1;
        }
        2 + self.content_size()
    }

    /// Size of this node's content, i.e. the largest valid position inside a root.
    pub fn content_size(&self) -> usize {
        self.children().iter().map(DocNode::node_size).sum()
    }

    /// Canonical serialized form used for equality checks.
    pub fn canonical_json(&self) -> Result<String, ModelError> {
        serde_json::to_string(self).map_err(ModelError::Serialization)
    }

    /// Plain-text projection.
    pub fn plain_text(&self) -> String {
        self.text_layout().text
    }

    /// Plain-text projection with a text offset → position mapping.
    pub fn text_layout(&self) -> TextLayout {
        let mut layout = TextLayout::default();
        collect_children(self.children(), 0, &mut layout);
        layout
    }

    /// First position inside the first text block, or 0 when there is none.
    pub fn start_position(&self) -> usize {
        self.text_layout()
            .segments
            .first()
            .map_or(0, |segment| segment.pos_start)
    }

    /// Inserts `value` at document position `pos`, returning the position
    /// right after the inserted text.
    ///
    /// `pos` must fall inside a text block.
    pub fn insert_text(&mut self, pos: usize, value: &str) -> Result<usize, ModelError> {
        let inserted = value.chars().count();
        let children = self.content.get_or_insert_with(Vec::new);
        if insert_into_children(children, 0, pos, value) {
            Ok(pos + inserted)
        } else {
            Err(ModelError::PositionOutOfRange(pos))
        }
    }
}

fn collect_children(children: &[DocNode], start: usize, layout: &mut TextLayout) {
    let mut pos = start;
    for child in children {
        collect_node(child, pos, layout);
        pos += child.node_size();
    }
}

fn collect_node(node: &DocNode, pos: usize, layout: &mut TextLayout) {
    if node.is_textblock() {
        let mut inline_pos = pos + 1;
        layout.begin_block(inline_pos);
        for child in node.children() {
            if let Some(text) = &child.text {
                layout.push_text(text, inline_pos);
            } else if child.kind == HARD_BREAK {
                layout.push_text("\n", inline_pos);
            }
            inline_pos += child.node_size();
        }
    } else if !node.is_leaf() && !node.is_text() {
        collect_children(node.children(), pos + 1, layout);
    }
}

fn insert_into_children(children: &mut [DocNode], start: usize, pos: usize, value: &str) -> bool {
    let mut child_pos = start;
    for child in children.iter_mut() {
        let size = child.node_size();
        if child.is_textblock() {
            let inner = child_pos + 1;
            if pos >= inner && pos < child_pos + size {
                insert_inline(child, inner, pos, value);
                return true;
            }
        } else if !child.is_leaf() && !child.is_text() && pos > child_pos && pos < child_pos + size {
            let grandchildren = child.content.get_or_insert_with(Vec::new);
            if insert_into_children(grandchildren, child_pos + 1, pos, value) {
                return true;
            }
        }
        child_pos += size;
    }
    false
}

fn insert_inline(block: &mut DocNode, inner: usize, pos: usize, value: &str) {
    let children = block.content.get_or_insert_with(Vec::new);
    let mut cursor = inner;
    let mut insert_at = children.len();
    for (index, child) in children.iter_mut().enumerate() {
        if let Some(existing) = child.text.as_mut() {
            let len = existing.chars().count();
            if pos <= cursor + len {
                let byte = char_to_byte(existing, pos - cursor);
                existing.insert_str(byte, value);
                return;
            }
            cursor += len;
        } else {
            if pos == cursor {
                insert_at = index;
                break;
            }
            cursor += child.node_size();
        }
    }
    children.insert(insert_at, DocNode::text(value));
}

fn char_to_byte(value: &str, char_index: usize) -> usize {
    value
        .char_indices()
        .nth(char_index)
        .map_or(value.len(), |(byte, _)| byte)
}

/// Stored value of one content slot.
///
/// Older records hold plain strings; newer ones hold structured documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotContent {
    Doc(DocNode),
    LegacyText(String),
}

impl SlotContent {
    /// Normalizes into the structured form handed to editor engines.
    ///
    /// An empty legacy string counts as absent.
    pub fn to_document(&self) -> Option<DocNode> {
        match self {
            Self::Doc(doc) => Some(doc.clone()),
            Self::LegacyText(text) if text.is_empty() => None,
            Self::LegacyText(text) => Some(DocNode::from_plain_text(text)),
        }
    }
}

impl From<DocNode> for SlotContent {
    fn from(value: DocNode) -> Self {
        Self::Doc(value)
    }
}
