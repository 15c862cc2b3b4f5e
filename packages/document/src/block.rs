use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Closed set of block types.
///
/// `EmailLayout` is the document root (exactly one per document, at the
/// reserved id `"root"`). `Container` and `ColumnsContainer` own children;
/// everything else is a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    EmailLayout,
    Container,
    ColumnsContainer,
    Heading,
    Text,
    Button,
    Image,
    Avatar,
    Video,
    Socials,
    Divider,
    Spacer,
    Html,
    Code,
}

impl BlockKind {
    pub fn is_container(self) -> bool {
        matches!(
            self,
            BlockKind::EmailLayout | BlockKind::Container | BlockKind::ColumnsContainer
        )
    }

    pub fn is_leaf(self) -> bool {
        !self.is_container()
    }
}

/// A node in the document tree.
///
/// The block's id is the key under which it is stored in the document
/// mapping; it is not duplicated inside the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: BlockKind,

    #[serde(default)]
    pub data: BlockData,
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            data: BlockData::default(),
        }
    }

    /// Root layout block with an empty child list.
    pub fn layout() -> Self {
        let mut block = Self::new(BlockKind::EmailLayout);
        block.data.children_ids = Some(Vec::new());
        block
    }

    /// Single-slot container with an empty child list.
    pub fn container() -> Self {
        let mut block = Self::new(BlockKind::Container);
        block.data.props.children_ids = Some(Vec::new());
        block
    }

    /// Column layout with `count` empty columns.
    pub fn columns(count: usize) -> Self {
        let mut block = Self::new(BlockKind::ColumnsContainer);
        block.data.props.columns = Some(vec![Column::default(); count]);
        block.data.props.columns_count = Some(count);
        block
    }
}

/// Type-specific payload of a block.
///
/// `style` and the non-linkage parts of `props` are opaque to this crate:
/// they are produced by styling panels and consumed by renderers, and only
/// pass through serialization unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlockData {
    /// Child linkage for `EmailLayout` only.
    #[serde(rename = "childrenIds", default, skip_serializing_if = "Option::is_none")]
    pub children_ids: Option<Vec<String>>,

    /// Opaque visual properties.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub style: Value,

    #[serde(default, skip_serializing_if = "BlockProps::is_empty")]
    pub props: BlockProps,
}

/// Content properties. Linkage fields are typed; everything else flattens
/// into `extra` and round-trips losslessly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlockProps {
    /// Child linkage for `Container` only.
    #[serde(rename = "childrenIds", default, skip_serializing_if = "Option::is_none")]
    pub children_ids: Option<Vec<String>>,

    /// Child linkage for `ColumnsContainer` only; length 1..=4.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<Column>>,

    /// Must equal `columns.len()` whenever `columns` is present.
    #[serde(rename = "columnsCount", default, skip_serializing_if = "Option::is_none")]
    pub columns_count: Option<usize>,

    /// Explicit per-column widths; `None` entries share space equally.
    #[serde(rename = "fixedWidths", default, skip_serializing_if = "Option::is_none")]
    pub fixed_widths: Option<Vec<Option<f64>>>,

    /// Opaque content properties (text, urls, alignment, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BlockProps {
    pub fn is_empty(&self) -> bool {
        self.children_ids.is_none()
            && self.columns.is_none()
            && self.columns_count.is_none()
            && self.fixed_widths.is_none()
            && self.extra.is_empty()
    }
}

/// One ordered child-list slot within a `ColumnsContainer`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Column {
    #[serde(rename = "childrenIds", default)]
    pub children_ids: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Column {
    pub fn with_children(children_ids: Vec<String>) -> Self {
        Self {
            children_ids,
            extra: Map::new(),
        }
    }
}
