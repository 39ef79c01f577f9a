//! Core data types for table-of-contents detection.
//!
//! Parsers produce flat [`TocEntry`] sequences; the hierarchy builder turns
//! them into a [`TocTree`], an arena of [`TocNode`]s linked by [`NodeId`].
//! The tree is built once per detection pass and only read afterwards.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A flat TOC item as produced by a parser, before hierarchy building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Heading text as it appears in the source.
    pub title: String,
    /// Printed page the heading points to, if known (always ≥ 1).
    #[serde(default, alias = "page")]
    pub page_number: Option<u32>,
    /// Nesting depth, 1 = top division.
    #[serde(default = "default_level")]
    pub level: u32,
    /// 1-based position within the detection pass.
    #[serde(default)]
    pub order: u32,
}

fn default_level() -> u32 {
    1
}

impl TocEntry {
    /// Build an entry, clamping the level to ≥ 1 and dropping page 0.
    pub fn new(title: impl Into<String>, page_number: Option<u32>, level: u32, order: u32) -> Self {
        Self {
            title: title.into(),
            page_number: page_number.filter(|&p| p >= 1),
            level: level.max(1),
            order,
        }
    }
}

/// Stable identifier of a node inside one [`TocTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Arena index of this node; equals its position in parse order.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "toc:{}", self.0)
    }
}

/// A TOC item placed in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocNode {
    pub id: NodeId,
    pub title: String,
    pub page_number: Option<u32>,
    pub level: u32,
    pub order: u32,
    /// Nearest preceding node with a strictly lower level.
    pub parent: Option<NodeId>,
    /// Children in parse order.
    pub children: Vec<NodeId>,
}

impl TocNode {
    /// The flat entry this node was built from.
    pub fn entry(&self) -> TocEntry {
        TocEntry {
            title: self.title.clone(),
            page_number: self.page_number,
            level: self.level,
            order: self.order,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Arena-backed TOC hierarchy.
///
/// Nodes are stored in parse order, so `nodes()[i].id.index() == i`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TocTree {
    pub(crate) nodes: Vec<TocNode>,
    pub(crate) roots: Vec<NodeId>,
}

impl TocTree {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in parse order.
    pub fn nodes(&self) -> &[TocNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&TocNode> {
        self.nodes.get(id.0)
    }

    /// Root identifiers in parse order.
    pub fn root_ids(&self) -> &[NodeId] {
        &self.roots
    }

    /// Root nodes in parse order.
    pub fn roots(&self) -> impl Iterator<Item = &TocNode> + '_ {
        self.roots.iter().map(|id| &self.nodes[id.0])
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &TocNode> + '_ {
        self.node(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|c| &self.nodes[c.0])
    }

    pub fn parent(&self, id: NodeId) -> Option<&TocNode> {
        self.node(id)?.parent.and_then(|p| self.node(p))
    }

    /// Node identifiers in depth-first pre-order, starting from the roots.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    /// Flatten back to entries in depth-first pre-order.
    pub fn flatten(&self) -> Vec<TocEntry> {
        self.preorder()
            .into_iter()
            .map(|id| self.nodes[id.0].entry())
            .collect()
    }

    /// Nested, serializable view of the tree.
    pub fn to_nested(&self) -> Vec<TocItemView> {
        self.roots.iter().map(|&id| self.view(id)).collect()
    }

    fn view(&self, id: NodeId) -> TocItemView {
        let node = &self.nodes[id.0];
        TocItemView {
            id: Some(node.id.to_string()),
            title: node.title.clone(),
            page_number: node.page_number,
            level: node.level,
            order: node.order,
            children: node.children.iter().map(|&c| self.view(c)).collect(),
        }
    }
}

impl Serialize for TocTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.to_nested())
    }
}

impl<'de> Deserialize<'de> for TocTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let views = Vec::<TocItemView>::deserialize(deserializer)?;
        Ok(super::hierarchy::build(&flatten_views(&views)))
    }
}

/// One item of the nested TOC representation handed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocItemView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, alias = "page")]
    pub page_number: Option<u32>,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub children: Vec<TocItemView>,
}

/// Pre-order flattening of nested views into entries.
///
/// Missing or zero `order` values are replaced by the pre-order position.
pub fn flatten_views(views: &[TocItemView]) -> Vec<TocEntry> {
    fn walk(views: &[TocItemView], out: &mut Vec<TocEntry>) {
        for v in views {
            let position = out.len() as u32 + 1;
            let order = if v.order == 0 { position } else { v.order };
            out.push(TocEntry::new(v.title.clone(), v.page_number, v.level, order));
            walk(&v.children, out);
        }
    }
    let mut out = Vec::new();
    walk(views, &mut out);
    out
}

/// Which strategy produced a detection result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TocSource {
    Embedded,
    Pattern,
    Semantic,
    StructureHeuristic,
}

impl TocSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Embedded => "embedded",
            Self::Pattern => "pattern",
            Self::Semantic => "semantic",
            Self::StructureHeuristic => "structure_heuristic",
        }
    }
}

impl std::fmt::Display for TocSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Book-level metadata recovered from the leading text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInfo {
    pub title: Option<String>,
    pub author: Option<String>,
}

/// Output of one detection pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Detected hierarchy; serialized as the nested list of roots.
    pub toc: TocTree,
    pub detected_title: Option<String>,
    pub detected_author: Option<String>,
    /// Trust in this result, in `[0, 1]`.
    pub confidence: f32,
    pub source: TocSource,
}

impl DetectionResult {
    /// A zero-confidence result with no entries.
    pub fn empty(source: TocSource) -> Self {
        Self {
            toc: TocTree::default(),
            detected_title: None,
            detected_author: None,
            confidence: 0.0,
            source,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.toc.is_empty()
    }
}

/// An outline item supplied by a format-specific metadata reader
/// (e.g. a PDF outline). Loosely typed; validated by [`EmbeddedTocItem::to_entry`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddedTocItem {
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "page")]
    pub page_number: Option<i64>,
}

impl EmbeddedTocItem {
    /// Validate into a [`TocEntry`]; a missing or non-positive level becomes 1.
    pub fn to_entry(&self, order: u32) -> TocEntry {
        let level = self
            .level
            .filter(|&l| l >= 1)
            .map(|l| u32::try_from(l).unwrap_or(u32::MAX))
            .unwrap_or(1);
        let page = self
            .page_number
            .filter(|&p| p >= 1)
            .and_then(|p| u32::try_from(p).ok());
        TocEntry::new(self.title.trim(), page, level, order)
    }
}
