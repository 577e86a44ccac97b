use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::framework::Framework;
use super::outline::{OutlineKind, SourceRange};

/// Index of a symbol inside a [`SymbolForest`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub usize);

/// Semantic symbol kind after framework-aware classification.
///
/// This is a closed enumeration; classification either lands on one of these
/// or the node is dropped from the enriched forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FrontendKind {
    // Vue
    VueComponent,
    VueComposable,
    VueRef,
    VueReactive,
    VueComputed,
    VueWatch,
    VueLifecycle,
    VueProp,
    VueEmit,
    // React
    ReactComponent,
    ReactHook,
    ReactCustomHook,
    ReactState,
    ReactEffect,
    ReactCallback,
    ReactMemo,
    ReactRef,
    ReactContext,
    ReactReducer,
    // Framework-independent
    EventHandler,
    ApiCall,
    ArrowFunction,
    AsyncFunction,
    ClassDef,
    TypeDef,
    Constant,
    StyleDef,
}

impl FrontendKind {
    /// Display name as shown in symbol descriptions and tooltips
    pub fn display_name(&self) -> &'static str {
        match self {
            FrontendKind::VueComponent => "组件",
            FrontendKind::VueComposable => "组合式函数",
            FrontendKind::VueRef => "响应式引用",
            FrontendKind::VueReactive => "响应式对象",
            FrontendKind::VueComputed => "计算属性",
            FrontendKind::VueWatch => "侦听器",
            FrontendKind::VueLifecycle => "生命周期钩子",
            FrontendKind::VueProp => "组件属性",
            FrontendKind::VueEmit => "组件事件",
            FrontendKind::ReactComponent => "组件",
            FrontendKind::ReactHook => "内置 Hook",
            FrontendKind::ReactCustomHook => "自定义 Hook",
            FrontendKind::ReactState => "状态",
            FrontendKind::ReactEffect => "副作用",
            FrontendKind::ReactCallback => "回调缓存",
            FrontendKind::ReactMemo => "计算缓存",
            FrontendKind::ReactRef => "引用",
            FrontendKind::ReactContext => "上下文",
            FrontendKind::ReactReducer => "状态归约",
            FrontendKind::EventHandler => "事件处理函数",
            FrontendKind::ApiCall => "接口请求",
            FrontendKind::ArrowFunction => "箭头函数",
            FrontendKind::AsyncFunction => "异步函数",
            FrontendKind::ClassDef => "类",
            FrontendKind::TypeDef => "类型定义",
            FrontendKind::Constant => "常量",
            FrontendKind::StyleDef => "样式定义",
        }
    }

    /// Fixed priority table keyed on kind; never inferred anywhere else
    pub fn priority(&self) -> Priority {
        match self {
            FrontendKind::VueComponent | FrontendKind::ReactComponent => Priority::Critical,

            FrontendKind::VueComposable
            | FrontendKind::VueLifecycle
            | FrontendKind::ReactHook
            | FrontendKind::ReactCustomHook => Priority::High,

            FrontendKind::EventHandler
            | FrontendKind::ApiCall
            | FrontendKind::VueComputed
            | FrontendKind::VueWatch
            | FrontendKind::VueProp
            | FrontendKind::VueEmit
            | FrontendKind::ReactState
            | FrontendKind::ReactEffect
            | FrontendKind::ReactCallback
            | FrontendKind::ReactReducer => Priority::Medium,

            FrontendKind::VueRef
            | FrontendKind::VueReactive
            | FrontendKind::ReactRef
            | FrontendKind::ReactContext
            | FrontendKind::ReactMemo
            | FrontendKind::ArrowFunction
            | FrontendKind::AsyncFunction => Priority::Low,

            FrontendKind::ClassDef
            | FrontendKind::TypeDef
            | FrontendKind::Constant
            | FrontendKind::StyleDef => Priority::Minimal,
        }
    }

    /// Fixed coarse-category mapping
    pub fn category(&self) -> Category {
        match self {
            FrontendKind::VueComponent | FrontendKind::ReactComponent => Category::Component,

            FrontendKind::VueComposable
            | FrontendKind::VueLifecycle
            | FrontendKind::VueRef
            | FrontendKind::VueReactive
            | FrontendKind::VueComputed
            | FrontendKind::VueWatch
            | FrontendKind::ReactHook
            | FrontendKind::ReactCustomHook
            | FrontendKind::ReactState
            | FrontendKind::ReactEffect
            | FrontendKind::ReactCallback
            | FrontendKind::ReactMemo
            | FrontendKind::ReactRef
            | FrontendKind::ReactContext
            | FrontendKind::ReactReducer => Category::Hook,

            FrontendKind::EventHandler | FrontendKind::VueEmit => Category::Event,

            FrontendKind::ApiCall => Category::Api,

            FrontendKind::StyleDef => Category::Style,

            FrontendKind::ArrowFunction
            | FrontendKind::AsyncFunction
            | FrontendKind::ClassDef
            | FrontendKind::TypeDef
            | FrontendKind::Constant
            | FrontendKind::VueProp => Category::Utility,
        }
    }
}

/// Symbol priority; `Critical` sorts above `High` and so on down to `Minimal`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Minimal,
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn display_name(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
            Priority::Minimal => "minimal",
        }
    }

    /// Glyph used as the leading marker in display labels
    pub fn glyph(&self) -> &'static str {
        match self {
            Priority::Critical => "🔴",
            Priority::High => "🟠",
            Priority::Medium => "🟡",
            Priority::Low => "🟢",
            Priority::Minimal => "⚪",
        }
    }
}

/// Coarse organizational bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Component,
    Hook,
    Event,
    Api,
    Style,
    Utility,
}

impl Category {
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Component => "component",
            Category::Hook => "hook",
            Category::Event => "event",
            Category::Api => "api",
            Category::Style => "style",
            Category::Utility => "utility",
        }
    }
}

/// Vue-specific enrichment payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VueInfo {
    /// Composition API (script setup / setup()) vs Options API
    pub is_composition_api: bool,

    /// Reactive flavor for data symbols ("ref", "reactive", "computed")
    pub reactive_type: Option<String>,

    /// Component flavor ("composition", "options") for component symbols
    pub component_type: Option<String>,

    /// Template mustache bindings that reference this symbol
    pub template_bindings: Vec<String>,
}

/// React-specific enrichment payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactInfo {
    /// Component flavor ("function", "class") for component symbols
    pub component_type: Option<String>,

    /// Hook name for hook-derived symbols ("useState", "custom", ...)
    pub hook_type: Option<String>,
}

/// Framework payload; at most one variant is attached per symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "framework", rename_all = "lowercase")]
pub enum FrameworkInfo {
    Vue(VueInfo),
    React(ReactInfo),
}

/// An enriched symbol: a raw outline node augmented with framework-aware
/// classification, priority, usage context, and display metadata.
///
/// Tree shape lives in the owning [`SymbolForest`] arena: `parent` and
/// `children` are indices, never owning references, so no cycles can form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolNode {
    /// Stable id derived from name + start line
    pub id: String,
    pub name: String,
    pub range: SourceRange,

    /// Raw kind from the outline provider
    pub kind: OutlineKind,
    pub frontend_kind: FrontendKind,
    pub framework: Framework,
    pub priority: Priority,

    /// First declaration line, trimmed and truncated to 100 chars
    pub signature: String,
    pub parameters: Vec<String>,
    pub return_type: Option<String>,
    pub is_async: bool,
    pub is_private: bool,
    pub is_exported: bool,

    pub used_in_template: bool,
    pub used_in_events: bool,
    pub reference_count: usize,
    /// Reserved; not computed by this engine
    pub usage_frequency: Option<u32>,

    pub category: Category,
    pub tags: Vec<String>,
    /// 1-4, derived from line span
    pub complexity: u8,

    /// Depth from root (root = 0)
    pub level: usize,
    pub parent: Option<SymbolId>,
    pub children: Vec<SymbolId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<FrameworkInfo>,
}

impl SymbolNode {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Arena holding one document's enriched symbol forest.
///
/// Nodes are owned by the arena and addressed by [`SymbolId`]; children are
/// index lists and parents are back-indices, so ownership stays strictly
/// top-down and acyclic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolForest {
    /// Owning document path, absent for an empty forest
    pub document: Option<PathBuf>,
    nodes: Vec<SymbolNode>,
    roots: Vec<SymbolId>,
}

impl SymbolForest {
    pub fn new(document: Option<PathBuf>) -> Self {
        Self {
            document,
            nodes: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Insert a node and wire it beneath `parent` (or as a root)
    pub fn push(&mut self, mut node: SymbolNode, parent: Option<SymbolId>) -> SymbolId {
        let id = SymbolId(self.nodes.len());
        node.parent = parent;
        self.nodes.push(node);
        match parent {
            Some(parent_id) => self.nodes[parent_id.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn get(&self, id: SymbolId) -> Option<&SymbolNode> {
        self.nodes.get(id.0)
    }

    /// Remove a childless node that was the most recent push, unwiring it
    /// from its parent (or the root list). Used by tree pruning to discard
    /// optimistically copied nodes.
    pub(crate) fn pop_leaf(&mut self, id: SymbolId) {
        debug_assert_eq!(id.0 + 1, self.nodes.len(), "pop_leaf requires the last node");
        let Some(node) = self.nodes.pop() else {
            return;
        };
        debug_assert!(node.children.is_empty(), "pop_leaf requires a leaf");
        match node.parent {
            Some(parent) => {
                if let Some(parent_node) = self.nodes.get_mut(parent.0) {
                    parent_node.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }
    }

    pub fn roots(&self) -> &[SymbolId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over every node in the forest in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &SymbolNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (SymbolId(idx), node))
    }
}

/// Stable symbol id: truncated SHA-256 of `name:start_line`
pub fn stable_symbol_id(name: &str, start_line: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(b":");
    hasher.update(start_line.to_string().as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    format!("sym-{}", &hash[..8])
}
