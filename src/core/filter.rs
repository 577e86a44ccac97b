use serde::{Deserialize, Serialize};

use super::symbol::{Category, Priority, SymbolForest, SymbolId, SymbolNode};

/// Predicate of a quick filter, evaluated by [`FilterRule::matches`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterRule {
    CategoryIs(Category),
    IsAsync,
    PriorityAtLeast(Priority),
    IsExported,
    IsPrivate,
    UsedInTemplate,
}

impl FilterRule {
    pub fn matches(&self, symbol: &SymbolNode) -> bool {
        match self {
            FilterRule::CategoryIs(category) => symbol.category == *category,
            FilterRule::IsAsync => symbol.is_async,
            FilterRule::PriorityAtLeast(threshold) => symbol.priority >= *threshold,
            FilterRule::IsExported => symbol.is_exported,
            FilterRule::IsPrivate => symbol.is_private,
            FilterRule::UsedInTemplate => symbol.used_in_template,
        }
    }
}

/// A named, toggleable predicate from the fixed catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickFilter {
    pub id: String,
    pub name: String,
    pub rule: FilterRule,
    /// Single-keystroke hotkey (1-9)
    pub hotkey: Option<char>,
}

impl QuickFilter {
    fn new(id: &str, name: &str, rule: FilterRule, hotkey: char) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            rule,
            hotkey: Some(hotkey),
        }
    }
}

/// The fixed catalog of eight quick filters
pub fn quick_filter_catalog() -> Vec<QuickFilter> {
    vec![
        QuickFilter::new("components", "组件", FilterRule::CategoryIs(Category::Component), '1'),
        QuickFilter::new("hooks", "Hooks", FilterRule::CategoryIs(Category::Hook), '2'),
        QuickFilter::new("events", "事件", FilterRule::CategoryIs(Category::Event), '3'),
        QuickFilter::new("async", "异步", FilterRule::IsAsync, '4'),
        QuickFilter::new(
            "important",
            "重要符号",
            FilterRule::PriorityAtLeast(Priority::High),
            '5',
        ),
        QuickFilter::new("exported", "已导出", FilterRule::IsExported, '6'),
        QuickFilter::new("private", "私有", FilterRule::IsPrivate, '7'),
        QuickFilter::new("used-in-template", "模板引用", FilterRule::UsedInTemplate, '8'),
    ]
}

/// Active filter selections; applied on read, never stored in the forest
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    /// Free-text search query
    pub search: Option<String>,
    /// Active quick filter id (at most one)
    pub quick_filter: Option<String>,
    /// Priority >= High attribute filter
    pub important_only: bool,
    /// used_in_template attribute filter
    pub template_only: bool,
}

impl FilterState {
    pub fn is_neutral(&self) -> bool {
        self.search.is_none()
            && self.quick_filter.is_none()
            && !self.important_only
            && !self.template_only
    }
}

/// Recursive tree pruning: a node survives when it matches the predicate or
/// when at least one descendant survives. The input forest is never mutated;
/// survivors are copied into a fresh arena with their pruned child lists.
pub fn prune_forest<F>(forest: &SymbolForest, predicate: F) -> SymbolForest
where
    F: Fn(&SymbolNode) -> bool,
{
    let mut pruned = SymbolForest::new(forest.document.clone());
    for &root in forest.roots() {
        prune_node(forest, root, &predicate, None, &mut pruned);
    }
    pruned
}

fn prune_node<F>(
    forest: &SymbolForest,
    id: SymbolId,
    predicate: &F,
    parent: Option<SymbolId>,
    pruned: &mut SymbolForest,
) -> bool
where
    F: Fn(&SymbolNode) -> bool,
{
    let Some(node) = forest.get(id) else {
        return false;
    };

    let self_matches = predicate(node);
    let children = node.children.clone();

    // Copy the node optimistically; discard it when neither the node nor any
    // descendant survives. Ids are arena-local, so the copy starts clean.
    let mut copy = node.clone();
    copy.children = Vec::new();
    let new_id = pruned.push(copy, parent);

    let mut kept_child = false;
    for child in children {
        kept_child |= prune_node(forest, child, predicate, Some(new_id), pruned);
    }

    if self_matches || kept_child {
        true
    } else {
        pruned.pop_leaf(new_id);
        false
    }
}

/// Case-insensitive substring search over name, kind, category, tags, and
/// signature
pub fn search_predicate(query: &str) -> impl Fn(&SymbolNode) -> bool {
    let needle = query.to_lowercase();
    move |symbol: &SymbolNode| {
        if needle.is_empty() {
            return true;
        }
        symbol.name.to_lowercase().contains(&needle)
            || format!("{:?}", symbol.frontend_kind).to_lowercase().contains(&needle)
            || symbol.category.display_name().contains(&needle)
            || symbol.tags.iter().any(|tag| tag.to_lowercase().contains(&needle))
            || symbol.signature.to_lowercase().contains(&needle)
    }
}

/// Apply the composable filter pipeline: search → quick filter. Attribute
/// filters (priority, template usage) are flat filters handled by the caller
/// on the top-level list before grouping.
pub fn apply_tree_filters(
    forest: &SymbolForest,
    state: &FilterState,
    catalog: &[QuickFilter],
) -> SymbolForest {
    let mut current = forest.clone();

    if let Some(query) = state.search.as_deref() {
        if !query.is_empty() {
            current = prune_forest(&current, search_predicate(query));
        }
    }

    if let Some(active) = state.quick_filter.as_deref() {
        if let Some(filter) = catalog.iter().find(|f| f.id == active) {
            let rule = filter.rule;
            current = prune_forest(&current, move |symbol| rule.matches(symbol));
        }
    }

    current
}
