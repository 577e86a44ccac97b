use serde::{Deserialize, Serialize};

use super::framework::Framework;
use super::symbol::{Category, FrontendKind, SymbolForest, SymbolId, SymbolNode};

/// Matching rule of a group, evaluated by [`GroupRule::matches`].
///
/// Rules are data, not closures: the closed enum keeps the registry
/// serializable and free of captured state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GroupRule {
    /// Frontend kind is one of the listed kinds
    KindIn(Vec<FrontendKind>),
    /// Coarse category equals the given category
    CategoryIs(Category),
    /// Fallback bucket; matches any symbol
    CatchAll,
}

impl GroupRule {
    pub fn matches(&self, symbol: &SymbolNode) -> bool {
        match self {
            GroupRule::KindIn(kinds) => kinds.contains(&symbol.frontend_kind),
            GroupRule::CategoryIs(category) => symbol.category == *category,
            GroupRule::CatchAll => true,
        }
    }
}

/// In-bucket ordering; `Default` is priority desc, line asc, name lex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupOrdering {
    Default,
    ByName,
    BySourceLine,
    /// Vue lifecycle hooks in their documented firing sequence
    LifecycleSequence,
}

/// A named, orderable bucket definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub id: String,
    /// Display label (product localization is Chinese)
    pub name: String,
    pub icon: String,
    pub color: String,
    /// Higher priority groups are evaluated and listed first
    pub priority: u32,
    pub default_expanded: bool,
    pub rule: GroupRule,
    pub comparator: Option<GroupOrdering>,
}

impl GroupDefinition {
    fn new(
        id: &str,
        name: &str,
        icon: &str,
        color: &str,
        priority: u32,
        default_expanded: bool,
        rule: GroupRule,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            color: color.to_string(),
            priority,
            default_expanded,
            rule,
            comparator: None,
        }
    }

    fn with_comparator(mut self, ordering: GroupOrdering) -> Self {
        self.comparator = Some(ordering);
        self
    }
}

/// Ordered group registry for one framework, built once and never mutated
#[derive(Debug, Clone)]
pub struct GroupConfig {
    pub framework: Framework,
    groups: Vec<GroupDefinition>,
}

impl GroupConfig {
    /// Resolve the static config for a framework
    pub fn for_framework(framework: Framework) -> Self {
        let mut groups = match framework {
            Framework::Vue => vue_groups(),
            Framework::React => react_groups(),
            Framework::General => general_groups(),
        };
        // Evaluation and listing order is descending priority
        groups.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self { framework, groups }
    }

    pub fn groups(&self) -> &[GroupDefinition] {
        &self.groups
    }
}

fn vue_groups() -> Vec<GroupDefinition> {
    vec![
        GroupDefinition::new(
            "components",
            "组件",
            "symbol-class",
            "charts.purple",
            100,
            true,
            GroupRule::KindIn(vec![FrontendKind::VueComponent]),
        ),
        GroupDefinition::new(
            "composables",
            "组合式函数",
            "symbol-method",
            "charts.blue",
            90,
            true,
            GroupRule::KindIn(vec![FrontendKind::VueComposable]),
        ),
        GroupDefinition::new(
            "reactive",
            "响应式数据",
            "symbol-variable",
            "charts.green",
            80,
            true,
            GroupRule::KindIn(vec![FrontendKind::VueRef, FrontendKind::VueReactive]),
        ),
        GroupDefinition::new(
            "computed",
            "计算属性",
            "symbol-property",
            "charts.yellow",
            70,
            true,
            GroupRule::KindIn(vec![FrontendKind::VueComputed]),
        ),
        GroupDefinition::new(
            "watchers",
            "侦听器",
            "eye",
            "charts.orange",
            60,
            false,
            GroupRule::KindIn(vec![FrontendKind::VueWatch]),
        ),
        GroupDefinition::new(
            "lifecycle",
            "生命周期",
            "history",
            "charts.red",
            50,
            false,
            GroupRule::KindIn(vec![FrontendKind::VueLifecycle]),
        )
        .with_comparator(GroupOrdering::LifecycleSequence),
        GroupDefinition::new(
            "events",
            "事件处理",
            "zap",
            "charts.red",
            40,
            false,
            GroupRule::KindIn(vec![FrontendKind::EventHandler, FrontendKind::VueEmit]),
        ),
        GroupDefinition::new(
            "api",
            "接口请求",
            "cloud",
            "charts.blue",
            30,
            false,
            GroupRule::CategoryIs(Category::Api),
        ),
        GroupDefinition::new(
            "utility",
            "工具函数",
            "tools",
            "foreground",
            10,
            false,
            GroupRule::CatchAll,
        ),
    ]
}

fn react_groups() -> Vec<GroupDefinition> {
    vec![
        GroupDefinition::new(
            "components",
            "组件",
            "symbol-class",
            "charts.purple",
            100,
            true,
            GroupRule::KindIn(vec![FrontendKind::ReactComponent]),
        ),
        GroupDefinition::new(
            "hooks",
            "Hooks",
            "symbol-event",
            "charts.blue",
            90,
            true,
            GroupRule::KindIn(vec![FrontendKind::ReactHook]),
        ),
        GroupDefinition::new(
            "custom-hooks",
            "自定义 Hooks",
            "symbol-method",
            "charts.green",
            85,
            true,
            GroupRule::KindIn(vec![FrontendKind::ReactCustomHook]),
        ),
        GroupDefinition::new(
            "state",
            "状态管理",
            "database",
            "charts.yellow",
            80,
            true,
            GroupRule::KindIn(vec![
                FrontendKind::ReactState,
                FrontendKind::ReactReducer,
                FrontendKind::ReactContext,
                FrontendKind::ReactRef,
            ]),
        ),
        GroupDefinition::new(
            "effects",
            "副作用",
            "sync",
            "charts.orange",
            70,
            false,
            GroupRule::KindIn(vec![
                FrontendKind::ReactEffect,
                FrontendKind::ReactCallback,
                FrontendKind::ReactMemo,
            ]),
        ),
        GroupDefinition::new(
            "events",
            "事件处理",
            "zap",
            "charts.red",
            40,
            false,
            GroupRule::KindIn(vec![FrontendKind::EventHandler]),
        ),
        GroupDefinition::new(
            "api",
            "接口请求",
            "cloud",
            "charts.blue",
            30,
            false,
            GroupRule::CategoryIs(Category::Api),
        ),
        GroupDefinition::new(
            "utility",
            "工具函数",
            "tools",
            "foreground",
            10,
            false,
            GroupRule::CatchAll,
        ),
    ]
}

fn general_groups() -> Vec<GroupDefinition> {
    vec![
        GroupDefinition::new(
            "events",
            "事件处理",
            "zap",
            "charts.red",
            40,
            false,
            GroupRule::KindIn(vec![FrontendKind::EventHandler]),
        ),
        GroupDefinition::new(
            "api",
            "接口请求",
            "cloud",
            "charts.blue",
            30,
            false,
            GroupRule::CategoryIs(Category::Api),
        ),
        GroupDefinition::new(
            "async",
            "异步函数",
            "clock",
            "charts.yellow",
            20,
            false,
            GroupRule::KindIn(vec![FrontendKind::AsyncFunction]),
        ),
        GroupDefinition::new(
            "utility",
            "工具函数",
            "tools",
            "foreground",
            10,
            false,
            GroupRule::CatchAll,
        ),
    ]
}

/// A non-empty bucket of the grouped output
#[derive(Debug, Clone)]
pub struct GroupBucket {
    pub definition: GroupDefinition,
    pub symbols: Vec<SymbolId>,
}

/// Partitions a flat symbol list into the framework's named buckets.
///
/// Assignment is single-assignment: groups are evaluated in descending
/// priority order and the first matching rule wins, so a symbol never
/// appears in two buckets.
pub struct GroupEngine {
    config: GroupConfig,
}

impl GroupEngine {
    pub fn new(framework: Framework) -> Self {
        Self {
            config: GroupConfig::for_framework(framework),
        }
    }

    pub fn config(&self) -> &GroupConfig {
        &self.config
    }

    /// Group the given top-level symbols; children are not regrouped
    pub fn group(&self, forest: &SymbolForest, symbols: &[SymbolId]) -> Vec<GroupBucket> {
        let groups = self.config.groups();
        let mut buckets: Vec<Vec<SymbolId>> = vec![Vec::new(); groups.len()];

        for &id in symbols {
            let Some(symbol) = forest.get(id) else {
                continue;
            };
            if let Some(slot) = groups.iter().position(|g| g.rule.matches(symbol)) {
                buckets[slot].push(id);
            }
            // No match and no catch-all group: the symbol is dropped from
            // the grouped output (it remains in the enriched forest)
        }

        groups
            .iter()
            .zip(buckets)
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(definition, mut ids)| {
                sort_bucket(forest, &mut ids, definition.comparator.unwrap_or(GroupOrdering::Default));
                GroupBucket {
                    definition: definition.clone(),
                    symbols: ids,
                }
            })
            .collect()
    }
}

fn sort_bucket(forest: &SymbolForest, ids: &mut [SymbolId], ordering: GroupOrdering) {
    ids.sort_by(|a, b| {
        let (sa, sb) = match (forest.get(*a), forest.get(*b)) {
            (Some(sa), Some(sb)) => (sa, sb),
            _ => return std::cmp::Ordering::Equal,
        };
        match ordering {
            GroupOrdering::Default => sb
                .priority
                .cmp(&sa.priority)
                .then_with(|| sa.range.start.line.cmp(&sb.range.start.line))
                .then_with(|| sa.name.cmp(&sb.name)),
            GroupOrdering::ByName => sa.name.cmp(&sb.name),
            GroupOrdering::BySourceLine => sa.range.start.line.cmp(&sb.range.start.line),
            GroupOrdering::LifecycleSequence => lifecycle_rank(&sa.name)
                .cmp(&lifecycle_rank(&sb.name))
                .then_with(|| sa.range.start.line.cmp(&sb.range.start.line)),
        }
    });
}

fn lifecycle_rank(name: &str) -> usize {
    const SEQUENCE: [&str; 6] = [
        "onBeforeMount",
        "onMounted",
        "onBeforeUpdate",
        "onUpdated",
        "onBeforeUnmount",
        "onUnmounted",
    ];
    SEQUENCE
        .iter()
        .position(|hook| *hook == name)
        .unwrap_or(SEQUENCE.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::SymbolClassifier;
    use crate::core::outline::{Document, OutlineKind, OutlineNode, Position, SourceRange};

    fn classified(framework: Framework, text: &str, names: &[(&str, OutlineKind, usize)]) -> SymbolForest {
        let outline: Vec<OutlineNode> = names
            .iter()
            .map(|(name, kind, line)| {
                OutlineNode::new(
                    *name,
                    *kind,
                    SourceRange::new(Position::new(*line, 0), Position::new(*line, 0)),
                )
            })
            .collect();
        SymbolClassifier::new(framework, text).classify_forest(&outline, &Document::new("test", text))
    }

    #[test]
    fn configured_group_counts() {
        assert_eq!(GroupConfig::for_framework(Framework::Vue).groups().len(), 9);
        assert_eq!(GroupConfig::for_framework(Framework::React).groups().len(), 8);
        assert_eq!(GroupConfig::for_framework(Framework::General).groups().len(), 4);
    }

    #[test]
    fn vue_scenario_groups_are_disjoint_and_named() {
        let text = "const count = ref(0)\nfunction onClick() {}\n";
        let forest = classified(
            Framework::Vue,
            text,
            &[("count", OutlineKind::Variable, 0), ("onClick", OutlineKind::Function, 1)],
        );

        let engine = GroupEngine::new(Framework::Vue);
        let buckets = engine.group(&forest, forest.roots());

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].definition.name, "响应式数据");
        assert_eq!(buckets[1].definition.name, "事件处理");
        assert_eq!(buckets[0].symbols.len(), 1);
        assert_eq!(buckets[1].symbols.len(), 1);
        assert_ne!(buckets[0].symbols[0], buckets[1].symbols[0]);
    }

    #[test]
    fn every_symbol_lands_in_exactly_one_bucket() {
        let text = "const count = ref(0)\nconst total = computed(() => count.value)\nfunction onClick() {}\nasync function fetchUser() {}\nfunction misc() {}\n";
        let forest = classified(
            Framework::Vue,
            text,
            &[
                ("count", OutlineKind::Variable, 0),
                ("total", OutlineKind::Variable, 1),
                ("onClick", OutlineKind::Function, 2),
                ("fetchUser", OutlineKind::Function, 3),
                ("misc", OutlineKind::Function, 4),
            ],
        );

        let engine = GroupEngine::new(Framework::Vue);
        let buckets = engine.group(&forest, forest.roots());

        let mut seen: Vec<SymbolId> = buckets.iter().flat_map(|b| b.symbols.clone()).collect();
        let total: usize = seen.len();
        seen.sort_by_key(|id| id.0);
        seen.dedup();
        assert_eq!(seen.len(), total, "a symbol appeared in two groups");
        assert_eq!(total, forest.roots().len(), "a symbol was lost despite the catch-all");
    }

    #[test]
    fn grouping_is_order_independent() {
        let text = "const a = ref(0)\nconst b = ref(1)\nfunction onClick() {}\n";
        let declared = [
            ("a", OutlineKind::Variable, 0usize),
            ("b", OutlineKind::Variable, 1),
            ("onClick", OutlineKind::Function, 2),
        ];
        let mut reversed = declared;
        reversed.reverse();

        let engine = GroupEngine::new(Framework::Vue);
        let snapshot = |order: &[(&str, OutlineKind, usize)]| {
            let forest = classified(Framework::Vue, text, order);
            engine
                .group(&forest, forest.roots())
                .into_iter()
                .map(|b| {
                    let mut names: Vec<String> = b
                        .symbols
                        .iter()
                        .map(|id| forest.get(*id).unwrap().name.clone())
                        .collect();
                    names.sort();
                    (b.definition.id, names)
                })
                .collect::<Vec<_>>()
        };

        assert_eq!(snapshot(&declared), snapshot(&reversed));
    }

    #[test]
    fn lifecycle_bucket_uses_hook_sequence() {
        let text = "onUnmounted(() => {})\nonMounted(() => {})\nonBeforeMount(() => {})\n";
        let forest = classified(
            Framework::Vue,
            text,
            &[
                ("onUnmounted", OutlineKind::Function, 0),
                ("onMounted", OutlineKind::Function, 1),
                ("onBeforeMount", OutlineKind::Function, 2),
            ],
        );

        let engine = GroupEngine::new(Framework::Vue);
        let buckets = engine.group(&forest, forest.roots());
        let lifecycle = buckets
            .iter()
            .find(|b| b.definition.id == "lifecycle")
            .expect("lifecycle bucket");
        let names: Vec<&str> = lifecycle
            .symbols
            .iter()
            .map(|id| forest.get(*id).unwrap().name.as_str())
            .collect();
        assert_eq!(names, vec!["onBeforeMount", "onMounted", "onUnmounted"]);
    }

    #[test]
    fn empty_buckets_are_removed() {
        let text = "function onClick() {}\n";
        let forest = classified(Framework::General, text, &[("onClick", OutlineKind::Function, 0)]);
        let engine = GroupEngine::new(Framework::General);
        let buckets = engine.group(&forest, forest.roots());
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].definition.id, "events");
    }
}
