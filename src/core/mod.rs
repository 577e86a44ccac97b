mod classifier;
mod context;
mod display;
mod engine;
mod filter;
mod framework;
mod grouping;
mod outline;
mod stats;
mod symbol;

// Bundled outline providers
mod providers;

pub use classifier::SymbolClassifier;
pub use context::{ContextAnalyzer, SymbolContext};
pub use display::{GroupHeader, NavigationTarget, SymbolDisplay, SymbolPresenter};
pub use engine::{GroupedView, OutlineEngine};
pub use filter::{
    apply_tree_filters, prune_forest, quick_filter_catalog, search_predicate, FilterRule,
    FilterState, QuickFilter,
};
pub use framework::{Framework, FrameworkDetector};
pub use grouping::{GroupBucket, GroupConfig, GroupDefinition, GroupEngine, GroupOrdering, GroupRule};
pub use outline::{Document, OutlineKind, OutlineNode, OutlineProvider, Position, SourceRange};
pub use providers::TreeSitterProvider;
pub use stats::SymbolStats;
pub use symbol::{
    stable_symbol_id, Category, FrameworkInfo, FrontendKind, Priority, ReactInfo, SymbolForest,
    SymbolId, SymbolNode, VueInfo,
};
