use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use symscope::config::Config;
use symscope::core::{
    Document, Framework, OutlineEngine, OutlineKind, OutlineNode, OutlineProvider, Position,
    SourceRange, TreeSitterProvider,
};
use symscope::error::Result;

/// Provider that serves a fixed outline and counts round trips
struct CountingProvider {
    calls: AtomicUsize,
    outline: Vec<OutlineNode>,
    delay: Duration,
}

impl CountingProvider {
    fn new(outline: Vec<OutlineNode>, delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            outline,
            delay,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OutlineProvider for CountingProvider {
    async fn outline(&self, _document: &Document) -> Result<Vec<OutlineNode>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.outline.clone())
    }

    fn file_extensions(&self) -> &[&str] {
        &["js"]
    }

    fn provider_name(&self) -> &str {
        "counting"
    }
}

fn single_line(line: usize) -> SourceRange {
    SourceRange::new(Position::new(line, 0), Position::new(line, 0))
}

fn tree_sitter_engine() -> OutlineEngine {
    OutlineEngine::with_provider(
        Config::default(),
        Arc::new(TreeSitterProvider::new().expect("provider")),
    )
}

#[tokio::test]
async fn vue_scenario_classifies_and_groups() {
    let engine = tree_sitter_engine();
    let text = "<script setup>\nconst count = ref(0)\nfunction onClick() {}\n</script>\n";
    engine.set_document(Document::new("Foo.vue", text));
    engine.refresh_now().await;

    assert_eq!(engine.current_framework(), Framework::Vue);

    let view = engine.grouped();
    let labels: Vec<&str> = view
        .buckets
        .iter()
        .map(|bucket| bucket.definition.name.as_str())
        .collect();
    assert_eq!(labels, vec!["响应式数据", "事件处理"]);

    let reactive = &view.buckets[0];
    let events = &view.buckets[1];
    assert_eq!(reactive.symbols.len(), 1);
    assert_eq!(events.symbols.len(), 1);
    assert_eq!(view.forest.get(reactive.symbols[0]).unwrap().name, "count");
    assert_eq!(view.forest.get(events.symbols[0]).unwrap().name, "onClick");
}

#[tokio::test]
async fn empty_document_reports_empty_state() {
    let engine = tree_sitter_engine();
    engine.set_document(Document::new("Empty.vue", "<template><div /></template>\n"));
    engine.refresh_now().await;

    let stats = engine.symbol_stats();
    assert_eq!(stats.total, 0);
    assert!(stats.by_category.is_empty());
    assert!(stats.by_priority.is_empty());
    assert_eq!(stats.framework, Framework::General);

    assert!(engine.grouped().buckets.is_empty());
}

#[tokio::test]
async fn search_narrows_to_matching_symbols() {
    let engine = tree_sitter_engine();
    let text = "async function fetchUser() {}\nfunction helperFn() {}\n";
    engine.set_document(Document::new("api.js", text));
    engine.refresh_now().await;

    engine.search("api");
    let view = engine.grouped();
    let names: Vec<String> = view
        .buckets
        .iter()
        .flat_map(|bucket| &bucket.symbols)
        .filter_map(|id| view.forest.get(*id).map(|s| s.name.clone()))
        .collect();
    assert_eq!(names, vec!["fetchUser".to_string()]);

    engine.clear_search();
    let total: usize = engine.grouped().buckets.iter().map(|b| b.symbols.len()).sum();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn quick_filter_toggles_back_to_unfiltered() {
    let engine = tree_sitter_engine();
    let text = "async function fetchUser() {}\nfunction onClick() {}\n";
    engine.set_document(Document::new("api.js", text));
    engine.refresh_now().await;

    let symbol_names = |engine: &OutlineEngine| {
        let view = engine.grouped();
        let mut names: Vec<String> = view
            .buckets
            .iter()
            .flat_map(|bucket| &bucket.symbols)
            .filter_map(|id| view.forest.get(*id).map(|s| s.name.clone()))
            .collect();
        names.sort();
        names
    };

    let unfiltered = symbol_names(&engine);
    assert_eq!(unfiltered.len(), 2);

    engine.apply_quick_filter("async");
    assert_eq!(symbol_names(&engine), vec!["fetchUser".to_string()]);

    // Passing the active id clears the filter
    engine.apply_quick_filter("async");
    assert_eq!(symbol_names(&engine), unfiltered);
}

#[tokio::test]
async fn important_filter_drops_low_priority_symbols() {
    let engine = tree_sitter_engine();
    let text = "<script setup>\nconst count = ref(0)\nfunction useCounter() {}\n</script>\n";
    engine.set_document(Document::new("Counter.vue", text));
    engine.refresh_now().await;

    engine.toggle_important_filter();
    let view = engine.grouped();
    let names: Vec<String> = view
        .buckets
        .iter()
        .flat_map(|bucket| &bucket.symbols)
        .filter_map(|id| view.forest.get(*id).map(|s| s.name.clone()))
        .collect();
    // useCounter is a composable (high); count is a ref (low)
    assert_eq!(names, vec!["useCounter".to_string()]);

    engine.toggle_important_filter();
    let total: usize = engine.grouped().buckets.iter().map(|b| b.symbols.len()).sum();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn rapid_triggers_coalesce_into_one_refresh() {
    let provider = Arc::new(CountingProvider::new(
        vec![OutlineNode::new("onClick", OutlineKind::Function, single_line(0))],
        Duration::ZERO,
    ));
    let mut config = Config::default();
    config.engine.debounce_ms = 50;
    let engine = OutlineEngine::with_provider(config, provider.clone());
    engine.set_document(Document::new("app.js", "function onClick() {}\n"));

    for _ in 0..5 {
        engine.refresh();
    }
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(provider.calls(), 1);
    assert_eq!(engine.symbol_stats().total, 1);
}

#[tokio::test]
async fn triggers_during_running_computation_are_dropped() {
    let provider = Arc::new(CountingProvider::new(
        vec![OutlineNode::new("onClick", OutlineKind::Function, single_line(0))],
        Duration::from_millis(200),
    ));
    let mut config = Config::default();
    config.engine.debounce_ms = 10;
    let engine = OutlineEngine::with_provider(config, provider.clone());
    engine.set_document(Document::new("app.js", "function onClick() {}\n"));

    engine.refresh();
    // Let the debounce elapse so the computation is in flight
    tokio::time::sleep(Duration::from_millis(100)).await;
    engine.refresh();
    engine.refresh();
    tokio::time::sleep(Duration::from_millis(400)).await;

    // The in-flight run completed; the triggers during it were dropped
    assert_eq!(provider.calls(), 1);

    // A later trigger works again
    engine.refresh_now().await;
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn provider_failure_degrades_to_empty_state() {
    struct FailingProvider;

    #[async_trait]
    impl OutlineProvider for FailingProvider {
        async fn outline(&self, _document: &Document) -> Result<Vec<OutlineNode>> {
            Err(symscope::error::SymscopeError::Provider("boom".to_string()))
        }

        fn file_extensions(&self) -> &[&str] {
            &["js"]
        }

        fn provider_name(&self) -> &str {
            "failing"
        }
    }

    let engine = OutlineEngine::with_provider(Config::default(), Arc::new(FailingProvider));
    engine.set_document(Document::new("app.js", "function onClick() {}\n"));
    engine.refresh_now().await;

    assert_eq!(engine.symbol_stats().total, 0);
    assert_eq!(engine.current_framework(), Framework::General);
    assert!(engine.grouped().buckets.is_empty());
}

#[tokio::test]
async fn stale_state_is_replaced_on_refresh() {
    let engine = tree_sitter_engine();
    engine.set_document(Document::new(
        "Foo.vue",
        "<script setup>\nconst count = ref(0)\n</script>\n",
    ));
    engine.refresh_now().await;
    assert_eq!(engine.symbol_stats().total, 1);

    // Replacing the document keeps the old view until the next refresh
    engine.set_document(Document::new("app.jsx", "function App() { return (<div />) }\n"));
    assert_eq!(engine.current_framework(), Framework::Vue);

    engine.refresh_now().await;
    assert_eq!(engine.current_framework(), Framework::React);
}
