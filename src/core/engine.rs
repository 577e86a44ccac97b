// src/core/engine.rs
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;

use super::filter::{apply_tree_filters, quick_filter_catalog, FilterState, QuickFilter};
use super::framework::{Framework, FrameworkDetector};
use super::grouping::{GroupBucket, GroupEngine};
use super::outline::{Document, OutlineProvider};
use super::providers::TreeSitterProvider;
use super::stats::SymbolStats;
use super::symbol::{Priority, SymbolForest};
use super::classifier::SymbolClassifier;

/// Refresh state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshPhase {
    Idle,
    Scheduled,
    Running,
}

struct RefreshState {
    phase: RefreshPhase,
    /// Invalidates stale scheduled tasks after a re-trigger
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

struct EngineShared {
    document: Option<Document>,
    framework: Framework,
    forest: SymbolForest,
    filters: FilterState,
}

struct EngineInner {
    config: Config,
    provider: Arc<dyn OutlineProvider>,
    catalog: Vec<QuickFilter>,
    shared: Mutex<EngineShared>,
    refresh: Mutex<RefreshState>,
}

/// A presentation-ready grouped view of the current document
#[derive(Debug, Clone)]
pub struct GroupedView {
    pub framework: Framework,
    /// Filtered forest backing the bucket symbol ids
    pub forest: SymbolForest,
    pub buckets: Vec<GroupBucket>,
}

/// Main orchestration engine: owns the enriched-forest cache, drives the
/// refresh pipeline, and serves filterable grouped views.
///
/// The cache is replaced atomically after each refresh; readers always see
/// either the previous complete state or the new one, never a partial build.
/// Cloning the engine clones a cheap handle to the same state.
#[derive(Clone)]
pub struct OutlineEngine {
    inner: Arc<EngineInner>,
}

impl OutlineEngine {
    /// Create an engine with the bundled tree-sitter outline provider
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;
        debug!("Loaded configuration: {:?}", config);
        let provider = Arc::new(TreeSitterProvider::new()?);
        Ok(Self::with_provider(config, provider))
    }

    /// Create an engine with a custom outline provider
    pub fn with_provider(config: Config, provider: Arc<dyn OutlineProvider>) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                config,
                provider,
                catalog: quick_filter_catalog(),
                shared: Mutex::new(EngineShared {
                    document: None,
                    framework: Framework::General,
                    forest: SymbolForest::new(None),
                    filters: FilterState::default(),
                }),
                refresh: Mutex::new(RefreshState {
                    phase: RefreshPhase::Idle,
                    generation: 0,
                    handle: None,
                }),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Replace the active document. Derived state stays until the next
    /// refresh completes.
    pub fn set_document(&self, document: Document) {
        let mut shared = self.inner.shared.lock().unwrap();
        shared.document = Some(document);
    }

    pub fn clear_document(&self) {
        let mut shared = self.inner.shared.lock().unwrap();
        shared.document = None;
        shared.framework = Framework::General;
        shared.forest = SymbolForest::new(None);
    }

    /// Debounced refresh trigger.
    ///
    /// Rapid consecutive triggers coalesce: Idle/Scheduled re-arm the delay
    /// timer, a trigger during a running computation is dropped (the caller
    /// re-triggers after completion if needed). Completion — success or
    /// failure — always returns the machine to Idle.
    pub fn refresh(&self) {
        let mut state = self.inner.refresh.lock().unwrap();
        match state.phase {
            RefreshPhase::Running => {
                debug!("Refresh trigger dropped: computation in flight");
                return;
            }
            RefreshPhase::Idle | RefreshPhase::Scheduled => {
                if let Some(handle) = state.handle.take() {
                    handle.abort();
                }
            }
        }

        state.generation += 1;
        state.phase = RefreshPhase::Scheduled;
        let generation = state.generation;
        let delay = Duration::from_millis(self.inner.config.engine.debounce_ms);
        let inner = Arc::clone(&self.inner);

        state.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // Claim the run; a newer trigger invalidates this task
            {
                let mut state = inner.refresh.lock().unwrap();
                if state.generation != generation || state.phase != RefreshPhase::Scheduled {
                    return;
                }
                state.phase = RefreshPhase::Running;
            }

            EngineInner::run_pipeline(&inner).await;

            let mut state = inner.refresh.lock().unwrap();
            state.phase = RefreshPhase::Idle;
            state.handle = None;
        }));
    }

    /// Run the refresh pipeline immediately, bypassing the debounce delay.
    /// Honors the busy flag: a call during a running computation is dropped.
    pub async fn refresh_now(&self) {
        {
            let mut state = self.inner.refresh.lock().unwrap();
            if state.phase == RefreshPhase::Running {
                debug!("Immediate refresh dropped: computation in flight");
                return;
            }
            if let Some(handle) = state.handle.take() {
                handle.abort();
            }
            state.generation += 1;
            state.phase = RefreshPhase::Running;
        }

        EngineInner::run_pipeline(&self.inner).await;

        let mut state = self.inner.refresh.lock().unwrap();
        state.phase = RefreshPhase::Idle;
    }

    /// Set the free-text search query; empty clears it
    pub fn search(&self, query: &str) {
        let mut shared = self.inner.shared.lock().unwrap();
        shared.filters.search = (!query.is_empty()).then(|| query.to_string());
    }

    pub fn clear_search(&self) {
        self.inner.shared.lock().unwrap().filters.search = None;
    }

    /// Toggle a quick filter by id; applying the active id clears it and an
    /// unknown id is ignored with a warning
    pub fn apply_quick_filter(&self, id: &str) {
        if !self.inner.catalog.iter().any(|f| f.id == id) {
            warn!("Unknown quick filter: {}", id);
            return;
        }
        let mut shared = self.inner.shared.lock().unwrap();
        if shared.filters.quick_filter.as_deref() == Some(id) {
            shared.filters.quick_filter = None;
        } else {
            shared.filters.quick_filter = Some(id.to_string());
        }
    }

    pub fn toggle_important_filter(&self) {
        let mut shared = self.inner.shared.lock().unwrap();
        shared.filters.important_only = !shared.filters.important_only;
    }

    pub fn toggle_template_usage_filter(&self) {
        let mut shared = self.inner.shared.lock().unwrap();
        shared.filters.template_only = !shared.filters.template_only;
    }

    pub fn current_framework(&self) -> Framework {
        self.inner.shared.lock().unwrap().framework
    }

    pub fn quick_filters(&self) -> Vec<QuickFilter> {
        self.inner.catalog.clone()
    }

    /// Aggregate counts over the unfiltered enriched forest
    pub fn symbol_stats(&self) -> SymbolStats {
        let shared = self.inner.shared.lock().unwrap();
        if shared.forest.is_empty() {
            return SymbolStats::empty();
        }
        SymbolStats::from_forest(&shared.forest, shared.framework)
    }

    /// Compute the grouped view under the active filters.
    ///
    /// Filters compose sequentially and intersectively:
    /// search → quick filter → priority filter → template-usage filter.
    /// Filtering happens on read; the cached forest is never mutated.
    pub fn grouped(&self) -> GroupedView {
        let (framework, filtered, filters) = {
            let shared = self.inner.shared.lock().unwrap();
            let filtered = apply_tree_filters(&shared.forest, &shared.filters, &self.inner.catalog);
            (shared.framework, filtered, shared.filters.clone())
        };

        let mut top_level: Vec<_> = filtered.roots().to_vec();
        if filters.important_only {
            top_level.retain(|id| {
                filtered
                    .get(*id)
                    .is_some_and(|s| s.priority >= Priority::High)
            });
        }
        if filters.template_only {
            top_level.retain(|id| filtered.get(*id).is_some_and(|s| s.used_in_template));
        }

        let buckets = GroupEngine::new(framework).group(&filtered, &top_level);
        GroupedView {
            framework,
            forest: filtered,
            buckets,
        }
    }
}

impl EngineInner {
    /// The refresh pipeline: one provider round trip, then synchronous
    /// classification and an atomic state swap. Any failure degrades to the
    /// empty state — consumers never observe a partial build.
    async fn run_pipeline(inner: &Arc<EngineInner>) {
        let document = inner.shared.lock().unwrap().document.clone();
        let Some(document) = document else {
            debug!("No active document; clearing symbol state");
            Self::clear_derived(inner);
            return;
        };

        info!("🔍 Refreshing outline for {}", document.path.display());

        let outline = match inner.provider.outline(&document).await {
            Ok(outline) => outline,
            Err(e) => {
                warn!("Outline refresh failed: {}", e);
                Self::clear_derived(inner);
                return;
            }
        };

        if outline.is_empty() {
            debug!("Provider returned no symbols");
            Self::clear_derived(inner);
            return;
        }

        let framework = FrameworkDetector::new().detect(document.file_name(), &document.text);
        let classifier = SymbolClassifier::new(framework, &document.text);
        let forest = classifier.classify_forest(&outline, &document);

        info!(
            "📊 {} symbols classified ({} framework)",
            forest.len(),
            framework.display_name()
        );

        // Atomic swap: the previous forest stays readable until this point
        let mut shared = inner.shared.lock().unwrap();
        shared.framework = framework;
        shared.forest = forest;
    }

    fn clear_derived(inner: &Arc<EngineInner>) {
        let mut shared = inner.shared.lock().unwrap();
        shared.framework = Framework::General;
        shared.forest = SymbolForest::new(None);
    }
}
