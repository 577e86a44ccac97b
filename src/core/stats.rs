use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::framework::Framework;
use super::symbol::SymbolForest;

/// Aggregate counts over one document's enriched forest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolStats {
    pub total: usize,
    pub by_category: HashMap<String, usize>,
    pub by_priority: HashMap<String, usize>,
    pub framework: Framework,
}

impl SymbolStats {
    /// Stats for the empty state: zero symbols, no counts, General framework
    pub fn empty() -> Self {
        Self {
            total: 0,
            by_category: HashMap::new(),
            by_priority: HashMap::new(),
            framework: Framework::General,
        }
    }

    /// Count every node of the forest (roots and descendants alike)
    pub fn from_forest(forest: &SymbolForest, framework: Framework) -> Self {
        let mut by_category: HashMap<String, usize> = HashMap::new();
        let mut by_priority: HashMap<String, usize> = HashMap::new();

        for (_, symbol) in forest.iter() {
            *by_category
                .entry(symbol.category.display_name().to_string())
                .or_insert(0) += 1;
            *by_priority
                .entry(symbol.priority.display_name().to_string())
                .or_insert(0) += 1;
        }

        Self {
            total: forest.len(),
            by_category,
            by_priority,
            framework,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats_shape() {
        let stats = SymbolStats::empty();
        assert_eq!(stats.total, 0);
        assert!(stats.by_category.is_empty());
        assert!(stats.by_priority.is_empty());
        assert_eq!(stats.framework, Framework::General);
    }
}
