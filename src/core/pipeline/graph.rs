//! Asset dependency graph and execution planning

use crate::core::assets::{Asset, AssetKey};
use crate::domain::{PipelineError, Result};
use std::collections::HashSet;

/// Registered assets, validated to form a DAG
pub struct AssetGraph {
    assets: Vec<Box<dyn Asset>>,
}

impl AssetGraph {
    /// Build a graph, rejecting duplicate keys, unknown dependencies and cycles
    pub fn new(assets: Vec<Box<dyn Asset>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for asset in &assets {
            if !seen.insert(asset.key()) {
                return Err(PipelineError::Configuration(format!(
                    "Asset '{}' is registered twice",
                    asset.key()
                )));
            }
        }

        for asset in &assets {
            if let Some(missing) = asset.deps().iter().find(|dep| !seen.contains(*dep)) {
                return Err(PipelineError::Configuration(format!(
                    "Asset '{}' depends on unknown asset '{missing}'",
                    asset.key()
                )));
            }
        }

        let graph = Self { assets };
        graph.topological_order()?;
        Ok(graph)
    }

    pub fn keys(&self) -> Vec<AssetKey> {
        self.assets.iter().map(|a| a.key()).collect()
    }

    /// Assets to run for `selection`, dependencies first
    ///
    /// An empty selection means every asset. Unselected upstream assets are
    /// not added to the plan.
    pub fn plan(&self, selection: &[AssetKey]) -> Result<Vec<&dyn Asset>> {
        for key in selection {
            if !self.assets.iter().any(|a| a.key() == *key) {
                return Err(PipelineError::Configuration(format!(
                    "Asset '{key}' is not registered"
                )));
            }
        }

        let order = self.topological_order()?;
        Ok(order
            .into_iter()
            .filter(|idx| selection.is_empty() || selection.contains(&self.assets[*idx].key()))
            .map(|idx| self.assets[idx].as_ref())
            .collect())
    }

    /// Indices in dependency order, ties broken by registration order
    fn topological_order(&self) -> Result<Vec<usize>> {
        let mut placed: HashSet<AssetKey> = HashSet::new();
        let mut order = Vec::with_capacity(self.assets.len());

        while order.len() < self.assets.len() {
            let next = self.assets.iter().enumerate().find(|(_, asset)| {
                !placed.contains(&asset.key()) && asset.deps().iter().all(|d| placed.contains(d))
            });

            match next {
                Some((idx, asset)) => {
                    placed.insert(asset.key());
                    order.push(idx);
                }
                None => {
                    let stuck: Vec<String> = self
                        .assets
                        .iter()
                        .filter(|a| !placed.contains(&a.key()))
                        .map(|a| a.key().to_string())
                        .collect();
                    return Err(PipelineError::Configuration(format!(
                        "Dependency cycle between assets: {}",
                        stuck.join(", ")
                    )));
                }
            }
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assets::{default_assets, Materialization};
    use crate::core::pipeline::RunContext;
    use async_trait::async_trait;

    struct Fake {
        key: AssetKey,
        deps: Vec<AssetKey>,
    }

    #[async_trait]
    impl Asset for Fake {
        fn key(&self) -> AssetKey {
            self.key
        }

        fn deps(&self) -> &[AssetKey] {
            &self.deps
        }

        async fn materialize(&self, _ctx: &RunContext) -> Result<Materialization> {
            Ok(Materialization::new("ok"))
        }
    }

    fn fake(key: AssetKey, deps: &[AssetKey]) -> Box<dyn Asset> {
        Box::new(Fake {
            key,
            deps: deps.to_vec(),
        })
    }

    fn plan_keys(graph: &AssetGraph, selection: &[AssetKey]) -> Vec<AssetKey> {
        graph
            .plan(selection)
            .unwrap()
            .iter()
            .map(|a| a.key())
            .collect()
    }

    #[test]
    fn test_default_plan_is_chain_order() {
        let graph = AssetGraph::new(default_assets()).unwrap();
        assert_eq!(plan_keys(&graph, &[]), AssetKey::ALL.to_vec());
    }

    #[test]
    fn test_plan_respects_dependencies_over_registration_order() {
        let graph = AssetGraph::new(vec![
            fake(AssetKey::CsvExport, &[AssetKey::OrdersExtractLoad]),
            fake(AssetKey::OrdersExtractLoad, &[AssetKey::DatabaseCheck]),
            fake(AssetKey::DatabaseCheck, &[]),
        ])
        .unwrap();

        assert_eq!(
            plan_keys(&graph, &[]),
            vec![
                AssetKey::DatabaseCheck,
                AssetKey::OrdersExtractLoad,
                AssetKey::CsvExport
            ]
        );
    }

    #[test]
    fn test_plan_selection_only() {
        let graph = AssetGraph::new(default_assets()).unwrap();
        assert_eq!(
            plan_keys(&graph, &[AssetKey::CsvExport, AssetKey::DatabaseCheck]),
            vec![AssetKey::DatabaseCheck, AssetKey::CsvExport]
        );
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let err = AssetGraph::new(vec![fake(AssetKey::CsvExport, &[AssetKey::OrdersExtractLoad])])
            .err()
            .unwrap();
        assert!(err.to_string().contains("unknown asset 'orders_extract_load'"));
    }

    #[test]
    fn test_cycle_rejected() {
        let err = AssetGraph::new(vec![
            fake(AssetKey::DatabaseCheck, &[AssetKey::ApiCheck]),
            fake(AssetKey::ApiCheck, &[AssetKey::DatabaseCheck]),
        ])
        .err()
        .unwrap();
        assert!(matches!(err, PipelineError::Configuration(_)));
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_duplicate_rejected() {
        assert!(AssetGraph::new(vec![
            fake(AssetKey::ApiCheck, &[]),
            fake(AssetKey::ApiCheck, &[]),
        ])
        .is_err());
    }

    #[test]
    fn test_unregistered_selection_rejected() {
        let graph = AssetGraph::new(vec![fake(AssetKey::ApiCheck, &[])]).unwrap();
        assert!(graph.plan(&[AssetKey::CsvExport]).is_err());
    }
}
