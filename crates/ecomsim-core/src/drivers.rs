//! How the inputs connect to the KPIs.
//!
//! The derivation formulas form a small directed acyclic graph: traffic and
//! conversion drive orders, orders and AOV drive revenue, and so on down to
//! gross profit and the ratios. [`DriverGraph`] holds that graph so callers
//! can ask which levers move a KPI and in which direction, and
//! [`DriverGraph::sensitivity`] measures how strongly each lever moves gross
//! profit for a concrete set of inputs.

use anyhow::{anyhow, Result};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

use crate::error::MetricsError;
use crate::metrics::{compute, BusinessInputs, MetricField};
use crate::units::Money;

/// Direction in which a driver moves the dependent value, all else equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Influence {
    Increases,
    Decreases,
}

impl std::fmt::Display for Influence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Influence::Increases => f.write_str("+"),
            Influence::Decreases => f.write_str("-"),
        }
    }
}

/// Effect on gross profit of raising one input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sensitivity {
    pub input: MetricField,
    pub baseline_value: f64,
    pub bumped_value: f64,
    pub gross_profit_delta: Money,
}

/// Dependency graph of inputs and derived KPIs.
#[derive(Debug, Clone)]
pub struct DriverGraph {
    graph: DiGraph<MetricField, Influence>,
    nodes: HashMap<MetricField, NodeIndex>,
}

const EDGES: &[(MetricField, MetricField, Influence)] = {
    use Influence::*;
    use MetricField::*;
    &[
        (Traffic, Orders, Increases),
        (ConversionRate, Orders, Increases),
        (Orders, Revenue, Increases),
        (AverageOrderValue, Revenue, Increases),
        (Revenue, ProductCost, Increases),
        (CogsRate, ProductCost, Increases),
        (Revenue, ReturnsLoss, Increases),
        (ReturnRate, ReturnsLoss, Increases),
        (Revenue, GrossProfit, Increases),
        (ProductCost, GrossProfit, Decreases),
        (AdSpend, GrossProfit, Decreases),
        (ReturnsLoss, GrossProfit, Decreases),
        (Revenue, ReturnOnAdSpend, Increases),
        (AdSpend, ReturnOnAdSpend, Decreases),
        (AdSpend, CustomerAcquisitionCost, Increases),
        (Orders, CustomerAcquisitionCost, Decreases),
        (GrossProfit, ProfitMarginPercent, Increases),
        (Revenue, ProfitMarginPercent, Decreases),
    ]
};

impl Default for DriverGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverGraph {
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();
        for field in MetricField::INPUTS.iter().chain(MetricField::DERIVED.iter()) {
            nodes.insert(*field, graph.add_node(*field));
        }
        for (from, to, influence) in EDGES {
            graph.add_edge(nodes[from], nodes[to], *influence);
        }
        Self { graph, nodes }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Immediate drivers of a field with the direction of each.
    pub fn direct_drivers(&self, field: MetricField) -> Vec<(MetricField, Influence)> {
        let mut drivers: Vec<_> = self
            .graph
            .edges_directed(self.nodes[&field], Direction::Incoming)
            .map(|edge| (self.graph[edge.source()], *edge.weight()))
            .collect();
        drivers.sort_by_key(|(driver, _)| *driver);
        drivers
    }

    /// Every field that influences `field`, directly or transitively.
    pub fn upstream(&self, field: MetricField) -> Vec<MetricField> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([self.nodes[&field]]);
        while let Some(node) = queue.pop_front() {
            for parent in self.graph.neighbors_directed(node, Direction::Incoming) {
                if seen.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }
        let mut fields: Vec<MetricField> = seen.into_iter().map(|n| self.graph[n]).collect();
        fields.sort();
        fields
    }

    /// The six inputs that ultimately drive `field`.
    pub fn root_inputs(&self, field: MetricField) -> Vec<MetricField> {
        self.upstream(field)
            .into_iter()
            .filter(MetricField::is_input)
            .collect()
    }

    /// Fields in an order where every driver precedes what it drives.
    pub fn evaluation_order(&self) -> Result<Vec<MetricField>> {
        let order = toposort(&self.graph, None).map_err(|cycle| {
            anyhow!(
                "driver graph has a cycle through {}",
                self.graph[cycle.node_id()]
            )
        })?;
        Ok(order.into_iter().map(|n| self.graph[n]).collect())
    }

    /// Change in gross profit when each input is raised by `step_percent`
    /// percent of its current value.
    ///
    /// Inputs whose raised value would leave the valid domain (a rate above
    /// 100%) are skipped. Zero-valued inputs stay at zero.
    pub fn sensitivity(
        &self,
        inputs: &BusinessInputs,
        step_percent: f64,
    ) -> Result<Vec<Sensitivity>, MetricsError> {
        let baseline = compute(inputs)?;
        let factor = 1.0 + step_percent / 100.0;
        let mut results = Vec::with_capacity(MetricField::INPUTS.len());
        for field in MetricField::INPUTS {
            let Some(current) = inputs.get(field) else {
                continue;
            };
            let bumped_inputs = inputs.with(field, current * factor);
            let bumped = match compute(&bumped_inputs) {
                Ok(metrics) => metrics,
                Err(MetricsError::InvalidInput { .. }) => {
                    debug!(%field, step_percent, "skipping sensitivity outside input domain");
                    continue;
                }
                Err(err) => return Err(err),
            };
            results.push(Sensitivity {
                input: field,
                baseline_value: current,
                bumped_value: bumped_inputs.get(field).unwrap_or(current),
                gross_profit_delta: bumped.gross_profit - baseline.gross_profit,
            });
        }
        Ok(results)
    }
}
