//! Sankey placement.
//!
//! [`layout`] is a pure function from a [`FlowGraph`] to positioned geometry
//! inside a `width x height` extent:
//!
//! 1. Columns: longest path from a source node, with sink nodes pushed to
//!    the last column (justified alignment).
//! 2. Node value: the larger of total inflow and total outflow.
//! 3. Vertical scale: the largest `ky` such that every column, including
//!    padding between nodes, fits in the height.
//! 4. Nodes stack top-down per column in index order; each column is
//!    centered vertically.
//! 5. Link width is `value * ky`. Outgoing links stack down the source node
//!    ordered by target position, incoming links stack down the target node
//!    ordered by source position.

use petgraph::algo::toposort;
use petgraph::graph::NodeIndex;
use petgraph::Direction;
use serde::Serialize;

use crate::error::ViewError;
use crate::graph::FlowGraph;

/// Geometry parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub width: f64,
    pub height: f64,
    pub node_width: f64,
    pub node_padding: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            width: 900.0,
            height: 560.0,
            node_width: 15.0,
            node_padding: 10.0,
        }
    }
}

/// A node with its rectangle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    pub index: usize,
    pub label: String,
    pub column: usize,
    pub value: f64,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl PositionedNode {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}

/// A link ribbon. `y0`/`y1` are the ribbon centerlines at the source and
/// target ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
    pub width: f64,
    pub y0: f64,
    pub y1: f64,
    pub category: String,
}

/// Positioned nodes (index order) and links (record order).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub nodes: Vec<PositionedNode>,
    pub links: Vec<PositionedLink>,
}

pub fn layout(graph: &FlowGraph, options: &LayoutOptions) -> Result<Layout, ViewError> {
    let g = graph.inner();

    for link in g.edge_weights() {
        if link.value.is_nan() || link.value < 0.0 {
            return Err(ViewError::NegativeValue {
                source_label: g[NodeIndex::new(link.source)].clone(),
                target_label: g[NodeIndex::new(link.target)].clone(),
                value: link.value,
            });
        }
    }

    let order = toposort(g, None).map_err(|cycle| ViewError::CircularLink {
        label: g[cycle.node_id()].clone(),
    })?;

    let n = g.node_count();
    let mut depth = vec![0usize; n];
    for &idx in &order {
        for next in g.neighbors_directed(idx, Direction::Outgoing) {
            depth[next.index()] = depth[next.index()].max(depth[idx.index()] + 1);
        }
    }
    let last_column = depth.iter().copied().max().unwrap_or(0);
    let column: Vec<usize> = g
        .node_indices()
        .map(|idx| {
            let is_sink = g
                .neighbors_directed(idx, Direction::Outgoing)
                .next()
                .is_none();
            if is_sink {
                last_column
            } else {
                depth[idx.index()]
            }
        })
        .collect();

    let mut inflow = vec![0.0f64; n];
    let mut outflow = vec![0.0f64; n];
    for link in g.edge_weights() {
        outflow[link.source] += link.value;
        inflow[link.target] += link.value;
    }
    let value: Vec<f64> = (0..n).map(|i| inflow[i].max(outflow[i])).collect();

    let mut columns: Vec<Vec<usize>> = vec![Vec::new(); last_column + 1];
    for (i, &c) in column.iter().enumerate() {
        columns[c].push(i);
    }

    let widest = columns.iter().map(Vec::len).max().unwrap_or(0);
    let padding = if widest > 1 {
        options
            .node_padding
            .min(options.height / (widest - 1) as f64)
    } else {
        options.node_padding
    };

    let ky = columns
        .iter()
        .filter_map(|nodes| {
            let total: f64 = nodes.iter().map(|&i| value[i]).sum();
            if total <= 0.0 {
                return None;
            }
            let room = options.height - (nodes.len().saturating_sub(1)) as f64 * padding;
            Some((room / total).max(0.0))
        })
        .fold(f64::INFINITY, f64::min);
    let ky = if ky.is_finite() { ky } else { 0.0 };

    let kx = if last_column > 0 {
        (options.width - options.node_width) / last_column as f64
    } else {
        0.0
    };

    let mut nodes: Vec<PositionedNode> = g
        .node_indices()
        .map(|idx| {
            let i = idx.index();
            let x0 = column[i] as f64 * kx;
            PositionedNode {
                index: i,
                label: g[idx].clone(),
                column: column[i],
                value: value[i],
                x0,
                x1: x0 + options.node_width,
                y0: 0.0,
                y1: 0.0,
            }
        })
        .collect();

    for members in &columns {
        let used: f64 = members.iter().map(|&i| value[i] * ky).sum::<f64>()
            + members.len().saturating_sub(1) as f64 * padding;
        let mut y = ((options.height - used) / 2.0).max(0.0);
        for &i in members {
            let node = &mut nodes[i];
            node.y0 = y;
            node.y1 = y + value[i] * ky;
            y = node.y1 + padding;
        }
    }

    let mut links: Vec<PositionedLink> = g
        .edge_weights()
        .map(|link| PositionedLink {
            source: link.source,
            target: link.target,
            value: link.value,
            width: link.value * ky,
            y0: 0.0,
            y1: 0.0,
            category: link.category.clone(),
        })
        .collect();

    let mut by_source: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut by_target: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (li, link) in links.iter().enumerate() {
        by_source[link.source].push(li);
        by_target[link.target].push(li);
    }

    for (node_index, outgoing) in by_source.iter_mut().enumerate() {
        outgoing.sort_by(|&a, &b| {
            let (ta, tb) = (&nodes[links[a].target], &nodes[links[b].target]);
            ta.y0.total_cmp(&tb.y0).then(ta.index.cmp(&tb.index))
        });
        let mut y = nodes[node_index].y0;
        for &li in outgoing.iter() {
            links[li].y0 = y + links[li].width / 2.0;
            y += links[li].width;
        }
    }

    for (node_index, incoming) in by_target.iter_mut().enumerate() {
        incoming.sort_by(|&a, &b| {
            let (sa, sb) = (&nodes[links[a].source], &nodes[links[b].source]);
            sa.y0.total_cmp(&sb.y0).then(sa.index.cmp(&sb.index))
        });
        let mut y = nodes[node_index].y0;
        for &li in incoming.iter() {
            links[li].y1 = y + links[li].width / 2.0;
            y += links[li].width;
        }
    }

    Ok(Layout { nodes, links })
}
