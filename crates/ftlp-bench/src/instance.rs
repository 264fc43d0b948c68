//! Synthetic subtree-selection instances.
//!
//! Nodes `1..nodes` each get a few candidate parents among earlier nodes;
//! every candidate edge is a binary column. A feasible selection picks at most
//! one in-edge per node, only uses an edge whose parent is itself reached (the
//! root is always reached) and selects at most `colour_cap` nodes of each
//! colour. The objective is a random weight per edge.

use ftlp::{ApiError, Handle, api};
use rand::Rng;

#[derive(Debug, Clone, Copy)]
pub struct ShapeParams {
    pub nodes: usize,
    pub parents_per_node: usize,
    pub colours: usize,
    pub colour_cap: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub parent: usize,
    pub child: usize,
}

/// Graph structure shared by every instance of a run.
#[derive(Debug, Clone)]
pub struct TreeShape {
    pub edges: Vec<Edge>,
    /// Column indices of the edges entering each node.
    pub in_edges: Vec<Vec<i32>>,
    pub colours: Vec<usize>,
    pub num_colours: usize,
    pub colour_cap: f64,
}

impl TreeShape {
    pub fn generate(params: ShapeParams, rng: &mut impl Rng) -> Self {
        let nodes = params.nodes.max(2);
        let num_colours = params.colours.max(1);
        let mut edges = Vec::new();
        let mut in_edges = vec![Vec::new(); nodes];

        for child in 1..nodes {
            let wanted = params.parents_per_node.clamp(1, child);
            let mut parents: Vec<usize> = Vec::with_capacity(wanted);
            while parents.len() < wanted {
                let parent = rng.random_range(0..child);
                if !parents.contains(&parent) {
                    parents.push(parent);
                }
            }
            for parent in parents {
                in_edges[child].push(edges.len() as i32);
                edges.push(Edge { parent, child });
            }
        }

        let colours = (0..nodes)
            .map(|_| rng.random_range(0..num_colours))
            .collect();
        Self {
            edges,
            in_edges,
            colours,
            num_colours,
            colour_cap: params.colour_cap.max(1) as f64,
        }
    }

    pub fn num_columns(&self) -> usize {
        self.edges.len()
    }

    pub fn num_rows(&self) -> usize {
        let in_edge_rows = self.in_edges.iter().filter(|edges| !edges.is_empty()).count();
        in_edge_rows + self.requirement_rows() + self.num_colours
    }

    fn requirement_rows(&self) -> usize {
        self.edges.iter().filter(|edge| edge.parent != 0).count()
    }

    /// "Edge requires an in-edge of its parent" rows in compressed layout.
    fn requirement_batch(&self) -> RequirementBatch {
        let mut batch = RequirementBatch {
            row_starts: vec![0],
            ..RequirementBatch::default()
        };
        for (column, edge) in self.edges.iter().enumerate() {
            if edge.parent == 0 {
                continue;
            }
            batch.column_indices.push(column as i32);
            batch.coefficients.push(1.0);
            for &parent_edge in &self.in_edges[edge.parent] {
                batch.column_indices.push(parent_edge);
                batch.coefficients.push(-1.0);
            }
            batch.row_starts.push(batch.column_indices.len() as i32);
        }
        batch
    }

    fn colour_row(&self, colour: usize) -> Vec<f64> {
        let mut row = vec![0.0; self.num_columns()];
        for (node, edges) in self.in_edges.iter().enumerate() {
            if self.colours[node] == colour {
                for &edge in edges {
                    row[edge as usize] = 1.0;
                }
            }
        }
        row
    }
}

#[derive(Debug, Default)]
struct RequirementBatch {
    row_starts: Vec<i32>,
    column_indices: Vec<i32>,
    coefficients: Vec<f64>,
}

/// Build one instance through the handle API.
///
/// In-edge rows go through the row cache (they repeat across instances of one
/// shape), requirement rows are added as one batch and colour rows as dense
/// rows.
pub fn build_instance(
    shape: &TreeShape,
    weights: &[f64],
    time_limit: Option<f64>,
) -> Result<Handle, ApiError> {
    let num_columns = shape.num_columns();
    let handle = api::construct_model(num_columns as i32, shape.num_rows() as i32)?;
    if let Err(err) = populate(handle, shape, weights, time_limit) {
        api::dispose_model(handle)?;
        return Err(err);
    }
    Ok(handle)
}

fn populate(
    handle: Handle,
    shape: &TreeShape,
    weights: &[f64],
    time_limit: Option<f64>,
) -> Result<(), ApiError> {
    let num_columns = shape.num_columns();
    let infinity = api::get_infinity(handle)?;

    api::set_column_bounds(handle, &vec![0.0; num_columns], &vec![1.0; num_columns])?;
    api::set_column_integrality(handle, &vec![true; num_columns])?;
    api::set_objective(handle, weights)?;
    api::set_column_start(handle, &vec![0.0; num_columns])?;
    if let Some(seconds) = time_limit {
        api::set_time_limit(handle, seconds)?;
    }

    for edges in shape.in_edges.iter().filter(|edges| !edges.is_empty()) {
        let ones = vec![1.0; edges.len()];
        api::add_sparse_row_cached(handle, &ones, edges, -infinity, 1.0)?;
    }

    let batch = shape.requirement_batch();
    let row_count = batch.row_starts.len() - 1;
    api::add_sparse_rows(
        handle,
        row_count as i32,
        &batch.row_starts,
        &batch.column_indices,
        &batch.coefficients,
        &vec![-infinity; row_count],
        &vec![0.0; row_count],
    )?;

    for colour in 0..shape.num_colours {
        api::add_full_row(handle, &shape.colour_row(colour), -infinity, shape.colour_cap)?;
    }
    Ok(())
}

/// Random edge weights, mostly positive so the selection is nontrivial.
pub fn random_weights(num_columns: usize, rng: &mut impl Rng) -> Vec<f64> {
    (0..num_columns).map(|_| rng.random_range(-1.0..3.0)).collect()
}
