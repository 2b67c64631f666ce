//! Dependency graphs.
//!
//! [`Digraph`] is a small ordered adjacency map with the closure, cycle and
//! reduction operations the planner needs. [`DeploymentGraph`] builds the
//! deployment-level ordering graph from satisfied dependencies.

mod deps;
mod digraph;

pub use deps::DeploymentGraph;
pub use digraph::Digraph;
