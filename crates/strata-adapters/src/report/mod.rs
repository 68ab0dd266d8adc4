//! Text renderings of a [`ResolutionResult`](strata_core::domain::ResolutionResult).
//!
//! Everything here works from the result alone (its edge list, versions and
//! issue lists), so no second resolution pass is needed to draw it.

mod dot;
mod tree;

pub use dot::render_dot;
pub use tree::DependencyTree;
