//! Trained models in the model catalog.

mod graph_sage;
mod handle;


pub use graph_sage::{GraphSageModel, GraphSageRunner};
pub(crate) use handle::catalog_namespace;
pub use handle::{Model, ModelProcRunner};
