pub mod query;
pub mod reconciler;
pub mod store;

pub use reconciler::SessionReconciler;
