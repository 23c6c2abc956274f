//! Paper discovery: query planning, relevance judgement and the paginated
//! collection loop that combines them.

mod orchestrator;
mod planner;
mod relevance;

pub use orchestrator::PaperCollector;
pub use planner::{normalize_queries, plan_queries};
pub use relevance::{filter_relevant, is_relevant};
