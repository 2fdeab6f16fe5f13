pub mod nav;
pub mod orchestrator;
pub mod snapshot;
pub mod web;

pub use nav::{ExpandState, NavItem, NavigationTraverser};
pub use orchestrator::{CrawlOrchestrator, Schedule};
pub use snapshot::SnapshotItem;
pub use web::WebSession;
