pub mod behavior;
pub mod category;
pub mod interactions;

pub use behavior::{BehaviorLog, BehaviorPattern, BehaviorStatistics};
pub use category::{CategoryStatistics, CategoryTree, ROOT_CATEGORY};
pub use interactions::{InteractionStatistics, InteractionTable};
