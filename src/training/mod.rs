//! Model training module
//!
//! The regression model behind every run: bagged regression trees with a
//! seeded bootstrap, so one seed always produces the same forest.

pub mod decision_tree;
pub mod random_forest;

pub use decision_tree::{DecisionTree, TreeNode};
pub use random_forest::{MaxFeatures, RandomForest};
