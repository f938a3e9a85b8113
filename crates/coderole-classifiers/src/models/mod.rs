pub mod classifier;
pub mod classifier_trait;
pub mod decision_tree;
pub mod factory;
pub mod neural_network;
pub mod random_forest;
pub mod svm;

pub use classifier::Classifier;
pub use classifier_trait::ClassifierModel;
pub use factory::{build_model, Backend};
