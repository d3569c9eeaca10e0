pub mod decision;
pub mod inference;
pub mod labels;
pub mod model_manager;
pub mod predictor;
