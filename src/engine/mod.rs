pub mod estimator;
pub mod matcher;
pub mod orchestrator;
pub mod planner;
pub mod scorer;
