use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use std::sync::OnceLock;

use crate::gateway::GatewayError;

static INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// ONNX Runtime settings used when loading a churn model.
#[derive(Debug)]
pub struct RuntimeConfig {
    pub inter_threads: usize,
    pub intra_threads: usize,
    pub optimization_level: GraphOptimizationLevel,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            inter_threads: 0, // Let ONNX Runtime decide
            intra_threads: 0, // Let ONNX Runtime decide
            optimization_level: GraphOptimizationLevel::Level3,
        }
    }
}

impl Clone for RuntimeConfig {
    fn clone(&self) -> Self {
        Self {
            inter_threads: self.inter_threads,
            intra_threads: self.intra_threads,
            optimization_level: self.optimization_level(),
        }
    }
}

impl RuntimeConfig {
    /// Single-record models gain little from parallelism; this caps both pools.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.inter_threads = threads;
        self.intra_threads = threads;
        self
    }

    // GraphOptimizationLevel is neither Copy nor Clone.
    fn optimization_level(&self) -> GraphOptimizationLevel {
        match self.optimization_level {
            GraphOptimizationLevel::Level1 => GraphOptimizationLevel::Level1,
            GraphOptimizationLevel::Level2 => GraphOptimizationLevel::Level2,
            GraphOptimizationLevel::Level3 => GraphOptimizationLevel::Level3,
            GraphOptimizationLevel::Disable => GraphOptimizationLevel::Disable,
        }
    }
}

fn init_onnx_environment() -> ort::Result<()> {
    ort::init()
        .with_name("churnscope")
        .commit()?;
    Ok(())
}

/// Initialises the ONNX Runtime environment once per process.
///
/// A failed initialisation is remembered and reported on every later call.
pub fn ensure_initialized() -> Result<(), GatewayError> {
    INIT.get_or_init(|| init_onnx_environment().map_err(|e| e.to_string()))
        .clone()
        .map_err(|e| GatewayError::ModelUnavailable(format!("ONNX Runtime failed to initialise: {}", e)))
}

pub fn create_session_builder(config: &RuntimeConfig) -> Result<SessionBuilder, GatewayError> {
    ensure_initialized()?;
    let mut builder = Session::builder()?;

    // Configure threading
    if config.inter_threads > 0 {
        builder = builder.with_inter_threads(config.inter_threads)?;
    }
    if config.intra_threads > 0 {
        builder = builder.with_intra_threads(config.intra_threads)?;
    }

    builder = builder.with_optimization_level(config.optimization_level())?;

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_initialization() {
        assert!(ensure_initialized().is_ok());
        assert!(ensure_initialized().is_ok()); // Second call should be fine
    }

    #[test]
    fn test_session_builder_config() {
        let config = RuntimeConfig {
            inter_threads: 2,
            intra_threads: 2,
            optimization_level: GraphOptimizationLevel::Level1,
        };
        let builder = create_session_builder(&config);
        assert!(builder.is_ok());
    }

    #[test]
    fn test_clone_and_threads() {
        let config = RuntimeConfig::default().with_threads(1);
        let cloned = config.clone();
        assert_eq!(cloned.inter_threads, 1);
        assert_eq!(cloned.intra_threads, 1);
        assert!(matches!(cloned.optimization_level, GraphOptimizationLevel::Level3));
    }
}
