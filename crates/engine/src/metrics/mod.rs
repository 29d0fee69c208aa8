pub mod engine_metrics;
pub mod exposition;

pub use engine_metrics::EngineMetrics;
pub use exposition::render_prometheus;
