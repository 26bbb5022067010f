//! Developer-facing instrumentation, kept deliberately separate from the
//! user-facing `Report`/`ReportManager` diagnostics the analyzer produces.
//!
//! Mirrors `ouros::tracer::VmTracer`: a trait with no-op default methods so
//! [`NoopTracer`] costs nothing once monomorphized, plus a couple of
//! concrete implementations for debugging and profiling. Stages call into
//! whichever tracer they were handed at stage-entry/exit and at CFG
//! construction boundaries.

use std::collections::HashMap;

/// One instrumentation event. [`RecordingTracer`] keeps a log of these for
/// post-mortem inspection; other tracers consume events without storing them.
#[derive(Debug, Clone)]
pub enum TraceEvent {
    /// A semantic-analysis stage started for one module.
    StageEntered { stage: &'static str, module: String },
    /// A semantic-analysis stage finished for one module.
    StageExited { stage: &'static str, module: String },
    /// A generic or function specialization was created (not reused from the
    /// memo table).
    Specialized { def_name: String },
    /// A CFG was constructed for a function and renumbered into reverse
    /// post-order.
    CfgBuilt { function: String, block_count: usize },
}

/// Hook points an analysis/codegen pass can report progress through.
///
/// All methods default to doing nothing, so callers that don't care about
/// instrumentation pay no cost beyond a monomorphized empty call.
pub trait AnalysisTracer {
    #[inline(always)]
    fn on_stage_enter(&mut self, _stage: &'static str, _module: &str) {}

    #[inline(always)]
    fn on_stage_exit(&mut self, _stage: &'static str, _module: &str) {}

    #[inline(always)]
    fn on_specialized(&mut self, _def_name: &str) {}

    #[inline(always)]
    fn on_cfg_built(&mut self, _function: &str, _block_count: usize) {}
}

/// Zero-cost default tracer used in production builds.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl AnalysisTracer for NoopTracer {}

/// Prints each event to stderr as it happens; used by `loom-cli -v`.
#[derive(Debug, Default)]
pub struct StderrTracer;

impl AnalysisTracer for StderrTracer {
    fn on_stage_enter(&mut self, stage: &'static str, module: &str) {
        eprintln!("[{stage}] entering {module}");
    }

    fn on_stage_exit(&mut self, stage: &'static str, module: &str) {
        eprintln!("[{stage}] leaving {module}");
    }

    fn on_specialized(&mut self, def_name: &str) {
        eprintln!("[specialize] {def_name}");
    }

    fn on_cfg_built(&mut self, function: &str, block_count: usize) {
        eprintln!("[cfg] {function}: {block_count} blocks");
    }
}

/// Records every event for later inspection (tests, offline profiling).
#[derive(Debug, Default)]
pub struct RecordingTracer {
    pub events: Vec<TraceEvent>,
}

impl AnalysisTracer for RecordingTracer {
    fn on_stage_enter(&mut self, stage: &'static str, module: &str) {
        self.events.push(TraceEvent::StageEntered {
            stage,
            module: module.to_owned(),
        });
    }

    fn on_stage_exit(&mut self, stage: &'static str, module: &str) {
        self.events.push(TraceEvent::StageExited {
            stage,
            module: module.to_owned(),
        });
    }

    fn on_specialized(&mut self, def_name: &str) {
        self.events.push(TraceEvent::Specialized {
            def_name: def_name.to_owned(),
        });
    }

    fn on_cfg_built(&mut self, function: &str, block_count: usize) {
        self.events.push(TraceEvent::CfgBuilt {
            function: function.to_owned(),
            block_count,
        });
    }
}

/// Counts how many times each stage was entered, per module. Used to verify
/// the "every stage is a barrier" ordering guarantee in tests.
#[derive(Debug, Default)]
pub struct ProfilingTracer {
    pub stage_entries: HashMap<&'static str, usize>,
}

impl AnalysisTracer for ProfilingTracer {
    fn on_stage_enter(&mut self, stage: &'static str, _module: &str) {
        *self.stage_entries.entry(stage).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_tracer_captures_events_in_order() {
        let mut tracer = RecordingTracer::default();
        tracer.on_stage_enter("NAME", "main");
        tracer.on_stage_exit("NAME", "main");
        assert_eq!(tracer.events.len(), 2);
    }

    #[test]
    fn profiling_tracer_counts_per_stage() {
        let mut tracer = ProfilingTracer::default();
        tracer.on_stage_enter("NAME", "a");
        tracer.on_stage_enter("NAME", "b");
        tracer.on_stage_enter("INTERFACE", "a");
        assert_eq!(tracer.stage_entries[&"NAME"], 2);
        assert_eq!(tracer.stage_entries[&"INTERFACE"], 1);
    }
}
