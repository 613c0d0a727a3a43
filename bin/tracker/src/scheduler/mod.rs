mod tracker_loop;

pub use tracker_loop::{CycleOutcome, TrackerLoop, TrackerLoopConfig, TrackerState};
