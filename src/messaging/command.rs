// Command types - Communication UI -> scheduler
// Drained by the clock owner before it advances, never applied directly by the UI

use crate::pattern::GaitKind;

/// Requests from the UI to the scheduler owner
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Rebuild the pattern; takes effect at the next cycle boundary
    SetParameters {
        kind: GaitKind,
        period: f64,
        asymmetry: f64,
    },
    Play,
    Stop,
}
