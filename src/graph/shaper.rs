use crate::curve::TransferCurve;
use crate::graph::node::{GraphNode, RenderCtx};

/*
Waveshaper Node
===============

Reads each sample through a pre-computed transfer table. The table is built
on the control thread whenever drive, model or input mode change, then
swapped in whole. The realtime side never computes the curve, and the old
table is handed back to the caller so it can be freed elsewhere.

  control thread                  realtime thread
  ──────────────                  ───────────────
  TransferCurve::build ──ring──▶  swap_curve ──▶ old table
                                                   │
  drop(old) ◀──────────ring────────────────────────┘
*/

pub struct ShaperNode {
    curve: Box<TransferCurve>,
}

impl ShaperNode {
    pub fn new(curve: Box<TransferCurve>) -> Self {
        Self { curve }
    }

    /// Install `next` and return the table it replaces.
    pub fn swap_curve(&mut self, next: Box<TransferCurve>) -> Box<TransferCurve> {
        std::mem::replace(&mut self.curve, next)
    }

    pub fn curve(&self) -> &TransferCurve {
        &self.curve
    }
}

impl GraphNode for ShaperNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            *sample = self.curve.lookup(*sample);
        }
    }
}
