/*
Graph Control Plumbing
======================

Parameter changes cross from the control thread to the audio callback
through one SPSC ring. Transfer tables are heap objects, so they also need a
way back: the callback never frees memory, it returns the table it replaced
through a second ring and the control side drops it.

  control thread                        audio callback
  ──────────────                        ──────────────
  GraphController ── GraphMessage ────▶ GraphInbox ─▶ SignalGraph
        ▲                                   │
        └──────── Box<TransferCurve> ◀──────┘

Updates are superseded, never queued: if the ring is full the controller
keeps only the newest targets and the newest table and retries on the next
flush. The controller also caps how many tables are in flight at the
garbage ring's capacity, so the callback's push of a replaced table always
has room.
*/

use rtrb::{Consumer, Producer, PushError, RingBuffer};
use tracing::trace;

use crate::curve::{CurveKey, TransferCurve};
use crate::graph::signal::SignalGraph;
use crate::graph::targets::StageTargets;
use crate::params::EffectSettings;

/// Slots in the control → audio ring.
pub const MESSAGE_CAPACITY: usize = 64;

/// Transfer tables that may be in flight at once.
pub const CURVE_CAPACITY: usize = 4;

pub enum GraphMessage {
    Targets(StageTargets),
    Curve(Box<TransferCurve>),
}

/// Control-side half. Owned by the engine.
pub struct GraphController {
    tx: Producer<GraphMessage>,
    garbage: Consumer<Box<TransferCurve>>,
    current_key: CurveKey,
    pending_targets: Option<StageTargets>,
    pending_curve: Option<Box<TransferCurve>>,
    outstanding_curves: usize,
    dropped_updates: u64,
}

/// Audio-side half. Lives inside the realtime processor.
pub struct GraphInbox {
    rx: Consumer<GraphMessage>,
    garbage: Producer<Box<TransferCurve>>,
}

/// Build both halves. `initial` is the key of the table the graph was
/// constructed with.
pub fn graph_channel(initial: CurveKey) -> (GraphController, GraphInbox) {
    let (tx, rx) = RingBuffer::new(MESSAGE_CAPACITY);
    let (garbage_tx, garbage_rx) = RingBuffer::new(CURVE_CAPACITY);
    (
        GraphController {
            tx,
            garbage: garbage_rx,
            current_key: initial,
            pending_targets: None,
            pending_curve: None,
            outstanding_curves: 0,
            dropped_updates: 0,
        },
        GraphInbox {
            rx,
            garbage: garbage_tx,
        },
    )
}

impl GraphController {
    /// Queue `settings` for the audio thread. Rebuilds the transfer table
    /// only when drive, model or input mode changed.
    pub fn apply(&mut self, settings: &EffectSettings) {
        let targets = StageTargets::from_settings(settings);

        if self.pending_targets.replace(targets).is_some() {
            self.dropped_updates += 1;
        }
        if targets.curve != self.current_key {
            self.current_key = targets.curve;
            let curve = Box::new(TransferCurve::build(&targets.curve));
            if self.pending_curve.replace(curve).is_some() {
                self.dropped_updates += 1;
            }
            trace!(?targets.curve, "transfer table rebuilt");
        }

        self.flush();
    }

    /// Free returned tables and push whatever is still pending.
    pub fn flush(&mut self) {
        self.collect_garbage();

        if let Some(targets) = self.pending_targets.take() {
            if let Err(PushError::Full(GraphMessage::Targets(targets))) =
                self.tx.push(GraphMessage::Targets(targets))
            {
                self.pending_targets = Some(targets);
            }
        }

        if self.outstanding_curves < CURVE_CAPACITY {
            if let Some(curve) = self.pending_curve.take() {
                match self.tx.push(GraphMessage::Curve(curve)) {
                    Ok(()) => self.outstanding_curves += 1,
                    Err(PushError::Full(GraphMessage::Curve(curve))) => {
                        self.pending_curve = Some(curve)
                    }
                    Err(PushError::Full(_)) => {}
                }
            }
        }
    }

    fn collect_garbage(&mut self) {
        while let Ok(curve) = self.garbage.pop() {
            drop(curve);
            self.outstanding_curves = self.outstanding_curves.saturating_sub(1);
        }
    }

    /// Updates superseded before the audio thread took them.
    pub fn dropped_updates(&self) -> u64 {
        self.dropped_updates
    }

    pub fn has_pending(&self) -> bool {
        self.pending_targets.is_some() || self.pending_curve.is_some()
    }
}

impl GraphInbox {
    /// Apply every queued message. Realtime safe.
    pub fn poll(&mut self, graph: &mut SignalGraph) {
        while let Ok(message) = self.rx.pop() {
            match message {
                GraphMessage::Targets(targets) => graph.apply_targets(&targets),
                GraphMessage::Curve(curve) => {
                    let old = graph.swap_curve(curve);
                    // Capacity is reserved by the controller, so this never
                    // hands the table back to us.
                    if let Err(PushError::Full(old)) = self.garbage.push(old) {
                        std::mem::forget(old);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::ImpulseResponse;
    use crate::engine::stats::RealtimeStats;
    use crate::params::DriveModel;
    use crate::voices::DrumBus;
    use std::sync::Arc;

    fn graph() -> SignalGraph {
        let targets = StageTargets::default();
        let curve = Box::new(TransferCurve::build(&targets.curve));
        let impulse = ImpulseResponse::with_length(48_000, 0.05);
        let (_tx, rx) = RingBuffer::new(4);
        let drums = DrumBus::new(rx, Arc::new(RealtimeStats::new()));
        SignalGraph::new(48_000.0, &impulse, &targets, curve, drums)
    }

    fn driven(drive: f32) -> EffectSettings {
        EffectSettings {
            drive,
            drive_model: DriveModel::Distortion,
            ..EffectSettings::default()
        }
    }

    #[test]
    fn test_same_curve_key_does_not_rebuild() {
        let (mut controller, _inbox) = graph_channel(StageTargets::default().curve);
        controller.apply(&EffectSettings {
            output_volume: 0.5,
            ..EffectSettings::default()
        });
        assert_eq!(controller.outstanding_curves, 0);
        assert!(!controller.has_pending());
    }

    #[test]
    fn test_curves_come_back_for_freeing() {
        let mut graph = graph();
        let (mut controller, mut inbox) = graph_channel(StageTargets::default().curve);

        controller.apply(&driven(0.5));
        assert_eq!(controller.outstanding_curves, 1);

        inbox.poll(&mut graph);
        controller.flush();
        assert_eq!(controller.outstanding_curves, 0);
    }

    #[test]
    fn test_in_flight_tables_are_capped() {
        let (mut controller, _inbox) = graph_channel(StageTargets::default().curve);
        for i in 0..10 {
            controller.apply(&driven(0.05 * (i + 1) as f32));
        }
        assert_eq!(controller.outstanding_curves, CURVE_CAPACITY);
        assert!(controller.has_pending());
        // Tables 6 through 10 each replaced a table still waiting to be sent
        assert_eq!(controller.dropped_updates(), 5);
    }

    #[test]
    fn test_full_ring_keeps_newest_targets() {
        let (mut controller, _inbox) = graph_channel(StageTargets::default().curve);
        for i in 0..(MESSAGE_CAPACITY + 3) {
            controller.apply(&EffectSettings {
                output_volume: i as f32 / 100.0,
                ..EffectSettings::default()
            });
        }
        assert!(controller.has_pending());
        assert_eq!(controller.dropped_updates(), 2);
        assert_eq!(
            controller.pending_targets.map(|t| t.output_gain),
            Some((MESSAGE_CAPACITY + 2) as f32 / 100.0)
        );
    }
}
