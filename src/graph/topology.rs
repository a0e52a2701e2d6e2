//! Static description of the effects chain.
//!
//! ```text
//! Input ─▶ InputGain ─▶ NoiseGate ─▶ HighPass ─▶ Drive ─▶ Bass ─▶ Mid ─▶ Treble ─▶ Cabinet
//!                                                                                    │
//!                        ┌──────────────┬───────────────┬────────────────────────────┤
//!                        ▼              ▼               ▼                            ▼
//!                       Dry       Delay ⟲ (feedback)   Reverb (stereo)            Chorus
//!                        │              │               │                            │
//!                        └──────────────┴───────┬───────┴────────────────────────────┘
//!                                               ▼
//!                                     Mix ─▶ Tremolo ─▶ Compressor ─▶ Output
//!                                                                       │
//!                                                     Rhythm ─────────▶ Master
//!                                                                       │
//!                                          ┌────────────────┬───────────┤
//!                                          ▼                ▼           ▼
//!                                     Destination       Analyser     Capture
//! ```
//!
//! The graph constructor walks this description once; nothing about the
//! shape changes for the lifetime of an engine.

/// Every node in the chain. The discriminant doubles as the storage index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Input,
    InputGain,
    NoiseGate,
    HighPass,
    Drive,
    Bass,
    Mid,
    Treble,
    Cabinet,
    Dry,
    Delay,
    Reverb,
    Chorus,
    Mix,
    Tremolo,
    Compressor,
    Output,
    Rhythm,
    Master,
    Destination,
    Analyser,
    Capture,
}

impl Stage {
    pub const ALL: [Stage; 22] = [
        Stage::Input,
        Stage::InputGain,
        Stage::NoiseGate,
        Stage::HighPass,
        Stage::Drive,
        Stage::Bass,
        Stage::Mid,
        Stage::Treble,
        Stage::Cabinet,
        Stage::Dry,
        Stage::Delay,
        Stage::Reverb,
        Stage::Chorus,
        Stage::Mix,
        Stage::Tremolo,
        Stage::Compressor,
        Stage::Output,
        Stage::Rhythm,
        Stage::Master,
        Stage::Destination,
        Stage::Analyser,
        Stage::Capture,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        self as usize
    }

    /// Stages that start a signal rather than receive one.
    pub fn is_source(self) -> bool {
        matches!(self, Stage::Input | Stage::Rhythm)
    }

    /// Stages where the signal leaves the graph.
    pub fn is_sink(self) -> bool {
        matches!(self, Stage::Destination | Stage::Analyser | Stage::Capture)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: Stage,
    pub to: Stage,
    /// Loops back into an earlier point; realized inside the stage itself.
    pub feedback: bool,
}

const fn edge(from: Stage, to: Stage) -> Edge {
    Edge {
        from,
        to,
        feedback: false,
    }
}

pub const EDGES: &[Edge] = &[
    edge(Stage::Input, Stage::InputGain),
    edge(Stage::InputGain, Stage::NoiseGate),
    edge(Stage::NoiseGate, Stage::HighPass),
    edge(Stage::HighPass, Stage::Drive),
    edge(Stage::Drive, Stage::Bass),
    edge(Stage::Bass, Stage::Mid),
    edge(Stage::Mid, Stage::Treble),
    edge(Stage::Treble, Stage::Cabinet),
    // fan-out
    edge(Stage::Cabinet, Stage::Dry),
    edge(Stage::Cabinet, Stage::Delay),
    edge(Stage::Cabinet, Stage::Reverb),
    edge(Stage::Cabinet, Stage::Chorus),
    Edge {
        from: Stage::Delay,
        to: Stage::Delay,
        feedback: true,
    },
    // sum
    edge(Stage::Dry, Stage::Mix),
    edge(Stage::Delay, Stage::Mix),
    edge(Stage::Reverb, Stage::Mix),
    edge(Stage::Chorus, Stage::Mix),
    edge(Stage::Mix, Stage::Tremolo),
    edge(Stage::Tremolo, Stage::Compressor),
    edge(Stage::Compressor, Stage::Output),
    edge(Stage::Output, Stage::Master),
    edge(Stage::Rhythm, Stage::Master),
    edge(Stage::Master, Stage::Destination),
    edge(Stage::Master, Stage::Analyser),
    edge(Stage::Master, Stage::Capture),
];

/// Feed-forward edges ending at `stage`.
pub fn inputs_of(stage: Stage) -> impl Iterator<Item = Stage> {
    EDGES
        .iter()
        .filter(move |e| e.to == stage && !e.feedback)
        .map(|e| e.from)
}

/// Feed-forward edges starting at `stage`.
pub fn outputs_of(stage: Stage) -> impl Iterator<Item = Stage> {
    EDGES
        .iter()
        .filter(move |e| e.from == stage && !e.feedback)
        .map(|e| e.to)
}

/// Render order: every stage after all of its inputs (Kahn's algorithm).
///
/// Returns `None` if the feed-forward edges contain a cycle.
pub fn render_order() -> Option<Vec<Stage>> {
    let mut pending: Vec<usize> = Stage::ALL.iter().map(|&s| inputs_of(s).count()).collect();
    let mut ready: Vec<Stage> = Stage::ALL
        .iter()
        .copied()
        .filter(|s| pending[s.index()] == 0)
        .collect();
    let mut order = Vec::with_capacity(Stage::COUNT);

    while let Some(stage) = ready.pop() {
        order.push(stage);
        for next in outputs_of(stage) {
            pending[next.index()] -= 1;
            if pending[next.index()] == 0 {
                ready.push(next);
            }
        }
    }

    (order.len() == Stage::COUNT).then_some(order)
}
