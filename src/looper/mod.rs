//! Loop station: capture takes from the master bus and bounce them.
//!
//! Recording is split across threads. The audio callback pushes master-bus
//! frames into a ring while the recorder is armed, and [`LoopRecorder`]
//! collects them on the control side. Finished takes become [`LoopTrack`]s
//! owned by the caller; [`export_mix`] sums the audible ones offline.
//!
//! ```
//! use neuroamp_dsp::looper::{audible_subset, LoopTrack, Take};
//!
//! let take = Take { payload: Vec::new(), duration: 0.0 };
//! let mut a = LoopTrack::from_take(take.clone(), 1);
//! let b = LoopTrack::from_take(take, 2);
//! a.is_solo = true;
//!
//! let tracks = [a, b];
//! let audible = audible_subset(&tracks);
//! assert_eq!(audible.len(), 1);
//! assert_eq!(audible[0].name, "Loop Layer 1");
//! ```

pub mod capture;
pub mod mixdown;
pub mod track;
pub mod wav;

pub use capture::{LoopRecorder, RecordingState, Take};
pub use mixdown::{export_mix, export_mix_with, render_mix, spawn_export, MixdownOptions, TailMode};
pub use track::{audible_subset, LoopTrack, PlaybackSpeed};
pub use wav::StereoClip;
