/*
Step Clock
==========

Maps sequencer steps to audio-clock time.

Step times are never accumulated by adding durations one at a time, because
float error in a running sum drifts over a long session. Instead the clock
keeps an anchor (a step index and its exact time) and computes

    time(step) = anchor_time + (step - anchor_step) × step_duration

A tempo change re-anchors at the next unscheduled step, so every step that was
already handed out keeps its time and the new tempo starts cleanly from there.

    tempo 120             tempo 90
    |--|--|--|--|--|--|--|---|---|---|
                         ^ new anchor
*/

use crate::STEPS_PER_BEAT;

/// Seconds per sixteenth step at `bpm`.
pub fn step_duration(bpm: f64) -> f64 {
    60.0 / bpm / STEPS_PER_BEAT as f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepClock {
    anchor_time: f64,
    anchor_step: u64,
    step_duration: f64,
    next_step: u64,
}

impl StepClock {
    pub fn new(bpm: f64) -> Self {
        Self {
            anchor_time: 0.0,
            anchor_step: 0,
            step_duration: step_duration(bpm),
            next_step: 0,
        }
    }

    /// Restart at step 0 sounding at `at_time`.
    pub fn start(&mut self, at_time: f64) {
        self.anchor_time = at_time;
        self.anchor_step = 0;
        self.next_step = 0;
    }

    pub fn step_duration(&self) -> f64 {
        self.step_duration
    }

    /// Change tempo from the next unscheduled step onward.
    pub fn set_bpm(&mut self, bpm: f64) {
        let duration = step_duration(bpm);
        if duration == self.step_duration {
            return;
        }
        self.anchor_time = self.time_of(self.next_step);
        self.anchor_step = self.next_step;
        self.step_duration = duration;
    }

    pub fn time_of(&self, step: u64) -> f64 {
        self.anchor_time + (step - self.anchor_step) as f64 * self.step_duration
    }

    pub fn next_step(&self) -> u64 {
        self.next_step
    }

    pub fn next_time(&self) -> f64 {
        self.time_of(self.next_step)
    }

    /// Hand out the next step and its time.
    pub fn advance(&mut self) -> (u64, f64) {
        let step = self.next_step;
        let time = self.time_of(step);
        self.next_step += 1;
        (step, time)
    }

    /// Move past every step whose time is before `now`. Returns how many were
    /// skipped.
    pub fn skip_past(&mut self, now: f64) -> u64 {
        let behind = now - self.next_time();
        if behind <= 0.0 {
            return 0;
        }
        let mut skipped = (behind / self.step_duration).floor() as u64;
        // Float rounding can land one step short or one step over
        while self.time_of(self.next_step + skipped) < now {
            skipped += 1;
        }
        while skipped > 0 && self.time_of(self.next_step + skipped - 1) >= now {
            skipped -= 1;
        }
        self.next_step += skipped;
        skipped
    }
}
