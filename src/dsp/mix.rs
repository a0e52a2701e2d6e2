//! Signal summing and balance primitives.

/*
Signal Mixing
=============

Mixing combines signals by ADDING them together, each with its own weight.
The effects chain does it twice: once where the parallel paths (dry, delay,
reverb, chorus) meet again, and once where the drum bus joins the processed
instrument. The loop station does it offline when bouncing takes.

Vocabulary
----------

  summing       Adding signals at their own levels. Nothing prevents the
                result from leaving [-1.0, +1.0].

  gain          A linear multiplier applied before summing.
                  gain = 0.5  →  -6 dB
                  gain = 1.0  →  unchanged

  balance       A stereo position for a mono-or-stereo source, -1.0 (left)
                to +1.0 (right). Unlike an equal-power pan law, a balance
                control never boosts: the centered source passes at unity on
                both sides and moving it attenuates the opposite channel.

                   pan    left   right
                  -1.0    1.0    0.0
                   0.0    1.0    1.0
                  +0.5    0.5    1.0
                  +1.0    0.0    1.0


Clipping Risk
-------------

Parallel paths add up. With dry at 1.0, a delay at 0.8 and a reverb tail,
the sum can easily exceed full scale:

    Dry:     [ 0.9,  0.5, -0.5]
    Delay:   [ 0.7,  0.2, -0.4]
    Sum:     [ 1.6,  0.7, -0.9]  ← exceeds ±1.0!

Inside the engine the compressor and output gain sit after the sum, and
floats carry the overshoot without damage. Integer export is different:
16-bit PCM cannot represent it, so the mixdown clips to [-1.0, +1.0] right
before quantizing (see `clip`).
*/

/// Add `src × gain` into `out`, sample by sample.
#[inline]
pub fn sum_into(out: &mut [f32], src: &[f32], gain: f32) {
    debug_assert_eq!(out.len(), src.len());

    for (o, &s) in out.iter_mut().zip(src.iter()) {
        *o += s * gain;
    }
}

/// Per-channel gains for a balance position in [-1.0, +1.0].
#[inline]
pub fn balance_gains(pan: f32) -> (f32, f32) {
    let pan = if pan.is_finite() { pan.clamp(-1.0, 1.0) } else { 0.0 };
    let left = if pan > 0.0 { 1.0 - pan } else { 1.0 };
    let right = if pan < 0.0 { 1.0 + pan } else { 1.0 };
    (left, right)
}

/// Hard limit to full scale. NaN becomes silence.
#[inline]
pub fn clip(sample: f32) -> f32 {
    if sample.is_nan() {
        0.0
    } else {
        sample.clamp(-1.0, 1.0)
    }
}
