// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visibility fade state machine.
//!
//! Hiding or showing a node never cuts its opacity. Instead, the node keeps
//! the wall-clock time of its last flip and the fade factor is a linear ramp
//! over the configured fade duration:
//!
//! ```text
//!   dt = now - last_change
//!   dt > fade   → 1 if visible, 0 if hidden
//!   otherwise   → lint(dt, 0, fade, 0, 1), inverted while hiding
//! ```
//!
//! A hidden node stays renderable until its fade reaches zero. Flipping the
//! flag again in the middle of a fade back-dates the flip so the ramp
//! continues from the current factor.

/// Linear interpolation of `x` from `[x0, x1]` onto `[y0, y1]`, clamped to
/// the output range.
#[must_use]
pub fn lint(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    if x1 == x0 {
        return if x < x0 { y0 } else { y1 };
    }
    let t = ((x - x0) / (x1 - x0)).clamp(0.0, 1.0);
    y0 + (y1 - y0) * t
}

/// Per-node visibility flag with the time of its last change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FadeState {
    visible: bool,
    // Signed so a back-dated flip can precede the wall-clock origin.
    last_change_ms: Option<i64>,
}

impl Default for FadeState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl FadeState {
    /// Creates a settled state; no fade is in progress.
    #[must_use]
    pub const fn new(visible: bool) -> Self {
        Self {
            visible,
            last_change_ms: None,
        }
    }

    /// Returns the user visibility flag.
    #[inline]
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns the wall-clock time of the last flip, if any.
    #[inline]
    #[must_use]
    pub const fn last_change_ms(&self) -> Option<i64> {
        self.last_change_ms
    }

    /// Sets the visibility flag. Returns `true` if it changed.
    pub fn set_visible(&mut self, visible: bool, now_ms: u64, fade_ms: u64) -> bool {
        if visible == self.visible {
            return false;
        }
        let current = self.factor(now_ms, fade_ms);
        // Progress along the new ramp that reproduces the current factor.
        let progress = if visible { current } else { 1.0 - current };
        #[expect(
            clippy::cast_possible_truncation,
            reason = "progress is in [0, 1] so the product fits in the fade duration"
        )]
        let elapsed = (progress * fade_ms as f64).round() as i64;
        self.visible = visible;
        self.last_change_ms = Some(now_ms as i64 - elapsed);
        true
    }

    /// Returns the fade factor in `[0, 1]` at `now_ms`.
    #[must_use]
    pub fn factor(&self, now_ms: u64, fade_ms: u64) -> f64 {
        let settled = if self.visible { 1.0 } else { 0.0 };
        let Some(last) = self.last_change_ms else {
            return settled;
        };
        // Queries before the flip clamp to the flip instant.
        let dt = (now_ms as i64 - last).max(0);
        if dt > fade_ms as i64 {
            return settled;
        }
        let x = lint(dt as f64, 0.0, fade_ms as f64, 0.0, 1.0);
        if self.visible { x } else { 1.0 - x }
    }

    /// Returns whether a fade is in progress at `now_ms`.
    #[must_use]
    pub fn is_fading(&self, now_ms: u64, fade_ms: u64) -> bool {
        self.last_change_ms
            .is_some_and(|last| now_ms as i64 - last < fade_ms as i64)
    }

    /// Returns whether the node can contribute to this frame.
    #[must_use]
    pub fn should_render(&self, now_ms: u64, fade_ms: u64) -> bool {
        self.visible || self.is_fading(now_ms, fade_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FADE: u64 = 1000;

    #[test]
    fn lint_clamps() {
        assert_eq!(lint(-1.0, 0.0, 10.0, 0.0, 1.0), 0.0);
        assert_eq!(lint(5.0, 0.0, 10.0, 0.0, 1.0), 0.5);
        assert_eq!(lint(20.0, 0.0, 10.0, 0.0, 1.0), 1.0);
        assert_eq!(lint(5.0, 0.0, 10.0, 1.0, 0.0), 0.5);
        assert_eq!(lint(3.0, 3.0, 3.0, 0.0, 1.0), 1.0);
    }

    #[test]
    fn hide_fades_to_zero() {
        let mut s = FadeState::new(true);
        let t = 10_000;
        assert!(s.set_visible(false, t, FADE));
        assert_eq!(s.factor(t - 500, FADE), 1.0, "before the flip");
        assert_eq!(s.factor(t, FADE), 1.0);
        assert!((s.factor(t + FADE / 2, FADE) - 0.5).abs() < 1e-12);
        assert_eq!(s.factor(t + FADE, FADE), 0.0);
        assert_eq!(s.factor(t + FADE * 2, FADE), 0.0);
        assert!(s.should_render(t + FADE / 2, FADE));
        assert!(!s.should_render(t + FADE * 2, FADE));
    }

    #[test]
    fn fade_out_is_monotonic() {
        let mut s = FadeState::new(true);
        s.set_visible(false, 0, FADE);
        let mut prev = f64::INFINITY;
        for now in (0..=FADE + 100).step_by(7) {
            let f = s.factor(now, FADE);
            assert!(f <= prev, "factor rose at {now}");
            assert!((0.0..=1.0).contains(&f));
            prev = f;
        }
    }

    #[test]
    fn show_fades_in() {
        let mut s = FadeState::new(false);
        assert!(!s.should_render(0, FADE));
        s.set_visible(true, 100, FADE);
        assert_eq!(s.factor(100, FADE), 0.0);
        assert!((s.factor(350, FADE) - 0.25).abs() < 1e-12);
        assert_eq!(s.factor(100 + FADE + 1, FADE), 1.0);
    }

    #[test]
    fn reversing_mid_fade_is_continuous() {
        let mut s = FadeState::new(true);
        s.set_visible(false, 0, FADE);
        let before = s.factor(300, FADE);
        s.set_visible(true, 300, FADE);
        let after = s.factor(300, FADE);
        assert!((before - after).abs() < 1e-3, "{before} vs {after}");
        assert!(s.factor(400, FADE) > after);
        assert_eq!(s.last_change_ms(), Some(-400), "flip is back-dated");
    }

    #[test]
    fn redundant_set_is_ignored() {
        let mut s = FadeState::new(true);
        assert!(!s.set_visible(true, 5, FADE));
        assert_eq!(s.last_change_ms(), None);
    }

    #[test]
    fn zero_fade_switches_instantly() {
        let mut s = FadeState::new(true);
        s.set_visible(false, 50, 0);
        assert_eq!(s.factor(50, 0), 0.0);
        assert!(!s.should_render(50, 0));
    }
}
