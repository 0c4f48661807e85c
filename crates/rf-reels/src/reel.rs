//! Reel Animator: per-reel phase machine
//!
//! ```text
//! IDLE ──start_spin──▶ SPINNING ──begin_deceleration──▶ DECELERATING ──last step──▶ STOPPED
//!   ▲                                                                                  │
//!   └───────────────────────────────── reset (new spin) ◀─────────────────────────────┘
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{ReelConfig, SolverConfig};
use crate::solver::{DecelPlan, plan_deceleration};
use crate::symbols::{ReelStrip, Symbol};

/// Phase of a reel's stop sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReelPhase {
    #[default]
    Idle,
    Spinning,
    Decelerating,
    Stopped,
}

/// Progress through an active deceleration plan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deceleration {
    pub plan: DecelPlan,
    pub steps_done: u32,
    pub distance_traveled: f64,
    /// Index the reel rests on once the plan completes
    pub landing_index: usize,
}

/// What a renderer needs to draw one reel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReelView {
    pub phase: ReelPhase,
    pub index: usize,
    pub offset: f64,
    pub speed: f64,
    /// Symbol at `index`
    pub symbol: Symbol,
}

/// One animated reel
#[derive(Debug, Clone)]
pub struct ReelAnimator {
    strip: ReelStrip,
    config: ReelConfig,
    phase: ReelPhase,
    index: usize,
    offset: f64,
    speed: f64,
    decel: Option<Deceleration>,
}

impl ReelAnimator {
    /// Create an idle reel with a freshly drawn strip
    pub fn new<R: Rng + ?Sized>(config: ReelConfig, rng: &mut R) -> Self {
        Self::with_strip(config, ReelStrip::random(config.strip_length, rng))
    }

    /// Create an idle reel over an explicit strip
    pub fn with_strip(config: ReelConfig, strip: ReelStrip) -> Self {
        Self {
            strip,
            config,
            phase: ReelPhase::Idle,
            index: 0,
            offset: 0.0,
            speed: 0.0,
            decel: None,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TRANSITIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// STOPPED → IDLE. No effect in any other phase.
    pub fn reset(&mut self) {
        if self.phase == ReelPhase::Stopped {
            self.phase = ReelPhase::Idle;
            self.decel = None;
        }
    }

    /// IDLE → SPINNING: reshuffle, full speed, offset cleared
    ///
    /// Returns false (and changes nothing) outside IDLE.
    pub fn start_spin<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.phase != ReelPhase::Idle {
            return false;
        }
        self.strip.reshuffle(rng);
        self.speed = self.config.max_speed;
        self.offset = 0.0;
        self.decel = None;
        self.phase = ReelPhase::Spinning;
        true
    }

    /// SPINNING → DECELERATING: consult the solver once and store the plan
    pub fn begin_deceleration(&mut self, solver: &SolverConfig) -> Option<DecelPlan> {
        if self.phase != ReelPhase::Spinning {
            return None;
        }

        let h = self.config.symbol_height;
        let plan = plan_deceleration(self.speed, self.offset, h, solver);
        let cells = plan.cells_advanced(self.offset, h);
        let landing_index = ((self.index as u64 + cells) % self.strip.len() as u64) as usize;

        log::debug!(
            "Decelerating from v0={:.2} offset={:.2}: N={} k={} D={:.2} v_end={:.3}{}",
            self.speed,
            self.offset,
            plan.steps,
            plan.extra_cells,
            plan.target_distance,
            plan.exit_speed,
            if plan.fallback { " (fallback)" } else { "" }
        );

        self.decel = Some(Deceleration {
            plan,
            steps_done: 0,
            distance_traveled: 0.0,
            landing_index,
        });
        self.phase = ReelPhase::Decelerating;
        Some(plan)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STEPPING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Advance one tick. Returns true on the tick the reel enters STOPPED.
    pub fn tick(&mut self) -> bool {
        match self.phase {
            ReelPhase::Spinning => {
                self.scroll(self.speed);
                false
            }
            ReelPhase::Decelerating => self.step_deceleration(),
            ReelPhase::Idle | ReelPhase::Stopped => false,
        }
    }

    fn step_deceleration(&mut self) -> bool {
        let Some(mut decel) = self.decel else {
            return false;
        };

        let last = decel.steps_done + 1 >= decel.plan.steps;
        let distance = if last {
            (decel.plan.target_distance - decel.distance_traveled).max(0.0)
        } else {
            self.speed.max(0.0)
        };

        self.scroll(distance);
        decel.distance_traveled += distance;
        decel.steps_done += 1;
        self.speed = (self.speed + decel.plan.acceleration).max(0.0);

        if last {
            decel.distance_traveled = decel.plan.target_distance;
            self.speed = 0.0;
            self.offset = 0.0;
            self.index = decel.landing_index;
            self.phase = ReelPhase::Stopped;
        }

        self.decel = Some(decel);
        last
    }

    /// Move the strip by `distance` px, carrying whole cells into `index`
    fn scroll(&mut self, distance: f64) {
        let h = self.config.symbol_height;
        let len = self.strip.len();

        self.offset += distance;
        while self.offset >= h {
            self.offset -= h;
            self.index = (self.index + 1) % len;
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn phase(&self) -> ReelPhase {
        self.phase
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn strip(&self) -> &ReelStrip {
        &self.strip
    }

    /// Active or just-completed deceleration
    pub fn deceleration(&self) -> Option<&Deceleration> {
        self.decel.as_ref()
    }

    /// Symbol currently centered
    pub fn symbol(&self) -> Symbol {
        self.strip.symbol_at(self.index)
    }

    /// `rows` symbols centred on `index` (top to bottom)
    pub fn visible_symbols(&self, rows: usize) -> Vec<Symbol> {
        let len = self.strip.len();
        let above = rows / 2 % len;
        self.strip.window(self.index + len - above, rows)
    }

    pub fn view(&self) -> ReelView {
        ReelView {
            phase: self.phase,
            index: self.index,
            offset: self.offset,
            speed: self.speed,
            symbol: self.symbol(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SpinRng;
    use approx::assert_relative_eq;

    fn reel(seed: u64) -> (ReelAnimator, SpinRng) {
        let mut rng = SpinRng::seeded(seed);
        (ReelAnimator::new(ReelConfig::default(), &mut rng), rng)
    }

    #[test]
    fn test_idle_reel_does_not_move() {
        let (mut reel, _) = reel(1);
        assert!(!reel.tick());
        assert_eq!(reel.phase(), ReelPhase::Idle);
        assert_eq!(reel.offset(), 0.0);
        assert_eq!(reel.index(), 0);
    }

    #[test]
    fn test_spinning_wraps_offset_into_index() {
        let (mut reel, mut rng) = reel(2);
        assert!(reel.start_spin(&mut rng));
        assert_eq!(reel.speed(), 36.0);

        reel.tick(); // 36
        reel.tick(); // 72
        assert_eq!(reel.index(), 0);
        reel.tick(); // 108 → index 1, offset 28
        assert_eq!(reel.index(), 1);
        assert_relative_eq!(reel.offset(), 28.0);
    }

    #[test]
    fn test_multi_cell_speed_wraps_fully() {
        let config = ReelConfig {
            max_speed: 250.0,
            ..ReelConfig::default()
        };
        let mut rng = SpinRng::seeded(3);
        let mut reel = ReelAnimator::new(config, &mut rng);
        reel.start_spin(&mut rng);
        reel.tick(); // 250 = 3 cells + 10
        assert_eq!(reel.index(), 3);
        assert_relative_eq!(reel.offset(), 10.0);
    }

    #[test]
    fn test_start_spin_only_from_idle() {
        let (mut reel, mut rng) = reel(4);
        assert!(reel.start_spin(&mut rng));
        assert!(!reel.start_spin(&mut rng));
        assert!(reel.begin_deceleration(&SolverConfig::default()).is_some());
        assert!(reel.begin_deceleration(&SolverConfig::default()).is_none());
    }

    #[test]
    fn test_deceleration_lands_on_boundary() {
        let (mut reel, mut rng) = reel(5);
        reel.start_spin(&mut rng);
        for _ in 0..7 {
            reel.tick();
        }
        let start_index = reel.index();
        let start_offset = reel.offset();
        assert!(start_offset > 0.0);

        let plan = reel.begin_deceleration(&SolverConfig::default()).unwrap();
        let mut ticks = 0;
        let mut last_speed = reel.speed();
        while !reel.tick() {
            ticks += 1;
            assert_eq!(reel.phase(), ReelPhase::Decelerating);
            assert!(reel.speed() <= last_speed, "speed increased mid-ramp");
            assert!(reel.offset() >= 0.0 && reel.offset() < 80.0);
            last_speed = reel.speed();
        }
        ticks += 1;

        assert_eq!(ticks, plan.steps);
        assert_eq!(reel.phase(), ReelPhase::Stopped);
        assert_eq!(reel.offset(), 0.0);
        assert_eq!(reel.speed(), 0.0);

        let cells = plan.cells_advanced(start_offset, 80.0) as usize;
        assert_eq!(reel.index(), (start_index + cells) % 20);

        let decel = reel.deceleration().unwrap();
        assert_eq!(decel.steps_done, plan.steps);
        assert_eq!(decel.distance_traveled, plan.target_distance);
    }

    #[test]
    fn test_ramp_distance_matches_plan_before_pinning() {
        // Walk the stepping rule by hand and compare the cumulative distance
        let (mut reel, mut rng) = reel(6);
        reel.start_spin(&mut rng);
        let plan = reel.begin_deceleration(&SolverConfig::default()).unwrap();

        let mut speed = 36.0_f64;
        let mut travelled = 0.0;
        for _ in 0..plan.steps - 1 {
            travelled += speed;
            speed = (speed + plan.acceleration).max(0.0);
        }
        let residual = plan.target_distance - travelled;
        assert_relative_eq!(residual, plan.exit_speed, epsilon = 1e-6);
    }

    #[test]
    fn test_stopped_is_terminal_until_reset() {
        let (mut reel, mut rng) = reel(7);
        reel.start_spin(&mut rng);
        reel.begin_deceleration(&SolverConfig::default());
        while !reel.tick() {}

        let view = reel.view();
        for _ in 0..10 {
            assert!(!reel.tick());
        }
        assert_eq!(reel.view(), view);
        assert!(!reel.start_spin(&mut rng));

        reel.reset();
        assert_eq!(reel.phase(), ReelPhase::Idle);
        assert!(reel.deceleration().is_none());
        assert!(reel.start_spin(&mut rng));
    }

    #[test]
    fn test_visible_symbols_centred() {
        let strip = ReelStrip::new(vec![
            Symbol::Cherry,
            Symbol::Lemon,
            Symbol::Orange,
            Symbol::Grape,
        ]);
        let reel = ReelAnimator::with_strip(ReelConfig::default(), strip);
        assert_eq!(
            reel.visible_symbols(3),
            vec![Symbol::Grape, Symbol::Cherry, Symbol::Lemon]
        );
    }
}
