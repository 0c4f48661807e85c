//! Kinematics Solver: aligned deceleration planning
//!
//! Given the speed `v0` at which a reel starts to brake and its sub-cell
//! offset, pick a step count `N` and a whole number of extra cells `k` so that
//! a linear speed ramp from `v0` over `N` ticks covers exactly
//!
//! ```text
//! D = align_remainder + k · H        align_remainder = (H − offset) mod H
//! ```
//!
//! and therefore comes to rest on a cell boundary. The ramp's exit speed is
//! `v_end = 2·D/N − v0`, constrained to `[0, v0]` so the reel only ever slows
//! down. Among valid pairs the one with `v_end` closest to the configured
//! target exit speed wins; the smallest `N` wins ties.
//!
//! The search visits each `N` once and tests at most two `k` values per `N`,
//! so it always completes inside a single tick.

use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;

/// A deceleration plan for one reel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecelPlan {
    /// Ticks until the reel is stopped (N)
    pub steps: u32,
    /// Whole cells travelled beyond the next boundary (k)
    pub extra_cells: u32,
    /// Distance to the next cell boundary at plan time (px)
    pub align_remainder: f64,
    /// Total distance covered while decelerating (D, px)
    pub target_distance: f64,
    /// Speed at the last tick before the forced stop (px per tick)
    pub exit_speed: f64,
    /// Per-tick speed change (negative while braking)
    pub acceleration: f64,
    /// True when the search found nothing and the fixed fallback was used
    pub fallback: bool,
}

impl DecelPlan {
    fn build(v0: f64, align_remainder: f64, symbol_height: f64, steps: u32, extra_cells: u32, fallback: bool) -> Self {
        let target_distance = align_remainder + f64::from(extra_cells) * symbol_height;
        let exit_speed = exit_speed(target_distance, steps, v0);
        let acceleration = if steps > 1 {
            (exit_speed - v0) / f64::from(steps - 1)
        } else {
            0.0
        };

        Self {
            steps,
            extra_cells,
            align_remainder,
            target_distance,
            exit_speed,
            acceleration,
            fallback,
        }
    }

    /// Whole cells the reel index advances by, starting from `offset`
    pub fn cells_advanced(&self, offset: f64, symbol_height: f64) -> u64 {
        ((offset + self.target_distance) / symbol_height).round().max(0.0) as u64
    }
}

/// Distance to the next cell boundary
pub fn align_remainder(offset: f64, symbol_height: f64) -> f64 {
    (symbol_height - offset).rem_euclid(symbol_height)
}

/// Exit speed of a linear ramp from `v0` covering `distance` in `steps` ticks
pub fn exit_speed(distance: f64, steps: u32, v0: f64) -> f64 {
    2.0 * distance / f64::from(steps) - v0
}

/// Range of `k` for which the ramp never speeds up or reverses
///
/// `v_end ∈ [0, v0]` ⇔ `D ∈ [v0·N/2, v0·N]`.
fn monotone_cell_range(v0: f64, remainder: f64, symbol_height: f64, steps: u32) -> Option<(u32, u32)> {
    let n = f64::from(steps);
    let lo = ((v0 * n / 2.0 - remainder) / symbol_height).ceil().max(0.0);
    let hi = ((v0 * n - remainder) / symbol_height).floor();
    if !(lo.is_finite() && hi.is_finite()) || hi < lo {
        return None;
    }
    Some((lo as u32, hi as u32))
}

/// Plan the deceleration of a reel moving at `v0` with sub-cell `offset`
///
/// Never fails: an unsatisfiable search resolves to the fallback plan
/// (`fallback_steps`, midpoint of the monotone `k` range, or
/// `fallback_extra_cells` when that range is empty).
pub fn plan_deceleration(v0: f64, offset: f64, symbol_height: f64, config: &SolverConfig) -> DecelPlan {
    let remainder = align_remainder(offset, symbol_height);
    let target = config.target_exit_speed;

    // (|v_end - target|, N, k)
    let mut best: Option<(f64, u32, u32)> = None;

    for steps in config.min_steps..=config.max_steps {
        let Some((mono_lo, mono_hi)) = monotone_cell_range(v0, remainder, symbol_height, steps) else {
            continue;
        };
        let lo = mono_lo.max(config.min_extra_cells);
        let hi = mono_hi.min(config.max_extra_cells);
        if lo > hi {
            continue;
        }

        let ideal = ((v0 + target) * f64::from(steps) / 2.0 - remainder) / symbol_height;
        for candidate in [ideal.floor(), ideal.ceil()] {
            let k = candidate.clamp(f64::from(lo), f64::from(hi)) as u32;
            let distance = remainder + f64::from(k) * symbol_height;
            let v_end = exit_speed(distance, steps, v0);
            if !(0.0..=v0).contains(&v_end) {
                continue;
            }

            let error = (v_end - target).abs();
            if best.is_none_or(|(best_error, _, _)| error < best_error) {
                best = Some((error, steps, k));
            }
        }
    }

    if let Some((_, steps, k)) = best {
        return DecelPlan::build(v0, remainder, symbol_height, steps, k, false);
    }

    let steps = config.fallback_steps;
    let k = match monotone_cell_range(v0, remainder, symbol_height, steps) {
        Some((lo, hi)) => lo + (hi - lo) / 2,
        None => config.fallback_extra_cells,
    };
    log::warn!(
        "No aligned deceleration for v0={v0:.3} offset={offset:.3}; falling back to N={steps} k={k}"
    );
    DecelPlan::build(v0, remainder, symbol_height, steps, k, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const H: f64 = 80.0;

    fn extra_cells_of(plan: &DecelPlan) -> f64 {
        (plan.target_distance - plan.align_remainder) / H
    }

    #[test]
    fn test_align_remainder() {
        assert_eq!(align_remainder(0.0, H), 0.0);
        assert_relative_eq!(align_remainder(20.0, H), 60.0);
        assert_relative_eq!(align_remainder(79.5, H), 0.5);
    }

    #[test]
    fn test_reference_plan() {
        let plan = plan_deceleration(36.0, 0.0, H, &SolverConfig::default());

        assert!(!plan.fallback);
        assert!((100..=150).contains(&plan.steps));
        assert!((12..=40).contains(&plan.extra_cells));
        assert!(plan.exit_speed > 0.0 && plan.exit_speed <= 36.0);

        // 36.8 · 100 / 2 = 1840 = 23 cells: exact hit on the first N searched
        assert_eq!(plan.steps, 100);
        assert_eq!(plan.extra_cells, 23);
        assert_relative_eq!(plan.target_distance, 1840.0);
        assert_relative_eq!(plan.exit_speed, 0.8, epsilon = 1e-9);
        assert_relative_eq!(plan.acceleration, (0.8 - 36.0) / 99.0, epsilon = 1e-9);
    }

    #[test]
    fn test_plans_are_monotone_and_aligned() {
        let config = SolverConfig::default();
        for &v0 in &[12.0, 24.0, 36.0, 48.0, 60.0] {
            let mut offset = 0.0;
            while offset < H {
                let plan = plan_deceleration(v0, offset, H, &config);

                assert!(
                    plan.exit_speed >= 0.0 && plan.exit_speed <= v0,
                    "v0={v0} offset={offset}: exit speed {} out of range",
                    plan.exit_speed
                );

                let k = extra_cells_of(&plan);
                assert_relative_eq!(k, k.round(), epsilon = 1e-9);
                assert_relative_eq!(
                    (offset + plan.target_distance) / H,
                    ((offset + plan.target_distance) / H).round(),
                    epsilon = 1e-9
                );

                if !plan.fallback {
                    assert!((config.min_steps..=config.max_steps).contains(&plan.steps));
                    assert!((config.min_extra_cells..=config.max_extra_cells).contains(&plan.extra_cells));
                }
                offset += 0.37;
            }
        }
    }

    #[test]
    fn test_exit_speed_prefers_target() {
        let config = SolverConfig::default();
        let mut offset = 0.0;
        while offset < H {
            let plan = plan_deceleration(36.0, offset, H, &config);
            // Adjacent k values are 2H/N ≤ 1.6 px/tick apart
            assert!(
                (plan.exit_speed - config.target_exit_speed).abs() <= 2.0 * H / 100.0,
                "offset={offset}: exit speed {}",
                plan.exit_speed
            );
            offset += 1.3;
        }
    }

    #[test]
    fn test_fallback_midpoint_when_policy_unsatisfiable() {
        let config = SolverConfig {
            min_extra_cells: 0,
            max_extra_cells: 1,
            ..SolverConfig::default()
        };
        let plan = plan_deceleration(36.0, 0.0, H, &config);

        assert!(plan.fallback);
        assert_eq!(plan.steps, 130);
        // monotone range at N=130: ceil(2340/80)=30 ..= floor(4680/80)=58
        assert_eq!(plan.extra_cells, 44);
        assert!(plan.exit_speed >= 0.0 && plan.exit_speed <= 36.0);
    }

    #[test]
    fn test_fallback_default_cells_when_range_empty() {
        let config = SolverConfig::default();
        let plan = plan_deceleration(0.1, 0.0, H, &config);
        assert!(plan.fallback);
        assert_eq!(plan.steps, 130);
        assert_eq!(plan.extra_cells, 20);
        assert_relative_eq!(plan.target_distance, 1600.0);

        // Only reachable below the validated brake speed, where no ramp over
        // 130 ticks can both slow down and land on a boundary
        assert!(0.1 < config.min_brake_speed(H));
        assert_relative_eq!(plan.exit_speed, 2.0 * 1600.0 / 130.0 - 0.1, epsilon = 1e-9);
        assert!(plan.exit_speed > 0.1);
    }

    #[test]
    fn test_fallback_slows_down_above_min_brake_speed() {
        let config = SolverConfig {
            min_extra_cells: 0,
            max_extra_cells: 0,
            ..SolverConfig::default()
        };
        for &v0 in &[config.min_brake_speed(H) * 1.01, 1.93, 2.53] {
            let mut offset = 0.0;
            while offset < H {
                let plan = plan_deceleration(v0, offset, H, &config);
                assert!(
                    plan.exit_speed >= 0.0 && plan.exit_speed <= v0,
                    "v0={v0} offset={offset}: exit speed {} out of range",
                    plan.exit_speed
                );
                assert!(plan.acceleration <= 0.0);
                offset += 0.5;
            }
        }
    }

    #[test]
    fn test_cells_advanced() {
        let plan = plan_deceleration(36.0, 20.0, H, &SolverConfig::default());
        assert_eq!(
            plan.cells_advanced(20.0, H),
            u64::from(plan.extra_cells) + 1
        );

        let plan = plan_deceleration(36.0, 0.0, H, &SolverConfig::default());
        assert_eq!(plan.cells_advanced(0.0, H), u64::from(plan.extra_cells));
    }
}
