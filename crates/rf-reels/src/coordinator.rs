//! Spin Coordinator: three reels, one clock, left-to-right stop cascade
//!
//! The coordinator is an owned aggregate: callers hold it by value and drive
//! it with [`SpinCoordinator::request_spin`] and one
//! [`SpinCoordinator::advance`] per rendered frame. Time is simulated; the
//! caller passes each frame's duration explicitly.

use std::time::Duration;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::config::MachineConfig;
use crate::error::ConfigResult;
use crate::ledger::StakeLedger;
use crate::payout::SpinOutcome;
use crate::reel::{ReelAnimator, ReelPhase, ReelView};
use crate::rng::SpinRng;
use crate::solver::DecelPlan;
use crate::symbols::{ReelStrip, Symbol};

/// Reels per cabinet
pub const REEL_COUNT: usize = 3;

/// Nominal frame time at 60 fps
pub const FRAME_60HZ: Duration = Duration::from_nanos(16_666_667);

/// Coordinator-level state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MachineState {
    /// No spin yet
    #[default]
    Idle,
    /// A session is running
    Spinning,
    /// Last session finished; outcome available
    Settled,
}

/// Condition under which a reel may leave SPINNING
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReelGate {
    /// After this much simulated time since spin start
    FreeSpin { duration: Duration },
    /// After the given reel has reached STOPPED
    AfterStopped { reel_index: usize },
}

/// One accepted spin, from request until settle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinSession {
    pub spin_id: u64,
    pub stake: u64,
    /// Simulated clock reading when the spin was accepted
    pub started_at: Duration,
    pub gates: [ReelGate; REEL_COUNT],
}

impl SpinSession {
    fn new(spin_id: u64, stake: u64, started_at: Duration, free_spin: Duration) -> Self {
        let gates = std::array::from_fn(|i| {
            if i == 0 {
                ReelGate::FreeSpin {
                    duration: free_spin,
                }
            } else {
                ReelGate::AfterStopped { reel_index: i - 1 }
            }
        });
        Self {
            spin_id,
            stake,
            started_at,
            gates,
        }
    }

    /// Whether `reel` may begin deceleration, given the elapsed spin time
    /// and the reel phases at the start of the tick
    pub fn gate_open(&self, reel: usize, elapsed: Duration, phases: &[ReelPhase; REEL_COUNT]) -> bool {
        match self.gates[reel] {
            ReelGate::FreeSpin { duration } => elapsed >= duration,
            ReelGate::AfterStopped { reel_index } => phases[reel_index] == ReelPhase::Stopped,
        }
    }
}

/// Why a spin request was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum SpinRejection {
    #[error("a spin is already in progress")]
    Busy,
    #[error("stake must be at least 1")]
    ZeroStake,
    #[error("insufficient credits for stake")]
    InsufficientCredits,
}

/// Answer to a spin request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpinDecision {
    Started { spin_id: u64 },
    Rejected { reason: SpinRejection },
}

impl SpinDecision {
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started { .. })
    }
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpinEvent {
    /// Spin accepted; reels reshuffled and at full speed
    SpinStarted { spin_id: u64, stake: u64 },
    /// Reel left SPINNING with this plan
    DecelerationStarted { reel_index: usize, plan: DecelPlan },
    /// Reel came to rest
    ReelStopped {
        reel_index: usize,
        index: usize,
        symbol: Symbol,
    },
    /// All reels stopped and the outcome was evaluated
    SpinSettled { outcome: SpinOutcome },
}

/// Result of one [`SpinCoordinator::advance`] call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number (1-based, counts every advance)
    pub tick: u64,
    /// Simulated clock after this tick
    pub clock: Duration,
    pub events: Vec<SpinEvent>,
    /// Present only on the settle tick
    pub outcome: Option<SpinOutcome>,
}

/// Serializable view of the whole cabinet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    pub state: MachineState,
    pub tick: u64,
    pub clock: Duration,
    pub reels: [ReelView; REEL_COUNT],
    pub strips: [ReelStrip; REEL_COUNT],
    pub session: Option<SpinSession>,
    pub last_outcome: Option<SpinOutcome>,
}

/// Three-reel spin coordinator
#[derive(Debug, Clone)]
pub struct SpinCoordinator<R: RngCore = SpinRng> {
    config: MachineConfig,
    reels: [ReelAnimator; REEL_COUNT],
    rng: R,
    state: MachineState,
    session: Option<SpinSession>,
    last_outcome: Option<SpinOutcome>,
    pending: Vec<SpinEvent>,
    tick: u64,
    clock: Duration,
    spin_count: u64,
}

impl SpinCoordinator<SpinRng> {
    /// Coordinator over the default ChaCha source
    pub fn seeded(config: MachineConfig, seed: u64) -> ConfigResult<Self> {
        Self::new(config, SpinRng::seeded(seed))
    }
}

impl<R: RngCore> SpinCoordinator<R> {
    /// Validate `config` and build an idle cabinet drawing from `rng`
    pub fn new(config: MachineConfig, mut rng: R) -> ConfigResult<Self> {
        config.validate()?;
        let reels = std::array::from_fn(|_| ReelAnimator::new(config.reel, &mut rng));

        Ok(Self {
            config,
            reels,
            rng,
            state: MachineState::Idle,
            session: None,
            last_outcome: None,
            pending: Vec::new(),
            tick: 0,
            clock: Duration::ZERO,
            spin_count: 0,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPIN REQUESTS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Ask for a new spin
    ///
    /// Ignored while a session is running. Otherwise the stake is offered to
    /// `ledger`; if accepted every reel is reset and spun up.
    pub fn request_spin<L: StakeLedger + ?Sized>(&mut self, stake: u64, ledger: &mut L) -> SpinDecision {
        let rejected = |reason| SpinDecision::Rejected { reason };

        if self.state == MachineState::Spinning {
            return rejected(SpinRejection::Busy);
        }
        if stake == 0 {
            return rejected(SpinRejection::ZeroStake);
        }
        if !ledger.try_debit(stake) {
            return rejected(SpinRejection::InsufficientCredits);
        }

        for reel in &mut self.reels {
            reel.reset();
            reel.start_spin(&mut self.rng);
        }

        self.spin_count += 1;
        let spin_id = self.spin_count;
        self.session = Some(SpinSession::new(
            spin_id,
            stake,
            self.clock,
            self.config.cascade.free_spin(),
        ));
        self.state = MachineState::Spinning;
        self.last_outcome = None;
        self.pending.push(SpinEvent::SpinStarted { spin_id, stake });

        log::debug!("Spin {spin_id} started, stake {stake}");
        SpinDecision::Started { spin_id }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SIMULATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Advance the simulation by one tick of `dt` simulated time
    pub fn advance(&mut self, dt: Duration) -> TickReport {
        self.tick += 1;
        self.clock += dt;

        let mut events = std::mem::take(&mut self.pending);
        let mut outcome = None;

        if let Some(session) = self.session {
            let elapsed = self.clock.saturating_sub(session.started_at);

            // Gates read the phases as they were before this tick moved anything
            let phases: [ReelPhase; REEL_COUNT] = std::array::from_fn(|i| self.reels[i].phase());
            let open: [bool; REEL_COUNT] = std::array::from_fn(|i| session.gate_open(i, elapsed, &phases));

            for (reel_index, reel) in self.reels.iter_mut().enumerate() {
                if open[reel_index] && reel.phase() == ReelPhase::Spinning {
                    if let Some(plan) = reel.begin_deceleration(&self.config.solver) {
                        events.push(SpinEvent::DecelerationStarted { reel_index, plan });
                    }
                }

                if reel.tick() {
                    log::debug!(
                        "Reel {reel_index} stopped on {} (index {}) at tick {}",
                        reel.symbol(),
                        reel.index(),
                        self.tick
                    );
                    events.push(SpinEvent::ReelStopped {
                        reel_index,
                        index: reel.index(),
                        symbol: reel.symbol(),
                    });
                }
            }

            if self.reels.iter().all(|r| r.phase() == ReelPhase::Stopped) {
                let symbols = std::array::from_fn(|i| self.reels[i].symbol());
                let settled = self.config.payout.evaluate(symbols, session.stake);

                log::info!(
                    "Spin {} settled: {} {} {} → {:?} pays {}",
                    session.spin_id,
                    symbols[0],
                    symbols[1],
                    symbols[2],
                    settled.kind,
                    settled.payout
                );

                self.state = MachineState::Settled;
                self.session = None;
                self.last_outcome = Some(settled);
                events.push(SpinEvent::SpinSettled { outcome: settled });
                outcome = Some(settled);
            }
        }

        log::trace!(
            "tick {} clock {:?}: {:?}",
            self.tick,
            self.clock,
            self.reels.iter().map(|r| (r.phase(), r.index(), r.offset())).collect::<Vec<_>>()
        );

        TickReport {
            tick: self.tick,
            clock: self.clock,
            events,
            outcome,
        }
    }

    /// Advance until the current session settles or `max_ticks` elapse
    ///
    /// Returns the settle outcome, or `None` if nothing was spinning or the
    /// budget ran out.
    pub fn run_to_settle(&mut self, dt: Duration, max_ticks: u64) -> Option<SpinOutcome> {
        for _ in 0..max_ticks {
            if self.state != MachineState::Spinning {
                return None;
            }
            if let Some(outcome) = self.advance(dt).outcome {
                return Some(outcome);
            }
        }
        None
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    /// True when a spin request would not be rejected as busy
    pub fn is_idle(&self) -> bool {
        self.state != MachineState::Spinning
    }

    pub fn session(&self) -> Option<&SpinSession> {
        self.session.as_ref()
    }

    pub fn reels(&self) -> &[ReelAnimator; REEL_COUNT] {
        &self.reels
    }

    pub fn reel(&self, index: usize) -> Option<&ReelAnimator> {
        self.reels.get(index)
    }

    /// Per-reel render state
    pub fn views(&self) -> [ReelView; REEL_COUNT] {
        std::array::from_fn(|i| self.reels[i].view())
    }

    /// Outcome of the most recent settled spin
    pub fn last_outcome(&self) -> Option<&SpinOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn spin_count(&self) -> u64 {
        self.spin_count
    }

    pub fn snapshot(&self) -> MachineSnapshot {
        MachineSnapshot {
            state: self.state,
            tick: self.tick,
            clock: self.clock,
            reels: self.views(),
            strips: std::array::from_fn(|i| self.reels[i].strip().clone()),
            session: self.session,
            last_outcome: self.last_outcome,
        }
    }
}
