//! Session phase sequencer.
//!
//! Drives one practice session through a deterministic, time-ordered stream
//! of phase transitions. The sequencer is pure: it never talks to the
//! browser. Every operation returns [`Effect`]s that the presentation shell
//! interprets (schedule a step after a delay, play a cue), so the whole
//! state machine can be exercised with simulated time.
//!
//! At most one step is scheduled at any moment. Each scheduled step carries
//! the session [`epoch`](Session) it was created under; `pause` and `reset`
//! bump the epoch, turning any step that still fires into a no-op. Handle
//! cancellation in the shell is the first line of defense, the epoch check
//! is the second.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::defaults::{HALF_REP_MS, PREPARE_DURATION_MS, REST_DURATION_MS};
use crate::{Cue, Technique};

/// Session lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Idle,
    Preparing,
    Running,
    Paused,
    Finished,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Preparing => "preparing",
            Status::Running => "running",
            Status::Paused => "paused",
            Status::Finished => "finished",
        }
    }
}

/// The instructional phase currently shown to the user.
///
/// `Inhale` and `Exhale` render through the technique's label variants; the
/// rest map to fixed labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Prepare,
    GetReady,
    Inhale,
    Exhale,
    Rest,
    Complete,
}

/// An internal timer step. Only the sequencer schedules these; the shell
/// feeds them back through [`Session::fire`] when their delay elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    /// Begin the next repetition (inhale half).
    EnterRep,
    /// Flip to the exhale half of the current repetition.
    Midpoint,
    /// Close the current repetition; advances, rests, or finishes.
    FinishRep,
    /// Leave the rest period and prepare the next cycle.
    NextCycle,
}

/// A side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Run `step` through [`Session::fire`] after `delay_ms`, passing
    /// `epoch` back unchanged.
    Schedule { delay_ms: u32, step: Step, epoch: u64 },
    /// Play a short tone now. Fire-and-forget; failures must not affect
    /// timing.
    Cue(Cue),
}

/// One live run of a chosen technique.
///
/// The single authoritative record for the session: status, phase, and the
/// repetition/cycle counters all live here and are mutated only by
/// [`start`](Self::start) / [`pause`](Self::pause) /
/// [`resume`](Self::resume) / [`reset`](Self::reset) and by scheduled steps
/// arriving through [`fire`](Self::fire).
///
/// Invariants: `rep <= technique.reps` and `cycle <= technique.cycles` at
/// all times; invalid operations (pause while idle, resume while running,
/// ...) leave the session untouched and return no effects.
#[derive(Debug, Clone)]
pub struct Session {
    technique: Technique,
    status: Status,
    phase: Phase,
    rep: u32,
    cycle: u32,
    epoch: u64,
}

impl Session {
    pub fn new(technique: Technique) -> Self {
        Session {
            technique,
            status: Status::Idle,
            phase: Phase::Prepare,
            rep: 0,
            cycle: 1,
            epoch: 0,
        }
    }

    pub fn technique(&self) -> &Technique {
        &self.technique
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current repetition index, `0..=reps`.
    pub fn rep(&self) -> u32 {
        self.rep
    }

    /// Current cycle index, `1..=cycles`.
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    /// The display label for the current phase.
    pub fn phase_label(&self) -> &str {
        match self.phase {
            Phase::Prepare => "Prepare",
            Phase::GetReady => "Get Ready...",
            Phase::Inhale => &self.technique.inhale_label,
            Phase::Exhale => &self.technique.exhale_label,
            Phase::Rest => "Rest",
            Phase::Complete => "Practice Complete",
        }
    }

    /// Begin the practice. Accepted only from `Idle`; a finished session is
    /// restarted via [`reset`](Self::reset) first.
    pub fn start(&mut self) -> Vec<Effect> {
        if self.status != Status::Idle {
            debug!("Ignoring start while {}", self.status.as_str());
            return Vec::new();
        }
        self.epoch += 1;
        self.status = Status::Preparing;
        self.phase = Phase::GetReady;
        self.rep = 0;
        self.cycle = 1;
        info!(
            "Starting {}: {} reps x {} cycles",
            self.technique.name, self.technique.reps, self.technique.cycles
        );
        vec![self.schedule(PREPARE_DURATION_MS, Step::EnterRep)]
    }

    /// Freeze the session. Accepted only from `Running`; the displayed
    /// phase and counters stay exactly as they were.
    pub fn pause(&mut self) -> Vec<Effect> {
        if self.status != Status::Running {
            debug!("Ignoring pause while {}", self.status.as_str());
            return Vec::new();
        }
        self.epoch += 1;
        self.status = Status::Paused;
        debug!(
            "Paused at rep {}/{} cycle {}/{}",
            self.rep, self.technique.reps, self.cycle, self.technique.cycles
        );
        Vec::new()
    }

    /// Continue a paused session by re-entering the interrupted wait from
    /// its beginning: a paused repetition restarts its inhale/exhale timing
    /// (the counter is not advanced again), a paused rest or preparation
    /// wait restarts in full.
    pub fn resume(&mut self) -> Vec<Effect> {
        if self.status != Status::Paused {
            debug!("Ignoring resume while {}", self.status.as_str());
            return Vec::new();
        }
        self.status = Status::Running;
        match self.phase {
            Phase::Inhale | Phase::Exhale => self.enter_rep(false),
            Phase::Rest => vec![self.schedule(REST_DURATION_MS, Step::NextCycle)],
            Phase::GetReady => vec![self.schedule(PREPARE_DURATION_MS, Step::EnterRep)],
            // Unreachable: pause is only accepted while Running, and a
            // running session is never in Prepare or Complete.
            Phase::Prepare | Phase::Complete => Vec::new(),
        }
    }

    /// Discard the run and return to `Idle`. Accepted from any non-idle
    /// status.
    pub fn reset(&mut self) -> Vec<Effect> {
        if self.status == Status::Idle {
            debug!("Ignoring reset while idle");
            return Vec::new();
        }
        self.epoch += 1;
        self.status = Status::Idle;
        self.phase = Phase::Prepare;
        self.rep = 0;
        self.cycle = 1;
        debug!("Session reset");
        Vec::new()
    }

    /// Deliver a scheduled step. Steps created before the last
    /// pause/reset carry a stale epoch and are dropped without touching the
    /// session.
    pub fn fire(&mut self, epoch: u64, step: Step) -> Vec<Effect> {
        if epoch != self.epoch {
            debug!(
                "Dropping stale {:?} (epoch {} != {})",
                step, epoch, self.epoch
            );
            return Vec::new();
        }
        match step {
            Step::EnterRep => self.enter_rep(true),
            Step::Midpoint => {
                self.phase = Phase::Exhale;
                vec![
                    Effect::Cue(self.technique.midpoint_cue),
                    self.schedule(HALF_REP_MS, Step::FinishRep),
                ]
            }
            Step::FinishRep => {
                if self.rep < self.technique.reps {
                    self.enter_rep(true)
                } else if self.cycle >= self.technique.cycles {
                    // Final cycle: complete immediately, no trailing rest.
                    self.status = Status::Finished;
                    self.phase = Phase::Complete;
                    info!("Practice complete: {}", self.technique.name);
                    Vec::new()
                } else {
                    self.phase = Phase::Rest;
                    debug!("Cycle {}/{} done, resting", self.cycle, self.technique.cycles);
                    vec![self.schedule(REST_DURATION_MS, Step::NextCycle)]
                }
            }
            Step::NextCycle => {
                self.cycle += 1;
                self.rep = 0;
                self.phase = Phase::GetReady;
                vec![self.schedule(PREPARE_DURATION_MS, Step::EnterRep)]
            }
        }
    }

    // Enter a repetition's inhale half. `advance` is false when resume
    // replays the current repetition.
    fn enter_rep(&mut self, advance: bool) -> Vec<Effect> {
        self.status = Status::Running;
        if advance {
            self.rep += 1;
        }
        self.phase = Phase::Inhale;
        vec![
            Effect::Cue(self.technique.rep_start_cue),
            self.schedule(HALF_REP_MS, Step::Midpoint),
        ]
    }

    fn schedule(&self, delay_ms: u32, step: Step) -> Effect {
        Effect::Schedule {
            delay_ms,
            step,
            epoch: self.epoch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{PREPARE_DURATION_MS, REP_DURATION_MS, REST_DURATION_MS};
    use crate::technique_by_id;
    use std::collections::VecDeque;

    /// Simulated scheduler: collects `Schedule` effects into a due-time
    /// queue and feeds them back through `fire`, recording every phase
    /// change and cue along the way.
    struct Harness {
        session: Session,
        queue: VecDeque<(u64, u64, Step)>,
        now: u64,
        phases: Vec<Phase>,
        cues: Vec<Cue>,
    }

    impl Harness {
        fn new(id: &str) -> Self {
            Harness {
                session: Session::new(technique_by_id(id).unwrap().clone()),
                queue: VecDeque::new(),
                now: 0,
                phases: Vec::new(),
                cues: Vec::new(),
            }
        }

        fn apply<F: FnOnce(&mut Session) -> Vec<Effect>>(&mut self, op: F) {
            let before = self.session.phase();
            let effects = op(&mut self.session);
            if self.session.phase() != before {
                self.phases.push(self.session.phase());
            }
            for effect in effects {
                match effect {
                    Effect::Schedule { delay_ms, step, epoch } => {
                        self.queue
                            .push_back((self.now + u64::from(delay_ms), epoch, step));
                    }
                    Effect::Cue(cue) => self.cues.push(cue),
                }
            }
            let reps = self.session.technique().reps;
            let cycles = self.session.technique().cycles;
            assert!(self.session.rep() <= reps, "rep exceeded limit");
            assert!(self.session.cycle() <= cycles, "cycle exceeded limit");
        }

        fn start(&mut self) {
            self.apply(|s| s.start());
        }

        fn pause(&mut self) {
            self.apply(|s| s.pause());
        }

        fn resume(&mut self) {
            self.apply(|s| s.resume());
        }

        fn reset(&mut self) {
            self.apply(|s| s.reset());
        }

        /// Deliver the next scheduled step, stale or not. Returns false
        /// when nothing is queued.
        fn step_once(&mut self) -> bool {
            match self.queue.pop_front() {
                Some((due, epoch, step)) => {
                    self.now = self.now.max(due);
                    self.apply(|s| s.fire(epoch, step));
                    true
                }
                None => false,
            }
        }

        fn run_to_completion(&mut self) {
            while self.step_once() {}
        }

        fn count(&self, phase: Phase) -> usize {
            self.phases.iter().filter(|&&p| p == phase).count()
        }
    }

    #[test]
    fn kapalabhati_full_run() {
        let mut h = Harness::new("kapalabhati");
        h.start();
        assert_eq!(h.session.status(), Status::Preparing);
        assert_eq!(h.session.phase_label(), "Get Ready...");
        h.run_to_completion();

        assert_eq!(h.session.status(), Status::Finished);
        assert_eq!(h.session.phase_label(), "Practice Complete");
        assert_eq!(h.session.rep(), 20);
        assert_eq!(h.session.cycle(), 3);

        assert_eq!(h.count(Phase::Inhale), 60);
        assert_eq!(h.count(Phase::Exhale), 60);
        assert_eq!(h.count(Phase::Rest), 2);
        // One initial preparation plus one before each later cycle.
        assert_eq!(h.count(Phase::GetReady), 3);
        assert_eq!(h.count(Phase::Complete), 1);

        // Two cues per repetition, nothing else.
        assert_eq!(h.cues.len(), 120);

        let expected_ms = u64::from(PREPARE_DURATION_MS)
            + 60 * u64::from(REP_DURATION_MS)
            + 2 * u64::from(REST_DURATION_MS)
            + 2 * u64::from(PREPARE_DURATION_MS);
        assert_eq!(h.now, expected_ms);
    }

    #[test]
    fn bhastrika_full_run_has_no_rest() {
        let mut h = Harness::new("bhastrika");
        h.start();
        h.run_to_completion();

        assert_eq!(h.session.status(), Status::Finished);
        assert_eq!(h.session.rep(), 10);
        assert_eq!(h.session.cycle(), 1);
        assert_eq!(h.count(Phase::Inhale), 10);
        assert_eq!(h.count(Phase::Exhale), 10);
        assert_eq!(h.count(Phase::Rest), 0);
        assert_eq!(h.count(Phase::GetReady), 1);

        let expected_ms = u64::from(PREPARE_DURATION_MS) + 10 * u64::from(REP_DURATION_MS);
        assert_eq!(h.now, expected_ms);
    }

    #[test]
    fn technique_label_variants_are_used() {
        let mut h = Harness::new("bhastrika");
        h.start();
        h.step_once(); // EnterRep
        assert_eq!(h.session.phase_label(), "Inhale & Reach Up");
        h.step_once(); // Midpoint
        assert_eq!(h.session.phase_label(), "Exhale & Pull Down");
    }

    #[test]
    fn every_inhale_is_followed_by_an_exhale() {
        let mut h = Harness::new("kapalabhati");
        h.start();
        h.run_to_completion();

        let mut open_inhale = false;
        for phase in &h.phases {
            match phase {
                Phase::Inhale => {
                    assert!(!open_inhale, "two inhales without an exhale between");
                    open_inhale = true;
                }
                Phase::Exhale => {
                    assert!(open_inhale, "exhale without a preceding inhale");
                    open_inhale = false;
                }
                _ => assert!(!open_inhale, "repetition interrupted by {:?}", phase),
            }
        }
        assert!(!open_inhale);
    }

    #[test]
    fn pause_at_every_scheduling_point() {
        // Count the scheduled steps of an undisturbed run first.
        let total_steps = {
            let mut h = Harness::new("kapalabhati");
            h.start();
            let mut n = 0;
            while h.step_once() {
                n += 1;
            }
            n
        };

        for k in 0..total_steps {
            let mut h = Harness::new("kapalabhati");
            h.start();
            for _ in 0..k {
                h.step_once();
            }
            if h.session.status() != Status::Running {
                continue;
            }
            h.pause();
            let frozen = (h.session.phase(), h.session.rep(), h.session.cycle());
            let emitted = h.phases.len();

            // Drain everything still queued: all of it is stale now.
            h.run_to_completion();
            assert_eq!(h.session.status(), Status::Paused, "pause point {}", k);
            assert_eq!(
                (h.session.phase(), h.session.rep(), h.session.cycle()),
                frozen,
                "pause point {}",
                k
            );
            assert_eq!(h.phases.len(), emitted, "emission after pause, point {}", k);

            h.resume();
            h.run_to_completion();
            assert_eq!(h.session.status(), Status::Finished, "pause point {}", k);
            assert_eq!(h.session.rep(), 20);
            assert_eq!(h.session.cycle(), 3);
        }
    }

    #[test]
    fn resume_restarts_the_current_repetition() {
        let mut h = Harness::new("bhastrika");
        h.start();
        h.step_once(); // EnterRep -> rep 1, Inhale
        h.step_once(); // Midpoint -> Exhale
        assert_eq!(h.session.rep(), 1);
        h.pause();
        h.resume();
        // Back at the inhale half of rep 1, not advanced.
        assert_eq!(h.session.phase(), Phase::Inhale);
        assert_eq!(h.session.rep(), 1);
        h.run_to_completion();
        assert_eq!(h.session.status(), Status::Finished);
        assert_eq!(h.session.rep(), 10);
    }

    #[test]
    fn pause_while_idle_is_ignored() {
        let mut h = Harness::new("kapalabhati");
        h.pause();
        assert_eq!(h.session.status(), Status::Idle);
        assert!(h.queue.is_empty());
        assert!(h.phases.is_empty());
    }

    #[test]
    fn pause_while_preparing_is_ignored() {
        let mut h = Harness::new("kapalabhati");
        h.start();
        h.pause();
        assert_eq!(h.session.status(), Status::Preparing);
        // The initial preparation still runs out into the first repetition.
        h.step_once();
        assert_eq!(h.session.status(), Status::Running);
        assert_eq!(h.session.rep(), 1);
    }

    #[test]
    fn invalid_transitions_are_ignored() {
        let mut h = Harness::new("kapalabhati");
        h.start();
        h.step_once(); // now Running

        let before = h.session.clone();
        assert!(h.session.start().is_empty());
        assert!(h.session.resume().is_empty());
        assert_eq!(h.session.status(), before.status());
        assert_eq!(h.session.phase(), before.phase());
        assert_eq!(h.session.rep(), before.rep());

        h.reset();
        assert!(h.session.reset().is_empty());
        assert_eq!(h.session.status(), Status::Idle);
    }

    #[test]
    fn reset_clears_counters_from_any_status() {
        // From Preparing.
        let mut h = Harness::new("kapalabhati");
        h.start();
        h.reset();
        assert_eq!(h.session.status(), Status::Idle);
        assert_eq!(h.session.phase_label(), "Prepare");

        // From Running, mid-cycle.
        let mut h = Harness::new("kapalabhati");
        h.start();
        for _ in 0..10 {
            h.step_once();
        }
        h.reset();
        assert_eq!(h.session.status(), Status::Idle);
        assert_eq!(h.session.rep(), 0);
        assert_eq!(h.session.cycle(), 1);

        // Queued steps are stale after the reset.
        h.run_to_completion();
        assert_eq!(h.session.status(), Status::Idle);

        // From Paused.
        let mut h = Harness::new("bhastrika");
        h.start();
        h.step_once();
        h.pause();
        h.reset();
        assert_eq!(h.session.status(), Status::Idle);

        // From Finished, and the session is restartable afterwards.
        let mut h = Harness::new("bhastrika");
        h.start();
        h.run_to_completion();
        assert_eq!(h.session.status(), Status::Finished);
        h.reset();
        assert_eq!(h.session.status(), Status::Idle);
        h.start();
        h.run_to_completion();
        assert_eq!(h.session.status(), Status::Finished);
    }

    #[test]
    fn stale_step_after_reset_is_a_no_op() {
        let mut h = Harness::new("kapalabhati");
        let effects = h.session.start();
        let (step, epoch) = match effects[0] {
            Effect::Schedule { step, epoch, .. } => (step, epoch),
            Effect::Cue(_) => unreachable!("start schedules, it does not cue"),
        };
        h.session.reset();
        assert!(h.session.fire(epoch, step).is_empty());
        assert_eq!(h.session.status(), Status::Idle);
        assert_eq!(h.session.rep(), 0);
    }

    #[test]
    fn start_is_rejected_after_finish_until_reset() {
        let mut h = Harness::new("bhastrika");
        h.start();
        h.run_to_completion();
        assert_eq!(h.session.status(), Status::Finished);
        assert!(h.session.start().is_empty());
        assert_eq!(h.session.status(), Status::Finished);
    }
}
