//! Pure helpers deriving display values from a session snapshot.

use pranayama_guide::defaults::{
    HALF_REP_MS, PREPARE_DURATION_MS, REP_DURATION_MS, REST_DURATION_MS,
};
use pranayama_guide::sequencer::Phase;
use pranayama_guide::Technique;

/// Total repetitions across all cycles of a technique.
pub fn total_reps(technique: &Technique) -> u32 {
    technique.reps * technique.cycles
}

/// Repetitions begun so far, counting completed cycles plus the current
/// cycle's counter.
pub fn reps_begun(rep: u32, cycle: u32, technique: &Technique) -> u32 {
    cycle.saturating_sub(1) * technique.reps + rep
}

/// Overall completion as a percentage of all repetitions.
pub fn progress_percent(rep: u32, cycle: u32, technique: &Technique) -> f64 {
    f64::from(reps_begun(rep, cycle, technique)) / f64::from(total_reps(technique)) * 100.0
}

/// Upper-bound estimate of the time left in the session, at phase
/// granularity: the current phase is counted in full, then every
/// repetition not yet begun and every remaining rest/preparation pair.
pub fn estimated_remaining_ms(rep: u32, cycle: u32, phase: Phase, technique: &Technique) -> u32 {
    if phase == Phase::Complete {
        return 0;
    }

    let reps_left = total_reps(technique) - reps_begun(rep, cycle, technique);
    let boundaries_left = technique.cycles - cycle;

    let current = match phase {
        Phase::Inhale => REP_DURATION_MS,
        Phase::Exhale => HALF_REP_MS,
        Phase::Rest => REST_DURATION_MS,
        Phase::GetReady | Phase::Prepare => PREPARE_DURATION_MS,
        Phase::Complete => 0,
    };

    let boundary_cost = REST_DURATION_MS + PREPARE_DURATION_MS;
    let interstitial = if phase == Phase::Rest {
        // This boundary's rest is already in `current`; its preparation and
        // the later boundaries are not.
        (boundaries_left - 1) * boundary_cost + PREPARE_DURATION_MS
    } else {
        boundaries_left * boundary_cost
    };

    current + reps_left * REP_DURATION_MS + interstitial
}
