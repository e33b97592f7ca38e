use once_cell::sync::Lazy;
use std::fmt;

/// Default session timing and cue parameters.
///
/// Every repetition lasts `REP_DURATION_MS`, split into two equal halves
/// (inhale, then exhale). Between cycles the session rests for
/// `REST_DURATION_MS` and then prepares for `PREPARE_DURATION_MS` before the
/// next repetition begins.
pub mod defaults {
    pub const REP_DURATION_MS: u32 = 10_000;
    pub const HALF_REP_MS: u32 = REP_DURATION_MS / 2;
    pub const REST_DURATION_MS: u32 = 5_000;
    pub const PREPARE_DURATION_MS: u32 = 4_000;

    // Cue notes (equal temperament, A4 = 440 Hz)
    pub const NOTE_C4_HZ: f32 = 261.63;
    pub const NOTE_G4_HZ: f32 = 392.00;
    pub const NOTE_C5_HZ: f32 = 523.25;
}

/// A short tone played as a phase cue.
///
/// Pitch and duration are cosmetic; nothing in the session timing depends on
/// them.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Cue {
    pub freq_hz: f32,
    pub duration_ms: u32,
}

/// An immutable catalog entry describing one breathing technique.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Technique {
    /// Stable key used for lookup.
    pub id: String,
    pub name: String,
    pub tagline: String,
    pub description: String,
    /// Repetitions per cycle. Always positive.
    pub reps: u32,
    /// Number of cycles. Always positive; 1 means no rest phases.
    pub cycles: u32,
    /// Label variant shown during the inhale half.
    pub inhale_label: String,
    /// Label variant shown during the exhale half.
    pub exhale_label: String,
    /// Tone played when a repetition begins.
    pub rep_start_cue: Cue,
    /// Tone played at the inhale→exhale midpoint.
    pub midpoint_cue: Cue,
    pub instructions: Vec<String>,
    pub tips: Vec<String>,
}

// Custom error type for catalog lookups
#[derive(Debug)]
pub enum CatalogError {
    UnknownTechnique(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::UnknownTechnique(id) => {
                write!(f, "No technique with id '{}' in the catalog", id)
            }
        }
    }
}

impl std::error::Error for CatalogError {}

static CATALOG: Lazy<Vec<Technique>> = Lazy::new(|| {
    vec![
        Technique {
            id: "kapalabhati".to_string(),
            name: "Kapalabhati".to_string(),
            tagline: "Skull Shining Breath".to_string(),
            description: "Forceful exhalations followed by passive, natural inhalations \
                          to energize and cleanse."
                .to_string(),
            reps: 20,
            cycles: 3,
            inhale_label: "Inhale".to_string(),
            exhale_label: "Exhale".to_string(),
            rep_start_cue: Cue {
                freq_hz: defaults::NOTE_C4_HZ,
                duration_ms: 100,
            },
            midpoint_cue: Cue {
                freq_hz: defaults::NOTE_G4_HZ,
                duration_ms: 50,
            },
            instructions: vec![
                "Sit comfortably with a straight spine.".to_string(),
                "Rest palms on knees, thumb and index finger touching.".to_string(),
                "Close your eyes. Take three natural breaths.".to_string(),
                "Inhale naturally, then forcefully exhale through the nose, drawing the \
                 belly in."
                    .to_string(),
                "Relax the belly to let the inhalation happen automatically.".to_string(),
                "Practice 20 of these pumping movements.".to_string(),
                "End on an exhalation. Take three natural breaths. This is one cycle."
                    .to_string(),
            ],
            tips: vec![
                "Don't force the inhalation; it should be a passive reflex.".to_string(),
                "Keep the face relaxed and shoulders down.".to_string(),
                "The movement comes from the abdomen, not the chest or shoulders.".to_string(),
                "Avoid hunching over or jerking the body.".to_string(),
            ],
        },
        Technique {
            id: "bhastrika".to_string(),
            name: "Bhastrika".to_string(),
            tagline: "Bellows Breath".to_string(),
            description: "Forceful inhalations and exhalations to build heat and vitality."
                .to_string(),
            reps: 10,
            cycles: 1,
            inhale_label: "Inhale & Reach Up".to_string(),
            exhale_label: "Exhale & Pull Down".to_string(),
            rep_start_cue: Cue {
                freq_hz: defaults::NOTE_C4_HZ,
                duration_ms: 200,
            },
            midpoint_cue: Cue {
                freq_hz: defaults::NOTE_C5_HZ,
                duration_ms: 100,
            },
            instructions: vec![
                "Sit comfortably with a straight spine.".to_string(),
                "Close your eyes. Take three natural breaths.".to_string(),
                "Make fists and bring them to your shoulders.".to_string(),
                "As you inhale deeply, reach your fists up to the sky, opening the palms."
                    .to_string(),
                "As you exhale forcefully through the mouth, quickly bring hands back to \
                 the shoulders, drawing the belly in."
                    .to_string(),
                "This is one round. Practice 5-10 rounds.".to_string(),
                "After finishing, rest in Savasana for a minute or two.".to_string(),
            ],
            tips: vec![
                "Breathe from the belly, not the chest.".to_string(),
                "Keep your chin parallel to the floor.".to_string(),
                "Avoid tensing the face or breathing too quickly.".to_string(),
                "If you feel dizzy, stop immediately and rest.".to_string(),
            ],
        },
    ]
});

/// The full, fixed set of selectable techniques, in display order.
pub fn techniques() -> &'static [Technique] {
    &CATALOG
}

/// Look up a technique by its stable id.
pub fn technique_by_id(id: &str) -> Result<&'static Technique, CatalogError> {
    CATALOG
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| CatalogError::UnknownTechnique(id.to_string()))
}

/// Format a millisecond duration as `MM:SS` for display.
pub fn format_clock_ms(ms: u32) -> String {
    let total_seconds = ms / 1000;
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

pub mod sequencer;
