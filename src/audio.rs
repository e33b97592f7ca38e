//! Fire-and-forget audio cues through the Web Audio API.
//!
//! The sequencer treats cues as pure data; this module is the side-effect
//! boundary that turns a [`Cue`] into an actual tone. Failures are logged
//! and swallowed: a missing or broken audio stack must never affect phase
//! timing.

use std::cell::RefCell;

use pranayama_guide::Cue;
use wasm_bindgen::JsValue;
use web_sys::{AudioContext, OscillatorType};

thread_local! {
    /// One lazily-created context for the whole app. Browsers cap the
    /// number of live contexts, so cues share it.
    static AUDIO_CONTEXT: RefCell<Option<AudioContext>> = RefCell::new(None);
}

/// Play a short tone now.
pub fn play_cue(cue: &Cue) {
    AUDIO_CONTEXT.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_none() {
            match AudioContext::new() {
                Ok(ctx) => *slot = Some(ctx),
                Err(err) => {
                    log::warn!("Audio unavailable: {:?}", err);
                    return;
                }
            }
        }
        if let Some(ctx) = slot.as_ref() {
            if let Err(err) = schedule_tone(ctx, cue) {
                log::warn!("Audio cue failed: {:?}", err);
            }
        }
    });
}

fn schedule_tone(ctx: &AudioContext, cue: &Cue) -> Result<(), JsValue> {
    let oscillator = ctx.create_oscillator()?;
    let gain = ctx.create_gain()?;

    oscillator.set_type(OscillatorType::Sine);
    oscillator.frequency().set_value(cue.freq_hz);
    gain.gain().set_value(0.25);

    oscillator.connect_with_audio_node(&gain)?;
    gain.connect_with_audio_node(&ctx.destination())?;

    let stop_at = ctx.current_time() + f64::from(cue.duration_ms) / 1000.0;
    oscillator.start()?;
    oscillator.stop_with_when(stop_at)?;
    Ok(())
}
