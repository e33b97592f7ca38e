//! Custom hook owning the live session and its timer.
//!
//! `use_session` keeps the [`Session`] itself out of Yew state: the FSM
//! lives in a `use_mut_ref` cell so timer callbacks can mutate it directly,
//! and a version counter state forces a re-render after every transition.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use pranayama_guide::sequencer::{Effect, Phase, Session, Status};
use pranayama_guide::Technique;
use yew::prelude::*;

use crate::audio;

/// Snapshot of the session plus the user-action callbacks.
#[derive(Clone)]
pub struct SessionHandle {
    pub status: Status,
    pub phase: Phase,
    pub phase_label: String,
    pub rep: u32,
    pub cycle: u32,
    pub start: Callback<()>,
    pub pause: Callback<()>,
    pub resume: Callback<()>,
    pub reset: Callback<()>,
}

/// Interpret sequencer effects: cues play immediately, schedules become the
/// single pending `Timeout`. The fired callback clears its own handle,
/// delivers the step, and recurses on whatever the session asks for next.
fn run_effects(
    session: &Rc<RefCell<Session>>,
    pending: &Rc<RefCell<Option<Timeout>>>,
    version: &UseStateHandle<usize>,
    effects: Vec<Effect>,
) {
    for effect in effects {
        match effect {
            Effect::Cue(cue) => audio::play_cue(&cue),
            Effect::Schedule {
                delay_ms,
                step,
                epoch,
            } => {
                let session_cb = session.clone();
                let pending_cb = pending.clone();
                let version_cb = version.clone();
                let handle = Timeout::new(delay_ms, move || {
                    // Clear the spent handle before anything else so a new
                    // schedule never races the old slot.
                    pending_cb.borrow_mut().take();
                    let next = session_cb.borrow_mut().fire(epoch, step);
                    version_cb.set(version_cb.wrapping_add(1));
                    run_effects(&session_cb, &pending_cb, &version_cb, next);
                });
                *pending.borrow_mut() = Some(handle);
            }
        }
    }
}

/// Drive one practice session for the given technique.
#[hook]
pub fn use_session(technique: Technique) -> SessionHandle {
    let session = {
        let initial = technique.clone();
        use_mut_ref(move || Session::new(initial))
    };
    let pending = use_mut_ref(|| None::<Timeout>);
    let version = use_state(|| 0usize);

    // If the technique prop changes without a remount, discard the old run.
    {
        let session = session.clone();
        let pending = pending.clone();
        let version = version.clone();
        use_effect_with(technique.clone(), move |t: &Technique| {
            if session.borrow().technique() != t {
                pending.borrow_mut().take();
                *session.borrow_mut() = Session::new(t.clone());
                version.set(version.wrapping_add(1));
            }
            || ()
        });
    }

    // Unmount cleanup: cancel whatever is still scheduled. Taking the
    // handle out of the slot also breaks the handle→closure→slot Rc cycle
    // so the session state can actually drop.
    {
        let pending = pending.clone();
        use_effect_with((), move |_| {
            move || {
                pending.borrow_mut().take();
            }
        });
    }

    let start = {
        let session = session.clone();
        let pending = pending.clone();
        let version = version.clone();
        Callback::from(move |_| {
            let effects = session.borrow_mut().start();
            version.set(version.wrapping_add(1));
            run_effects(&session, &pending, &version, effects);
        })
    };

    let pause = {
        let session = session.clone();
        let pending = pending.clone();
        let version = version.clone();
        Callback::from(move |_| {
            let effects = session.borrow_mut().pause();
            // Dropping the handle cancels the timer; the epoch bump inside
            // pause() covers any callback already in flight.
            pending.borrow_mut().take();
            version.set(version.wrapping_add(1));
            run_effects(&session, &pending, &version, effects);
        })
    };

    let resume = {
        let session = session.clone();
        let pending = pending.clone();
        let version = version.clone();
        Callback::from(move |_| {
            let effects = session.borrow_mut().resume();
            version.set(version.wrapping_add(1));
            run_effects(&session, &pending, &version, effects);
        })
    };

    let reset = {
        let session = session.clone();
        let pending = pending.clone();
        let version = version.clone();
        Callback::from(move |_| {
            let effects = session.borrow_mut().reset();
            pending.borrow_mut().take();
            version.set(version.wrapping_add(1));
            run_effects(&session, &pending, &version, effects);
        })
    };

    // Reading the counter ties this hook's output to timer-driven updates.
    let _ = *version;

    let snapshot = session.borrow();
    SessionHandle {
        status: snapshot.status(),
        phase: snapshot.phase(),
        phase_label: snapshot.phase_label().to_string(),
        rep: snapshot.rep(),
        cycle: snapshot.cycle(),
        start,
        pause,
        resume,
        reset,
    }
}
