//! Pure Yew view components for the Pranayama Guide UI.
//!
//! This module contains stateless components that render based on props,
//! making them easy to test and reuse.

use pranayama_guide::sequencer::{Phase, Status};
use pranayama_guide::{format_clock_ms, techniques, Technique};
use yew::prelude::*;

use crate::utils::{estimated_remaining_ms, progress_percent};

/// Map session status and phase onto the breathing circle's visual state.
///
/// The circle expands while the user should be breathing in (and during the
/// countdown before a repetition), contracts while breathing out or
/// resting, and sits idle otherwise.
pub fn circle_state(status: Status, phase: Phase) -> &'static str {
    match status {
        Status::Running | Status::Preparing => match phase {
            Phase::Inhale | Phase::GetReady => "inhale",
            Phase::Exhale | Phase::Rest => "exhale",
            Phase::Prepare | Phase::Complete => "idle",
        },
        _ => "idle",
    }
}

/// Technique picker shown before a session begins.
#[derive(Properties, PartialEq)]
pub struct SelectionScreenProps {
    pub on_select: Callback<Technique>,
}

#[function_component(SelectionScreen)]
pub fn selection_screen(props: &SelectionScreenProps) -> Html {
    html! {
        <div class="selection-screen">
            <header class="app-header">
                <h1>{ "Pranayama" }</h1>
                <p>{ "Choose your practice for today." }</p>
            </header>
            <div class="technique-list">
                { techniques().iter().map(|t| {
                    let on_select = props.on_select.clone();
                    let technique = t.clone();
                    html! {
                        <button key={t.id.clone()}
                            class="technique-card"
                            onclick={Callback::from(move |_| on_select.emit(technique.clone()))}
                        >
                            <h2>{ &t.name }</h2>
                            <p class="technique-tagline">{ &t.tagline }</p>
                            <p class="technique-description">{ &t.description }</p>
                        </button>
                    }
                }).collect::<Html>() }
            </div>
        </div>
    }
}

/// The animated circle mirroring the current breath direction.
#[derive(Properties, PartialEq)]
pub struct BreathingCircleProps {
    pub status: Status,
    pub phase: Phase,
}

#[function_component(BreathingCircle)]
pub fn breathing_circle(props: &BreathingCircleProps) -> Html {
    html! {
        <div class={classes!("breathing-circle", circle_state(props.status, props.phase))}></div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ControlButtonProps {
    pub label: String,
    pub onclick: Callback<MouseEvent>,
}

#[function_component(ControlButton)]
pub fn control_button(props: &ControlButtonProps) -> Html {
    html! {
        <button class="control-button" onclick={props.onclick.clone()}>
            { &props.label }
        </button>
    }
}

/// Guide dialog with the technique's instructions and tips.
#[derive(Properties, PartialEq)]
pub struct InfoModalProps {
    pub technique: Technique,
    pub on_close: Callback<()>,
}

#[function_component(InfoModal)]
pub fn info_modal(props: &InfoModalProps) -> Html {
    let close = props.on_close.reform(|_: MouseEvent| ());
    let swallow = Callback::from(|e: MouseEvent| e.stop_propagation());
    html! {
        <div class="modal-overlay" onclick={close.clone()}>
            <div class="modal-body" onclick={swallow}>
                <button class="modal-close" onclick={close}>{ "✕" }</button>
                <h3>{ format!("{} Guide", props.technique.name) }</h3>
                <h4>{ "Instructions:" }</h4>
                <ul>
                    { props.technique.instructions.iter().map(|line| html! {
                        <li>{ line }</li>
                    }).collect::<Html>() }
                </ul>
                <h4>{ "Common Mistakes & Tips:" }</h4>
                <ul>
                    { props.technique.tips.iter().map(|line| html! {
                        <li>{ line }</li>
                    }).collect::<Html>() }
                </ul>
            </div>
        </div>
    }
}

/// Renders the repetition/cycle counters for the current status.
///
/// Multi-cycle techniques show both counters, single-cycle techniques only
/// the repetition counter; a finished session shows a closing line instead.
pub fn render_counters(technique: &Technique, status: Status, rep: u32, cycle: u32) -> Html {
    match status {
        Status::Running | Status::Paused => {
            let text = if technique.cycles > 1 {
                format!(
                    "Rep: {}/{} | Cycle: {}/{}",
                    rep, technique.reps, cycle, technique.cycles
                )
            } else {
                format!("Rep: {}/{}", rep, technique.reps)
            };
            html! { <p class="session-counters">{ text }</p> }
        }
        Status::Finished => html! { <p class="session-counters">{ "Well done!" }</p> },
        _ => html! {},
    }
}

/// Renders overall completion and the estimated time remaining.
pub fn render_progress(technique: &Technique, status: Status, phase: Phase, rep: u32, cycle: u32) -> Html {
    if status == Status::Idle {
        return html! {};
    }
    let pct = progress_percent(rep, cycle, technique);
    let remaining = estimated_remaining_ms(rep, cycle, phase, technique);
    html! {
        <p class="session-progress">
            { format!("{:.0}% complete | {} remaining", pct, format_clock_ms(remaining)) }
        </p>
    }
}
