//! Main module for the Pranayama Guide application using Yew.
//! Wires the screens, the session hook, and the entry point.

use pranayama_guide::sequencer::Status;
use pranayama_guide::Technique;
use yew::prelude::*;

mod audio;
mod components;
mod hooks;
mod utils;

use components::{
    render_counters, render_progress, BreathingCircle, ControlButton, InfoModal, SelectionScreen,
};
use hooks::use_session;

#[derive(Properties, PartialEq)]
struct SessionScreenProps {
    technique: Technique,
    on_back: Callback<()>,
}

/// One active practice: breathing circle, phase label, counters, controls.
///
/// Which controls are offered follows the session status: Start from idle,
/// Pause while running, Resume/Reset while paused, Reset after finishing or
/// during the initial preparation.
#[function_component(SessionScreen)]
fn session_screen(props: &SessionScreenProps) -> Html {
    let session = use_session(props.technique.clone());
    let show_info = use_state(|| false);

    let on_back = props.on_back.reform(|_: MouseEvent| ());
    let open_info = {
        let show_info = show_info.clone();
        Callback::from(move |_: MouseEvent| show_info.set(true))
    };
    let close_info = {
        let show_info = show_info.clone();
        Callback::from(move |_| show_info.set(false))
    };

    let controls = match session.status {
        Status::Idle => html! {
            <ControlButton label="Start" onclick={session.start.reform(|_: MouseEvent| ())} />
        },
        Status::Preparing => html! {
            <ControlButton label="Reset" onclick={session.reset.reform(|_: MouseEvent| ())} />
        },
        Status::Running => html! {
            <ControlButton label="Pause" onclick={session.pause.reform(|_: MouseEvent| ())} />
        },
        Status::Paused => html! {
            <>
                <ControlButton label="Resume" onclick={session.resume.reform(|_: MouseEvent| ())} />
                <ControlButton label="Reset" onclick={session.reset.reform(|_: MouseEvent| ())} />
            </>
        },
        Status::Finished => html! {
            <ControlButton label="Reset" onclick={session.reset.reform(|_: MouseEvent| ())} />
        },
    };

    html! {
        <div class="session-screen">
            if *show_info {
                <InfoModal technique={props.technique.clone()} on_close={close_info} />
            }
            <div class="session-header">
                <button class="back-button" onclick={on_back}>{ "← Back" }</button>
                <h1>{ &props.technique.name }</h1>
                <button class="info-button" onclick={open_info}>{ "Info" }</button>
            </div>
            <div class="circle-area">
                <BreathingCircle status={session.status} phase={session.phase} />
            </div>
            <div class="phase-readout">
                <p class="phase-label">{ &session.phase_label }</p>
                { render_counters(&props.technique, session.status, session.rep, session.cycle) }
                { render_progress(&props.technique, session.status, session.phase, session.rep, session.cycle) }
            </div>
            <div class="session-controls">
                { controls }
            </div>
        </div>
    }
}

/// Primary application component switching between selection and session.
#[function_component(Main)]
fn main_component() -> Html {
    let selected = use_state(|| None::<Technique>);

    let on_select = {
        let selected = selected.clone();
        Callback::from(move |technique: Technique| selected.set(Some(technique)))
    };
    let on_back = {
        let selected = selected.clone();
        Callback::from(move |_| selected.set(None))
    };

    html! {
        <div class="container">
            {
                match &*selected {
                    Some(technique) => html! {
                        <SessionScreen technique={technique.clone()} on_back={on_back} />
                    },
                    None => html! { <SelectionScreen on_select={on_select} /> },
                }
            }
            <footer class="app-footer">
                <p>{ "Pranayama Guide App" }</p>
                <p>{ "Always practice safely. Stop if you feel dizzy or unwell." }</p>
            </footer>
        </div>
    }
}

/// Entry point: install the panic hook and start the Yew renderer.
fn main() {
    console_error_panic_hook::set_once();
    yew::Renderer::<Main>::new().render();
}
