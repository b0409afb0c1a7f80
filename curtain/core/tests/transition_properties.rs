//! Property tests for panel transition invariants
//!
//! Random request/tick sequences against a small panel tree. Whatever the
//! sequence, the state machine must stay consistent:
//! - a deferred action only exists while a transition is in flight
//! - every panel's event history alternates begin/end correctly
//! - stable panels rest exactly on their terminal progress

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use curtain_core::{
    ApplyMode, EasingFunction, FrameTime, LifecycleEvent, MotionStrategy, Panel, PanelEvent,
    PanelId, PanelOrchestrator, PanelSettings, PanelState, TransitionRequest, TweenTarget,
};

const PANELS: [&str; 4] = ["root", "a", "b", "c"];

#[derive(Debug, Clone)]
enum Step {
    Tick(f32),
    Request {
        panel: usize,
        on: bool,
        force: bool,
        wait: bool,
        cascade: bool,
        exclusive: bool,
    },
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0.0f32..0.4).prop_map(Step::Tick),
        (
            0..PANELS.len(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>()
        )
            .prop_map(|(panel, on, force, wait, cascade, exclusive)| Step::Request {
                panel,
                on,
                force,
                wait,
                cascade,
                exclusive,
            }),
    ]
}

fn build() -> (PanelOrchestrator, Arc<Mutex<Vec<PanelEvent>>>) {
    let mut orchestrator = PanelOrchestrator::default();
    let settings = |motion| PanelSettings {
        on_motion: motion,
        off_motion: motion,
        ..PanelSettings::tween(0.3, 0.2, EasingFunction::EaseInOutSine)
    };

    orchestrator
        .register(Panel::new("root", settings(MotionStrategy::Instant)))
        .unwrap();
    for (name, motion) in [
        ("a", MotionStrategy::Tween),
        ("b", MotionStrategy::Tween),
        ("c", MotionStrategy::Instant),
    ] {
        orchestrator
            .register(
                Panel::new(name, settings(motion))
                    .with_parent("root")
                    .with_target(TweenTarget::Apply(ApplyMode::Fade)),
            )
            .unwrap();
    }

    let log = Arc::new(Mutex::new(Vec::new()));
    for name in PANELS {
        for kind in LifecycleEvent::ALL {
            let log = Arc::clone(&log);
            orchestrator.subscribe(name, kind, move |event, _| {
                log.lock().unwrap().push(event.clone());
            });
        }
    }
    (orchestrator, log)
}

proptest! {
    #[test]
    fn prop_state_machine_stays_consistent(steps in proptest::collection::vec(step(), 1..60)) {
        let (mut orchestrator, log) = build();

        for step in steps {
            match step {
                Step::Tick(dt) => orchestrator.tick(FrameTime::uniform(dt)),
                Step::Request { panel, on, force, wait, cascade, exclusive } => {
                    let request = TransitionRequest::on(PANELS[panel])
                        .force_finish_current(force)
                        .wait_for_current(wait)
                        .cascade_ancestors(cascade)
                        .exclusive_at_same_level(exclusive);
                    let request = if on {
                        request
                    } else {
                        TransitionRequest { direction: curtain_core::Turn::Off, ..request }
                    };
                    orchestrator.turn(request);
                }
            }

            for name in PANELS {
                let panel = orchestrator.get(&PanelId::new(name)).unwrap();
                if panel.deferred().is_some() {
                    prop_assert!(panel.is_animating(), "{name} has a deferred action while stable");
                }
                match panel.state() {
                    PanelState::On => prop_assert!((panel.progress() - 1.0).abs() < 1e-6),
                    PanelState::Off => {
                        prop_assert!(panel.progress().abs() < 1e-6);
                        prop_assert!(!panel.visual().active);
                    }
                    PanelState::TransitioningToOn | PanelState::TransitioningToOff => {}
                }
            }
        }

        // Each panel's events alternate begin → end, matching directions
        let mut open: HashMap<PanelId, LifecycleEvent> = HashMap::new();
        for event in log.lock().unwrap().iter() {
            if event.kind.is_begin() {
                prop_assert!(!open.contains_key(&event.panel), "{} began twice", event.panel);
                open.insert(event.panel.clone(), event.kind);
            } else {
                let begin = open.remove(&event.panel);
                prop_assert_eq!(begin.map(LifecycleEvent::turn), Some(event.kind.turn()));
            }
        }
    }
}
