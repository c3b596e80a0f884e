//! Integration tests for groups, event channels and keyed registries.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use callwire::prelude::*;
use common::{Recorder, hud, reset, scoreboard, set_score, set_speed, show_score};

// =============================================================================
// Binding groups
// =============================================================================

#[test]
fn test_group_order_survives_unresolved_binding() {
    let recorder = Recorder::game();
    let missing = MethodInfo::new(TypeInfo::object(common::SCOREBOARD), "Explode");

    let mut group = BindingGroup::new();
    group.add(scoreboard(), &set_score()).unwrap();
    group.add(scoreboard(), &missing).unwrap();
    group.add(scoreboard(), &reset()).unwrap();

    let summary = group.invoke(&recorder.runtime(), &[]);
    assert_eq!(recorder.names(), vec!["Scoreboard.SetScore", "Scoreboard.Reset"]);
    assert_eq!(summary.invoked, 2);
    assert_eq!(summary.skipped, 1);
    assert!(summary.is_ok());
    assert!(matches!(
        group.get(1).unwrap().resolution_status(),
        ResolutionStatus::Failed(ResolveError::MethodNotFound { .. })
    ));
}

#[test]
fn test_group_dispatch_is_repeatable() {
    let recorder = Recorder::game();
    let mut group = BindingGroup::new();
    group.add(scoreboard(), &reset()).unwrap();
    group.add(hud(), &set_speed()).unwrap();

    for _ in 0..3 {
        group.invoke(&recorder.runtime(), &[]);
    }
    assert_eq!(recorder.calls().len(), 6);
    assert_eq!(recorder.names()[4..], ["Scoreboard.Reset", "Hud.set_Speed"]);
}

#[test]
fn test_group_mixes_context_gating() {
    let recorder = Recorder::game();
    let mut group = BindingGroup::new();
    group
        .add(scoreboard(), &reset())
        .unwrap()
        .set_state(CallState::EditorAndRuntime);
    group.add(scoreboard(), &set_score()).unwrap();

    let summary = group.invoke(&recorder.editor(), &[]);
    assert_eq!(summary.invoked, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(recorder.names(), vec!["Scoreboard.Reset"]);
}

// =============================================================================
// Event channels
// =============================================================================

#[test]
fn test_channel_gates_dynamic_mode_by_declared_types() {
    let mut matching: Event2<i32, bool> = Event2::new();
    let binding = matching.group_mut().add(hud(), &show_score()).unwrap();
    assert!(binding.supports_dynamic_mode());
    binding.set_mode(ArgumentMode::Dynamic).unwrap();

    let mut narrower: Event1<f32> = Event1::new();
    let binding = narrower.group_mut().add(hud(), &show_score()).unwrap();
    assert!(!binding.supports_dynamic_mode());
    assert_eq!(
        binding.set_mode(ArgumentMode::Dynamic).unwrap_err(),
        BindingError::DynamicModeNotAllowed
    );

    // Moving the dynamic binding into the narrower channel forces it static.
    let moved = matching.group_mut().remove(0).unwrap();
    narrower.group_mut().push(moved);
    assert_eq!(narrower.group().get(1).unwrap().mode(), ArgumentMode::Static);
}

#[test]
fn test_channel_runs_bindings_then_listeners() {
    let recorder = Recorder::game();
    let order = Rc::new(RefCell::new(Vec::new()));

    let mut on_score: Event2<i32, bool> = Event2::new();
    for tag in ["first", "second"] {
        let order = Rc::clone(&order);
        on_score.add_listener(Rc::new(move |score: i32, best: bool| {
            order.borrow_mut().push(format!("{tag} {score} {best}"));
        }));
    }
    on_score
        .group_mut()
        .add(hud(), &show_score())
        .unwrap()
        .set_mode(ArgumentMode::Dynamic)
        .unwrap();
    on_score.group_mut().add(scoreboard(), &reset()).unwrap();

    let summary = on_score.invoke(&recorder.runtime(), 12, true);
    assert_eq!(summary.invoked, 2);
    assert_eq!(recorder.names(), vec!["Hud.ShowScore", "Scoreboard.Reset"]);
    assert_eq!(
        recorder.calls()[0].args,
        vec![Dynamic::Int(12), Dynamic::Bool(true)]
    );
    assert_eq!(*order.borrow(), vec!["first 12 true", "second 12 true"]);
}

#[test]
fn test_listeners_run_despite_binding_failure() {
    let mut recorder = Recorder::new();
    recorder.refuse(reset());
    let heard = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&heard);

    let mut on_reset = Event0::new();
    on_reset.group_mut().add(scoreboard(), &reset()).unwrap();
    on_reset.add_listener(Rc::new(move || *sink.borrow_mut() += 1));

    let summary = on_reset.invoke(&recorder.runtime());
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(*heard.borrow(), 1);
}

#[test]
fn test_four_argument_channel() {
    let mut recorder = Recorder::new();
    let place = MethodInfo::new(TypeInfo::object(common::HUD), "Place")
        .param("name", String::type_info())
        .param("at", Vector3::type_info())
        .param("tint", Color::type_info())
        .param("visible", bool::type_info());
    recorder.record(place.clone());

    let mut on_place: Event4<String, Vector3, Color, bool> = Event4::new();
    on_place
        .group_mut()
        .add(hud(), &place)
        .unwrap()
        .set_mode(ArgumentMode::Dynamic)
        .unwrap();

    let at = Vector3 {
        x: 1.0,
        y: 2.0,
        z: 3.0,
    };
    let tint = Color {
        r: 1.0,
        g: 0.5,
        b: 0.25,
        a: 1.0,
    };
    on_place.invoke(&recorder.runtime(), "marker".to_owned(), at, tint, true);
    assert_eq!(
        recorder.calls()[0].args,
        vec![
            Dynamic::String("marker".into()),
            Dynamic::Vector3(at),
            Dynamic::Color(tint),
            Dynamic::Bool(true),
        ]
    );
}

// =============================================================================
// Keyed registries
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
enum Trigger {
    Enter,
    Exit,
}

#[test]
fn test_registry_uniqueness_and_removal() {
    let mut registry: KeyedEventRegistry<Trigger, Event0> = KeyedEventRegistry::new();
    registry.add(Trigger::Enter).unwrap();
    assert_eq!(
        registry.add(Trigger::Enter).unwrap_err(),
        RegistryError::DuplicateKey {
            key: "Enter".into()
        }
    );
    assert_eq!(registry.len(), 1);

    assert!(registry.remove(Trigger::Enter));
    assert!(registry.get(Trigger::Enter).is_none());
    assert!(registry.is_empty());
}

#[test]
fn test_registry_dispatches_per_key() {
    let recorder = Recorder::game();
    let mut registry: KeyedEventRegistry<Trigger, Event0> = KeyedEventRegistry::new();
    registry
        .add(Trigger::Enter)
        .unwrap()
        .group_mut()
        .add(scoreboard(), &reset())
        .unwrap();
    registry
        .get_or_add(Trigger::Exit)
        .group_mut()
        .add(hud(), &set_speed())
        .unwrap();

    registry
        .get_mut(Trigger::Exit)
        .unwrap()
        .invoke(&recorder.runtime());
    assert_eq!(recorder.names(), vec!["Hud.set_Speed"]);
}
