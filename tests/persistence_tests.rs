//! Integration tests for the persisted layout of bindings, groups and registries.

mod common;

use callwire::prelude::*;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde_json::json;

use common::{Recorder, hud, scoreboard, set_score, show_score};

#[derive(Debug, Clone, Copy, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(i32)]
enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl_enum_argument!(Difficulty, "Game.Difficulty");

#[test]
fn test_float_bits_survive_json() {
    for value in [0.1f32, -0.0, f32::MIN_POSITIVE, f32::MAX, 1.0e-38] {
        let arg = ArgumentValue::from_float(value);
        let json = serde_json::to_string(&arg).unwrap();
        let back: ArgumentValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back.float_value().unwrap().to_bits(), value.to_bits());
    }
}

#[test]
fn test_binding_layout() {
    let mut binding = CallBinding::with_method(scoreboard(), &set_score()).unwrap();
    binding.set_argument(0, Dynamic::Int(42)).unwrap();
    binding.set_state(CallState::EditorAndRuntime);

    let value = serde_json::to_value(&binding).unwrap();
    assert_eq!(
        value,
        json!({
            "target": { "id": 10, "type": common::SCOREBOARD },
            "method": "SetScore",
            "arguments": [
                { "tag": 1, "string": "", "object": null, "ints": [42, 0, 0, 0] }
            ],
            "mode": 0,
            "state": 1,
        })
    );
}

#[test]
fn test_missing_fields_take_defaults() {
    let binding: CallBinding = serde_json::from_value(json!({})).unwrap();
    assert!(binding.target().is_none());
    assert!(binding.method_name().is_none());
    assert_eq!(binding.state(), CallState::RuntimeOnly);
    assert_eq!(binding.mode(), ArgumentMode::Static);
}

#[test]
fn test_unknown_state_is_rejected() {
    let result: Result<CallBinding, _> = serde_json::from_value(json!({ "state": 9 }));
    assert!(result.is_err());
}

#[test]
fn test_loaded_binding_invokes() {
    let recorder = Recorder::game();
    let mut binding = CallBinding::with_method(hud(), &show_score()).unwrap();
    binding.set_argument(0, Dynamic::Int(5)).unwrap();
    binding.set_argument(1, Dynamic::Bool(true)).unwrap();
    let json = serde_json::to_string(&binding).unwrap();

    let mut loaded: CallBinding = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded, binding);
    assert_eq!(loaded.resolution_status(), ResolutionStatus::Unresolved);

    // Parameter names are not persisted.
    assert_eq!(loaded.arguments()[0].declared_name(), None);
    assert!(loaded.refresh_argument_names(&recorder.table));
    assert_eq!(loaded.arguments()[1].declared_name(), Some("best"));

    loaded.invoke(&recorder.runtime(), &[]).unwrap();
    assert_eq!(
        recorder.calls()[0].args,
        vec![Dynamic::Int(5), Dynamic::Bool(true)]
    );
}

#[test]
fn test_enum_and_object_arguments() {
    let mut recorder = Recorder::new();
    let configure = MethodInfo::new(TypeInfo::object(common::HUD), "Configure")
        .param("difficulty", Difficulty::type_info())
        .param("owner", TypeInfo::object(common::SCOREBOARD));
    recorder.record(configure.clone());

    let mut binding = CallBinding::with_method(hud(), &configure).unwrap();
    binding
        .edit_argument(0, |arg| arg.set(Difficulty::Hard))
        .unwrap();
    binding
        .edit_argument(1, |arg| arg.set_object_ref(Some(ObjectId(10))))
        .unwrap();

    let json = serde_json::to_string(&binding).unwrap();
    let mut loaded: CallBinding = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded.arguments()[0].get::<Difficulty>(), Ok(Difficulty::Hard));
    assert_eq!(
        loaded.argument_types(),
        &[Difficulty::type_info(), TypeInfo::object(common::SCOREBOARD)][..]
    );

    loaded.invoke(&recorder.runtime(), &[]).unwrap();
    assert_eq!(
        recorder.calls()[0].args,
        vec![
            Difficulty::Hard.into_dynamic(),
            Dynamic::Object(Some(ObjectId(10))),
        ]
    );
}

#[test]
fn test_group_and_registry_round_trip() {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    enum Stage {
        Intro,
        Outro,
    }

    let mut registry: KeyedEventRegistry<Stage, Event1<i32>> = KeyedEventRegistry::new();
    registry
        .add(Stage::Outro)
        .unwrap()
        .group_mut()
        .add(scoreboard(), &set_score())
        .unwrap()
        .set_mode(ArgumentMode::Dynamic)
        .unwrap();
    registry.add(Stage::Intro).unwrap();

    let value = serde_json::to_value(&registry).unwrap();
    assert_eq!(value["keys"], json!(["Outro", "Intro"]));
    assert_eq!(value["channels"][1], json!([]));

    let mut loaded: KeyedEventRegistry<Stage, Event1<i32>> =
        serde_json::from_value(value).unwrap();
    let outro = loaded.get_mut(Stage::Outro).unwrap();
    assert_eq!(outro.group().get(0).unwrap().mode(), ArgumentMode::Dynamic);

    let recorder = Recorder::game();
    outro.invoke(&recorder.runtime(), 77);
    assert_eq!(recorder.calls()[0].args, vec![Dynamic::Int(77)]);
}

#[test]
fn test_duplicate_keys_on_load() {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    enum Stage {
        Intro,
    }

    let value = json!({
        "keys": ["Intro", "Intro"],
        "channels": [[], [{ "method": "Reset" }]],
    });
    let mut loaded: KeyedEventRegistry<Stage, Event0> = serde_json::from_value(value).unwrap();
    assert!(loaded.get(Stage::Intro).unwrap().group().is_empty());

    loaded.set_policy(DuplicateKeyPolicy::KeepLast);
    assert_eq!(loaded.get(Stage::Intro).unwrap().group().len(), 1);
}
