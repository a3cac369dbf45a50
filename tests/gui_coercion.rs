// tests/gui_coercion.rs

use serde_json::{json, Value};

use pixrun::exec::RunnerVariant;
use pixrun::flow::InvocationRequest;
use pixrun::types::{coerce_loose_bool, is_truthy_str};
use pixrun_test_utils::builders::{fake_controller, mapping, test_robot_path};
use pixrun_test_utils::{init_tracing, FakeBackend, StubLocator};

fn truthy_values() -> Vec<Value> {
    vec![
        json!("Y"),
        json!("y"),
        json!("yes"),
        json!("YeS"),
        json!("TRUE"),
        json!("true"),
        json!("1"),
        json!(true),
        json!(1),
    ]
}

fn falsy_values() -> Vec<Value> {
    vec![
        json!("no"),
        json!("n"),
        json!("false"),
        json!("False"),
        json!("0"),
        json!(""),
        json!("maybe"),
        json!("on"),
        json!(" true"),
        json!(false),
        json!(0),
        json!(2),
        json!(1.0),
        json!(null),
        json!([]),
        json!({}),
    ]
}

#[test]
fn truthy_values_coerce_to_true() {
    for v in truthy_values() {
        assert!(coerce_loose_bool(&v), "{v} should coerce to true");
    }
}

#[test]
fn everything_else_coerces_to_false() {
    for v in falsy_values() {
        assert!(!coerce_loose_bool(&v), "{v} should coerce to false");
    }
}

#[test]
fn false_string_is_false_only_by_absence() {
    // There is no falsy table: "false" is false because it is not truthy,
    // exactly like "banana".
    assert_eq!(is_truthy_str("false"), is_truthy_str("banana"));
}

#[test]
fn binding_applies_coercion_and_default() {
    let bound = |need_gui: Option<Value>| {
        let mut params = mapping(json!({"script_path": "task.pix"}));
        if let Some(v) = need_gui {
            params.insert("need_gui".into(), v);
        }
        InvocationRequest::from_params(&params).unwrap().need_gui
    };

    assert!(bound(None));
    for v in truthy_values() {
        assert!(bound(Some(v)));
    }
    for v in falsy_values() {
        assert!(!bound(Some(v)));
    }
}

#[tokio::test]
async fn every_value_routes_to_exactly_one_runner() {
    init_tracing();
    let controller = fake_controller(StubLocator::missing(), FakeBackend::new());

    let cases = truthy_values()
        .into_iter()
        .map(|v| (v, RunnerVariant::Gui))
        .chain(falsy_values().into_iter().map(|v| (v, RunnerVariant::Headless)));

    for (value, expected) in cases {
        let params = mapping(json!({
            "script_path": "task.pix",
            "robot_path": test_robot_path().to_string_lossy(),
            "need_gui": value.clone(),
        }));
        let run = controller.run_params(&params).await;
        assert!(run.succeeded(), "run for {value} failed: {:?}", run.result());
        assert_eq!(run.variant(), Some(expected), "need_gui = {value}");
    }
}
