// tests/properties.rs

use proptest::prelude::*;
use serde_json::{Map, Value};

use pixrun::command::{build_command, to_python_json};
use pixrun::types::{is_truthy_str, ParameterValue};
use pixrun_test_utils::builders::test_robot_path;
use pixrun_test_utils::StubLocator;

fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "\\PC{0,12}".prop_map(Value::String),
    ]
}

fn json_value() -> impl Strategy<Value = Value> {
    json_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            proptest::collection::vec(("\\PC{0,6}", inner), 0..4)
                .prop_map(|entries| Value::Object(entries.into_iter().collect())),
        ]
    })
}

fn json_mapping() -> impl Strategy<Value = Map<String, Value>> {
    proptest::collection::vec(("\\PC{0,8}", json_value()), 0..5)
        .prop_map(|entries| entries.into_iter().collect())
}

proptest! {
    #[test]
    fn structured_token_decodes_back_to_mapping(map in json_mapping()) {
        let robot = test_robot_path();
        let locator = StubLocator::missing();
        let params = ParameterValue::Structured(map.clone());

        let cmd = build_command("task.pix", Some(&params), Some(&robot), &locator).unwrap();
        let token = &cmd.tokens()[3];

        prop_assert_eq!(token, &format!("-p={}", to_python_json(&map).unwrap()));
        let decoded: Map<String, Value> =
            serde_json::from_str(token.strip_prefix("-p=").unwrap()).unwrap();
        prop_assert_eq!(decoded, map);
    }

    #[test]
    fn structured_token_is_pure_ascii(map in json_mapping()) {
        prop_assert!(to_python_json(&map).unwrap().is_ascii());
    }

    #[test]
    fn structured_token_is_printable_ascii(s in any::<String>()) {
        let mut map = Map::new();
        map.insert(s.clone(), Value::String(s));
        let text = to_python_json(&map).unwrap();
        prop_assert!(text.bytes().all(|b| (b' '..=b'~').contains(&b)), "{text:?}");
    }

    #[test]
    fn floats_render_as_parseable_repr(x in any::<f64>().prop_filter("finite", |x| x.is_finite())) {
        let mut map = Map::new();
        map.insert("f".to_string(), Value::from(x));
        let text = to_python_json(&map).unwrap();
        let body = text
            .strip_prefix("{\"f\": ")
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap();

        prop_assert_eq!(body.parse::<f64>().unwrap(), x);
        match body.split_once('e') {
            Some((_, exp)) => {
                prop_assert!(exp.starts_with('+') || exp.starts_with('-'), "{body}");
                prop_assert!(exp.len() >= 3, "{body}");
            }
            None => prop_assert!(body.contains('.'), "{body}"),
        }
    }

    #[test]
    fn raw_token_is_quote_wrapped(s in "\\PC{0,40}") {
        let robot = test_robot_path();
        let locator = StubLocator::missing();
        let params = ParameterValue::Raw(s.clone());

        let cmd = build_command("task.pix", Some(&params), Some(&robot), &locator).unwrap();

        prop_assert_eq!(&cmd.tokens()[3], &format!("-p=\"{s}\""));
    }

    #[test]
    fn only_the_truthy_table_is_true(s in "\\PC{0,6}") {
        let expected = matches!(s.to_lowercase().as_str(), "yes" | "y" | "true" | "1");
        prop_assert_eq!(is_truthy_str(&s), expected);
    }
}
