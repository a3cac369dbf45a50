// src/command.rs

//! Command-line assembly for the robot executor.
//!
//! The robot accepts exactly:
//!
//! ```text
//! <executor_path> -f <script_path> [-p=<param-encoding>]
//! ```
//!
//! where `<param-encoding>` is either a quoted raw string or inline JSON.

use std::io;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::{Map, Value};
use tracing::{error, info};

use crate::errors::{PixError, Result};
use crate::locate::LocatorStrategy;
use crate::types::{CommandLine, ParameterValue};

/// Script flag understood by the robot.
pub const SCRIPT_FLAG: &str = "-f";

/// Prefix of the parameters token.
pub const PARAMS_PREFIX: &str = "-p=";

/// Build the robot command line for a script.
///
/// - Without `robot_path`, `locator` is consulted exactly once; with it,
///   the locator is never touched.
/// - The executor path is always made absolute.
pub fn build_command(
    script_path: &str,
    script_parameters: Option<&ParameterValue>,
    robot_path: Option<&Path>,
    locator: &dyn LocatorStrategy,
) -> Result<CommandLine> {
    if script_path.is_empty() {
        return Err(PixError::ConfigError(
            "script_path must not be empty".to_string(),
        ));
    }

    let executor = match robot_path {
        Some(path) => path.to_path_buf(),
        None => locator.locate().inspect_err(|err| {
            error!(locator = locator.name(), error = %err, "robot executable lookup failed");
        })?,
    };
    let executor = std::path::absolute(&executor).map_err(|e| {
        PixError::ConfigError(format!(
            "cannot make robot path '{}' absolute: {e}",
            executor.display()
        ))
    })?;

    let mut tokens = vec![
        executor.to_string_lossy().into_owned(),
        SCRIPT_FLAG.to_string(),
        script_path.to_string(),
    ];

    if let Some(params) = script_parameters {
        tokens.push(encode_parameters(params)?);
    }

    let cmd = CommandLine::from_tokens(tokens)
        .ok_or_else(|| PixError::ConfigError("empty command line".to_string()))?;

    info!(generated_cmd = %cmd, "robot command built");
    Ok(cmd)
}

/// Render the `-p=` token for the given parameters.
pub fn encode_parameters(params: &ParameterValue) -> Result<String> {
    match params {
        ParameterValue::Raw(s) => Ok(format!("{PARAMS_PREFIX}\"{s}\"")),
        ParameterValue::Structured(map) => Ok(format!("{PARAMS_PREFIX}{}", to_python_json(map)?)),
    }
}

/// Serialize a mapping the way Python's `json.dumps` does with its
/// defaults:
/// - `", "` / `": "` separators and keys in insertion order;
/// - anything outside printable ASCII escaped as `\uXXXX`;
/// - floats in `repr` form (`123.0`, `1e+16`, `1.5e-07`).
///
/// The robot parses this text, so the exact bytes matter.
pub fn to_python_json(map: &Map<String, Value>) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PythonJsonFormatter);
    map.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| PixError::Other(e.into()))
}

#[derive(Debug, Clone, Copy, Default)]
struct PythonJsonFormatter;

impl Formatter for PythonJsonFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        for ch in fragment.chars() {
            if matches!(ch, ' '..='~') {
                writer.write_all(&[ch as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(python_float_repr(value).as_bytes())
    }
}

/// Python's `repr(float)`: the shortest round-tripping digits, positional
/// for exponents in `-4..16` (always with a fractional part), scientific
/// otherwise with a signed exponent of at least two digits.
fn python_float_repr(value: f64) -> String {
    let sci = format!("{value:e}");
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if !(-4..16).contains(&exp) {
        let (lead, rest) = digits.split_at(1);
        let fraction = if rest.is_empty() {
            String::new()
        } else {
            format!(".{rest}")
        };
        let exp_sign = if exp < 0 { '-' } else { '+' };
        return format!("{sign}{lead}{fraction}e{exp_sign}{:02}", exp.unsigned_abs());
    }

    if exp < 0 {
        let zeros = "0".repeat((-exp - 1) as usize);
        return format!("{sign}0.{zeros}{digits}");
    }

    let int_len = exp as usize + 1;
    if digits.len() <= int_len {
        let zeros = "0".repeat(int_len - digits.len());
        format!("{sign}{digits}{zeros}.0")
    } else {
        let (int_part, frac_part) = digits.split_at(int_len);
        format!("{sign}{int_part}.{frac_part}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn python_separators() {
        let m = map(json!({"time": 120, "list": [1, 2], "nested": {"a": "b"}}));
        assert_eq!(
            to_python_json(&m).unwrap(),
            r#"{"time": 120, "list": [1, 2], "nested": {"a": "b"}}"#
        );
    }

    #[test]
    fn keys_keep_insertion_order() {
        let m = map(json!({"z": 1, "a": 2}));
        assert_eq!(to_python_json(&m).unwrap(), r#"{"z": 1, "a": 2}"#);
    }

    #[test]
    fn non_ascii_is_escaped_lowercase() {
        let m = map(json!({"name": "Отчёт", "emoji": "😀"}));
        assert_eq!(
            to_python_json(&m).unwrap(),
            r#"{"name": "\u041e\u0442\u0447\u0451\u0442", "emoji": "\ud83d\ude00"}"#
        );
    }

    #[test]
    fn control_characters_use_standard_escapes() {
        let m = map(json!({"s": "a\"b\n"}));
        assert_eq!(to_python_json(&m).unwrap(), r#"{"s": "a\"b\n"}"#);
    }

    #[test]
    fn del_and_other_non_printables_are_escaped() {
        let m = map(json!({"s": "a\u{7f}b", "t": "\u{1f}"}));
        assert_eq!(
            to_python_json(&m).unwrap(),
            r#"{"s": "a\u007fb", "t": "\u001f"}"#
        );
    }

    #[test]
    fn floats_use_python_repr() {
        let m = map(json!({
            "x": 1e16,
            "y": 1.5e-7,
            "z": 0.0001,
            "w": 1e15,
            "v": 123.0,
            "u": -0.0,
            "t": 2.5e-5,
            "r": 1e100,
            "q": 123.456,
            "p": f64::MAX,
            "o": 5e-324
        }));
        assert_eq!(
            to_python_json(&m).unwrap(),
            concat!(
                r#"{"x": 1e+16, "y": 1.5e-07, "z": 0.0001, "w": 1000000000000000.0, "#,
                r#""v": 123.0, "u": -0.0, "t": 2.5e-05, "r": 1e+100, "q": 123.456, "#,
                r#""p": 1.7976931348623157e+308, "o": 5e-324}"#
            )
        );
    }

    #[test]
    fn integers_stay_integers() {
        let m = map(json!({"a": 0, "b": -7, "c": u64::MAX}));
        assert_eq!(
            to_python_json(&m).unwrap(),
            r#"{"a": 0, "b": -7, "c": 18446744073709551615}"#
        );
    }

    #[test]
    fn raw_parameters_are_quoted_verbatim() {
        let token = encode_parameters(&ParameterValue::Raw("{'time': 10}".into())).unwrap();
        assert_eq!(token, r#"-p="{'time': 10}""#);
    }

    #[test]
    fn empty_mapping_encodes_as_empty_object() {
        let token = encode_parameters(&ParameterValue::Structured(Map::new())).unwrap();
        assert_eq!(token, "-p={}");
    }
}
