//! A minimal built-in platform for modules made of literal bindings.
//!
//! Each non-blank line is either a `#` comment or `name = literal`, where a
//! literal is an integer, a float, a single- or double-quoted string,
//! `True`, `False` or `None`. It gives stores a compiled representation
//! without embedding a real interpreter, and hosts with their own runtime
//! implement [`Platform`] instead.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Platform;
use crate::error::{Error, Result};
use crate::store::naming::is_identifier;
use crate::types::MagicNumber;

/// Bumped whenever [`CompiledUnit`]'s serialized shape changes.
pub const LITERAL_MAGIC_NUMBER: MagicNumber = MagicNumber::new(3329);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledUnit {
    magic_number: u32,
    pub path: String,
    pub bindings: Vec<(String, Value)>,
}

impl CompiledUnit {
    /// Runs the unit, producing the namespace of a module called `name`.
    /// Later bindings of the same name replace earlier ones.
    pub fn execute(&self, name: &str) -> Module {
        Module {
            name: name.to_string(),
            attributes: self.bindings.iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub attributes: BTreeMap<String, Value>,
}

impl Module {
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }
}

#[derive(Debug, Clone)]
pub struct LiteralPlatform {
    magic_number: MagicNumber,
}

impl LiteralPlatform {
    pub fn new() -> Self {
        Self {
            magic_number: LITERAL_MAGIC_NUMBER,
        }
    }

    /// A platform reporting a different signature, as a second interpreter
    /// revision would.
    pub fn with_magic_number(magic_number: MagicNumber) -> Self {
        Self { magic_number }
    }
}

impl Default for LiteralPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for LiteralPlatform {
    type Code = CompiledUnit;

    fn magic_number(&self) -> MagicNumber {
        self.magic_number
    }

    fn identifier(&self) -> String {
        format!("sqlbundle-literal {}", env!("CARGO_PKG_VERSION"))
    }

    fn compile(&self, source: &[u8], path: &str) -> Result<CompiledUnit> {
        let fail = |line: usize, message: &str| Error::Compilation {
            path: path.to_string(),
            message: format!("line {line}: {message}"),
        };

        let source = std::str::from_utf8(source).map_err(|e| Error::Compilation {
            path: path.to_string(),
            message: format!("source is not UTF-8: {e}"),
        })?;

        let mut bindings = Vec::new();
        for (index, line) in source.lines().enumerate() {
            let line_no = index + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (name, rest) = line
                .split_once('=')
                .ok_or_else(|| fail(line_no, "expected `name = value`"))?;
            let name = name.trim();
            if !is_identifier(name) {
                return Err(fail(line_no, &format!("invalid name `{name}`")));
            }

            let (value, trailing) =
                parse_literal(rest.trim()).map_err(|message| fail(line_no, &message))?;
            let trailing = trailing.trim_start();
            if !trailing.is_empty() && !trailing.starts_with('#') {
                return Err(fail(line_no, &format!("unexpected `{trailing}`")));
            }
            bindings.push((name.to_string(), value));
        }

        Ok(CompiledUnit {
            magic_number: self.magic_number.value(),
            path: path.to_string(),
            bindings,
        })
    }

    fn serialize(&self, code: &CompiledUnit) -> Result<Vec<u8>> {
        let failed = |message: String| Error::Compilation {
            path: code.path.clone(),
            message,
        };
        // JSON would write these as null, which never reads back as a float.
        if let Some((name, _)) = code
            .bindings
            .iter()
            .find(|(_, value)| matches!(value, Value::Float(f) if !f.is_finite()))
        {
            return Err(failed(format!("{name} is not a finite number")));
        }
        serde_json::to_vec(code).map_err(|e| failed(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<CompiledUnit> {
        let unit: CompiledUnit = serde_json::from_slice(bytes)
            .map_err(|e| Error::CorruptData(format!("invalid compiled unit: {e}")))?;
        if unit.magic_number != self.magic_number.value() {
            return Err(Error::CorruptData(format!(
                "compiled unit for magic number {}, expected {}",
                unit.magic_number, self.magic_number
            )));
        }
        Ok(unit)
    }
}

/// Parses one literal from the start of `input`, returning it with the
/// unparsed remainder.
fn parse_literal(input: &str) -> std::result::Result<(Value, &str), String> {
    if let Some(quote) = input.chars().next().filter(|c| *c == '"' || *c == '\'') {
        return parse_string(&input[1..], quote);
    }

    let end = input
        .find(|c: char| c.is_whitespace() || c == '#')
        .unwrap_or(input.len());
    let (token, rest) = input.split_at(end);
    let value = match token {
        "" => return Err("missing value".to_string()),
        "True" => Value::Bool(true),
        "False" => Value::Bool(false),
        "None" => Value::None,
        _ => {
            let digits = token.replace('_', "");
            if let Ok(int) = digits.parse::<i64>() {
                Value::Int(int)
            } else if let Ok(float) = digits.parse::<f64>() {
                if token.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
                    return Err(format!("invalid literal `{token}`"));
                }
                Value::Float(float)
            } else {
                return Err(format!("invalid literal `{token}`"));
            }
        }
    };
    Ok((value, rest))
}

fn parse_string(input: &str, quote: char) -> std::result::Result<(Value, &str), String> {
    let mut value = String::new();
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                let (_, escaped) = chars
                    .next()
                    .ok_or_else(|| "unterminated string".to_string())?;
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    '\\' | '\'' | '"' => escaped,
                    other => return Err(format!("unknown escape `\\{other}`")),
                });
            }
            c if c == quote => return Ok((Value::Str(value), &input[i + c.len_utf8()..])),
            c => value.push(c),
        }
    }
    Err("unterminated string".to_string())
}
