//! Target specifier parsing.
//!
//! Accepted forms:
//! - `demo.controller.UserController#getUserById(java.lang.Long)`
//! - `demo.controller.UserController#getUserById` (no declared parameter types)
//! - `demo.Main` (operation defaults to `main`)

use crate::host::TypeRef;
use crate::{DebuggerError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

const DEFAULT_OPERATION: &str = "main";

/// Parsed form of a target specifier. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDescriptor {
    type_name: String,
    operation_name: String,
    parameter_type_names: Vec<String>,
}

impl OperationDescriptor {
    pub fn parse(specifier: &str) -> Result<Self> {
        let (type_part, op_part) = match specifier.split_once('#') {
            Some((t, o)) => (t.trim(), o.trim()),
            None => (specifier.trim(), DEFAULT_OPERATION),
        };

        validate_type_name(type_part)?;

        let (operation_name, parameter_type_names) =
            match (op_part.find('('), op_part.rfind(')')) {
                (Some(left), Some(right)) if left < right => {
                    let name = op_part[..left].trim();
                    let params = split_top_level(&op_part[left + 1..right]);
                    (name, params)
                }
                // Best effort: the whole remainder is the name, arity is
                // settled at invocation time.
                _ => (op_part, Vec::new()),
            };

        if operation_name.is_empty() {
            return Err(DebuggerError::ParseError(format!(
                "'{}' has an empty operation name",
                specifier
            )));
        }

        Ok(Self {
            type_name: type_part.to_string(),
            operation_name: operation_name.to_string(),
            parameter_type_names,
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    pub fn parameter_type_names(&self) -> &[String] {
        &self.parameter_type_names
    }

    pub fn has_declared_types(&self) -> bool {
        !self.parameter_type_names.is_empty()
    }

    pub fn parameter_types(&self) -> Vec<TypeRef> {
        self.parameter_type_names
            .iter()
            .map(|name| TypeRef::parse(name))
            .collect()
    }
}

impl fmt::Display for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{}({})",
            self.type_name,
            self.operation_name,
            self.parameter_type_names.join(",")
        )
    }
}

impl FromStr for OperationDescriptor {
    type Err = DebuggerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn validate_type_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DebuggerError::ParseError(
            "target specifier has an empty type segment".to_string(),
        ));
    }
    let well_formed = name.split('.').all(|segment| {
        let mut chars = segment.chars();
        match chars.next() {
            Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
                chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
            }
            _ => false,
        }
    });
    if well_formed {
        Ok(())
    } else {
        Err(DebuggerError::ParseError(format!(
            "'{}' is not a valid type name",
            name
        )))
    }
}

/// Split a parameter list on commas that are not nested inside `<...>`.
fn split_top_level(list: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in list.chars() {
        match ch {
            '<' => {
                depth += 1;
                current.push(ch);
            }
            '>' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                push_trimmed(&mut out, &current);
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    push_trimmed(&mut out, &current);
    out
}

fn push_trimmed(out: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}
