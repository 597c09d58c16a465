// Copyright 2019 Facebook, Inc.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

//! Typed flag descriptors and per-kind value coercion.

use std::fmt;

use crate::errors::{FlagError, Result};
use crate::wrap::wrap;

/// Column width used when laying out help text.
pub(crate) const HELP_WIDTH: usize = 80;

/// The closed set of value kinds a flag can be declared with. The kind
/// determines how a raw token is coerced and whether repeated occurrences
/// accumulate or are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagType {
    String,
    Boolean,
    Integer,
    Number,
    StringList,
    MultiString,
}

/// A typed flag value, either a declared default or the result of coercing
/// a raw command line token.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    String(String),
    Boolean(bool),
    Integer(i64),
    Number(f64),
    List(Vec<String>),
}

impl FlagValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlagValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            FlagValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FlagValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FlagValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FlagValue::List(values) => Some(values),
            _ => None,
        }
    }

    /// Render the value the way it would be written in source. Used for the
    /// `(default: ...)` part of help text.
    fn to_literal(&self) -> String {
        match self {
            FlagValue::String(value) => format!("{:?}", value),
            FlagValue::Boolean(value) => value.to_string(),
            FlagValue::Integer(value) => value.to_string(),
            FlagValue::Number(value) => value.to_string(),
            FlagValue::List(values) => format!("{:?}", values),
        }
    }
}

impl FlagType {
    /// Coerce a raw token into a typed value following the rules of this
    /// kind. `None` means the flag appeared without a value.
    ///
    /// ```
    /// use flagparser::{FlagType, FlagValue};
    ///
    /// assert_eq!(
    ///     FlagType::Boolean.coerce("quiet", None).unwrap(),
    ///     FlagValue::Boolean(true)
    /// );
    /// assert_eq!(
    ///     FlagType::Integer.coerce("count", Some("42")).unwrap(),
    ///     FlagValue::Integer(42)
    /// );
    /// assert!(FlagType::Integer.coerce("count", Some("1.5")).is_err());
    /// ```
    pub fn coerce(&self, name: &str, input: Option<&str>) -> Result<FlagValue> {
        match self {
            FlagType::String | FlagType::MultiString => {
                let input = require_value(name, input)?;
                Ok(FlagValue::String(input.to_string()))
            }
            FlagType::Boolean => match input {
                None => Ok(FlagValue::Boolean(true)),
                Some(input) => match input.to_lowercase().as_str() {
                    "1" | "true" | "t" => Ok(FlagValue::Boolean(true)),
                    "0" | "false" | "f" => Ok(FlagValue::Boolean(false)),
                    _ => Err(invalid(name, format!("'{}' is not a boolean", input))),
                },
            },
            FlagType::Integer => {
                let input = require_value(name, input)?;
                if let Ok(value) = input.parse::<i64>() {
                    return Ok(FlagValue::Integer(value));
                }
                // Integral floats like "3.0" round-trip; fractional input
                // is rejected rather than truncated. Values at or beyond
                // i64 range would saturate on cast, so they are rejected
                // too (i64::MAX as f64 rounds up to 2^63, hence `<`).
                match input.parse::<f64>() {
                    Ok(value)
                        if value.fract() == 0.0
                            && value >= std::i64::MIN as f64
                            && value < std::i64::MAX as f64 =>
                    {
                        Ok(FlagValue::Integer(value as i64))
                    }
                    Ok(_) => Err(invalid(name, format!("'{}' is not an integer", input))),
                    Err(_) => Err(invalid(name, format!("'{}' is not a number", input))),
                }
            }
            FlagType::Number => {
                let input = require_value(name, input)?;
                match input.parse::<f64>() {
                    Ok(value) => Ok(FlagValue::Number(value)),
                    Err(_) => Err(invalid(name, format!("'{}' is not a number", input))),
                }
            }
            FlagType::StringList => match input {
                None => Ok(FlagValue::List(Vec::new())),
                Some(input) => Ok(FlagValue::List(
                    input.split(',').map(|item| item.to_string()).collect(),
                )),
            },
        }
    }
}

fn require_value<'a>(name: &str, input: Option<&'a str>) -> Result<&'a str> {
    input.ok_or_else(|| invalid(name, "a value is required".to_string()))
}

fn invalid(name: &str, message: String) -> FlagError {
    FlagError::InvalidValue {
        name: name.to_string(),
        message,
    }
}

/// Signature of a user supplied validation callback. The validator sees the
/// coerced value and rejects it by returning an error message.
pub type Validator = Box<dyn Fn(&FlagValue) -> std::result::Result<(), String> + Send>;

/// A single registered flag: its kind, default, current value and metadata.
///
/// The current value is only ever written through [`Flag::set`], which runs
/// the kind's coercion and the optional validator. Non-cumulative kinds may
/// be set at most once; `MultiString` accumulates across occurrences.
pub struct Flag {
    name: String,
    flag_type: FlagType,
    default: FlagValue,
    current: Option<FlagValue>,
    description: Option<String>,
    secret: bool,
    required: bool,
    is_set: bool,
    validator: Option<Validator>,
}

impl Flag {
    pub fn new(name: impl ToString, flag_type: FlagType, default: FlagValue) -> Self {
        Flag {
            name: name.to_string(),
            flag_type,
            default,
            current: None,
            description: None,
            secret: false,
            required: false,
            is_set: false,
            validator: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flag_type(&self) -> FlagType {
        self.flag_type
    }

    pub fn is_set(&self) -> bool {
        self.is_set
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }

    /// The current typed value: the default until the flag has been set.
    pub fn value(&self) -> FlagValue {
        if self.is_set {
            match &self.current {
                Some(value) => value.clone(),
                None => self.default.clone(),
            }
        } else {
            self.default.clone()
        }
    }

    /// Coerce `input`, run the validator and record the value.
    pub fn set(&mut self, input: Option<&str>) -> Result<()> {
        if self.is_set && self.flag_type != FlagType::MultiString {
            return Err(FlagError::AlreadySet {
                name: self.name.clone(),
            });
        }
        let value = self.flag_type.coerce(&self.name, input)?;
        if let Some(validator) = &self.validator {
            validator(&value).map_err(|message| FlagError::ValidatorRejection {
                name: self.name.clone(),
                message,
            })?;
        }
        if self.flag_type == FlagType::MultiString {
            if let FlagValue::String(item) = value {
                match &mut self.current {
                    Some(FlagValue::List(items)) => items.push(item),
                    _ => self.current = Some(FlagValue::List(vec![item])),
                }
            }
        } else {
            self.current = Some(value);
        }
        self.is_set = true;
        Ok(())
    }

    pub fn set_default(&mut self, default: FlagValue) -> &mut Self {
        self.default = default;
        self
    }

    pub fn set_description(&mut self, description: impl ToString) -> &mut Self {
        self.description = Some(description.to_string());
        self
    }

    /// Secret flags are omitted from help text.
    pub fn set_secret(&mut self, secret: bool) -> &mut Self {
        self.secret = secret;
        self
    }

    /// Required flags make parsing fail if they were never set.
    pub fn set_required(&mut self, required: bool) -> &mut Self {
        self.required = required;
        self
    }

    pub fn set_validator<F>(&mut self, validator: F) -> &mut Self
    where
        F: Fn(&FlagValue) -> std::result::Result<(), String> + Send + 'static,
    {
        self.validator = Some(Box::new(validator));
        self
    }

    /// One help text block for this flag, wrapped at `width` columns with
    /// continuation lines indented.
    pub(crate) fn help_block(&self, width: usize) -> String {
        let mut text = format!("--{}:", self.name);
        if let Some(description) = &self.description {
            text.push(' ');
            text.push_str(description);
        }
        text.push_str(&format!(" (default: {})", self.default.to_literal()));
        match self.flag_type {
            FlagType::Integer => text.push_str(" (an integer)"),
            FlagType::Number => text.push_str(" (a number)"),
            _ => {}
        }
        let mut block = String::new();
        for (n, line) in wrap(&text, width).iter().enumerate() {
            if n > 0 {
                block.push_str("\n    ");
            }
            block.push_str(line);
        }
        block
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Flag")
            .field("name", &self.name)
            .field("flag_type", &self.flag_type)
            .field("default", &self.default)
            .field("current", &self.current)
            .field("description", &self.description)
            .field("secret", &self.secret)
            .field("required", &self.required)
            .field("is_set", &self.is_set)
            .finish()
    }
}
