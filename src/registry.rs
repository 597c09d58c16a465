// Copyright 2019 Facebook, Inc.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

//! The flag registry: named descriptors, lifecycle and help text.

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::errors::{FlagError, Result};
use crate::flag::{Flag, FlagType, FlagValue, HELP_WIDTH};

/// An insertion-ordered mapping from flag name to descriptor, with a latch
/// that freezes the vocabulary once an argument vector has been parsed.
///
/// A fresh registry holds one built-in flag: `help` (Boolean, secret,
/// default false). [`Registry::reset`] restores that initial state.
///
/// ```
/// use flagparser::Registry;
///
/// let mut registry = Registry::new();
/// registry.define_string("name", "alice").unwrap();
/// registry.define_integer("retries", 3).unwrap();
///
/// let args: Vec<String> = ["--name=bob", "--retries", "5"]
///     .iter()
///     .map(|a| a.to_string())
///     .collect();
/// let trailing = registry.parse(&args, false).unwrap();
/// assert!(trailing.is_empty());
/// assert_eq!(registry.get("name").unwrap().as_str(), Some("bob"));
/// assert_eq!(registry.get("retries").unwrap().as_integer(), Some(5));
/// ```
pub struct Registry {
    flags: IndexMap<String, Flag>,
    usage: Option<String>,
    parse_called: bool,
}

impl Registry {
    /// Create a registry holding only the built-in `help` flag.
    pub fn new() -> Self {
        let mut registry = Registry {
            flags: IndexMap::new(),
            usage: None,
            parse_called: false,
        };
        registry.install_builtins();
        registry
    }

    fn install_builtins(&mut self) {
        let mut help = Flag::new("help", FlagType::Boolean, FlagValue::Boolean(false));
        help.set_description("print this help text").set_secret(true);
        self.flags.insert("help".to_string(), help);
    }

    fn define(&mut self, flag: Flag) -> Result<&mut Flag> {
        if self.parse_called {
            return Err(FlagError::RegistrationAfterParse {
                name: flag.name().to_string(),
            });
        }
        match self.flags.entry(flag.name().to_string()) {
            Entry::Occupied(entry) => Err(FlagError::DuplicateFlag {
                name: entry.key().clone(),
            }),
            Entry::Vacant(entry) => Ok(entry.insert(flag)),
        }
    }

    /// Define a flag taking an arbitrary string value.
    ///
    /// Like every `define_*` method this returns the descriptor for fluent
    /// configuration: `registry.define_string("name", "")?.set_required(true)`.
    pub fn define_string(&mut self, name: &str, default: &str) -> Result<&mut Flag> {
        self.define(Flag::new(
            name,
            FlagType::String,
            FlagValue::String(default.to_string()),
        ))
    }

    /// Define a boolean flag. `--name` alone means true; `--noname` is the
    /// negation shorthand.
    pub fn define_boolean(&mut self, name: &str, default: bool) -> Result<&mut Flag> {
        self.define(Flag::new(
            name,
            FlagType::Boolean,
            FlagValue::Boolean(default),
        ))
    }

    /// Define a flag taking an integer value. Fractional input is rejected.
    pub fn define_integer(&mut self, name: &str, default: i64) -> Result<&mut Flag> {
        self.define(Flag::new(
            name,
            FlagType::Integer,
            FlagValue::Integer(default),
        ))
    }

    /// Define a flag taking a floating point value.
    pub fn define_number(&mut self, name: &str, default: f64) -> Result<&mut Flag> {
        self.define(Flag::new(name, FlagType::Number, FlagValue::Number(default)))
    }

    /// Define a flag whose single value is split on commas into a list.
    pub fn define_string_list(&mut self, name: &str, default: Vec<String>) -> Result<&mut Flag> {
        self.define(Flag::new(
            name,
            FlagType::StringList,
            FlagValue::List(default),
        ))
    }

    /// Define a cumulative flag: each occurrence appends its value.
    pub fn define_multi_string(&mut self, name: &str, default: Vec<String>) -> Result<&mut Flag> {
        self.define(Flag::new(
            name,
            FlagType::MultiString,
            FlagValue::List(default),
        ))
    }

    /// Read a flag's typed value: the default until the flag was set.
    pub fn get(&self, name: &str) -> Result<FlagValue> {
        match self.flags.get(name) {
            Some(flag) => Ok(flag.value()),
            None => Err(FlagError::UnknownFlag {
                name: name.to_string(),
            }),
        }
    }

    /// Whether the flag was set by parsing (or programmatically).
    pub fn is_set(&self, name: &str) -> Result<bool> {
        match self.flags.get(name) {
            Some(flag) => Ok(flag.is_set()),
            None => Err(FlagError::UnknownFlag {
                name: name.to_string(),
            }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    pub(crate) fn flag_mut(&mut self, name: &str) -> Option<&mut Flag> {
        self.flags.get_mut(name)
    }

    pub(crate) fn flags(&self) -> impl Iterator<Item = &Flag> {
        self.flags.values()
    }

    /// Whether an argument vector has already been parsed against this
    /// registry generation.
    pub fn parse_called(&self) -> bool {
        self.parse_called
    }

    pub(crate) fn mark_parse_called(&mut self) {
        self.parse_called = true;
    }

    /// Set the banner printed above the per-flag help blocks.
    pub fn set_usage(&mut self, usage: impl ToString) {
        self.usage = Some(usage.to_string());
    }

    /// Render help text: the usage banner, then one block per non-secret
    /// flag in definition order.
    pub fn help_text(&self) -> String {
        let mut out = String::new();
        if let Some(usage) = &self.usage {
            out.push_str(usage);
            out.push('\n');
        }
        for flag in self.flags.values().filter(|flag| !flag.is_secret()) {
            out.push_str(&flag.help_block(HELP_WIDTH));
            out.push('\n');
        }
        out
    }

    /// Drop every flag, reinstall the built-ins and clear the parse latch.
    pub fn reset(&mut self) {
        self.flags.clear();
        self.usage = None;
        self.parse_called = false;
        self.install_builtins();
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

/// Structs generated by `define_flags!` know how to register their fields
/// as flags and rebuild themselves from a parsed registry.
pub trait StructFlags: Sized {
    fn define(registry: &mut Registry) -> Result<()>;
    fn from_registry(registry: &Registry, args: Vec<String>) -> Result<Self>;
}

/// A Rust field type that maps onto one flag kind.
pub trait FlagField: Sized {
    fn define(registry: &mut Registry, name: &str, default: Self, description: &str)
        -> Result<()>;
    fn extract(registry: &Registry, name: &str) -> Result<Self>;
}

fn mismatch(name: &str, value: FlagValue) -> FlagError {
    FlagError::InvalidValue {
        name: name.to_string(),
        message: format!("unexpected value {:?}", value),
    }
}

fn describe(flag: &mut Flag, description: &str) {
    if !description.is_empty() {
        flag.set_description(description);
    }
}

impl FlagField for bool {
    fn define(
        registry: &mut Registry,
        name: &str,
        default: Self,
        description: &str,
    ) -> Result<()> {
        describe(registry.define_boolean(name, default)?, description);
        Ok(())
    }

    fn extract(registry: &Registry, name: &str) -> Result<Self> {
        match registry.get(name)? {
            FlagValue::Boolean(value) => Ok(value),
            other => Err(mismatch(name, other)),
        }
    }
}

impl FlagField for i64 {
    fn define(
        registry: &mut Registry,
        name: &str,
        default: Self,
        description: &str,
    ) -> Result<()> {
        describe(registry.define_integer(name, default)?, description);
        Ok(())
    }

    fn extract(registry: &Registry, name: &str) -> Result<Self> {
        match registry.get(name)? {
            FlagValue::Integer(value) => Ok(value),
            other => Err(mismatch(name, other)),
        }
    }
}

impl FlagField for f64 {
    fn define(
        registry: &mut Registry,
        name: &str,
        default: Self,
        description: &str,
    ) -> Result<()> {
        describe(registry.define_number(name, default)?, description);
        Ok(())
    }

    fn extract(registry: &Registry, name: &str) -> Result<Self> {
        match registry.get(name)? {
            FlagValue::Number(value) => Ok(value),
            other => Err(mismatch(name, other)),
        }
    }
}

impl FlagField for String {
    fn define(
        registry: &mut Registry,
        name: &str,
        default: Self,
        description: &str,
    ) -> Result<()> {
        describe(registry.define_string(name, &default)?, description);
        Ok(())
    }

    fn extract(registry: &Registry, name: &str) -> Result<Self> {
        match registry.get(name)? {
            FlagValue::String(value) => Ok(value),
            other => Err(mismatch(name, other)),
        }
    }
}

impl FlagField for Vec<String> {
    fn define(
        registry: &mut Registry,
        name: &str,
        default: Self,
        description: &str,
    ) -> Result<()> {
        describe(registry.define_multi_string(name, default)?, description);
        Ok(())
    }

    fn extract(registry: &Registry, name: &str) -> Result<Self> {
        match registry.get(name)? {
            FlagValue::List(values) => Ok(values),
            other => Err(mismatch(name, other)),
        }
    }
}

/// Define the flags of `T` on a fresh registry, parse `args` against it and
/// rebuild `T` from the result. Trailing arguments after `--` land in the
/// struct's `#[args]` field if it declares one.
pub fn parse_struct<T: StructFlags>(args: &[String]) -> Result<T> {
    let mut registry = Registry::new();
    T::define(&mut registry)?;
    let trailing = registry.parse(args, false)?;
    T::from_registry(&registry, trailing)
}
