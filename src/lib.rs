// Copyright 2019 Facebook, Inc.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

//! Define and parse typed command line flags.
//!
//! Flags are declared up front with a kind and a default, an argument
//! vector is parsed exactly once against them, and the typed values are
//! read back afterwards. Parsing freezes the vocabulary: defining flags
//! after a parse fails until [`Registry::reset`] starts a new generation.
//!
//! The core is [`Registry`], an explicit context object that is trivial to
//! use in tests. The module level functions mirror its API on a
//! process-wide default registry for ergonomic top-level use:
//!
//! ```
//! use flagparser::Registry;
//!
//! let mut registry = Registry::new();
//! registry.define_boolean("verbose", false).unwrap();
//! registry
//!     .define_string_list("tags", Vec::new())
//!     .unwrap()
//!     .set_description("comma separated list of tags");
//!
//! let args: Vec<String> = ["--verbose", "--tags=a,b", "--", "leftover"]
//!     .iter()
//!     .map(|a| a.to_string())
//!     .collect();
//! let trailing = registry.parse(&args, false).unwrap();
//! assert_eq!(trailing, vec!["leftover".to_string()]);
//! assert_eq!(registry.get("verbose").unwrap().as_boolean(), Some(true));
//! ```
//!
//! By default the module level [`parse`] reports failures on stderr and
//! exits the process, and honors the built-in `--help` flag by printing
//! the registry's help text; [`set_exit_on_error`] switches it to
//! returning errors for library and test use.

pub mod errors;
pub mod flag;
pub mod macros;
mod parser;
pub mod registry;
pub mod wrap;

pub use crate::errors::{FlagError, Result};
pub use crate::flag::{Flag, FlagType, FlagValue, Validator};
pub use crate::registry::{parse_struct, FlagField, Registry, StructFlags};

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};

use lazy_static::lazy_static;
use parking_lot::Mutex;

lazy_static! {
    /// The process-wide registry behind the module level functions.
    static ref DEFAULT_REGISTRY: Mutex<Registry> = Mutex::new(Registry::new());
}

/// Whether parse failures print and exit instead of returning an error.
static EXIT_ON_ERROR: AtomicBool = AtomicBool::new(true);

/// Select how the module level [`parse`] reports failures: print the
/// formatted message and exit with status 1 (the default), or return the
/// error to the caller.
pub fn set_exit_on_error(exit: bool) {
    EXIT_ON_ERROR.store(exit, Ordering::Relaxed);
}

/// A handle to a flag in the default registry, returned by the module
/// level `define_*` functions for fluent configuration.
///
/// The handle holds only the flag's name. If [`reset`] runs between the
/// define call and a chained setter, the flag is gone from the registry
/// and the setter is a no-op; a stale handle never resurrects a flag.
///
/// ```
/// flagparser::reset();
/// flagparser::define_integer("jobs", 1)
///     .unwrap()
///     .set_description("number of parallel jobs")
///     .set_required(true);
/// # flagparser::reset();
/// ```
pub struct FlagRef {
    name: String,
}

impl FlagRef {
    fn configure(self, configure: impl FnOnce(&mut Flag)) -> Self {
        let mut registry = DEFAULT_REGISTRY.lock();
        if let Some(flag) = registry.flag_mut(&self.name) {
            configure(flag);
        }
        self
    }

    pub fn set_default(self, default: FlagValue) -> Self {
        self.configure(|flag| {
            flag.set_default(default);
        })
    }

    pub fn set_description(self, description: &str) -> Self {
        self.configure(|flag| {
            flag.set_description(description);
        })
    }

    pub fn set_secret(self, secret: bool) -> Self {
        self.configure(|flag| {
            flag.set_secret(secret);
        })
    }

    pub fn set_required(self, required: bool) -> Self {
        self.configure(|flag| {
            flag.set_required(required);
        })
    }

    pub fn set_validator<F>(self, validator: F) -> Self
    where
        F: Fn(&FlagValue) -> std::result::Result<(), String> + Send + 'static,
    {
        self.configure(move |flag| {
            flag.set_validator(validator);
        })
    }
}

/// Define a string flag on the default registry.
pub fn define_string(name: &str, default: &str) -> Result<FlagRef> {
    DEFAULT_REGISTRY.lock().define_string(name, default)?;
    Ok(FlagRef {
        name: name.to_string(),
    })
}

/// Define a boolean flag on the default registry.
pub fn define_boolean(name: &str, default: bool) -> Result<FlagRef> {
    DEFAULT_REGISTRY.lock().define_boolean(name, default)?;
    Ok(FlagRef {
        name: name.to_string(),
    })
}

/// Define an integer flag on the default registry.
pub fn define_integer(name: &str, default: i64) -> Result<FlagRef> {
    DEFAULT_REGISTRY.lock().define_integer(name, default)?;
    Ok(FlagRef {
        name: name.to_string(),
    })
}

/// Define a floating point flag on the default registry.
pub fn define_number(name: &str, default: f64) -> Result<FlagRef> {
    DEFAULT_REGISTRY.lock().define_number(name, default)?;
    Ok(FlagRef {
        name: name.to_string(),
    })
}

/// Define a comma separated list flag on the default registry.
pub fn define_string_list(name: &str, default: Vec<String>) -> Result<FlagRef> {
    DEFAULT_REGISTRY.lock().define_string_list(name, default)?;
    Ok(FlagRef {
        name: name.to_string(),
    })
}

/// Define a cumulative string flag on the default registry.
pub fn define_multi_string(name: &str, default: Vec<String>) -> Result<FlagRef> {
    DEFAULT_REGISTRY.lock().define_multi_string(name, default)?;
    Ok(FlagRef {
        name: name.to_string(),
    })
}

/// Read a flag's typed value from the default registry.
pub fn get(name: &str) -> Result<FlagValue> {
    DEFAULT_REGISTRY.lock().get(name)
}

/// Whether a flag on the default registry has been set.
pub fn is_set(name: &str) -> Result<bool> {
    DEFAULT_REGISTRY.lock().is_set(name)
}

/// Clear the default registry back to its initial state.
pub fn reset() {
    DEFAULT_REGISTRY.lock().reset();
}

/// Set the usage banner shown above the default registry's help text.
pub fn set_usage(usage: &str) {
    DEFAULT_REGISTRY.lock().set_usage(usage);
}

/// Render the default registry's help text.
pub fn help_text() -> String {
    DEFAULT_REGISTRY.lock().help_text()
}

/// Parse `args` against the default registry.
///
/// In exit-on-error mode (the default) a parse failure prints the
/// formatted message to stderr and exits with status 1, and a true
/// `--help` flag prints the help text to stdout and exits with status 0.
/// With [`set_exit_on_error`] turned off, errors are returned and help
/// handling is left to the caller.
pub fn parse(args: &[String], ignore_unrecognized: bool) -> Result<Vec<String>> {
    let result = DEFAULT_REGISTRY.lock().parse(args, ignore_unrecognized);
    let exit_on_error = EXIT_ON_ERROR.load(Ordering::Relaxed);
    match result {
        Ok(trailing) => {
            if exit_on_error {
                let registry = DEFAULT_REGISTRY.lock();
                if let Ok(FlagValue::Boolean(true)) = registry.get("help") {
                    println!("{}", registry.help_text());
                    process::exit(0);
                }
            }
            Ok(trailing)
        }
        Err(err) => {
            if exit_on_error {
                eprintln!("{}", err);
                process::exit(1);
            }
            Err(err)
        }
    }
}
