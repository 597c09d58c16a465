// Copyright 2019 Facebook, Inc.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

use failure::Fail;

/// The result of a fallible flag operation.
pub type Result<T> = std::result::Result<T, FlagError>;

/// Finely-grained enumeration of errors that may happen while defining,
/// setting or reading flags.
///
/// Errors raised while scanning an argument vector carry a `context`
/// string: the full argument line followed by a caret underline marking
/// the offending token.
#[derive(Debug, Fail)]
pub enum FlagError {
    /// A flag with this name was already defined on the registry.
    #[fail(display = "flag --{} is defined more than once", name)]
    DuplicateFlag { name: String },

    /// A define call arrived after parsing committed for this registry
    /// generation.
    #[fail(display = "cannot define flag --{} after parse was called", name)]
    RegistrationAfterParse { name: String },

    /// get or is_set was called with a name that was never defined.
    #[fail(display = "unknown flag --{}", name)]
    UnknownFlag { name: String },

    /// A non-cumulative flag was set a second time.
    #[fail(display = "flag --{} is already set", name)]
    AlreadySet { name: String },

    /// The raw token could not be coerced into the flag's typed value.
    #[fail(display = "invalid value for flag --{}: {}", name, message)]
    InvalidValue { name: String, message: String },

    /// A user supplied validator rejected the coerced value.
    #[fail(display = "validation failed for flag --{}: {}", name, message)]
    ValidatorRejection { name: String, message: String },

    /// A token looked like a flag but matched no descriptor.
    #[fail(display = "unrecognized flag --{}\n{}", name, context)]
    UnrecognizedFlag { name: String, context: String },

    /// A top level token that is neither a flag, the `--` separator, nor a
    /// consumed value.
    #[fail(display = "invalid argument '{}'\n{}", token, context)]
    InvalidArgument { token: String, context: String },

    /// A required flag was never set by the time the scan finished.
    #[fail(display = "flag --{} is required but was not provided", name)]
    MissingRequiredFlag { name: String },

    /// A coercion or validation failure re-raised by the parser, annotated
    /// with the position of the offending token in the argument line.
    #[fail(display = "{}\n{}", message, context)]
    Parse { message: String, context: String },
}
