// Copyright 2019 Facebook, Inc.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

//! The single-pass argument scanner.
//!
//! Tokens are consumed left to right. `--name=value`, `--name value` and
//! bare `--name` forms are recognized, `--noname` is the boolean negation
//! shorthand, and a lone `--` ends flag scanning with everything after it
//! returned verbatim. Errors carry the reconstructed argument line with a
//! caret underline pointing at the offending token.

use crate::errors::{FlagError, Result};
use crate::registry::Registry;

impl Registry {
    /// Scan `args` and record flag values on this registry, returning the
    /// trailing arguments found after a `--` separator (or an empty vector).
    ///
    /// Parsing commits exactly once per registry generation: a second call
    /// before [`Registry::reset`] is a no-op that returns no trailing
    /// arguments. With `ignore_unrecognized`, tokens that match no defined
    /// flag are skipped instead of failing the parse.
    pub fn parse(&mut self, args: &[String], ignore_unrecognized: bool) -> Result<Vec<String>> {
        if self.parse_called() {
            return Ok(Vec::new());
        }
        self.mark_parse_called();

        let mut trailing = Vec::new();
        let mut saw_separator = false;
        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];
            if arg == "--" {
                trailing.extend_from_slice(&args[i + 1..]);
                saw_separator = true;
                break;
            }
            if !arg.starts_with("--") {
                return Err(FlagError::InvalidArgument {
                    token: arg.clone(),
                    context: caret_context(args, i),
                });
            }
            let token_index = i;
            let mut pieces = arg[2..].splitn(2, '=');
            let mut name = pieces.next().unwrap_or("").to_string();
            let mut value = pieces.next().map(|value| value.to_string());

            // Space-separated form: the next token is the value unless it
            // looks like a flag itself.
            if value.is_none() {
                if let Some(next) = args.get(i + 1) {
                    if !next.starts_with("--") {
                        value = Some(next.clone());
                        i += 1;
                    }
                }
            }

            // Negated boolean shorthand: --noverbose means --verbose=0,
            // tried only when "noverbose" itself is not a defined flag and
            // the stripped name is non-empty (a bare --no stays --no).
            if value.is_none()
                && !self.contains(&name)
                && name.starts_with("no")
                && name.len() > "no".len()
            {
                name = name["no".len()..].to_string();
                value = Some("0".to_string());
            }

            match self.flag_mut(&name) {
                Some(flag) => {
                    flag.set(value.as_ref().map(String::as_str)).map_err(|err| {
                        FlagError::Parse {
                            message: err.to_string(),
                            context: caret_context(args, token_index),
                        }
                    })?;
                }
                None if ignore_unrecognized => {}
                None => {
                    return Err(FlagError::UnrecognizedFlag {
                        name,
                        context: caret_context(args, token_index),
                    });
                }
            }
            i += 1;
        }

        if !saw_separator {
            for flag in self.flags() {
                if flag.is_required() && !flag.is_set() {
                    return Err(FlagError::MissingRequiredFlag {
                        name: flag.name().to_string(),
                    });
                }
            }
        }
        Ok(trailing)
    }
}

/// Render the argument line with a caret underline under the token at
/// `index`, spanning its length.
fn caret_context(args: &[String], index: usize) -> String {
    let line = args.join(" ");
    let column: usize = args.iter().take(index).map(|arg| arg.len() + 1).sum();
    let width = args.get(index).map(|arg| arg.len()).unwrap_or(1).max(1);
    format!("{}\n{}{}", line, " ".repeat(column), "^".repeat(width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::FlagValue;

    fn arglist(args: &[&str]) -> Vec<String> {
        args.iter().map(|x| (*x).to_string()).collect()
    }

    #[test]
    fn test_equals_form() {
        let mut registry = Registry::new();
        registry.define_string("one", "111").unwrap();
        registry.parse(&arglist(&["--one=aaa"]), false).unwrap();
        assert_eq!(registry.get("one").unwrap().as_str(), Some("aaa"));
        assert!(registry.is_set("one").unwrap());
    }

    #[test]
    fn test_space_separated_form() {
        let mut registry = Registry::new();
        registry.define_string("one", "111").unwrap();
        registry.parse(&arglist(&["--one", "aaa"]), false).unwrap();
        assert_eq!(registry.get("one").unwrap().as_str(), Some("aaa"));
    }

    #[test]
    fn test_value_with_equals_signs() {
        let mut registry = Registry::new();
        registry.define_string("expr", "").unwrap();
        registry.parse(&arglist(&["--expr=a=b=c"]), false).unwrap();
        assert_eq!(registry.get("expr").unwrap().as_str(), Some("a=b=c"));
    }

    #[test]
    fn test_boolean_bare_form() {
        let mut registry = Registry::new();
        registry.define_boolean("a", false).unwrap();
        registry.parse(&arglist(&["--a"]), false).unwrap();
        assert_eq!(registry.get("a").unwrap(), FlagValue::Boolean(true));
    }

    #[test]
    fn test_boolean_negation_shorthand() {
        let mut registry = Registry::new();
        registry.define_boolean("verbose", true).unwrap();
        registry.parse(&arglist(&["--noverbose"]), false).unwrap();
        assert_eq!(registry.get("verbose").unwrap(), FlagValue::Boolean(false));
    }

    #[test]
    fn test_negation_shadowed_by_real_flag() {
        // A flag literally named "nonotify" wins over the shorthand for
        // "notify"; the heuristic is only tried for undefined names.
        let mut registry = Registry::new();
        registry.define_boolean("notify", true).unwrap();
        registry.define_boolean("nonotify", false).unwrap();
        registry.parse(&arglist(&["--nonotify"]), false).unwrap();
        assert_eq!(registry.get("nonotify").unwrap(), FlagValue::Boolean(true));
        assert_eq!(registry.get("notify").unwrap(), FlagValue::Boolean(true));
        assert!(!registry.is_set("notify").unwrap());
    }

    #[test]
    fn test_bare_no_token() {
        let mut registry = Registry::new();
        let err = registry.parse(&arglist(&["--no"]), false).unwrap_err();
        assert!(match err {
            FlagError::UnrecognizedFlag { ref name, .. } => name == "no",
            _ => false,
        });
    }

    #[test]
    fn test_boolean_invalid_token() {
        let mut registry = Registry::new();
        registry.define_boolean("a", false).unwrap();
        let err = registry.parse(&arglist(&["--a=yes"]), false).unwrap_err();
        assert!(err.to_string().contains("is not a boolean"));
    }

    #[test]
    fn test_unset_flag_returns_default() {
        let mut registry = Registry::new();
        registry.define_integer("age", 21).unwrap();
        registry.parse(&[], false).unwrap();
        assert_eq!(registry.get("age").unwrap(), FlagValue::Integer(21));
        assert!(!registry.is_set("age").unwrap());
    }

    #[test]
    fn test_integer_rejects_fractional() {
        let mut registry = Registry::new();
        registry.define_integer("n", 0).unwrap();
        let err = registry.parse(&arglist(&["--n=1.5"]), false).unwrap_err();
        assert!(err.to_string().contains("is not an integer"));
    }

    #[test]
    fn test_string_list_round_trip() {
        let mut registry = Registry::new();
        registry.define_string_list("x", Vec::new()).unwrap();
        registry.parse(&arglist(&["--x=a,b,c"]), false).unwrap();
        assert_eq!(
            registry.get("x").unwrap(),
            FlagValue::List(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_multi_string_accumulation() {
        let mut registry = Registry::new();
        registry.define_multi_string("x", Vec::new()).unwrap();
        registry
            .parse(&arglist(&["--x=a", "--x=b"]), false)
            .unwrap();
        assert_eq!(
            registry.get("x").unwrap(),
            FlagValue::List(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_repeated_singular_flag_fails() {
        let mut registry = Registry::new();
        registry.define_string("one", "").unwrap();
        let err = registry
            .parse(&arglist(&["--one=1", "--one=2"]), false)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("already set"));
        assert!(message.contains("--one=1 --one=2"));
    }

    #[test]
    fn test_trailing_args() {
        let mut registry = Registry::new();
        registry.define_integer("one", 0).unwrap();
        let trailing = registry
            .parse(&arglist(&["--one=2", "--", "x", "y"]), false)
            .unwrap();
        assert_eq!(trailing, arglist(&["x", "y"]));
        assert_eq!(registry.get("one").unwrap(), FlagValue::Integer(2));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let mut registry = Registry::new();
        registry.define_string("one", "").unwrap();
        registry.parse(&arglist(&["--one=first"]), false).unwrap();
        let trailing = registry
            .parse(&arglist(&["--one=second", "--", "x"]), false)
            .unwrap();
        assert!(trailing.is_empty());
        assert_eq!(registry.get("one").unwrap().as_str(), Some("first"));
    }

    #[test]
    fn test_define_after_parse_fails() {
        let mut registry = Registry::new();
        registry.parse(&[], false).unwrap();
        assert!(match registry.define_string("x", "") {
            Err(FlagError::RegistrationAfterParse { .. }) => true,
            _ => false,
        });
    }

    #[test]
    fn test_required_flag_missing() {
        let mut registry = Registry::new();
        registry
            .define_integer("one", 1)
            .unwrap()
            .set_required(true);
        let err = registry.parse(&[], false).unwrap_err();
        assert!(match err {
            FlagError::MissingRequiredFlag { ref name } => name == "one",
            _ => false,
        });
    }

    #[test]
    fn test_required_flag_present() {
        let mut registry = Registry::new();
        registry
            .define_integer("one", 1)
            .unwrap()
            .set_required(true);
        registry.parse(&arglist(&["--one=2"]), false).unwrap();
        assert_eq!(registry.get("one").unwrap(), FlagValue::Integer(2));
    }

    #[test]
    fn test_required_check_skipped_after_separator() {
        // A scan cut short by the -- separator does not enforce required
        // flags; everything after it is handed back untouched.
        let mut registry = Registry::new();
        registry
            .define_integer("one", 1)
            .unwrap()
            .set_required(true);
        let trailing = registry.parse(&arglist(&["--", "x"]), false).unwrap();
        assert_eq!(trailing, arglist(&["x"]));
    }

    #[test]
    fn test_unrecognized_flag() {
        let mut registry = Registry::new();
        let err = registry.parse(&arglist(&["--ghost"]), false).unwrap_err();
        assert!(match err {
            FlagError::UnrecognizedFlag { ref name, .. } => name == "ghost",
            _ => false,
        });
    }

    #[test]
    fn test_ignore_unrecognized() {
        let mut registry = Registry::new();
        registry.define_integer("known", 0).unwrap();
        // "--ghost value" consumes its lookahead value, then is skipped.
        registry
            .parse(&arglist(&["--ghost", "value", "--known=1"]), true)
            .unwrap();
        assert_eq!(registry.get("known").unwrap(), FlagValue::Integer(1));
    }

    #[test]
    fn test_invalid_argument() {
        let mut registry = Registry::new();
        let err = registry.parse(&arglist(&["hello"]), false).unwrap_err();
        assert!(match err {
            FlagError::InvalidArgument { ref token, .. } => token == "hello",
            _ => false,
        });
    }

    #[test]
    fn test_caret_context_first_token() {
        let mut registry = Registry::new();
        registry.define_integer("num", 0).unwrap();
        let err = registry.parse(&arglist(&["--num=abc"]), false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for flag --num: 'abc' is not a number\n\
             --num=abc\n\
             ^^^^^^^^^"
        );
    }

    #[test]
    fn test_caret_context_is_positional() {
        let mut registry = Registry::new();
        registry.define_integer("one", 0).unwrap();
        registry.define_integer("num", 0).unwrap();
        let err = registry
            .parse(&arglist(&["--one=1", "--num=x"]), false)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for flag --num: 'x' is not a number\n--one=1 --num=x\n        ^^^^^^^"
        );
    }

    #[test]
    fn test_validator_failure_has_context() {
        let mut registry = Registry::new();
        registry
            .define_integer("port", 0)
            .unwrap()
            .set_validator(|value| match value.as_integer() {
                Some(port) if port > 0 => Ok(()),
                _ => Err("port must be positive".to_string()),
            });
        let err = registry.parse(&arglist(&["--port=0"]), false).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("port must be positive"));
        assert!(message.contains("--port=0\n^^^^^^^^"));
    }

    #[test]
    fn test_negative_number_as_value() {
        let mut registry = Registry::new();
        registry.define_integer("n", 0).unwrap();
        registry.parse(&arglist(&["--n", "-5"]), false).unwrap();
        assert_eq!(registry.get("n").unwrap(), FlagValue::Integer(-5));
    }

    #[test]
    fn test_builtin_help_flag_parses() {
        let mut registry = Registry::new();
        registry.parse(&arglist(&["--help"]), false).unwrap();
        assert_eq!(registry.get("help").unwrap(), FlagValue::Boolean(true));
    }
}
