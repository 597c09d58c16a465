// Copyright 2019 Facebook, Inc.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

/// Define a struct whose doc-commented fields are registered as flags and
/// filled in from a parsed registry.
///
/// Field types map onto flag kinds: `bool` (Boolean), `i64` (Integer),
/// `f64` (Number), `String` (String) and `Vec<String>` (MultiString).
/// Underscores in field names become dashes in flag names. A field may
/// carry a `= default` initializer; without one the type's `Default` is
/// used. One `#[args]` field of type `Vec<String>` receives the trailing
/// arguments found after `--`.
#[macro_export]
macro_rules! define_flags {
    ( $( $vis:vis struct $name:ident { $( $token:tt )* } )*  ) => {
        $( $crate::_define_flags_impl!(
            input [ $( $token )* ]
            flags []
            varargs ()
            misc ($vis $name)
        ); )*
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! _define_flags_impl {
    // Nothing left to parse
    ( input []
      flags [ $( ($field:ident, $doc:expr, $type:ty, $default:expr) )* ]
      varargs ( $($varargs:ident)? )
      misc ($vis:vis $name:ident)
    ) => {
        $vis struct $name {
            $( #[doc=$doc] pub $field : $type , )*
            $( pub $varargs: Vec<String>, )?
        }

        impl $crate::registry::StructFlags for $name {
            fn define(registry: &mut $crate::registry::Registry) -> $crate::errors::Result<()> {
                $(
                    <$type as $crate::registry::FlagField>::define(
                        registry,
                        &stringify!($field).replace("_", "-"),
                        $default,
                        $doc.trim(),
                    )?;
                )*
                Ok(())
            }

            fn from_registry(
                registry: &$crate::registry::Registry,
                _args: Vec<String>,
            ) -> $crate::errors::Result<Self> {
                Ok(Self {
                    $( $field : <$type as $crate::registry::FlagField>::extract(
                        registry,
                        &stringify!($field).replace("_", "-"),
                    )?, )*
                    $( $varargs: _args, )?
                })
            }
        }
    };

    // Match a field like:
    //
    //    /// description
    //    name: type,
    ( input [ #[doc=$doc:expr] $field:ident : $type:ty, $($rest:tt)* ]
      flags [ $( $flags:tt )* ]
      varargs $varargs:tt
      misc $misc:tt
    ) => {
        $crate::_define_flags_impl!(
            input [ $( $rest )* ]
            flags [ $( $flags )* ($field, $doc, $type, (<$type as ::std::default::Default>::default())) ]
            varargs $varargs
            misc $misc
        );
    };

    // Match a field like:
    //
    //    /// description
    //    name: type = default,
    ( input [ #[doc=$doc:expr] $field:ident : $type:ty = $default:tt, $($rest:tt)* ]
      flags [ $( $flags:tt )* ]
      varargs $varargs:tt
      misc $misc:tt
    ) => {
        $crate::_define_flags_impl!(
            input [ $( $rest )* ]
            flags [ $( $flags )* ($field, $doc, $type, (::std::convert::Into::into($default))) ]
            varargs $varargs
            misc $misc
        );
    };

    // Match a field like:
    //
    //    #[args]
    //    patterns: Vec<String>,
    ( input [ #[args] $varargs_name:ident : Vec<String>, $($rest:tt)* ]
      flags $flags:tt
      varargs ()
      misc $tail:tt
    ) => {
        $crate::_define_flags_impl!(
            input [ $( $rest )* ]
            flags $flags
            varargs ( $varargs_name )
            misc $tail
        );
    };
}

#[cfg(test)]
mod tests {
    define_flags! {
        struct TestOptions {
            /// bool value
            boo: bool = true,

            /// foo
            foo: bool,

            /// int value
            count: i64 = 12,

            /// name
            long_name: String = "alice",

            /// revisions
            rev: Vec<String>,
        }

        struct AnotherTestOptions {
            /// follow renames
            follow: bool,

            #[args]
            pats: Vec<String>,
        }
    }

    use crate::registry::{parse_struct, Registry, StructFlags};

    fn arglist(args: &[&str]) -> Vec<String> {
        args.iter().map(|x| (*x).to_string()).collect()
    }

    #[test]
    fn test_struct_define() {
        let mut registry = Registry::new();
        TestOptions::define(&mut registry).unwrap();
        assert!(registry.contains("boo"));
        assert!(registry.contains("foo"));
        assert!(registry.contains("long-name"));
        assert!(registry.contains("rev"));
        assert_eq!(registry.get("count").unwrap().as_integer(), Some(12));
        assert_eq!(registry.get("long-name").unwrap().as_str(), Some("alice"));
    }

    #[test]
    fn test_struct_parse() {
        let parsed: TestOptions = parse_struct(&arglist(&["--count", "3"])).unwrap();
        assert_eq!(parsed.boo, true);
        assert_eq!(parsed.count, 3);
        assert_eq!(parsed.long_name, "alice");
        assert!(parsed.rev.is_empty());

        let parsed: TestOptions =
            parse_struct(&arglist(&["--noboo", "--long-name=bob", "--rev=b", "--rev", "a"]))
                .unwrap();
        assert_eq!(parsed.boo, false);
        assert_eq!(parsed.foo, false);
        assert_eq!(parsed.count, 12);
        assert_eq!(parsed.long_name, "bob");
        assert_eq!(parsed.rev, vec!["b", "a"]);

        let parsed: AnotherTestOptions =
            parse_struct(&arglist(&["--nofollow", "--", "b", "c"])).unwrap();
        assert_eq!(parsed.follow, false);
        assert_eq!(parsed.pats, vec!["b", "c"]);
    }
}
