//! Macro for mapping server error codes onto a closed enum
//!
//! Server error codes arrive as snake_case strings. This macro generates a
//! total mapping between those strings and enum variants: every known code
//! maps to its variant, everything else lands in an `Unknown(String)`
//! fallback that keeps the original text.
//!
//! # Example
//!
//! ```rust
//! use authsync_domain::impl_error_code_conversions;
//!
//! #[derive(Debug, Clone, PartialEq, Eq, Hash)]
//! pub enum ExampleCode {
//!     NotFound,
//!     Revoked,
//!     Unknown(String),
//! }
//!
//! impl_error_code_conversions!(ExampleCode {
//!     NotFound => "not_found",
//!     Revoked => "revoked",
//! });
//!
//! assert_eq!(ExampleCode::from("revoked"), ExampleCode::Revoked);
//! assert_eq!(ExampleCode::from("nope"), ExampleCode::Unknown("nope".into()));
//! assert_eq!(ExampleCode::NotFound.as_str(), "not_found");
//! ```

/// Implements `as_str`, `Display`, `From<&str>` and `From<String>` for an
/// error-code enum with an `Unknown(String)` fallback variant.
///
/// Parsing is case-insensitive. `is_known` reports whether a value is one of
/// the listed variants.
#[macro_export]
macro_rules! impl_error_code_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Wire representation of this code.
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $str,)+
                    Self::Unknown(raw) => raw.as_str(),
                }
            }

            /// `false` only for the `Unknown` fallback.
            #[must_use]
            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Unknown(_))
            }

            /// Every known code, in declaration order.
            #[must_use]
            pub fn known() -> &'static [&'static str] {
                &[$($str,)+]
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<&str> for $enum_name {
            fn from(s: &str) -> Self {
                match s.to_ascii_lowercase().as_str() {
                    $($str => Self::$variant,)+
                    _ => Self::Unknown(s.to_string()),
                }
            }
        }

        impl From<String> for $enum_name {
            fn from(s: String) -> Self {
                Self::from(s.as_str())
            }
        }
    };
}
