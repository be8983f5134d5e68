//! Display/FromStr conversions for closed status enums.
//!
//! Persisted statuses travel as lowercase strings (`"started"`, `"warning"`,
//! `"auth_revoked"`); the enums stay closed on the Rust side.
//!
//! # Example
//!
//! ```rust
//! use stocksync_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum RunPhase {
//!     Fetch,
//!     Resolve,
//!     Write,
//! }
//!
//! impl_domain_status_conversions!(RunPhase {
//!     Fetch => "fetch",
//!     Resolve => "resolve",
//!     Write => "write",
//! });
//!
//! assert_eq!(RunPhase::Resolve.to_string(), "resolve");
//! assert_eq!("WRITE".parse::<RunPhase>(), Ok(RunPhase::Write));
//! ```

/// Implements `Display` and case-insensitive `FromStr` for a status enum.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical lowercase representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
