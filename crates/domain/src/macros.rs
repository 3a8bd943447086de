//! Macro for implementing Display and FromStr for wire-named enums
//!
//! Generates both conversions from one variant table. Parsing is
//! case-insensitive; display always uses the canonical name.
//!
//! # Example
//!
//! ```rust
//! use hsdp_domain::impl_wire_name_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Region {
//!     UsEast,
//!     EuWest,
//! }
//!
//! impl_wire_name_conversions!(Region {
//!     UsEast => "us-east",
//!     EuWest => "eu-west",
//! });
//!
//! assert_eq!(Region::EuWest.to_string(), "eu-west");
//! assert_eq!("US-EAST".parse::<Region>(), Ok(Region::UsEast));
//! ```

/// Implements `Display` and `FromStr` for an enum from a variant/name table
///
/// `$str` must be lowercase for case-insensitive parsing to match.
#[macro_export]
macro_rules! impl_wire_name_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical wire name
            pub const fn as_str(&self) -> &'static str {
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

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tier {
        Sandbox,
        Production,
    }

    impl_wire_name_conversions!(Tier {
        Sandbox => "sandbox",
        Production => "production",
    });

    #[test]
    fn display_uses_canonical_name() {
        assert_eq!(Tier::Sandbox.to_string(), "sandbox");
        assert_eq!(Tier::Production.as_str(), "production");
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Tier::from_str("SandBox").unwrap(), Tier::Sandbox);
        assert_eq!(Tier::from_str("PRODUCTION").unwrap(), Tier::Production);
    }

    #[test]
    fn parse_rejects_unknown() {
        let result = Tier::from_str("staging");
        assert!(result.unwrap_err().contains("Invalid Tier: staging"));
        assert!(Tier::from_str("").is_err());
    }
}
