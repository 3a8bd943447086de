// Validation Rules - tagged constraints interpreted per field
use std::fmt;

use super::{ValidationResult, Validator};

/// Borrowed view of a single field handed to the constraint interpreter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Str(&'a str),
    List(&'a [String]),
    Int(i64),
    Bool(bool),
    Absent,
}

impl<'a> FieldValue<'a> {
    /// View an optional string, treating `None` as absent
    pub fn opt_str(value: Option<&'a str>) -> Self {
        value.map_or(Self::Absent, Self::Str)
    }

    /// View an optional list, treating `None` as absent
    pub fn opt_list(value: Option<&'a [String]>) -> Self {
        value.map_or(Self::Absent, Self::List)
    }

    /// Whether the value counts as "set": non-empty strings and lists,
    /// non-zero numbers, `true` booleans.
    pub fn is_present(&self) -> bool {
        match self {
            Self::Str(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Int(n) => *n != 0,
            Self::Bool(b) => *b,
            Self::Absent => false,
        }
    }

    /// Length in characters for strings, in items for lists
    pub fn length(&self) -> Option<usize> {
        match self {
            Self::Str(s) => Some(s.chars().count()),
            Self::List(items) => Some(items.len()),
            _ => None,
        }
    }

    fn number(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }
}

/// A single rule attached to a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Value must be present
    Required,
    /// Value must be present when the named field is absent
    RequiredWithout(&'static str),
    /// Value must be present when the named field is present
    RequiredWith(&'static str),
    /// Inclusive bounds on string length or list size
    LengthRange { min: Option<usize>, max: Option<usize> },
    /// Inclusive bounds on a numeric value
    NumericRange { min: Option<i64>, max: Option<i64> },
}

impl Constraint {
    /// Length between `min` and `max` characters
    pub const fn length(min: usize, max: usize) -> Self {
        Self::LengthRange { min: Some(min), max: Some(max) }
    }

    /// At most `max` characters
    pub const fn max_len(max: usize) -> Self {
        Self::LengthRange { min: None, max: Some(max) }
    }

    /// Integer between `min` and `max`
    pub const fn range(min: i64, max: i64) -> Self {
        Self::NumericRange { min: Some(min), max: Some(max) }
    }

    /// Stable code reported on the resulting `FieldError`
    pub fn code(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::RequiredWithout(_) => "required_without",
            Self::RequiredWith(_) => "required_with",
            Self::LengthRange { .. } => "length",
            Self::NumericRange { .. } => "range",
        }
    }

    /// Evaluate this constraint for `field`.
    ///
    /// `sibling` resolves other fields of the same resource for the
    /// conditional variants.
    pub fn check<'a, F>(&self, field: &str, value: &FieldValue<'a>, sibling: F) -> Result<(), String>
    where
        F: Fn(&str) -> FieldValue<'a>,
    {
        match self {
            Self::Required => {
                if value.is_present() {
                    Ok(())
                } else {
                    Err(format!("{field} is required"))
                }
            }
            Self::RequiredWithout(other) => {
                if sibling(other).is_present() || value.is_present() {
                    Ok(())
                } else {
                    Err(format!("{field} is required when {other} is not set"))
                }
            }
            Self::RequiredWith(other) => {
                if !sibling(other).is_present() || value.is_present() {
                    Ok(())
                } else {
                    Err(format!("{field} is required when {other} is set"))
                }
            }
            Self::LengthRange { min, max } => {
                let Some(len) = value.length() else {
                    return Ok(());
                };
                if let Some(min) = min {
                    if len < *min {
                        return Err(format!("{field} must be at least {min} characters"));
                    }
                }
                if let Some(max) = max {
                    if len > *max {
                        return Err(format!("{field} must not exceed {max} characters"));
                    }
                }
                Ok(())
            }
            Self::NumericRange { min, max } => {
                let Some(n) = value.number() else {
                    return Ok(());
                };
                if let Some(min) = min {
                    if n < *min {
                        return Err(format!("{field} must be at least {min}"));
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        return Err(format!("{field} must not exceed {max}"));
                    }
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required"),
            Self::RequiredWithout(other) => write!(f, "required_without={other}"),
            Self::RequiredWith(other) => write!(f, "required_with={other}"),
            Self::LengthRange { min, max } => write_bounds(f, "len", *min, *max),
            Self::NumericRange { min, max } => write_bounds(f, "value", *min, *max),
        }
    }
}

fn write_bounds<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    min: Option<T>,
    max: Option<T>,
) -> fmt::Result {
    match (min, max) {
        (Some(min), Some(max)) => write!(f, "{label} in {min}..={max}"),
        (Some(min), None) => write!(f, "{label} >= {min}"),
        (None, Some(max)) => write!(f, "{label} <= {max}"),
        (None, None) => write!(f, "{label} unbounded"),
    }
}

/// Ordered constraint table: `field -> [constraint, ...]`
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    fields: Vec<(&'static str, Vec<Constraint>)>,
}

impl ConstraintSet {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the constraints for `field` (builder style)
    pub fn field(mut self, field: &'static str, constraints: impl Into<Vec<Constraint>>) -> Self {
        self.fields.push((field, constraints.into()));
        self
    }

    /// Constraints declared for `field`, if any
    pub fn constraints_for(&self, field: &str) -> Option<&[Constraint]> {
        self.fields.iter().find(|(name, _)| *name == field).map(|(_, rules)| rules.as_slice())
    }

    /// Fields in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, Vec<Constraint>)> {
        self.fields.iter()
    }

    /// Number of constrained fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field is constrained
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A resource type with a declared constraint table
pub trait Validate {
    /// Constraint table shared by every value of this type
    fn constraints() -> &'static ConstraintSet;

    /// Resolve a field by its wire name
    fn field(&self, name: &str) -> FieldValue<'_>;

    /// Run every declared constraint, collecting all violations
    fn validate(&self) -> ValidationResult<()>
    where
        Self: Sized,
    {
        let mut validator = Validator::new();
        validator.check(self);
        validator.finalize()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;

    use super::*;

    #[derive(Default)]
    struct Account {
        id: Option<String>,
        login: String,
        secret: Option<String>,
        groups: Vec<String>,
        ttl: i64,
    }

    impl Validate for Account {
        fn constraints() -> &'static ConstraintSet {
            static RULES: OnceLock<ConstraintSet> = OnceLock::new();
            RULES.get_or_init(|| {
                ConstraintSet::new()
                    .field("login", [Constraint::Required, Constraint::length(3, 8)])
                    .field("secret", [Constraint::RequiredWithout("id"), Constraint::max_len(4)])
                    .field("groups", [Constraint::RequiredWith("id")])
                    .field("ttl", [Constraint::range(0, 100)])
            })
        }

        fn field(&self, name: &str) -> FieldValue<'_> {
            match name {
                "id" => FieldValue::opt_str(self.id.as_deref()),
                "login" => FieldValue::Str(&self.login),
                "secret" => FieldValue::opt_str(self.secret.as_deref()),
                "groups" => FieldValue::List(&self.groups),
                "ttl" => FieldValue::Int(self.ttl),
                _ => FieldValue::Absent,
            }
        }
    }

    #[test]
    fn collects_every_failing_field() {
        let account = Account { ttl: 500, ..Default::default() };
        let err = account.validate().unwrap_err();

        assert!(err.has_field("login"));
        assert!(err.has_field("secret"));
        assert!(err.has_field("ttl"));
        assert!(!err.has_field("groups"));
        assert_eq!(err.error_count(), 3);
    }

    #[test]
    fn stops_at_first_failure_within_a_field() {
        let account = Account { secret: Some("abcd".into()), ..Default::default() };
        let err = account.validate().unwrap_err();

        let login = err.field_errors("login");
        assert_eq!(login.len(), 1);
        assert_eq!(login[0].code.as_deref(), Some("required"));
    }

    #[test]
    fn required_without_flips_once_identifier_is_set() {
        let create = Account { login: "alice".into(), ..Default::default() };
        let err = create.validate().unwrap_err();
        assert_eq!(err.field_errors("secret")[0].code.as_deref(), Some("required_without"));

        let update = Account {
            id: Some("42".into()),
            login: "alice".into(),
            groups: vec!["admins".into()],
            ..Default::default()
        };
        assert!(update.validate().is_ok());
    }

    #[test]
    fn required_with_applies_only_when_sibling_present() {
        let update = Account { id: Some("42".into()), login: "alice".into(), ..Default::default() };
        let err = update.validate().unwrap_err();
        assert_eq!(err.error_count(), 1);
        assert_eq!(err.field_errors("groups")[0].code.as_deref(), Some("required_with"));
    }

    #[test]
    fn length_bounds_count_characters() {
        let value = FieldValue::Str("héllo");
        assert_eq!(value.length(), Some(5));
        assert!(Constraint::length(1, 5).check("f", &value, |_| FieldValue::Absent).is_ok());
        assert!(Constraint::max_len(4).check("f", &value, |_| FieldValue::Absent).is_err());
    }

    #[test]
    fn numeric_range_ignores_non_numeric_values() {
        let rule = Constraint::range(0, 10);
        assert!(rule.check("f", &FieldValue::Str("x"), |_| FieldValue::Absent).is_ok());
        assert_eq!(
            rule.check("f", &FieldValue::Int(-1), |_| FieldValue::Absent),
            Err("f must be at least 0".to_string())
        );
    }

    #[test]
    fn constraint_lookup_and_display() {
        let rules = Account::constraints();
        assert_eq!(rules.len(), 4);
        assert_eq!(rules.constraints_for("ttl"), Some(&[Constraint::range(0, 100)][..]));
        assert_eq!(Constraint::RequiredWithout("id").to_string(), "required_without=id");
        assert_eq!(Constraint::max_len(4).to_string(), "len <= 4");
    }
}
