//! Declarative validation rules for every sign-up field.
//!
//! Rules are compiled once into a process-wide [`RuleSet`] and shared by all
//! wizard sessions. Each field owns an ordered list; evaluation stops at the
//! first failing rule.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::forms::record::{FieldName, FormRecord};

const NAME_PATTERN: &str = r"^[A-Za-z]+$";
const PERSONAL_NR_PATTERN: &str = r"^[A-Za-z][0-9]{8}[A-Za-z]$";
const EMAIL_PATTERN: &str = r"^[A-Za-z0-9_.-]+@([A-Za-z0-9_-]+\.)+[A-Za-z0-9_-]{2,4}$";
const PASSWORD_PATTERNS: [&str; 5] = [r"^.{8,}$", r"[a-z]", r"[A-Z]", r"[0-9]", r"[^A-Za-z0-9\s]"];

const NAME_MIN_LENGTH: usize = 3;
const PERSONAL_NR_LENGTH: usize = 10;

/// Class of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    RequiredMissing,
    LengthOutOfRange,
    PatternMismatch,
    FieldMismatch,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::RequiredMissing => "required",
            ErrorKind::LengthOutOfRange => "length",
            ErrorKind::PatternMismatch => "pattern",
            ErrorKind::FieldMismatch => "mismatch",
        };
        f.write_str(label)
    }
}

/// Predicate receiving the field's own value and the whole record.
pub type CrossFieldCheck = fn(&str, &FormRecord) -> bool;

/// A single pass/fail test.
#[derive(Debug, Clone)]
pub enum Check {
    Required,
    MinLength(usize),
    MaxLength(usize),
    /// Every expression must match.
    Pattern(Vec<Regex>),
    Custom(CrossFieldCheck),
}

impl Check {
    fn kind(&self) -> ErrorKind {
        match self {
            Check::Required => ErrorKind::RequiredMissing,
            Check::MinLength(_) | Check::MaxLength(_) => ErrorKind::LengthOutOfRange,
            Check::Pattern(_) => ErrorKind::PatternMismatch,
            Check::Custom(_) => ErrorKind::FieldMismatch,
        }
    }

    fn passes(&self, field: FieldName, record: &FormRecord) -> bool {
        match self {
            Check::Required => !record.is_blank(field),
            Check::MinLength(min) => record.text(field).chars().count() >= *min,
            Check::MaxLength(max) => record.text(field).chars().count() <= *max,
            Check::Pattern(expressions) => {
                let value = record.text(field);
                expressions.iter().all(|regex| regex.is_match(&value))
            }
            Check::Custom(predicate) => predicate(&record.text(field), record),
        }
    }
}

/// A check paired with the message shown when it fails.
#[derive(Debug, Clone)]
pub struct Rule {
    check: Check,
    message: String,
}

impl Rule {
    pub fn new(check: Check, message: impl Into<String>) -> Self {
        Self {
            check,
            message: message.into(),
        }
    }

    pub fn required(message: impl Into<String>) -> Self {
        Self::new(Check::Required, message)
    }

    pub fn min_length(min: usize, message: impl Into<String>) -> Self {
        Self::new(Check::MinLength(min), message)
    }

    pub fn max_length(max: usize, message: impl Into<String>) -> Self {
        Self::new(Check::MaxLength(max), message)
    }

    pub fn pattern(regex: Regex, message: impl Into<String>) -> Self {
        Self::new(Check::Pattern(vec![regex]), message)
    }

    pub fn pattern_all(expressions: Vec<Regex>, message: impl Into<String>) -> Self {
        Self::new(Check::Pattern(expressions), message)
    }

    pub fn custom(predicate: CrossFieldCheck, message: impl Into<String>) -> Self {
        Self::new(Check::Custom(predicate), message)
    }

    pub fn check(&self) -> &Check {
        &self.check
    }

    pub fn kind(&self) -> ErrorKind {
        self.check.kind()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn passes(&self, field: FieldName, record: &FormRecord) -> bool {
        self.check.passes(field, record)
    }
}

/// Ordered rules for every field.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: BTreeMap<FieldName, Vec<Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(mut self, field: FieldName, rules: Vec<Rule>) -> Self {
        self.rules.insert(field, rules);
        self
    }

    /// Rules attached to `field`, empty when none are defined.
    pub fn rules_for(&self, field: FieldName) -> &[Rule] {
        self.rules.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The sign-up rules used by every wizard session.
    pub fn sign_up() -> Self {
        let mut set = Self::new();
        for field in [FieldName::FirstName, FieldName::LastName, FieldName::FatherName] {
            set = set.with_rules(field, name_rules(field));
        }

        let personal_nr = FieldName::PersonalNr.label();
        let exact_length =
            format!("{personal_nr} must be exactly {PERSONAL_NR_LENGTH} characters");

        set.with_rules(
            FieldName::Birthday,
            vec![Rule::required(required_message(FieldName::Birthday))],
        )
        .with_rules(
            FieldName::PersonalNr,
            vec![
                Rule::required(required_message(FieldName::PersonalNr)),
                Rule::min_length(PERSONAL_NR_LENGTH, exact_length.clone()),
                Rule::max_length(PERSONAL_NR_LENGTH, exact_length),
                Rule::pattern(
                    compile(PERSONAL_NR_PATTERN),
                    format!("{personal_nr} must be a letter, 8 digits, and a letter"),
                ),
            ],
        )
        .with_rules(
            FieldName::Email,
            vec![
                Rule::required(required_message(FieldName::Email)),
                Rule::pattern(compile(EMAIL_PATTERN), "Invalid email format"),
            ],
        )
        .with_rules(
            FieldName::Password,
            vec![
                Rule::required(required_message(FieldName::Password)),
                Rule::pattern_all(
                    PASSWORD_PATTERNS.into_iter().map(compile).collect(),
                    "Password must be at least 8 characters with upper and lower case letters, a digit, and a symbol",
                ),
            ],
        )
        .with_rules(
            FieldName::ConfirmPassword,
            vec![
                Rule::required(required_message(FieldName::ConfirmPassword)),
                Rule::custom(matches_password, "Passwords do not match"),
            ],
        )
    }
}

static SIGN_UP_RULES: Lazy<RuleSet> = Lazy::new(RuleSet::sign_up);

/// Shared sign-up rule set.
pub fn rule_set() -> &'static RuleSet {
    &SIGN_UP_RULES
}

fn name_rules(field: FieldName) -> Vec<Rule> {
    let label = field.label();
    vec![
        Rule::required(required_message(field)),
        Rule::min_length(
            NAME_MIN_LENGTH,
            format!("{label} must be at least {NAME_MIN_LENGTH} characters"),
        ),
        Rule::pattern(
            compile(NAME_PATTERN),
            format!("{label} must not contain numbers or special characters"),
        ),
    ]
}

fn required_message(field: FieldName) -> String {
    let label = field.label();
    format!("{label} is required")
}

fn matches_password(confirmation: &str, record: &FormRecord) -> bool {
    confirmation == record.password
}

// Patterns are literals above; failing to compile one is a programming error.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in validation pattern must compile")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_failure(field: FieldName, record: &FormRecord) -> Option<ErrorKind> {
        rule_set()
            .rules_for(field)
            .iter()
            .find(|rule| !rule.passes(field, record))
            .map(Rule::kind)
    }

    fn record_with(field: FieldName, value: &str) -> FormRecord {
        let mut record = FormRecord::new();
        record.set(field, value);
        record
    }

    #[test]
    fn every_field_has_rules_starting_with_required() {
        for field in FieldName::ALL {
            let rules = rule_set().rules_for(field);
            assert!(!rules.is_empty(), "{field} has no rules");
            assert_eq!(rules[0].kind(), ErrorKind::RequiredMissing);
        }
    }

    #[test]
    fn name_rules_apply_in_declared_order() {
        let field = FieldName::FirstName;
        assert_eq!(
            first_failure(field, &record_with(field, "")),
            Some(ErrorKind::RequiredMissing)
        );
        // Too short wins over the pattern even though both fail.
        assert_eq!(
            first_failure(field, &record_with(field, "J1")),
            Some(ErrorKind::LengthOutOfRange)
        );
        assert_eq!(
            first_failure(field, &record_with(field, "J0hn")),
            Some(ErrorKind::PatternMismatch)
        );
        assert_eq!(first_failure(field, &record_with(field, "John")), None);
    }

    #[test]
    fn personal_number_requires_exact_shape() {
        let field = FieldName::PersonalNr;
        assert_eq!(
            first_failure(field, &record_with(field, "A1234567B")),
            Some(ErrorKind::LengthOutOfRange)
        );
        assert_eq!(
            first_failure(field, &record_with(field, "A123456789B")),
            Some(ErrorKind::LengthOutOfRange)
        );
        assert_eq!(
            first_failure(field, &record_with(field, "1234567890")),
            Some(ErrorKind::PatternMismatch)
        );
        assert_eq!(first_failure(field, &record_with(field, "A12345678B")), None);
    }

    #[test]
    fn email_accepts_common_shapes() {
        let field = FieldName::Email;
        for valid in ["john@x.com", "first.last@mail.example.org", "a-b_c@host.io"] {
            assert_eq!(first_failure(field, &record_with(field, valid)), None, "{valid}");
        }
        for invalid in ["john", "john@", "john@x", "john@x.c", "jo hn@x.com"] {
            assert_eq!(
                first_failure(field, &record_with(field, invalid)),
                Some(ErrorKind::PatternMismatch),
                "{invalid}"
            );
        }
    }

    #[test]
    fn password_needs_every_character_class() {
        let field = FieldName::Password;
        assert_eq!(first_failure(field, &record_with(field, "Abcdef1!")), None);
        for weak in ["Abcde1!", "abcdef1!", "ABCDEF1!", "Abcdefg!", "Abcdefg1"] {
            assert_eq!(
                first_failure(field, &record_with(field, weak)),
                Some(ErrorKind::PatternMismatch),
                "{weak}"
            );
        }
    }

    #[test]
    fn confirmation_compares_against_current_password() {
        let mut record = FormRecord::new();
        record.set(FieldName::Password, "Abcdef1!");
        record.set(FieldName::ConfirmPassword, "abcdef1!");
        assert_eq!(
            first_failure(FieldName::ConfirmPassword, &record),
            Some(ErrorKind::FieldMismatch)
        );

        record.set(FieldName::Password, "abcdef1!");
        assert_eq!(first_failure(FieldName::ConfirmPassword, &record), None);
    }

    #[test]
    fn birthday_only_requires_a_date() {
        let field = FieldName::Birthday;
        assert_eq!(
            first_failure(field, &FormRecord::new()),
            Some(ErrorKind::RequiredMissing)
        );
        assert_eq!(first_failure(field, &record_with(field, "2000-01-01")), None);
    }

    #[test]
    fn custom_rule_sets_resolve_missing_fields_to_nothing() {
        let set = RuleSet::new().with_rules(
            FieldName::Email,
            vec![Rule::max_length(5, "Too long")],
        );
        assert!(set.rules_for(FieldName::Password).is_empty());
        let rule = &set.rules_for(FieldName::Email)[0];
        assert!(matches!(rule.check(), Check::MaxLength(5)));
        assert_eq!(rule.message(), "Too long");
    }
}
