use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::WizardError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Every field collected by the sign-up wizard, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    FirstName,
    LastName,
    FatherName,
    Birthday,
    PersonalNr,
    Email,
    Password,
    ConfirmPassword,
}

impl FieldName {
    pub const ALL: [FieldName; 8] = [
        FieldName::FirstName,
        FieldName::LastName,
        FieldName::FatherName,
        FieldName::Birthday,
        FieldName::PersonalNr,
        FieldName::Email,
        FieldName::Password,
        FieldName::ConfirmPassword,
    ];

    /// Wire name used by the presentation shell.
    pub fn key(self) -> &'static str {
        match self {
            FieldName::FirstName => "firstName",
            FieldName::LastName => "lastName",
            FieldName::FatherName => "fatherName",
            FieldName::Birthday => "birthday",
            FieldName::PersonalNr => "personalNr",
            FieldName::Email => "email",
            FieldName::Password => "password",
            FieldName::ConfirmPassword => "confirmPassword",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldName::FirstName => "First name",
            FieldName::LastName => "Last name",
            FieldName::FatherName => "Father name",
            FieldName::Birthday => "Birthday",
            FieldName::PersonalNr => "Personal number",
            FieldName::Email => "Email",
            FieldName::Password => "Password",
            FieldName::ConfirmPassword => "Confirm password",
        }
    }

    pub fn step(self) -> Step {
        if Step::Personal.contains(self) {
            Step::Personal
        } else {
            Step::Credentials
        }
    }

    pub fn is_secret(self) -> bool {
        matches!(self, FieldName::Password | FieldName::ConfirmPassword)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FieldName {
    type Err = WizardError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        FieldName::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| WizardError::UnknownField(trimmed.to_string()))
    }
}

/// The two mutually exclusive field groups of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    #[default]
    Personal,
    Credentials,
}

impl Step {
    pub const COUNT: usize = 2;

    pub fn fields(self) -> &'static [FieldName] {
        match self {
            Step::Personal => &[
                FieldName::FirstName,
                FieldName::LastName,
                FieldName::FatherName,
                FieldName::Birthday,
                FieldName::PersonalNr,
            ],
            Step::Credentials => &[
                FieldName::Email,
                FieldName::Password,
                FieldName::ConfirmPassword,
            ],
        }
    }

    pub fn contains(self, field: FieldName) -> bool {
        self.fields().contains(&field)
    }

    /// One-based position shown to the user.
    pub fn number(self) -> usize {
        match self {
            Step::Personal => 1,
            Step::Credentials => 2,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Personal => "Personal details",
            Step::Credentials => "Account credentials",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {}", self.number())
    }
}

/// Values accumulated across both steps of the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRecord {
    pub first_name: String,
    pub last_name: String,
    pub father_name: String,
    pub birthday: Option<NaiveDate>,
    pub personal_nr: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl FormRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a raw value coming from the shell.
    ///
    /// Birthdays are parsed as `YYYY-MM-DD`; anything else clears the date.
    pub fn set(&mut self, field: FieldName, value: impl Into<String>) {
        let value = value.into();
        match field {
            FieldName::FirstName => self.first_name = value,
            FieldName::LastName => self.last_name = value,
            FieldName::FatherName => self.father_name = value,
            FieldName::Birthday => self.birthday = parse_date(&value),
            FieldName::PersonalNr => self.personal_nr = value,
            FieldName::Email => self.email = value,
            FieldName::Password => self.password = value,
            FieldName::ConfirmPassword => self.confirm_password = value,
        }
    }

    pub fn set_birthday(&mut self, birthday: Option<NaiveDate>) {
        self.birthday = birthday;
    }

    /// Textual view of a field, with the birthday rendered as `YYYY-MM-DD`.
    pub fn text(&self, field: FieldName) -> Cow<'_, str> {
        match field {
            FieldName::FirstName => Cow::Borrowed(&self.first_name),
            FieldName::LastName => Cow::Borrowed(&self.last_name),
            FieldName::FatherName => Cow::Borrowed(&self.father_name),
            FieldName::Birthday => match self.birthday {
                Some(date) => Cow::Owned(date.format(DATE_FORMAT).to_string()),
                None => Cow::Borrowed(""),
            },
            FieldName::PersonalNr => Cow::Borrowed(&self.personal_nr),
            FieldName::Email => Cow::Borrowed(&self.email),
            FieldName::Password => Cow::Borrowed(&self.password),
            FieldName::ConfirmPassword => Cow::Borrowed(&self.confirm_password),
        }
    }

    pub fn is_blank(&self, field: FieldName) -> bool {
        match field {
            FieldName::Birthday => self.birthday.is_none(),
            other => self.text(other).trim().is_empty(),
        }
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_parse_from_wire_keys() {
        for field in FieldName::ALL {
            assert_eq!(field.key().parse::<FieldName>().unwrap(), field);
        }
        assert_eq!(
            "PERSONALNR".parse::<FieldName>().unwrap(),
            FieldName::PersonalNr
        );
        assert_eq!(
            "nickname".parse::<FieldName>(),
            Err(WizardError::UnknownField("nickname".into()))
        );
    }

    #[test]
    fn steps_partition_every_field() {
        for field in FieldName::ALL {
            let owners = [Step::Personal, Step::Credentials]
                .into_iter()
                .filter(|step| step.contains(field))
                .count();
            assert_eq!(owners, 1, "{field} must belong to exactly one step");
            assert!(field.step().contains(field));
        }
    }

    #[test]
    fn birthday_parses_iso_dates_and_clears_on_garbage() {
        let mut record = FormRecord::new();
        record.set(FieldName::Birthday, "2000-01-01");
        assert_eq!(record.birthday, NaiveDate::from_ymd_opt(2000, 1, 1));
        assert_eq!(record.text(FieldName::Birthday), "2000-01-01");

        record.set(FieldName::Birthday, "01/01/2000");
        assert!(record.birthday.is_none());
        assert!(record.is_blank(FieldName::Birthday));

        record.set_birthday(NaiveDate::from_ymd_opt(1999, 12, 31));
        assert_eq!(record.text(FieldName::Birthday), "1999-12-31");
    }

    #[test]
    fn blank_means_empty_after_trimming() {
        let mut record = FormRecord::new();
        record.set(FieldName::Email, "   ");
        assert!(record.is_blank(FieldName::Email));
        record.set(FieldName::Email, "a@b.io");
        assert!(!record.is_blank(FieldName::Email));
    }

    #[test]
    fn record_serializes_with_camel_case_keys() {
        let mut record = FormRecord::new();
        record.set(FieldName::PersonalNr, "A12345678B");
        record.set(FieldName::Birthday, "1999-12-31");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["personalNr"], "A12345678B");
        assert_eq!(json["birthday"], "1999-12-31");
        assert_eq!(json["confirmPassword"], "");
    }
}
