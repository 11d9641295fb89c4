use chrono::NaiveDate;
use signup_core::forms::{
    validate, AccountCreator, ErrorKind, FieldName, FormRecord, SignUpWizard, Step, Transition,
};

#[derive(Default)]
struct RecordingCreator {
    accounts: Vec<FormRecord>,
}

impl AccountCreator for RecordingCreator {
    fn create_account(&mut self, record: FormRecord) {
        self.accounts.push(record);
    }
}

fn fill_personal(wizard: &mut SignUpWizard) {
    wizard.update_field(FieldName::FirstName, "John");
    wizard.update_field(FieldName::LastName, "Doe");
    wizard.update_field(FieldName::FatherName, "Mark");
    wizard.update_field(FieldName::Birthday, "2000-01-01");
    wizard.update_field(FieldName::PersonalNr, "A12345678B");
}

#[test]
fn any_empty_required_field_blocks_advance() {
    for &missing in Step::Personal.fields() {
        let mut wizard = SignUpWizard::new();
        fill_personal(&mut wizard);
        wizard.update_field(missing, "");

        assert_eq!(wizard.advance().unwrap(), Transition::Blocked);
        assert_eq!(wizard.step(), Step::Personal);
        assert_eq!(
            wizard.errors().kind(missing),
            Some(ErrorKind::RequiredMissing),
            "{missing} should be reported as required"
        );
        assert_eq!(wizard.errors().len(), 1);
    }
}

#[test]
fn personal_number_shape_is_enforced() {
    let mut record = FormRecord::new();
    record.set(FieldName::PersonalNr, "A1234567B");
    let errors = validate(&[FieldName::PersonalNr], &record);
    assert_eq!(
        errors.kind(FieldName::PersonalNr),
        Some(ErrorKind::LengthOutOfRange)
    );

    for malformed in ["AB2345678B", "A12345678", "112345678B", "A1234 678B"] {
        record.set(FieldName::PersonalNr, malformed);
        assert!(
            validate(&[FieldName::PersonalNr], &record).contains(FieldName::PersonalNr),
            "{malformed} should fail"
        );
    }

    record.set(FieldName::PersonalNr, "A12345678B");
    assert!(validate(&[FieldName::PersonalNr], &record).is_empty());
}

#[test]
fn confirmation_must_match_exactly() {
    let mut record = FormRecord::new();
    record.set(FieldName::Password, "Abcdef1!");
    record.set(FieldName::ConfirmPassword, "Abcdef1!");
    assert!(validate(&[FieldName::ConfirmPassword], &record).is_empty());

    record.set(FieldName::ConfirmPassword, "abcdef1!");
    let errors = validate(&[FieldName::ConfirmPassword], &record);
    assert_eq!(
        errors.kind(FieldName::ConfirmPassword),
        Some(ErrorKind::FieldMismatch)
    );
    assert_eq!(
        errors.message(FieldName::ConfirmPassword),
        Some("Passwords do not match")
    );
}

#[test]
fn repeated_validation_is_identical() {
    let mut record = FormRecord::new();
    record.set(FieldName::Email, "john@");
    record.set(FieldName::Password, "weak");
    let first = validate(Step::Credentials.fields(), &record);
    let second = validate(Step::Credentials.fields(), &record);
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn back_then_advance_shows_no_stale_errors() {
    let mut wizard = SignUpWizard::new();
    let mut creator = RecordingCreator::default();
    fill_personal(&mut wizard);
    wizard.advance().unwrap();
    assert_eq!(wizard.submit(&mut creator).unwrap(), Transition::Blocked);

    assert_eq!(wizard.back().unwrap(), Transition::Returned);
    assert_eq!(wizard.advance().unwrap(), Transition::Advanced);
    assert_eq!(wizard.step(), Step::Credentials);
    assert!(wizard.errors().is_empty());
}

#[test]
fn end_to_end_sign_up_emits_the_full_record() {
    signup_core::init();

    let mut wizard = SignUpWizard::new();
    let mut creator = RecordingCreator::default();
    fill_personal(&mut wizard);

    assert_eq!(wizard.advance().unwrap(), Transition::Advanced);
    assert_eq!(wizard.step(), Step::Credentials);

    wizard.update_field(FieldName::Email, "john@x.com");
    wizard.update_field(FieldName::Password, "Abcdef1!");
    wizard.update_field(FieldName::ConfirmPassword, "Abcdef1!");
    assert_eq!(wizard.submit(&mut creator).unwrap(), Transition::Submitted);

    let expected = FormRecord {
        first_name: "John".into(),
        last_name: "Doe".into(),
        father_name: "Mark".into(),
        birthday: NaiveDate::from_ymd_opt(2000, 1, 1),
        personal_nr: "A12345678B".into(),
        email: "john@x.com".into(),
        password: "Abcdef1!".into(),
        confirm_password: "Abcdef1!".into(),
    };
    assert_eq!(creator.accounts, vec![expected]);

    let payload = serde_json::to_value(&creator.accounts[0]).unwrap();
    assert_eq!(payload.as_object().unwrap().len(), 8);
}
