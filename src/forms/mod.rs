//! Sign-up form core: field model, validation rules, validation engine, and
//! the two-step wizard state machine.

pub mod engine;
pub mod record;
pub mod rules;
pub mod wizard;

pub use engine::{validate, validate_with, ErrorMap, FieldError};
pub use record::{FieldName, FormRecord, Step, DATE_FORMAT};
pub use rules::{rule_set, Check, CrossFieldCheck, ErrorKind, Rule, RuleSet};
pub use wizard::{
    AccountCreator, SignUpWizard, Transition, ValidationTicket, WizardEvent, WizardSnapshot,
};
