//! Two-step sign-up wizard.
//!
//! The wizard collects personal details first and account credentials second.
//! Validation is deferred: edits only touch the record, and rules run when the
//! user tries to advance or submit. Only the active step's errors are ever
//! held, while the values of both steps persist until the session is reset.

use serde::Serialize;
use uuid::Uuid;

use crate::errors::WizardError;
use crate::forms::engine::{validate, ErrorMap};
use crate::forms::record::{FieldName, FormRecord, Step};

/// Receives the validated record once the credentials step submits.
pub trait AccountCreator {
    fn create_account(&mut self, record: FormRecord);
}

impl AccountCreator for Vec<FormRecord> {
    fn create_account(&mut self, record: FormRecord) {
        self.push(record);
    }
}

/// Outcome of a wizard operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Personal details were valid; the credentials step is now active.
    Advanced,
    /// Back on the personal details step.
    Returned,
    /// Validation failed; the errors are available on the wizard.
    Blocked,
    /// The record was handed to the account creator.
    Submitted,
    /// A newer validation request or edit made this result obsolete.
    Superseded,
}

/// Events the presentation shell dispatches into the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    Edit { field: FieldName, value: String },
    Advance,
    Back,
    Submit,
    /// Advance on the first step, submit on the second.
    Primary,
}

/// Handle for one validation request.
///
/// Only the most recent ticket for an unchanged record on the same step may
/// resolve, and only once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationTicket {
    id: u64,
    step: Step,
    revision: u64,
}

impl ValidationTicket {
    pub fn step(&self) -> Step {
        self.step
    }
}

/// Render-ready copy of the wizard state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSnapshot {
    pub session_id: Uuid,
    pub step: Step,
    pub record: FormRecord,
    pub errors: ErrorMap,
}

/// State machine for one sign-up session.
#[derive(Debug, Clone)]
pub struct SignUpWizard {
    session_id: Uuid,
    step: Step,
    record: FormRecord,
    errors: ErrorMap,
    latest_ticket: u64,
    revision: u64,
}

impl Default for SignUpWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl SignUpWizard {
    pub fn new() -> Self {
        let session_id = Uuid::new_v4();
        tracing::info!(session = %session_id, "sign-up session started");
        Self {
            session_id,
            step: Step::Personal,
            record: FormRecord::new(),
            errors: ErrorMap::new(),
            latest_ticket: 0,
            revision: 0,
        }
    }

    /// Discards the session and starts a fresh one.
    pub fn reset(&mut self) {
        tracing::info!(session = %self.session_id, "sign-up session discarded");
        *self = Self::new();
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn record(&self) -> &FormRecord {
        &self.record
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        WizardSnapshot {
            session_id: self.session_id,
            step: self.step,
            record: self.record.clone(),
            errors: self.errors.clone(),
        }
    }

    /// Stores a value without validating it.
    pub fn update_field(&mut self, field: FieldName, value: impl Into<String>) {
        self.record.set(field, value);
        self.revision += 1;
    }

    pub fn update_field_by_name(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<FieldName, WizardError> {
        let field = name.parse::<FieldName>()?;
        self.update_field(field, value);
        Ok(field)
    }

    pub fn advance(&mut self) -> Result<Transition, WizardError> {
        self.require_step(Step::Personal, "advance")?;
        let ticket = self.begin_validation();
        let errors = validate(Step::Personal.fields(), &self.record);
        self.resolve_advance(ticket, errors)
    }

    pub fn submit<C: AccountCreator + ?Sized>(
        &mut self,
        creator: &mut C,
    ) -> Result<Transition, WizardError> {
        self.require_step(Step::Credentials, "submit")?;
        let ticket = self.begin_validation();
        let errors = validate(Step::Credentials.fields(), &self.record);
        self.resolve_submit(ticket, errors, creator)
    }

    /// Returns to personal details with a clean error view.
    pub fn back(&mut self) -> Result<Transition, WizardError> {
        self.require_step(Step::Credentials, "back")?;
        self.cancel_in_flight();
        self.step = Step::Personal;
        self.errors.clear();
        tracing::info!(session = %self.session_id, step = %self.step, "returned to personal details");
        Ok(Transition::Returned)
    }

    pub fn primary_action<C: AccountCreator + ?Sized>(
        &mut self,
        creator: &mut C,
    ) -> Result<Transition, WizardError> {
        match self.step {
            Step::Personal => self.advance(),
            Step::Credentials => self.submit(creator),
        }
    }

    /// Applies one shell event. Edits produce no transition.
    pub fn dispatch<C: AccountCreator + ?Sized>(
        &mut self,
        event: WizardEvent,
        creator: &mut C,
    ) -> Result<Option<Transition>, WizardError> {
        match event {
            WizardEvent::Edit { field, value } => {
                self.update_field(field, value);
                Ok(None)
            }
            WizardEvent::Advance => self.advance().map(Some),
            WizardEvent::Back => self.back().map(Some),
            WizardEvent::Submit => self.submit(creator).map(Some),
            WizardEvent::Primary => self.primary_action(creator).map(Some),
        }
    }

    /// Starts a validation request for the active step, superseding any
    /// request still in flight.
    pub fn begin_validation(&mut self) -> ValidationTicket {
        self.latest_ticket += 1;
        ValidationTicket {
            id: self.latest_ticket,
            step: self.step,
            revision: self.revision,
        }
    }

    /// Applies the outcome of a personal-details validation request.
    pub fn resolve_advance(
        &mut self,
        ticket: ValidationTicket,
        errors: ErrorMap,
    ) -> Result<Transition, WizardError> {
        if ticket.step != Step::Personal {
            return Err(self.invalid_transition("advance"));
        }
        if self.is_stale(&ticket) {
            return Ok(self.superseded(&ticket));
        }
        self.cancel_in_flight();
        if !self.block_on(errors, Step::Personal) {
            return Ok(Transition::Blocked);
        }
        self.step = Step::Credentials;
        tracing::info!(session = %self.session_id, step = %self.step, "advanced to credentials");
        Ok(Transition::Advanced)
    }

    /// Applies the outcome of a credentials validation request, handing the
    /// record to `creator` when it is clean.
    pub fn resolve_submit<C: AccountCreator + ?Sized>(
        &mut self,
        ticket: ValidationTicket,
        errors: ErrorMap,
        creator: &mut C,
    ) -> Result<Transition, WizardError> {
        if ticket.step != Step::Credentials {
            return Err(self.invalid_transition("submit"));
        }
        if self.is_stale(&ticket) {
            return Ok(self.superseded(&ticket));
        }
        self.cancel_in_flight();
        if !self.block_on(errors, Step::Credentials) {
            return Ok(Transition::Blocked);
        }
        creator.create_account(self.record.clone());
        tracing::info!(session = %self.session_id, "sign-up record submitted");
        Ok(Transition::Submitted)
    }

    /// Replaces the error map. Returns `true` when the step is clean.
    fn block_on(&mut self, mut errors: ErrorMap, step: Step) -> bool {
        errors.retain_fields(step.fields());
        let clean = errors.is_empty();
        if !clean {
            tracing::info!(
                session = %self.session_id,
                step = %step,
                fields = ?errors.fields(),
                "validation blocked transition"
            );
        }
        self.errors = errors;
        clean
    }

    fn is_stale(&self, ticket: &ValidationTicket) -> bool {
        ticket.id != self.latest_ticket
            || ticket.step != self.step
            || ticket.revision != self.revision
    }

    fn superseded(&self, ticket: &ValidationTicket) -> Transition {
        tracing::debug!(
            session = %self.session_id,
            ticket = ticket.id,
            latest = self.latest_ticket,
            "discarded superseded validation result"
        );
        Transition::Superseded
    }

    fn cancel_in_flight(&mut self) {
        self.latest_ticket += 1;
    }

    fn require_step(&self, expected: Step, action: &'static str) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(self.invalid_transition(action))
        }
    }

    fn invalid_transition(&self, action: &'static str) -> WizardError {
        tracing::warn!(session = %self.session_id, step = %self.step, action, "invalid wizard transition");
        WizardError::InvalidTransition {
            action,
            step: self.step,
        }
    }
}
