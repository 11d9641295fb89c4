//! Line-oriented presentation shell for the sign-up wizard.
//!
//! Each input line is split with shell quoting rules and mapped onto a wizard
//! event or a shell preference change. A terminal gets a line editor with
//! history and completion; piped input is read as a plain script.

use std::borrow::Cow;
use std::io::{BufRead, Write};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Context as ReadlineContext, Editor, Helper,
};
use shell_words::split;
use strsim::levenshtein;

use crate::cli::output::Printer;
use crate::config::{Config, ConfigManager, Theme};
use crate::errors::{CliError, WizardError};
use crate::forms::{FieldName, FormRecord, SignUpWizard, Step, Transition};

const SUGGESTION_DISTANCE: usize = 3;
const NAVIGATION: [&str; 5] = ["Dashboard", "Products", "Users list", "Sign in", "Sign up"];
const THEMES: [&str; 3] = ["light", "dark", "plain"];
const SIGN_IN_FIELDS: [(&str, &str); 2] = [
    ("Your email", "name@company.com"),
    ("Your password", "••••••••"),
];

const COMMANDS: [(&str, &str); 14] = [
    ("set <field> <value>", "Edit a field of the active step"),
    ("next", "Validate personal details and continue"),
    ("back", "Return to personal details"),
    ("submit", "Validate credentials and create the account"),
    ("show", "Render the current page"),
    ("json", "Print the wizard state as JSON"),
    ("reset", "Start a new sign-up session"),
    ("sign-in", "Open the sign-in page"),
    ("sign-up", "Return to the sign-up wizard"),
    ("theme <light|dark|plain>", "Change the colour theme"),
    ("sidebar", "Toggle the navigation sidebar"),
    ("save-config", "Persist shell preferences"),
    ("help", "List commands"),
    ("exit", "Leave the shell"),
];

const COMMAND_NAMES: [&str; 14] = [
    "set",
    "next",
    "back",
    "submit",
    "show",
    "json",
    "reset",
    "sign-in",
    "sign-up",
    "theme",
    "sidebar",
    "save-config",
    "help",
    "exit",
];

/// Whether the shell should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellControl {
    Continue,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    SignIn,
    SignUp,
}

impl Page {
    fn label(self) -> &'static str {
        match self {
            Page::SignIn => "Sign in",
            Page::SignUp => "Sign up",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Set { name: String, value: String },
    Next,
    Back,
    Submit,
    Show,
    Json,
    Reset,
    SignIn,
    SignUp,
    Theme(Theme),
    Sidebar,
    SaveConfig,
    Help,
    Exit,
}

impl Command {
    fn drives_wizard(&self) -> bool {
        matches!(
            self,
            Command::Set { .. } | Command::Next | Command::Back | Command::Submit
        )
    }
}

fn parse_command(tokens: &[String]) -> Result<Command, CliError> {
    let Some((head, args)) = tokens.split_first() else {
        return Err(CliError::InvalidArguments("empty command".into()));
    };
    let command = match head.to_ascii_lowercase().as_str() {
        "set" => {
            let Some((name, rest)) = args.split_first() else {
                return Err(CliError::InvalidArguments(
                    "usage: set <field> <value>".into(),
                ));
            };
            Command::Set {
                name: name.clone(),
                value: rest.join(" "),
            }
        }
        "next" | "advance" => Command::Next,
        "back" => Command::Back,
        "submit" => Command::Submit,
        "show" => Command::Show,
        "json" => Command::Json,
        "reset" => Command::Reset,
        "sign-in" | "signin" => Command::SignIn,
        "sign-up" | "signup" => Command::SignUp,
        "theme" => {
            let name = args.first().ok_or_else(|| {
                CliError::InvalidArguments("usage: theme <light|dark|plain>".into())
            })?;
            Command::Theme(name.parse().map_err(CliError::InvalidArguments)?)
        }
        "sidebar" => Command::Sidebar,
        "save-config" => Command::SaveConfig,
        "help" | "?" => Command::Help,
        "exit" | "quit" => Command::Exit,
        other => {
            let mut message = format!("Unknown command `{other}`.");
            if let Some(best) = suggest(other, COMMAND_NAMES) {
                message.push_str(&format!(" Did you mean `{best}`?"));
            }
            return Err(CliError::InvalidArguments(message));
        }
    };
    Ok(command)
}

fn suggest<'a>(input: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let input = input.to_ascii_lowercase();
    candidates
        .into_iter()
        .map(|candidate| (levenshtein(&input, &candidate.to_ascii_lowercase()), candidate))
        .min_by_key(|(distance, _)| *distance)
        .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
        .map(|(_, candidate)| candidate)
}

/// History line for `line`. Secret values are left out.
fn history_entry(line: &str) -> Cow<'_, str> {
    let mut words = line.split_whitespace();
    match (words.next(), words.next()) {
        (Some(command), Some(name)) if command.eq_ignore_ascii_case("set") => {
            match name.parse::<FieldName>() {
                Ok(field) if field.is_secret() => Cow::Owned(format!("{command} {name} ")),
                _ => Cow::Borrowed(line),
            }
        }
        _ => Cow::Borrowed(line),
    }
}

fn confirm_exit(editor: &mut Editor<CommandHelper, DefaultHistory>) -> Result<bool, CliError> {
    match editor.readline("Exit shell? [y/N] ") {
        Ok(answer) => Ok(matches!(
            answer.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        )),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(true),
        Err(err) => Err(err.into()),
    }
}

/// Drives a [`SignUpWizard`] from text commands.
pub struct Shell<W: Write> {
    wizard: SignUpWizard,
    config: Config,
    config_manager: Option<ConfigManager>,
    printer: Printer<W>,
    page: Page,
}

impl<W: Write> Shell<W> {
    pub fn new(config: Config, out: W) -> Self {
        let printer = Printer::new(out, config.theme);
        Self {
            wizard: SignUpWizard::new(),
            config,
            config_manager: None,
            printer,
            page: Page::SignUp,
        }
    }

    pub fn with_config_manager(mut self, manager: ConfigManager) -> Self {
        self.config_manager = Some(manager);
        self
    }

    pub fn wizard(&self) -> &SignUpWizard {
        &self.wizard
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_output(self) -> W {
        self.printer.into_inner()
    }

    /// Reads a command script until `exit` or end of input.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<(), CliError> {
        self.greet()?;
        for line in input.lines() {
            let line = line?;
            if self.execute_line(&line)? == ShellControl::Exit {
                break;
            }
        }
        Ok(())
    }

    /// Runs the line editor on the controlling terminal.
    pub fn run_interactive(&mut self) -> Result<(), CliError> {
        let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
        editor.set_helper(Some(CommandHelper::new()));
        self.greet()?;

        loop {
            let prompt = self.prompt();
            match editor.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    editor.add_history_entry(history_entry(trimmed)).ok();

                    if self.execute_line(trimmed)? == ShellControl::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    if confirm_exit(&mut editor)? {
                        break;
                    }
                }
                Err(ReadlineError::Eof) => {
                    self.printer.info("Exiting shell.")?;
                    break;
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    /// Executes one command line. Bad input is reported, not returned.
    pub fn execute_line(&mut self, line: &str) -> Result<ShellControl, CliError> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(ShellControl::Continue);
        }

        let tokens = match split(trimmed) {
            Ok(tokens) => tokens,
            Err(err) => {
                self.printer.error(format!("Could not parse command: {err}"))?;
                return Ok(ShellControl::Continue);
            }
        };

        if let Some(head) = tokens.first() {
            tracing::debug!(command = %head, "shell command");
        }
        match parse_command(&tokens) {
            Ok(command) => self.execute(command),
            Err(CliError::InvalidArguments(message)) => {
                self.printer.error(message)?;
                Ok(ShellControl::Continue)
            }
            Err(other) => Err(other),
        }
    }

    fn greet(&mut self) -> Result<(), CliError> {
        self.printer.section("Create a Free Account")?;
        self.render_page()
    }

    fn prompt(&self) -> String {
        match self.page {
            Page::SignIn => "sign-in> ".to_string(),
            Page::SignUp => {
                let number = self.wizard.step().number();
                let count = Step::COUNT;
                format!("sign-up {number}/{count}> ")
            }
        }
    }

    fn execute(&mut self, command: Command) -> Result<ShellControl, CliError> {
        if self.page == Page::SignIn && command.drives_wizard() {
            self.printer.warning(
                "The sign-in form is for display only. Type `sign-up` to return to the wizard.",
            )?;
            return Ok(ShellControl::Continue);
        }

        match command {
            Command::Set { name, value } => {
                match self.wizard.update_field_by_name(&name, value) {
                    Ok(field) => {
                        if !self.wizard.step().contains(field) {
                            let step = field.step();
                            self.printer.info(format!(
                                "`{field}` belongs to {step}; the value is kept for later."
                            ))?;
                        }
                    }
                    Err(err) => self.report_wizard_error(err, &name)?,
                }
                self.echo_snapshot()?;
            }
            Command::Next => {
                let outcome = self.wizard.advance();
                self.report_transition(outcome, None)?;
            }
            Command::Back => {
                let outcome = self.wizard.back();
                self.report_transition(outcome, None)?;
            }
            Command::Submit => {
                let mut created: Vec<FormRecord> = Vec::new();
                let outcome = self.wizard.submit(&mut created);
                self.report_transition(outcome, created.pop())?;
            }
            Command::Show => self.render_page()?,
            Command::Json => {
                let json = serde_json::to_string_pretty(&self.wizard.snapshot())?;
                self.printer.detail(json)?;
            }
            Command::Reset => {
                self.wizard.reset();
                self.page = Page::SignUp;
                self.printer.info("Started a new sign-up session.")?;
                self.render_step()?;
            }
            Command::SignIn => {
                self.page = Page::SignIn;
                self.render_sign_in()?;
            }
            Command::SignUp => {
                self.page = Page::SignUp;
                self.render_step()?;
            }
            Command::Theme(theme) => {
                self.config.theme = theme;
                self.printer.set_theme(theme);
                self.printer.success(format!("Theme set to {theme:?}."))?;
            }
            Command::Sidebar => {
                self.config.sidebar_open = !self.config.sidebar_open;
                let state = if self.config.sidebar_open { "shown" } else { "hidden" };
                self.printer.success(format!("Sidebar {state}."))?;
            }
            Command::SaveConfig => match &self.config_manager {
                Some(manager) => {
                    manager.save(&self.config)?;
                    let path = manager.path().display();
                    self.printer
                        .success(format!("Preferences saved to {path}."))?;
                }
                None => self.printer.warning("No configuration file is in use.")?,
            },
            Command::Help => {
                self.printer.section("Commands")?;
                for (usage, description) in COMMANDS {
                    self.printer.detail(format!("  {usage:<26} {description}"))?;
                }
                let fields: Vec<&str> = FieldName::ALL.iter().map(|field| field.key()).collect();
                let fields = fields.join(", ");
                self.printer.detail(format!("Fields: {fields}"))?;
            }
            Command::Exit => return Ok(ShellControl::Exit),
        }
        Ok(ShellControl::Continue)
    }

    fn report_transition(
        &mut self,
        outcome: Result<Transition, WizardError>,
        created: Option<FormRecord>,
    ) -> Result<(), CliError> {
        match outcome {
            Ok(Transition::Advanced) => {
                self.printer.success("Personal details accepted.")?;
                self.render_step()?;
            }
            Ok(Transition::Returned) => {
                self.printer.info("Back to personal details.")?;
                self.render_step()?;
            }
            Ok(Transition::Blocked) => {
                self.printer.warning("Please fix the highlighted fields.")?;
                self.render_errors()?;
            }
            Ok(Transition::Submitted) => {
                self.printer.success("Account created")?;
                if let Some(record) = created {
                    let json = serde_json::to_string_pretty(&record)?;
                    self.printer.detail(json)?;
                }
            }
            Ok(Transition::Superseded) => {
                self.printer.info("A newer request replaced this one.")?;
            }
            Err(err) => self.report_wizard_error(err, "")?,
        }
        self.echo_snapshot()
    }

    fn report_wizard_error(&mut self, err: WizardError, input: &str) -> Result<(), CliError> {
        match err {
            WizardError::UnknownField(_) => {
                let mut message = err.to_string();
                if let Some(best) = suggest(input, FieldName::ALL.iter().map(|field| field.key())) {
                    message.push_str(&format!(" Did you mean `{best}`?"));
                }
                self.printer.error(message)?;
            }
            WizardError::InvalidTransition { .. } => self.printer.warning(err)?,
        }
        Ok(())
    }

    fn render_page(&mut self) -> Result<(), CliError> {
        match self.page {
            Page::SignIn => self.render_sign_in(),
            Page::SignUp => self.render_step(),
        }
    }

    fn render_navigation(&mut self) -> Result<(), CliError> {
        if !self.config.sidebar_open {
            return Ok(());
        }
        let current = self.page.label();
        let items: Vec<Cow<'_, str>> = NAVIGATION
            .iter()
            .map(|&item| {
                if item == current {
                    Cow::Owned(format!("[{item}]"))
                } else {
                    Cow::Borrowed(item)
                }
            })
            .collect();
        let items = items.join(" | ");
        self.printer.detail(format!("Navigation: {items}"))?;
        Ok(())
    }

    fn render_sign_in(&mut self) -> Result<(), CliError> {
        self.render_navigation()?;
        self.printer.section("Sign In")?;
        for (label, placeholder) in SIGN_IN_FIELDS {
            self.printer.detail(format!("  {label}: [{placeholder}]"))?;
        }
        self.printer.detail("  [ ] Remember me    Forgot Password?")?;
        self.printer
            .detail("Login to your account is not connected to an account service.")?;
        self.printer
            .detail("Not registered? Type `sign-up` to create an account.")?;
        Ok(())
    }

    fn render_step(&mut self) -> Result<(), CliError> {
        self.render_navigation()?;

        let step = self.wizard.step();
        let (number, count, title) = (step.number(), Step::COUNT, step.title());
        self.printer
            .section(format!("Step {number} of {count} – {title}"))?;
        for &field in step.fields() {
            let (label, key) = (field.label(), field.key());
            let value = display_value(self.wizard.record(), field);
            self.printer.detail(format!("  {label} ({key}): {value}"))?;
            if let Some(message) = self.wizard.errors().message(field) {
                let line = format!("{key}: {message}");
                self.printer.error(line)?;
            }
        }
        let hint = match step {
            Step::Personal => "Type `next` to continue.",
            Step::Credentials => "Type `submit` to create the account or `back` to edit details.",
        };
        self.printer.detail(hint)?;
        Ok(())
    }

    fn render_errors(&mut self) -> Result<(), CliError> {
        let lines: Vec<String> = self
            .wizard
            .errors()
            .iter()
            .map(|(field, error)| {
                let key = field.key();
                let message = &error.message;
                format!("{key}: {message}")
            })
            .collect();
        for line in lines {
            self.printer.error(line)?;
        }
        Ok(())
    }

    fn echo_snapshot(&mut self) -> Result<(), CliError> {
        if self.config.echo_snapshot {
            let json = serde_json::to_string(&self.wizard.snapshot())?;
            self.printer.detail(json)?;
        }
        Ok(())
    }
}

fn display_value(record: &FormRecord, field: FieldName) -> String {
    let value = record.text(field);
    if field.is_secret() {
        "*".repeat(value.chars().count())
    } else {
        value.into_owned()
    }
}

/// Completes command names, then field keys after `set` and theme names after
/// `theme`.
struct CommandHelper {
    commands: Vec<&'static str>,
    fields: Vec<&'static str>,
}

impl CommandHelper {
    fn new() -> Self {
        let mut commands = COMMAND_NAMES.to_vec();
        commands.sort_unstable();
        Self {
            commands,
            fields: FieldName::ALL.iter().map(|field| field.key()).collect(),
        }
    }

    fn candidates(&self, prefix: &str) -> (usize, Vec<&'static str>) {
        let start = prefix
            .rfind(|c: char| c.is_ascii_whitespace())
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let needle = prefix[start..].to_ascii_lowercase();
        let preceding: Vec<&str> = prefix[..start].split_whitespace().collect();

        let pool: &[&'static str] = match preceding.as_slice() {
            [] => &self.commands,
            [command] if command.eq_ignore_ascii_case("set") => &self.fields,
            [command] if command.eq_ignore_ascii_case("theme") => &THEMES,
            _ => &[],
        };
        let names = pool
            .iter()
            .copied()
            .filter(|name| name.to_ascii_lowercase().starts_with(&needle))
            .collect();
        (start, names)
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, names) = self.candidates(&line[..pos]);
        let pairs = names
            .into_iter()
            .map(|name| Pair {
                display: name.to_string(),
                replacement: name.to_string(),
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for CommandHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}
