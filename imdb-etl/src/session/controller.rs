//! Prompt-driven session controller
//!
//! Drives an [`EtlSession`] through its states, asking the [`Operator`] for
//! every decision. Malformed answers are re-asked without a retry bound;
//! end of input ends the session (or takes the non-destructive answer at a
//! yes/no question).

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::command::{
    parse_menu_choice, parse_percent, parse_scope, parse_yes_no, Command, MenuChoice, RankScope,
};
use super::etl_session::EtlSession;
use super::operator::Operator;
use super::state::SessionState;
use crate::error::{EtlError, EtlResult};
use crate::services::{RankingOptions, SourceFiles, Workspace, WriteResult};

const MENU_PROMPT: &str = "Choose a type (number or name), 'all' for every type, \
                           'top' for a top-percent list, 'end' to finish:";
const SCOPE_PROMPT: &str =
    "Rank which relation? 1 = current filtered relation, 2 = whole relation:";
const PERCENT_PROMPT: &str = "Top percent to keep (0.1 - 99.9):";
const KEEP_RESULTS_PROMPT: &str = "Keep them? (yes/no)";
const DELETE_RAW_PROMPT: &str = "Delete raw folder and source files? (yes/no)";

/// What a session controller needs to run
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub workspace: Workspace,
    pub sources: SourceFiles,
    pub ranking: RankingOptions,
}

/// Outcome of a completed session
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub session_id: Uuid,
    /// Artifacts written by this session
    pub artifacts_written: usize,
    /// Files in the result folder at the end
    pub result_files: usize,
    pub raw_removed: bool,
    pub transitions: usize,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

pub struct SessionController<O: Operator> {
    operator: O,
    settings: SessionSettings,
}

impl<O: Operator> SessionController<O> {
    pub fn new(operator: O, settings: SessionSettings) -> Self {
        Self { operator, settings }
    }

    pub fn operator(&self) -> &O {
        &self.operator
    }

    pub fn into_operator(self) -> O {
        self.operator
    }

    /// Run one session from `Init` to `Terminated`
    ///
    /// Returns `Err` only when the session cannot start (working folders or
    /// base load) or on an internal state machine fault.
    pub fn run(&mut self) -> EtlResult<SessionSummary> {
        let mut session = EtlSession::new(
            self.settings.workspace.result_folder().to_path_buf(),
            self.settings.ranking,
        );
        info!(session_id = %session.id(), "Session started");

        if let Err(e) = self.prepare_workspace() {
            error!(session_id = %session.id(), "Initialization failed: {}", e);
            self.operator.notify(&format!("Could not prepare working folders: {}", e));
            session.init_failed()?;
            return Err(e);
        }
        session.initialized()?;

        self.operator.notify("Loading source files ...");
        match session.load_base(&self.settings.sources) {
            Ok(report) => {
                self.operator.notify(&format!(
                    "Loaded {} titles ({} types)",
                    report.joined_rows,
                    session.title_types().len()
                ));
            }
            Err(e) => {
                error!(session_id = %session.id(), "Base load failed: {}", e);
                self.operator.notify(&format!("Could not load source files: {}", e));
                return Err(e);
            }
        }

        while session.state() == SessionState::MainMenu {
            let Some(command) = self.next_command(&session) else {
                continue;
            };

            match session.execute(command) {
                Ok(Some(result)) => self.report_write(&result),
                Ok(None) => {}
                Err(e @ EtlError::Internal(_)) => return Err(e),
                Err(e) => {
                    warn!(session_id = %session.id(), "Flow aborted: {}", e);
                    self.operator.notify(&e.to_string());
                }
            }
        }

        let raw_removed = self.cleanup();
        let result_files = self.settings.workspace.result_file_count()?;
        self.operator.notify(&format!("{} files produced", result_files));
        session.finish()?;

        info!(
            session_id = %session.id(),
            artifacts = session.writer().written_count(),
            result_files,
            "Session finished"
        );

        Ok(SessionSummary {
            session_id: session.id(),
            artifacts_written: session.writer().written_count(),
            result_files,
            raw_removed,
            transitions: session.transitions().len(),
            started_at: session.started_at(),
            ended_at: session.ended_at(),
        })
    }

    /// Create working folders and settle any results left by an earlier run
    fn prepare_workspace(&mut self) -> EtlResult<()> {
        self.settings.workspace.ensure()?;

        let previous = self.settings.workspace.result_file_count()?;
        if previous == 0 {
            return Ok(());
        }

        self.operator.notify(&format!(
            "{} contains {} files from a previous run.",
            self.settings.workspace.result_folder().display(),
            previous
        ));
        if !confirm(&mut self.operator, KEEP_RESULTS_PROMPT, true) {
            self.settings.workspace.clear_results()?;
            self.operator.notify("Previous results deleted.");
        }
        Ok(())
    }

    /// Ask for the next command; `None` means show the menu again
    fn next_command(&mut self, session: &EtlSession) -> Option<Command> {
        self.operator.notify(&menu_text(session));

        let Some(answer) = self.operator.ask(MENU_PROMPT) else {
            return Some(Command::End);
        };

        match parse_menu_choice(&answer, session.title_types()) {
            Ok(MenuChoice::Type(title_type)) => Some(Command::Filter { title_type }),
            Ok(MenuChoice::Unfiltered) => Some(Command::Unfiltered),
            Ok(MenuChoice::TopPercent) => self.ask_top_percent(session),
            Ok(MenuChoice::End) => Some(Command::End),
            Err(e) => {
                self.operator.notify(&e.to_string());
                None
            }
        }
    }

    fn ask_top_percent(&mut self, session: &EtlSession) -> Option<Command> {
        let scope = loop {
            let answer = self.operator.ask(SCOPE_PROMPT)?;
            match parse_scope(&answer) {
                Ok(RankScope::Current) if session.current().is_none() => {
                    self.operator
                        .notify("No type has been filtered yet. Choose 2 or filter a type first.");
                }
                Ok(scope) => break scope,
                Err(e) => self.operator.notify(&e.to_string()),
            }
        };

        let percent = loop {
            let answer = self.operator.ask(PERCENT_PROMPT)?;
            match parse_percent(&answer) {
                Ok(percent) => break percent,
                Err(e) => self.operator.notify(&e.to_string()),
            }
        };

        Some(Command::TopPercent { scope, percent })
    }

    fn report_write(&mut self, result: &WriteResult) {
        let message = if result.skipped {
            format!("{} was already written in this session, skipped.", result.name)
        } else {
            format!("Wrote {} rows to {}", result.rows, result.path.display())
        };
        self.operator.notify(&message);
    }

    /// Offer to delete the raw inputs; true when they were removed
    fn cleanup(&mut self) -> bool {
        if !confirm(&mut self.operator, DELETE_RAW_PROMPT, false) {
            return false;
        }

        let workspace = &self.settings.workspace;
        let operator = &mut self.operator;
        let removed = workspace
            .remove_raw_sources(|path| operator.notify(&format!("Deleted {}", path.display())));
        match removed {
            Ok(_) => true,
            Err(e) => {
                warn!("Raw folder cleanup failed: {}", e);
                operator.notify(&format!("Could not delete raw files: {}", e));
                false
            }
        }
    }
}

/// Ask a yes/no question until it gets an answer; `on_eof` at end of input
pub fn confirm<O: Operator + ?Sized>(operator: &mut O, prompt: &str, on_eof: bool) -> bool {
    loop {
        let Some(answer) = operator.ask(prompt) else {
            return on_eof;
        };
        match parse_yes_no(&answer) {
            Ok(value) => return value,
            Err(e) => operator.notify(&e.to_string()),
        }
    }
}

fn menu_text(session: &EtlSession) -> String {
    let mut text = String::from("Title types:");
    for (i, title_type) in session.title_types().iter().enumerate() {
        text.push_str(&format!("\n  {}. {}", i + 1, title_type));
    }
    if let Some(current) = session.current_type() {
        text.push_str(&format!("\nCurrent filter: {}", current));
    }
    text
}
