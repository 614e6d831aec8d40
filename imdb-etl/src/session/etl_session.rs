//! ETL session: base/current relations, artifact registry, and command dispatch
//!
//! The session owns everything that lives for one interactive run. Commands
//! are executed only from `MainMenu`; each one moves through its flow state
//! and back, recording every transition.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::command::{check_operator_percent, Command, RankScope};
use super::state::{next_state, SessionEvent, SessionState, StateTransition};
use crate::error::{EtlError, EtlResult};
use crate::models::Relation;
use crate::services::output_writer::{
    filtered_artifact_name, top_percent_artifact_name, unfiltered_artifact_name, ALL_TYPES_LABEL,
};
use crate::services::{filter_by_type, record_store, top_percent, LoadReport, OutputWriter};
use crate::services::{RankingOptions, SourceFiles, WriteResult};

#[derive(Debug)]
pub struct EtlSession {
    id: Uuid,
    state: SessionState,
    base: Relation,
    current: Option<Relation>,
    current_type: Option<String>,
    title_types: Vec<String>,
    writer: OutputWriter,
    ranking: RankingOptions,
    transitions: Vec<StateTransition>,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl EtlSession {
    /// New session in `Init`, writing artifacts into `output_dir`
    pub fn new(output_dir: PathBuf, ranking: RankingOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Init,
            base: Relation::default(),
            current: None,
            current_type: None,
            title_types: Vec::new(),
            writer: OutputWriter::new(output_dir),
            ranking,
            transitions: Vec::new(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Session already at `MainMenu` with `base` attached
    pub fn with_base(
        base: Relation,
        output_dir: PathBuf,
        ranking: RankingOptions,
    ) -> EtlResult<Self> {
        let mut session = Self::new(output_dir, ranking);
        session.fire(SessionEvent::Initialized)?;
        session.attach_base(base)?;
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn base(&self) -> &Relation {
        &self.base
    }

    pub fn current(&self) -> Option<&Relation> {
        self.current.as_ref()
    }

    pub fn current_type(&self) -> Option<&str> {
        self.current_type.as_deref()
    }

    /// Distinct title types of the base relation, first-seen order
    pub fn title_types(&self) -> &[String] {
        &self.title_types
    }

    pub fn writer(&self) -> &OutputWriter {
        &self.writer
    }

    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Working folders are ready: `Init` → `AwaitBaseLoad`
    pub fn initialized(&mut self) -> EtlResult<()> {
        self.fire(SessionEvent::Initialized).map(|_| ())
    }

    /// Working folders could not be prepared: `Init` → `Terminated`
    pub fn init_failed(&mut self) -> EtlResult<()> {
        self.fire(SessionEvent::InitFailed).map(|_| ())
    }

    /// Load and join the sources once
    ///
    /// Any failure terminates the session; there is no retry.
    pub fn load_base(&mut self, sources: &SourceFiles) -> EtlResult<LoadReport> {
        self.expect_state(SessionState::AwaitBaseLoad)?;

        match record_store::load_with_report(&sources.basics, &sources.ratings) {
            Ok((relation, report)) => {
                self.attach_base(relation)?;
                Ok(report)
            }
            Err(e) => {
                warn!(session_id = %self.id, "Base load failed: {}", e);
                self.fire(SessionEvent::LoadFailed)?;
                Err(e)
            }
        }
    }

    fn attach_base(&mut self, base: Relation) -> EtlResult<()> {
        self.expect_state(SessionState::AwaitBaseLoad)?;
        self.title_types = base.distinct_title_types();
        self.base = base;
        info!(
            session_id = %self.id,
            rows = self.base.len(),
            title_types = self.title_types.len(),
            "Base relation ready"
        );
        self.fire(SessionEvent::BaseLoaded).map(|_| ())
    }

    /// Run one menu command
    ///
    /// Flow commands return the write outcome; `End` moves to `Cleanup` and
    /// returns `None`. A failing flow returns to `MainMenu` before the error
    /// is handed back.
    pub fn execute(&mut self, command: Command) -> EtlResult<Option<WriteResult>> {
        self.expect_state(SessionState::MainMenu)?;
        debug!(session_id = %self.id, ?command, "Executing");

        match command {
            Command::Filter { title_type } => {
                self.run_flow(SessionEvent::FilterChosen, |session| {
                    let filtered = filter_by_type(&session.base, &title_type);
                    let name = filtered_artifact_name(&title_type);
                    let relation = session.current.insert(filtered);
                    session.current_type = Some(title_type);
                    session.writer.write(relation, &name)
                })
            }
            Command::Unfiltered => self.run_flow(SessionEvent::UnfilteredChosen, |session| {
                session.writer.write(&session.base, &unfiltered_artifact_name())
            }),
            Command::TopPercent { scope, percent } => {
                self.run_flow(SessionEvent::RankChosen, |session| {
                    let percent = check_operator_percent(percent)?;
                    let (target, label) = match scope {
                        RankScope::Whole => (&session.base, ALL_TYPES_LABEL),
                        RankScope::Current => {
                            match (session.current.as_ref(), session.current_type.as_deref()) {
                                (Some(relation), Some(title_type)) => (relation, title_type),
                                _ => {
                                    return Err(EtlError::InvalidParameter(
                                        "No filtered relation yet, filter a type first"
                                            .to_string(),
                                    ))
                                }
                            }
                        }
                    };
                    let name = top_percent_artifact_name(percent, label);
                    let top = top_percent(target, percent, &session.ranking)?;
                    session.writer.write(&top, &name)
                })
            }
            Command::End => {
                self.fire(SessionEvent::EndChosen)?;
                Ok(None)
            }
        }
    }

    /// Cleanup handled: `Cleanup` → `Terminated`
    pub fn finish(&mut self) -> EtlResult<()> {
        self.fire(SessionEvent::CleanupDone).map(|_| ())
    }

    fn run_flow<F>(&mut self, event: SessionEvent, flow: F) -> EtlResult<Option<WriteResult>>
    where
        F: FnOnce(&mut Self) -> EtlResult<WriteResult>,
    {
        self.fire(event)?;
        match flow(self) {
            Ok(result) => {
                self.fire(SessionEvent::FlowFinished)?;
                Ok(Some(result))
            }
            Err(e) => {
                debug!(session_id = %self.id, state = %self.state, "Flow aborted: {}", e);
                self.fire(SessionEvent::FlowAborted)?;
                Err(e)
            }
        }
    }

    fn expect_state(&self, expected: SessionState) -> EtlResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(EtlError::Internal(format!(
                "Session is in {}, expected {}",
                self.state, expected
            )))
        }
    }

    fn fire(&mut self, event: SessionEvent) -> EtlResult<&StateTransition> {
        let new_state = next_state(self.state, event).ok_or_else(|| {
            EtlError::Internal(format!("No transition from {} on {:?}", self.state, event))
        })?;

        let transition = StateTransition {
            session_id: self.id,
            old_state: self.state,
            event,
            new_state,
            transitioned_at: Utc::now(),
        };
        debug!(
            session_id = %self.id,
            from = %transition.old_state,
            to = %transition.new_state,
            ?event,
            "State transition"
        );

        self.state = new_state;
        if new_state.is_terminal() {
            self.ended_at = Some(transition.transitioned_at);
        }
        self.transitions.push(transition);
        Ok(&self.transitions[self.transitions.len() - 1])
    }
}
