//! Session state machine
//!
//! Init → AwaitBaseLoad → MainMenu → {FilterFlow, RankFlow, UnfilteredFlow}
//! → MainMenu (loop) → Cleanup → Terminated
//!
//! [`TRANSITIONS`] is the only place legal moves are defined. Anything not
//! listed there is rejected by [`next_state`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Interactive session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Working folders being validated/created
    Init,
    /// Record store loading the base relation
    AwaitBaseLoad,
    /// Waiting for the operator's next command
    MainMenu,
    /// Type filter + write of the filtered artifact
    FilterFlow,
    /// Top-percent selection + write
    RankFlow,
    /// Write of the whole base relation
    UnfilteredFlow,
    /// Offering to delete raw inputs
    Cleanup,
    /// Session over
    Terminated,
}

/// Something that happened which may move the session to another state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    Initialized,
    InitFailed,
    BaseLoaded,
    LoadFailed,
    FilterChosen,
    RankChosen,
    UnfilteredChosen,
    EndChosen,
    FlowFinished,
    FlowAborted,
    CleanupDone,
}

use SessionEvent as E;
use SessionState as S;

/// (from, event, to)
pub const TRANSITIONS: &[(SessionState, SessionEvent, SessionState)] = &[
    (S::Init, E::Initialized, S::AwaitBaseLoad),
    (S::Init, E::InitFailed, S::Terminated),
    (S::AwaitBaseLoad, E::BaseLoaded, S::MainMenu),
    (S::AwaitBaseLoad, E::LoadFailed, S::Terminated),
    (S::MainMenu, E::FilterChosen, S::FilterFlow),
    (S::MainMenu, E::RankChosen, S::RankFlow),
    (S::MainMenu, E::UnfilteredChosen, S::UnfilteredFlow),
    (S::MainMenu, E::EndChosen, S::Cleanup),
    (S::FilterFlow, E::FlowFinished, S::MainMenu),
    (S::FilterFlow, E::FlowAborted, S::MainMenu),
    (S::RankFlow, E::FlowFinished, S::MainMenu),
    (S::RankFlow, E::FlowAborted, S::MainMenu),
    (S::UnfilteredFlow, E::FlowFinished, S::MainMenu),
    (S::UnfilteredFlow, E::FlowAborted, S::MainMenu),
    (S::Cleanup, E::CleanupDone, S::Terminated),
];

/// Target state for `event` in `state`, or `None` if the move is illegal
pub fn next_state(state: SessionState, event: SessionEvent) -> Option<SessionState> {
    TRANSITIONS
        .iter()
        .find(|(from, on, _)| *from == state && *on == event)
        .map(|(_, _, to)| *to)
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Terminated)
    }

    /// One of the three sub-flows entered from the menu
    pub fn is_flow(&self) -> bool {
        matches!(
            self,
            SessionState::FilterFlow | SessionState::RankFlow | SessionState::UnfilteredFlow
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Init => "Init",
            SessionState::AwaitBaseLoad => "AwaitBaseLoad",
            SessionState::MainMenu => "MainMenu",
            SessionState::FilterFlow => "FilterFlow",
            SessionState::RankFlow => "RankFlow",
            SessionState::UnfilteredFlow => "UnfilteredFlow",
            SessionState::Cleanup => "Cleanup",
            SessionState::Terminated => "Terminated",
        };
        f.write_str(name)
    }
}

/// Recorded state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    pub session_id: Uuid,
    pub old_state: SessionState,
    pub event: SessionEvent,
    pub new_state: SessionState,
    pub transitioned_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ALL_STATES: [SessionState; 8] = [
        S::Init,
        S::AwaitBaseLoad,
        S::MainMenu,
        S::FilterFlow,
        S::RankFlow,
        S::UnfilteredFlow,
        S::Cleanup,
        S::Terminated,
    ];

    #[test]
    fn test_table_is_deterministic() {
        let mut seen = HashSet::new();
        for (from, event, _) in TRANSITIONS {
            assert!(seen.insert((*from, *event)), "duplicate entry for {from} on {event:?}");
        }
    }

    #[test]
    fn test_terminated_has_no_exits() {
        assert!(TRANSITIONS.iter().all(|(from, _, _)| !from.is_terminal()));
    }

    #[test]
    fn test_every_flow_returns_to_menu() {
        for state in ALL_STATES.iter().filter(|s| s.is_flow()) {
            assert_eq!(next_state(*state, E::FlowFinished), Some(S::MainMenu));
            assert_eq!(next_state(*state, E::FlowAborted), Some(S::MainMenu));
        }
    }

    #[test]
    fn test_load_failure_terminates_without_retry() {
        assert_eq!(next_state(S::AwaitBaseLoad, E::LoadFailed), Some(S::Terminated));
        assert_eq!(next_state(S::Terminated, E::Initialized), None);
    }

    #[test]
    fn test_illegal_moves_are_rejected() {
        assert_eq!(next_state(S::Init, E::FilterChosen), None);
        assert_eq!(next_state(S::MainMenu, E::FlowFinished), None);
        assert_eq!(next_state(S::FilterFlow, E::RankChosen), None);
        assert_eq!(next_state(S::Cleanup, E::EndChosen), None);
    }

    #[test]
    fn test_every_state_is_reachable_from_init() {
        let mut reached = HashSet::from([S::Init]);
        let mut frontier = vec![S::Init];
        while let Some(state) = frontier.pop() {
            for (from, _, to) in TRANSITIONS {
                if *from == state && reached.insert(*to) {
                    frontier.push(*to);
                }
            }
        }
        assert_eq!(reached.len(), ALL_STATES.len());
    }
}
