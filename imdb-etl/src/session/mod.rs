//! Interactive session: state machine, commands, and the operator loop

pub mod command;
pub mod controller;
pub mod etl_session;
pub mod operator;
pub mod state;

pub use command::{Command, RankScope};
pub use controller::{confirm, SessionController, SessionSettings, SessionSummary};
pub use etl_session::EtlSession;
pub use operator::{ConsoleOperator, Operator, ScriptedOperator};
pub use state::{SessionEvent, SessionState, StateTransition};
