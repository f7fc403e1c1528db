//! Resume analysis: intents, keyword summary, memoized dispatch, sessions and the
//! HTTP handlers that drive them.

pub mod cache;
pub mod dispatcher;
pub mod handlers;
pub mod intent;
pub mod keywords;
pub mod orchestrator;
pub mod prompts;
pub mod report;
pub mod session;
