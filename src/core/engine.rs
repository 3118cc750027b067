//! Invocation handling
//!
//! This module provides the `LedgerHandler`, the runtime-facing surface of the
//! crate. It resolves operation names, routes them to the handlers and decides
//! how their writes reach the ledger.
//!
//! The handler is a plain configuration value: it holds no mutable state, so one
//! instance can serve any number of ledgers and invocations. Everything that
//! changes lives in the ledger passed to each call.
//!
//! # Entry points
//!
//! - `initialize` - deployment-time initialization
//! - `invoke` - primary entry point, routed through [`LedgerHandler::dispatch`]
//! - `run` - legacy alias of `invoke`, routed through the same dispatch
//! - `query` - read path (currently a stub that returns no payload)
//!
//! # Concurrency
//!
//! `Transfer` reads both balances and then writes both. Nothing here locks
//! those keys across the read-modify-write; two concurrent invocations touching
//! the same balance through a shared ledger can lose an update. Isolation is the
//! ledger's responsibility.

use crate::core::handlers;
use crate::core::staged_ledger::StagedLedger;
use crate::core::traits::{EntryPoint, InvokeEntry, Ledger, RunEntry};
use crate::types::{
    EntryKind, HandlerConfig, HandlerError, InvocationRecord, Operation, Payload, ScriptStep,
    WriteMode,
};
use tracing::debug;

/// Stateless invocation handler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerHandler {
    config: HandlerConfig,
}

impl LedgerHandler {
    /// Create a handler with the given configuration
    pub fn new(config: HandlerConfig) -> Self {
        LedgerHandler { config }
    }

    /// The configuration this handler was built with
    pub fn config(&self) -> HandlerConfig {
        self.config
    }

    /// Deployment-time initialization
    ///
    /// Always runs the `Initialize` handler; there is no function name to route on.
    pub fn initialize<L: Ledger>(
        &self,
        ledger: &mut L,
        args: &[String],
    ) -> Result<Payload, HandlerError> {
        debug!("init called");
        self.apply(ledger, |target| handlers::initialize(target, args))
    }

    /// Primary invocation entry point
    pub fn invoke<L: Ledger>(
        &self,
        ledger: &mut L,
        function: &str,
        args: &[String],
    ) -> Result<Payload, HandlerError> {
        InvokeEntry.call(self, ledger, function, args)
    }

    /// Legacy invocation entry point, identical to [`invoke`](Self::invoke)
    pub fn run<L: Ledger>(
        &self,
        ledger: &mut L,
        function: &str,
        args: &[String],
    ) -> Result<Payload, HandlerError> {
        RunEntry.call(self, ledger, function, args)
    }

    /// Read path
    ///
    /// Validates the request and returns no payload; the ledger is not consulted.
    pub fn query(&self, function: &str, args: &[String]) -> Result<Payload, HandlerError> {
        debug!("query called");
        handlers::query(function, args)
    }

    /// Route an operation name to its handler
    ///
    /// This is the single routing table behind every invocation entry point.
    ///
    /// # Errors
    ///
    /// Returns `UnknownOperation` for any name other than `init`, `invoke` or
    /// `delete` without looking at the arguments; otherwise whatever the
    /// selected handler returns.
    pub fn dispatch<L: Ledger>(
        &self,
        ledger: &mut L,
        function: &str,
        args: &[String],
    ) -> Result<Payload, HandlerError> {
        let operation = Operation::from_name(function)?;
        debug!(%operation, "function resolved");

        let decode_mode = self.config.decode_mode;
        self.apply(ledger, |target| match operation {
            Operation::Initialize => handlers::initialize(target, args),
            Operation::Transfer => handlers::transfer(target, args, decode_mode),
            Operation::DeleteEntity => handlers::delete_entity(target, args),
        })
    }

    /// Execute a recorded invocation through its entry point
    pub fn execute<L: Ledger>(
        &self,
        ledger: &mut L,
        record: &InvocationRecord,
    ) -> Result<Payload, HandlerError> {
        match record.entry {
            EntryKind::Init => self.initialize(ledger, &record.args),
            EntryKind::Invoke => self.invoke(ledger, &record.function, &record.args),
            EntryKind::Run => self.run(ledger, &record.function, &record.args),
            EntryKind::Query => self.query(&record.function, &record.args),
        }
    }

    /// Replay one script step
    ///
    /// `Seed` steps write straight to the ledger, standing in for the external
    /// process that provisions balances. `Call` steps go through [`execute`](Self::execute).
    pub fn replay<L: Ledger>(
        &self,
        ledger: &mut L,
        step: &ScriptStep,
    ) -> Result<Payload, HandlerError> {
        match step {
            ScriptStep::Seed { key, value } => {
                ledger
                    .put(key, value.as_bytes())
                    .map_err(|e| HandlerError::storage_write(key, e))?;
                Ok(None)
            }
            ScriptStep::Call(record) => self.execute(ledger, record),
        }
    }

    /// Run a handler under the configured write mode
    fn apply<L, F>(&self, ledger: &mut L, handler: F) -> Result<Payload, HandlerError>
    where
        L: Ledger,
        F: FnOnce(&mut dyn Ledger) -> Result<Payload, HandlerError>,
    {
        match self.config.write_mode {
            WriteMode::Direct => handler(ledger),
            WriteMode::Atomic => {
                let mut staged = StagedLedger::new(ledger);
                match handler(&mut staged) {
                    Ok(payload) => {
                        staged.commit()?;
                        Ok(payload)
                    }
                    Err(e) => {
                        let discarded = staged.discard();
                        debug!(discarded, "discarded staged writes");
                        Err(e)
                    }
                }
            }
        }
    }
}
