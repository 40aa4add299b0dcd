// crates/contextstream-hooks/src/decision.rs
// Outcome of evaluating one tool invocation

use crate::classifier::DiscoveryKind;
use std::fmt;

/// A per-workspace requirement that a specific call comes next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Obligation {
    Init,
    Context,
}

impl fmt::Display for Obligation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Obligation::Init => write!(f, "init"),
            Obligation::Context => write!(f, "context"),
        }
    }
}

/// Why a call was stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// A protocol obligation is outstanding
    Obligation(Obligation),
    /// Broad local discovery in an indexed project
    Discovery(DiscoveryKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    /// Allowed, and it discharged an outstanding obligation
    Satisfied(Obligation),
    /// Allowed as a read-only remote query while context is owed
    Bypass,
    Block { reason: BlockReason, message: String },
}

/// Something that went wrong while deciding. The decision itself still
/// stands (failures always resolve to allow).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub source: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn new(source: &'static str, message: impl Into<String>) -> Self {
        Self {
            source,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.source, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub verdict: Verdict,
    /// Extra context for the assistant, delivered where the editor allows
    pub context: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Decision {
    pub fn allow() -> Self {
        Self::with_verdict(Verdict::Allow)
    }

    pub fn satisfied(obligation: Obligation) -> Self {
        Self::with_verdict(Verdict::Satisfied(obligation))
    }

    pub fn bypass() -> Self {
        Self::with_verdict(Verdict::Bypass)
    }

    pub fn block(reason: BlockReason, message: impl Into<String>) -> Self {
        Self::with_verdict(Verdict::Block {
            reason,
            message: message.into(),
        })
    }

    /// Allow, recording why nothing stronger was decided
    pub fn allow_with_diagnostic(diagnostic: Diagnostic) -> Self {
        Self::allow().diagnose(diagnostic)
    }

    fn with_verdict(verdict: Verdict) -> Self {
        Self {
            verdict,
            context: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn diagnose(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self.verdict, Verdict::Block { .. })
    }

    pub fn is_allowed(&self) -> bool {
        !self.is_blocked()
    }

    /// Block message, if blocked
    pub fn message(&self) -> Option<&str> {
        match &self.verdict {
            Verdict::Block { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn block_reason(&self) -> Option<BlockReason> {
        match &self.verdict {
            Verdict::Block { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}
