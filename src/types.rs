use std::fmt;

/// Number of history entries embedded in a model prompt.
pub const HISTORY_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskTier {
    Safe,
    Sudo,
    Dangerous,
    Unknown,
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskTier::Safe => "safe",
            RiskTier::Sudo => "sudo",
            RiskTier::Dangerous => "dangerous",
            RiskTier::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Shell history and host description gathered once per invocation.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    pub history: Vec<String>,
    pub system_info: String,
}

/// The tail of the history that fits in a prompt, oldest first.
pub fn recent(history: &[String]) -> &[String] {
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    &history[start..]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// What the gate did with a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Executed(ExecutionResult),
    /// The user said no somewhere along the way. Not an error.
    Declined,
}

impl GateOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, GateOutcome::Executed(result) if result.success())
    }
}
