/// Counters collected during one discovery cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Discovery pages received.
    pub pages: usize,
    /// Documents written to the store.
    pub persisted: usize,
    /// Documents whose write failed and was skipped.
    pub failed: usize,
}

/// How a discovery cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A page came back without new ids while a key was working.
    CaughtUp(CycleStats),
    /// The last page had no continuation token.
    Completed(CycleStats),
    /// No key produced a result; a new key has to be supplied.
    CredentialsExhausted(CycleStats),
    /// The catalog was unavailable; the cycle was cut short.
    Aborted(CycleStats),
}

impl CycleOutcome {
    pub fn stats(&self) -> CycleStats {
        match self {
            Self::CaughtUp(stats)
            | Self::Completed(stats)
            | Self::CredentialsExhausted(stats)
            | Self::Aborted(stats) => *stats,
        }
    }

    /// Short name for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CaughtUp(_) => "caught_up",
            Self::Completed(_) => "completed",
            Self::CredentialsExhausted(_) => "credentials_exhausted",
            Self::Aborted(_) => "aborted",
        }
    }
}
