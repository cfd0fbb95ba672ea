use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Identifiers of the rate sources in the retrieval chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Remote bulk call covering a whole date range.
    Timeframe,
    /// Remote single-date call, issued once per day.
    Historical,
    /// Bundled local dataset.
    Sample,
}

impl ProviderId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeframe => "timeframe",
            Self::Historical => "historical",
            Self::Sample => "sample",
        }
    }

    pub const fn is_remote(self) -> bool {
        matches!(self, Self::Timeframe | Self::Historical)
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
