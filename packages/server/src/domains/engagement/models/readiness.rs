use serde::{Deserialize, Serialize};

/// Closed set of answers to "are you ready to vote?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadinessResponse {
    Yes,
    No,
    StillThinking,
}

impl std::fmt::Display for ReadinessResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadinessResponse::Yes => write!(f, "yes"),
            ReadinessResponse::No => write!(f, "no"),
            ReadinessResponse::StillThinking => write!(f, "still-thinking"),
        }
    }
}

impl std::str::FromStr for ReadinessResponse {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "yes" => Ok(ReadinessResponse::Yes),
            "no" => Ok(ReadinessResponse::No),
            "still-thinking" => Ok(ReadinessResponse::StillThinking),
            _ => Err(anyhow::anyhow!("Invalid readiness response: {}", s)),
        }
    }
}

/// Occurrence counts per readiness answer. All three keys are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessStats {
    pub yes: i64,
    pub no: i64,
    #[serde(rename = "still-thinking")]
    pub still_thinking: i64,
}

impl ReadinessStats {
    pub fn add(&mut self, response: ReadinessResponse, n: i64) {
        match response {
            ReadinessResponse::Yes => self.yes += n,
            ReadinessResponse::No => self.no += n,
            ReadinessResponse::StillThinking => self.still_thinking += n,
        }
    }

    /// Tally raw stored answers; anything outside the closed set is ignored.
    pub fn tally<'a>(responses: impl IntoIterator<Item = &'a str>) -> Self {
        let mut stats = Self::default();
        for raw in responses {
            if let Ok(response) = raw.parse::<ReadinessResponse>() {
                stats.add(response, 1);
            }
        }
        stats
    }
}
