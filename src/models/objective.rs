//! Optimization objectives.

use serde::{Deserialize, Serialize};

/// A scheduling objective.
///
/// Several objectives may be requested; the engine optimizes them in the
/// order they were added (lexicographically).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Minimize the horizon (time of the last task end).
    Makespan,
    /// Maximize the smallest task start: schedule everything as late as possible.
    Latest,
    /// Minimize the sum of task ends.
    Flowtime,
    /// Minimize the greatest task start: pack tasks toward time 0.
    Earliest,
}

impl Objective {
    pub fn name(self) -> &'static str {
        match self {
            Objective::Makespan => "makespan",
            Objective::Latest => "latest",
            Objective::Flowtime => "flowtime",
            Objective::Earliest => "earliest",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names() {
        let o: Objective = serde_json::from_str("\"flowtime\"").unwrap();
        assert_eq!(o, Objective::Flowtime);
        assert_eq!(serde_json::to_string(&Objective::Makespan).unwrap(), "\"makespan\"");
        assert_eq!(Objective::Earliest.name(), "earliest");
    }
}
