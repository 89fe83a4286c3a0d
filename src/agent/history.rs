//! Append-only conversation history and the usage statistics derived from it.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One completed `process_query` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRecord {
    /// When the call completed.
    pub timestamp: DateTime<Utc>,
    /// Agent that served the call.
    pub agent_name: String,
    /// User query.
    pub query: String,
    /// Response text (including failure text).
    pub response: String,
    /// Model the caller asked for.
    pub model: String,
}

/// Per-agent call count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentUsage {
    /// Agent name.
    pub agent_name: String,
    /// Number of records for the agent.
    pub count: usize,
}

/// Insertion-ordered log of [`HistoryRecord`]s.
///
/// Records can only be appended. Timestamps never decrease: a record whose
/// clock reading is earlier than its predecessor's is stamped with the
/// predecessor's time.
#[derive(Debug, Clone, Default)]
pub struct History {
    records: Vec<HistoryRecord>,
}

impl History {
    /// Appends a record stamped with the current time and returns it.
    pub fn append(
        &mut self,
        agent_name: &str,
        query: &str,
        response: &str,
        model: &str,
    ) -> &HistoryRecord {
        self.append_at(Utc::now(), agent_name, query, response, model)
    }

    /// Appends a record with an explicit clock reading.
    pub(crate) fn append_at(
        &mut self,
        now: DateTime<Utc>,
        agent_name: &str,
        query: &str,
        response: &str,
        model: &str,
    ) -> &HistoryRecord {
        let timestamp = self.records.last().map_or(now, |last| now.max(last.timestamp));
        self.records.push(HistoryRecord {
            timestamp,
            agent_name: agent_name.to_string(),
            query: query.to_string(),
            response: response.to_string(),
            model: model.to_string(),
        });
        &self.records[self.records.len() - 1]
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no calls have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, oldest first.
    #[must_use]
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// Call counts per agent, in order of first appearance.
    #[must_use]
    pub fn usage_counts(&self) -> Vec<AgentUsage> {
        let mut counts: Vec<AgentUsage> = Vec::new();
        for record in &self.records {
            match counts.iter_mut().find(|u| u.agent_name == record.agent_name) {
                Some(usage) => usage.count += 1,
                None => counts.push(AgentUsage {
                    agent_name: record.agent_name.clone(),
                    count: 1,
                }),
            }
        }
        counts
    }

    /// Agent with the most records; ties go to the one seen first.
    #[must_use]
    pub fn most_used_agent(&self) -> Option<String> {
        let mut best: Option<AgentUsage> = None;
        for usage in self.usage_counts() {
            if best.as_ref().is_none_or(|b| usage.count > b.count) {
                best = Some(usage);
            }
        }
        best.map(|b| b.agent_name)
    }

    /// Number of distinct agents that have served a call.
    #[must_use]
    pub fn active_agents(&self) -> usize {
        self.usage_counts().len()
    }

    /// The last `n` records, newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter().rev().take(n)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn history_of(agents: &[&str]) -> History {
        let mut history = History::default();
        for agent in agents {
            history.append(agent, "q", "r", "m");
        }
        history
    }

    #[test]
    fn test_append_preserves_order() {
        let history = history_of(&["a", "b", "c"]);
        let names: Vec<_> = history.records().iter().map(|r| r.agent_name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_timestamps_never_decrease() {
        let mut history = History::default();
        let now = Utc::now();
        history.append_at(now, "a", "q", "r", "m");
        history.append_at(now - Duration::seconds(30), "b", "q", "r", "m");
        let records = history.records();
        assert_eq!(records[1].timestamp, records[0].timestamp);
    }

    #[test]
    fn test_usage_counts_first_seen_order() {
        let history = history_of(&["b", "a", "b", "c", "a", "b"]);
        let usage = history.usage_counts();
        assert_eq!(usage.len(), 3);
        assert_eq!(usage[0], AgentUsage { agent_name: "b".to_string(), count: 3 });
        assert_eq!(usage[1].agent_name, "a");
        assert_eq!(usage[1].count, 2);
        assert_eq!(history.active_agents(), 3);
    }

    #[test]
    fn test_most_used_ties_go_to_first_seen() {
        let history = history_of(&["x", "y", "y", "x"]);
        assert_eq!(history.most_used_agent().as_deref(), Some("x"));
        assert_eq!(History::default().most_used_agent(), None);
    }

    #[test]
    fn test_recent_is_newest_first() {
        let history = history_of(&["a", "b", "c", "d"]);
        let recent: Vec<_> = history.recent(2).map(|r| r.agent_name.as_str()).collect();
        assert_eq!(recent, ["d", "c"]);
        assert_eq!(history.recent(10).count(), 4);
    }
}
