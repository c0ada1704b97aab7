use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::record::{ScoreRecord, SourceType};
use crate::roster::{Roster, RosterEntry};

/// `true_name` used for submissions nobody on the roster claimed.
pub const ORPHAN_NAME: &str = "?";

/// `missing_questions` cell for roster entries without a submission.
pub const MISSING_SENTINEL: &str = "MISSING";

/// One row of the paired table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedRecord {
    pub true_name: String,
    pub submission: Option<ScoreRecord>,
}

impl PairedRecord {
    #[must_use]
    pub fn matched(entry: &RosterEntry, record: ScoreRecord) -> Self {
        Self {
            true_name: entry.name.clone(),
            submission: Some(record),
        }
    }

    #[must_use]
    pub fn missing(entry: &RosterEntry) -> Self {
        Self {
            true_name: entry.name.clone(),
            submission: None,
        }
    }

    #[must_use]
    pub fn orphan(record: ScoreRecord) -> Self {
        Self {
            true_name: ORPHAN_NAME.to_string(),
            submission: Some(record),
        }
    }

    pub fn is_missing(&self) -> bool {
        self.submission.is_none()
    }

    pub fn is_orphan(&self) -> bool {
        self.true_name == ORPHAN_NAME && self.submission.is_some()
    }

    pub fn submission_key(&self) -> &str {
        self.submission
            .as_ref()
            .map_or("", |r| r.submission_key.as_str())
    }

    pub fn score(&self) -> usize {
        self.submission.as_ref().map_or(0, |r| r.score)
    }

    pub fn source_type(&self) -> Option<SourceType> {
        self.submission.as_ref().map(|r| r.source_type)
    }
}

/// Suggests a roster entry for a submission key that matched nobody.
pub trait NameHint: Send + Sync {
    fn suggest<'a>(&self, key: &str, roster: &'a Roster) -> Option<&'a RosterEntry>;
}

/// Closest compact key by normalized Levenshtein similarity.
pub struct SimilarityHint {
    threshold: f64,
}

impl SimilarityHint {
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for SimilarityHint {
    fn default() -> Self {
        Self::new(0.75)
    }
}

impl NameHint for SimilarityHint {
    fn suggest<'a>(&self, key: &str, roster: &'a Roster) -> Option<&'a RosterEntry> {
        let mut best_match: Option<(&RosterEntry, f64)> = None;

        for entry in roster.entries() {
            let score = strsim::normalized_levenshtein(key, &entry.compact_key());
            if score < self.threshold {
                continue;
            }
            match best_match {
                Some((_, best_score)) if score <= best_score => {}
                _ => best_match = Some((entry, score)),
            }
        }

        best_match.map(|(entry, _)| entry)
    }
}

/// Aligns per-file scores with the class roster.
pub struct NameReconciler {
    hint: Option<Box<dyn NameHint>>,
}

impl NameReconciler {
    #[must_use]
    pub fn new() -> Self {
        Self { hint: None }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: Box<dyn NameHint>) -> Self {
        self.hint = Some(hint);
        self
    }

    /// Roster rows first, in roster order, then orphan submissions in scan
    /// order. Only the first record with a given key is paired, and only the
    /// first record of an unclaimed key becomes an orphan row.
    #[must_use]
    pub fn reconcile(&self, records: &[ScoreRecord], roster: &Roster) -> Vec<PairedRecord> {
        let mut paired = Vec::with_capacity(roster.len());
        let mut selected: HashSet<String> = HashSet::new();

        for entry in roster.entries() {
            let key = entry.compact_key();
            match records.iter().find(|r| r.join_key() == key) {
                Some(record) => {
                    selected.insert(key);
                    paired.push(PairedRecord::matched(entry, record.clone()));
                }
                None => {
                    tracing::info!(name = %entry.name, "No submission found");
                    paired.push(PairedRecord::missing(entry));
                }
            }
        }

        // Each unclaimed key is reported once, by its first record.
        for record in records {
            if !selected.insert(record.join_key()) {
                continue;
            }
            self.report_orphan(record, roster);
            paired.push(PairedRecord::orphan(record.clone()));
        }

        paired
    }

    fn report_orphan(&self, record: &ScoreRecord, roster: &Roster) {
        let suggestion = self
            .hint
            .as_ref()
            .and_then(|h| h.suggest(&record.join_key(), roster));

        match suggestion {
            Some(entry) => tracing::warn!(
                file = %record.file_name,
                key = %record.submission_key,
                "Submission matches nobody on the roster (did you mean {}?)",
                entry.name
            ),
            None => tracing::warn!(
                file = %record.file_name,
                key = %record.submission_key,
                "Submission matches nobody on the roster"
            ),
        }
    }
}

impl Default for NameReconciler {
    fn default() -> Self {
        Self::new().with_hint(Box::new(SimilarityHint::default()))
    }
}
