//! Session results and the recorder that receives them.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which question set feeds a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoringMode {
    /// Questions entered by a teacher for a class.
    Classroom,
    /// Generated drills.
    #[default]
    Freeplay,
}

impl ScoringMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Classroom => "classroom",
            Self::Freeplay => "freeplay",
        }
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown scoring mode '{0}' (expected classroom or freeplay)")]
pub struct UnknownScoringMode(pub String);

impl FromStr for ScoringMode {
    type Err = UnknownScoringMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classroom" => Ok(Self::Classroom),
            "freeplay" => Ok(Self::Freeplay),
            _ => Err(UnknownScoringMode(s.to_string())),
        }
    }
}

/// One resolved question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDetail {
    pub question_text: String,
    pub is_correct: bool,
    pub score_earned: u32,
}

/// Receives question details during play and the final score at the end.
pub trait SessionRecorder {
    /// Called once per resolved question, before the turn ends.
    fn record(&mut self, detail: &QuestionDetail);

    /// Called once when the game ends or the player exits.
    fn finalize(&mut self, total_score: u32, mode: ScoringMode);
}

impl<T: SessionRecorder + ?Sized> SessionRecorder for &mut T {
    fn record(&mut self, detail: &QuestionDetail) {
        (**self).record(detail);
    }

    fn finalize(&mut self, total_score: u32, mode: ScoringMode) {
        (**self).finalize(total_score, mode);
    }
}

/// Completed session as kept by [`MemoryRecorder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    pub score: u32,
    pub mode: ScoringMode,
    pub details: Vec<QuestionDetail>,
}

impl SessionRecord {
    #[must_use]
    pub fn correct_answers(&self) -> usize {
        self.details.iter().filter(|d| d.is_correct).count()
    }
}

/// In-memory recorder producing a [`SessionRecord`].
#[derive(Debug, Clone, Default)]
pub struct MemoryRecorder {
    session_id: String,
    details: Vec<QuestionDetail>,
    record: Option<SessionRecord>,
    finalize_calls: usize,
    clock: Option<DateTime<Utc>>,
}

impl MemoryRecorder {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Self::default()
        }
    }

    /// Stamp the record with `at` instead of the wall clock.
    #[must_use]
    pub fn with_clock(mut self, at: DateTime<Utc>) -> Self {
        self.clock = Some(at);
        self
    }

    #[must_use]
    pub fn details(&self) -> &[QuestionDetail] {
        &self.details
    }

    #[must_use]
    pub const fn session_record(&self) -> Option<&SessionRecord> {
        self.record.as_ref()
    }

    #[must_use]
    pub const fn finalize_calls(&self) -> usize {
        self.finalize_calls
    }

    #[must_use]
    pub fn into_record(self) -> Option<SessionRecord> {
        self.record
    }
}

impl SessionRecorder for MemoryRecorder {
    fn record(&mut self, detail: &QuestionDetail) {
        self.details.push(detail.clone());
    }

    fn finalize(&mut self, total_score: u32, mode: ScoringMode) {
        self.finalize_calls += 1;
        let timestamp = self.clock.unwrap_or_else(Utc::now);
        self.record = Some(SessionRecord {
            session_id: self.session_id.clone(),
            date: timestamp.date_naive(),
            timestamp,
            score: total_score,
            mode,
            details: self.details.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn memory_recorder_builds_record() {
        let at = Utc.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).unwrap();
        let mut recorder = MemoryRecorder::new("s-1").with_clock(at);
        recorder.record(&QuestionDetail {
            question_text: "2 + 2".into(),
            is_correct: true,
            score_earned: 10,
        });
        recorder.record(&QuestionDetail {
            question_text: "3 + 5".into(),
            is_correct: false,
            score_earned: 0,
        });
        recorder.finalize(10, ScoringMode::Classroom);

        let record = recorder.session_record().unwrap();
        assert_eq!(record.session_id, "s-1");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
        assert_eq!(record.score, 10);
        assert_eq!(record.correct_answers(), 1);
        assert_eq!(recorder.finalize_calls(), 1);
    }

    #[test]
    fn scoring_mode_parses_and_serializes() {
        assert_eq!("Classroom".parse::<ScoringMode>(), Ok(ScoringMode::Classroom));
        assert!("arcade".parse::<ScoringMode>().is_err());
        assert_eq!(
            serde_json::to_string(&ScoringMode::Freeplay).unwrap(),
            "\"FREEPLAY\""
        );
    }
}
