use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    DateCorrected,
    TermsCorrected,
}

/// Human-facing correction notice. Rendering is up to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    DateCorrected { original: NaiveDate, corrected: NaiveDate },
    TermsCorrected { original: String, corrected: String },
}

impl Notice {
    pub fn kind(&self) -> NoticeKind {
        match self {
            Self::DateCorrected { .. } => NoticeKind::DateCorrected,
            Self::TermsCorrected { .. } => NoticeKind::TermsCorrected,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::DateCorrected { original, corrected } => format!(
                "contract end date was corrected from {original} to {corrected}"
            ),
            Self::TermsCorrected { original, corrected } => format!(
                "general conditions were updated from {original} to the current version {corrected}"
            ),
        }
    }
}

/// Per-session set of correction notices.
///
/// Each kind is issued at most once. An issued notice stays visible until the
/// user dismisses it; further issues of the same kind are ignored.
#[derive(Clone, Debug, Default)]
pub struct NoticeBoard {
    issued: HashSet<NoticeKind>,
    visible: Vec<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the notice was newly issued.
    pub fn issue(&mut self, notice: Notice) -> bool {
        if !self.issued.insert(notice.kind()) {
            return false;
        }
        self.visible.push(notice);
        true
    }

    pub fn dismiss(&mut self, kind: NoticeKind) {
        self.visible.retain(|notice| notice.kind() != kind);
    }

    pub fn visible(&self) -> &[Notice] {
        &self.visible
    }

    pub fn was_issued(&self, kind: NoticeKind) -> bool {
        self.issued.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{Notice, NoticeBoard, NoticeKind};

    fn date_notice() -> Notice {
        Notice::DateCorrected {
            original: NaiveDate::from_ymd_opt(2027, 6, 30).expect("date"),
            corrected: NaiveDate::from_ymd_opt(2027, 12, 31).expect("date"),
        }
    }

    #[test]
    fn notices_are_issued_once_and_stay_until_dismissed() {
        let mut board = NoticeBoard::new();

        assert!(board.issue(date_notice()));
        assert!(!board.issue(date_notice()));
        assert_eq!(board.visible().len(), 1);

        board.dismiss(NoticeKind::DateCorrected);
        assert!(board.visible().is_empty());
        assert!(board.was_issued(NoticeKind::DateCorrected));
        assert!(!board.issue(date_notice()));
        assert!(board.visible().is_empty());
    }

    #[test]
    fn kinds_are_tracked_independently() {
        let mut board = NoticeBoard::new();
        board.issue(date_notice());
        board.issue(Notice::TermsCorrected {
            original: "AVB-2022".to_string(),
            corrected: "AVB-2025".to_string(),
        });

        board.dismiss(NoticeKind::TermsCorrected);
        assert_eq!(board.visible(), &[date_notice()]);
    }

    #[test]
    fn date_notice_message_mentions_both_dates() {
        assert_eq!(
            date_notice().message(),
            "contract end date was corrected from 2027-06-30 to 2027-12-31"
        );
    }
}
