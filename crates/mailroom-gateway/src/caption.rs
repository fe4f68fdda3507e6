//! Caption-overflow policy for submitted text.

/// Telegram caps media captions at 1024 characters; longer text has to
/// travel as its own message or the whole media group is rejected.
pub const CAPTION_LIMIT: usize = 1024;

/// How submitted text travels alongside a media group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionPlan {
    /// Inline caption for the first media item, when the text fits.
    pub caption: Option<String>,
    /// Full, unsplit text to send as its own message after the group.
    pub follow_up: Option<String>,
}

impl CaptionPlan {
    /// Decide placement for `text` (already trimmed). The limit counts
    /// Unicode scalars, not bytes — a 1024-character Cyrillic caption is
    /// within bounds even though it is 2048 bytes long.
    pub fn for_text(text: &str) -> Self {
        if text.is_empty() {
            return Self {
                caption: None,
                follow_up: None,
            };
        }
        if text.chars().count() <= CAPTION_LIMIT {
            Self {
                caption: Some(text.to_string()),
                follow_up: None,
            }
        } else {
            Self {
                caption: None,
                follow_up: Some(text.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_becomes_inline_caption() {
        let plan = CaptionPlan::for_text("hello");
        assert_eq!(plan.caption.as_deref(), Some("hello"));
        assert_eq!(plan.follow_up, None);
    }

    #[test]
    fn empty_text_needs_nothing() {
        let plan = CaptionPlan::for_text("");
        assert_eq!(plan.caption, None);
        assert_eq!(plan.follow_up, None);
    }

    #[test]
    fn exactly_at_limit_still_fits() {
        let text = "a".repeat(CAPTION_LIMIT);
        let plan = CaptionPlan::for_text(&text);
        assert_eq!(plan.caption.as_deref(), Some(text.as_str()));
        assert_eq!(plan.follow_up, None);
    }

    #[test]
    fn one_over_limit_splits_out() {
        let text = "a".repeat(CAPTION_LIMIT + 1);
        let plan = CaptionPlan::for_text(&text);
        assert_eq!(plan.caption, None);
        assert_eq!(plan.follow_up.as_deref(), Some(text.as_str()));
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        // 1024 two-byte characters: 2048 bytes, still within the limit.
        let text = "ы".repeat(CAPTION_LIMIT);
        let plan = CaptionPlan::for_text(&text);
        assert!(plan.caption.is_some());

        let text = "ы".repeat(CAPTION_LIMIT + 1);
        let plan = CaptionPlan::for_text(&text);
        assert_eq!(plan.caption, None);
        assert_eq!(plan.follow_up.as_deref(), Some(text.as_str()));
    }

    #[test]
    fn follow_up_keeps_the_original_text_unsplit() {
        let text = "x".repeat(2000);
        let plan = CaptionPlan::for_text(&text);
        assert_eq!(plan.follow_up.as_deref().map(str::len), Some(2000));
    }
}
