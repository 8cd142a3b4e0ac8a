//! Draft-post helpers: hashtag preview and tag suggestion plumbing.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HASHTAG_RE: Regex = Regex::new(r"#([A-Za-z0-9_-]+)").unwrap();
}

/// Tag suggestions are only requested once the draft has this much content.
pub const MIN_SUGGEST_CONTENT: usize = 20;

const MIN_TAG_LEN: usize = 2;
const MAX_TAG_LEN: usize = 50;

/// Extract the hashtags from a draft body for the live preview.
/// Tags are lowercased, deduplicated and kept in order of first appearance;
/// tags outside the 2..=50 length range are dropped.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut tags = Vec::new();
    for capture in HASHTAG_RE.captures_iter(text) {
        let tag = capture[1].to_lowercase();
        if tag.len() < MIN_TAG_LEN || tag.len() > MAX_TAG_LEN {
            continue;
        }
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// Whether the draft is substantial enough to ask the server for tags.
/// Counts characters, not bytes, so multibyte drafts are gated the same way.
pub fn wants_tag_suggestions(title: &str, body: &str) -> bool {
    title.trim().chars().count() + body.trim().chars().count() >= MIN_SUGGEST_CONTENT
}

fn current_tags(tags_input: &str) -> Vec<String> {
    tags_input
        .split(',')
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Drop suggestions the user has already typed into the tags field.
pub fn filter_suggestions(tags_input: &str, suggested: &[String]) -> Vec<String> {
    let present = current_tags(tags_input);
    suggested
        .iter()
        .filter(|tag| !present.contains(&tag.to_lowercase()))
        .cloned()
        .collect()
}

/// Append an accepted suggestion to the comma-separated tags field.
pub fn merge_tag(tags_input: &str, tag: &str) -> String {
    let current = tags_input.trim();
    if current.is_empty() {
        tag.to_string()
    } else {
        format!("{}, {}", current, tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_lowercased_tags_in_order() {
        let tags = extract_hashtags("Thoughts on #Rust and #WebDev, mostly #rust though");
        assert_eq!(tags, vec!["rust", "webdev"]);
    }

    #[test]
    fn tag_length_bounds_are_enforced() {
        let long = "a".repeat(51);
        let text = format!("#x #ok #{}", long);
        assert_eq!(extract_hashtags(&text), vec!["ok"]);

        // Exactly 50 is still allowed.
        let max = "b".repeat(50);
        assert_eq!(extract_hashtags(&format!("#{}", max)), vec![max]);
    }

    #[test]
    fn underscores_and_hyphens_are_part_of_tags() {
        assert_eq!(
            extract_hashtags("#office_hours #late-night"),
            vec!["office_hours", "late-night"]
        );
    }

    #[test]
    fn no_tags_in_plain_text() {
        assert!(extract_hashtags("nothing to see here").is_empty());
        assert!(extract_hashtags("").is_empty());
    }

    #[test]
    fn suggestion_gate_counts_trimmed_content() {
        assert!(!wants_tag_suggestions("hi", "  there  "));
        assert!(wants_tag_suggestions("a decent title", "and a body"));
    }

    #[test]
    fn suggestion_gate_counts_characters_not_bytes() {
        // 7 CJK characters (21 bytes) are still short of the 20-char gate.
        assert!(!wants_tag_suggestions("树洞耶鲁", "发帖子"));
        // 20 CJK characters pass it.
        assert!(wants_tag_suggestions("树洞耶鲁树洞耶鲁树洞", "发帖子发帖子发帖子发"));
    }

    #[test]
    fn filter_skips_already_typed_tags() {
        let suggested = vec!["Courses".to_string(), "housing".to_string()];
        let remaining = filter_suggestions("courses, food", &suggested);
        assert_eq!(remaining, vec!["housing"]);
    }

    #[test]
    fn merge_appends_with_separator() {
        assert_eq!(merge_tag("", "food"), "food");
        assert_eq!(merge_tag("courses", "food"), "courses, food");
        assert_eq!(merge_tag("  courses  ", "food"), "courses, food");
    }
}
