//! Rank extraction from free-text peer reviews.
//!
//! Reviews are requested in the shape produced by
//! [`PromptTemplate::review_prompt`](crate::prompt::PromptTemplate::review_prompt):
//!
//! ```text
//! Ranking:
//! 1. Response B: reasoning
//! 2. Response A: reasoning
//! ```
//!
//! Parsing is lenient and line based. It never fails: text that does not
//! follow the shape yields fewer rankings, possibly none.

use crate::council::anonymizer::{AnonymizedEntry, LABEL_ALPHABET};
use crate::council::value_objects::RankAssertion;

/// A rank claim about an anonymized label, before resolution to a participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRanking {
    pub label: char,
    pub rank: u32,
    pub justification: String,
}

/// Extract ordered rank claims from a review.
///
/// When a line beginning with `Ranking` is followed by ranked lines, scanning
/// starts after it so rank mentions in the review body are not mistaken for
/// the verdict. Otherwise the whole text is scanned. For each line, the rank
/// currently sought (starting at 1) matches when the line contains `N.` or
/// `N:`, and the earliest unclaimed `Response <label>` mention on that line
/// is claimed. Each label is claimed at most once and the sought rank only
/// advances on a match.
pub fn extract_rankings(review: &str, eligible_count: usize) -> Vec<LabelRanking> {
    let labels = &LABEL_ALPHABET[..eligible_count.min(LABEL_ALPHABET.len())];
    if labels.is_empty() {
        return Vec::new();
    }

    let lines: Vec<&str> = review.lines().collect();
    let header = lines.iter().position(|line| {
        line.trim_start_matches(['#', '*', ' '])
            .to_ascii_lowercase()
            .starts_with("ranking")
    });

    if let Some(header) = header {
        let after_header = scan(&lines[header + 1..], labels);
        if !after_header.is_empty() {
            return after_header;
        }
    }
    scan(&lines, labels)
}

fn scan(lines: &[&str], labels: &[char]) -> Vec<LabelRanking> {
    let mut claimed: Vec<char> = Vec::new();
    let mut rankings = Vec::new();
    let mut sought: u32 = 1;

    for line in lines {
        if claimed.len() == labels.len() {
            break;
        }
        if !has_rank_marker(line, sought) {
            continue;
        }

        let earliest = labels
            .iter()
            .filter(|&&label| !claimed.contains(&label))
            .filter_map(|&label| find_label(line, label).map(|(start, end)| (start, end, label)))
            .min_by_key(|(start, _, _)| *start);

        if let Some((_, end, label)) = earliest {
            claimed.push(label);
            rankings.push(LabelRanking {
                label,
                rank: sought,
                justification: justification_after(&line[end..]),
            });
            sought += 1;
        }
    }

    rankings
}

/// Map label-level claims back to Stage 1 indices through one reviewer's
/// anonymization. Claims for labels that reviewer never saw are dropped.
pub fn resolve_rankings(rankings: &[LabelRanking], entries: &[AnonymizedEntry]) -> Vec<RankAssertion> {
    rankings
        .iter()
        .filter_map(|ranking| {
            entries
                .iter()
                .find(|entry| entry.label == ranking.label)
                .map(|entry| RankAssertion {
                    label: ranking.label,
                    participant: entry.source,
                    rank: ranking.rank,
                    justification: ranking.justification.clone(),
                })
        })
        .collect()
}

fn has_rank_marker(line: &str, rank: u32) -> bool {
    line.contains(&format!("{}.", rank)) || line.contains(&format!("{}:", rank))
}

/// Byte range of a `Response <label>` mention (case-insensitive keyword,
/// exact label) that is not followed by another alphanumeric character.
fn find_label(line: &str, label: char) -> Option<(usize, usize)> {
    let haystack = line.to_ascii_lowercase();
    let needle = format!("response {}", label.to_ascii_lowercase());
    let mut from = 0;
    while let Some(offset) = haystack[from..].find(&needle) {
        let start = from + offset;
        let end = start + needle.len();
        let label_matches = line[end - 1..end].starts_with(label);
        let bounded = line[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        if label_matches && bounded {
            return Some((start, end));
        }
        from = end;
    }
    None
}

fn justification_after(rest: &str) -> String {
    rest.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '-' | '*' | ')' | '.'))
        .trim_end_matches(|c: char| c.is_whitespace() || c == '*')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(rankings: &[LabelRanking]) -> Vec<(char, u32)> {
        rankings.iter().map(|r| (r.label, r.rank)).collect()
    }

    #[test]
    fn test_requested_format() {
        let text = "Ranking:\n1. Response B: clear and correct\n2. Response A: verbose";
        let rankings = extract_rankings(text, 2);
        assert_eq!(pairs(&rankings), vec![('B', 1), ('A', 2)]);
        assert_eq!(rankings[0].justification, "clear and correct");
        assert_eq!(rankings[1].justification, "verbose");
    }

    #[test]
    fn test_unparseable_text_is_empty() {
        assert!(extract_rankings("I liked them both", 2).is_empty());
    }

    #[test]
    fn test_body_before_ranking_header_is_ignored() {
        let text = "\
Response A covers point 1. Response B misses it.

## Ranking
1. Response B: more precise
2. Response A: broader but shallow";
        assert_eq!(pairs(&extract_rankings(text, 2)), vec![('B', 1), ('A', 2)]);
    }

    #[test]
    fn test_ranking_lines_before_a_trailing_ranking_line() {
        let text = "1. Response B: clear\n2. Response A: verbose\nRanking rationale: B was more precise.";
        let rankings = extract_rankings(text, 2);
        assert_eq!(pairs(&rankings), vec![('B', 1), ('A', 2)]);
        assert_eq!(rankings[0].justification, "clear");
    }

    #[test]
    fn test_without_header_and_markdown_bold() {
        let text = "1: **Response C** - best\n2: **Response A** - ok\n3: **Response B** - weak";
        let rankings = extract_rankings(text, 3);
        assert_eq!(pairs(&rankings), vec![('C', 1), ('A', 2), ('B', 3)]);
        assert_eq!(rankings[0].justification, "best");
    }

    #[test]
    fn test_label_claimed_once() {
        let text = "Ranking:\n1. Response A: good\n2. Response A: again\n2. Response B: fine";
        assert_eq!(pairs(&extract_rankings(text, 2)), vec![('A', 1), ('B', 2)]);
    }

    #[test]
    fn test_labels_beyond_eligible_count_ignored() {
        let text = "Ranking:\n1. Response C: not shown\n1. Response A: shown";
        assert_eq!(pairs(&extract_rankings(text, 2)), vec![('A', 1)]);
    }

    #[test]
    fn test_earliest_mention_wins() {
        let text = "Ranking:\n1. Response B: better than Response A\n2. Response A: fine";
        assert_eq!(pairs(&extract_rankings(text, 2)), vec![('B', 1), ('A', 2)]);
    }

    #[test]
    fn test_partial_ranking() {
        let text = "Ranking:\n1. Response A: solid\nThe rest are similar.";
        assert_eq!(pairs(&extract_rankings(text, 3)), vec![('A', 1)]);
    }

    #[test]
    fn test_zero_eligible() {
        assert!(extract_rankings("Ranking:\n1. Response A: x", 0).is_empty());
    }

    #[test]
    fn test_resolve_through_entries() {
        let entries = vec![
            AnonymizedEntry { label: 'A', source: 0 },
            AnonymizedEntry { label: 'B', source: 2 },
        ];
        let rankings = extract_rankings("Ranking:\n1. Response B: x\n2. Response A: y", 2);
        let resolved = resolve_rankings(&rankings, &entries);
        assert_eq!(resolved.len(), 2);
        assert_eq!((resolved[0].participant, resolved[0].rank), (2, 1));
        assert_eq!((resolved[1].participant, resolved[1].rank), (0, 2));
    }
}
