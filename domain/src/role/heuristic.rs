//! Keyword-based role scoring.
//!
//! Pure function of `(message, available roles, keyword lists)`. The scores
//! are empirically tuned; the constants below are the knobs.
//!
//! Long messages (a piped diff followed by an instruction) are judged mostly
//! on their tail, the *request portion*: the last 50 words, or the last 500
//! bytes when the message has few words but many characters.

use super::entities::RoleKeywords;
use crate::core::string::tail;
use regex::Regex;
use std::sync::LazyLock;

/// Minimum score for any role other than `describe`
pub const MIN_SCORE: f64 = 0.4;
/// `describe` overlaps heavily with shell/code questions
pub const MIN_SCORE_DESCRIBE: f64 = 0.5;
/// commit/branch take over from shell/code at or above this score
pub const SPECIFICITY_FLOOR: f64 = 0.2;
/// Multiplier applied when any multi-word phrase matched
pub const PHRASE_BOOST: f64 = 2.0;
/// Added for code syntax or a shell-command shape
pub const PATTERN_BONUS: f64 = 0.5;

const REQUEST_TAIL_WORDS: usize = 50;
const REQUEST_TAIL_BYTES: usize = 500;
const SHELL_SHAPE_MAX_WORDS: usize = 10;
const QUESTION_OPENER_BONUS: usize = 3;
const QUESTION_OPENERS: [&str; 5] = ["what", "explain", "describe", "tell", "how"];

static CODE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b(def|class|function|const|let|var|import|from|return|if|else|for|while|try|catch)\b",
        r"[{}();]",
        r"\b(function|=>|->|::)\b",
        r"\b(public|private|protected|static|final|abstract)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("code pattern is valid"))
    .collect()
});

static SHELL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\$?\s*[a-z]+(\s+[^\s]+)*\s*$").expect("shell pattern is valid")
});

/// A role that cleared the acceptance threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicMatch {
    pub role: String,
    pub score: f64,
    pub reason: String,
}

struct MessageView {
    full: String,
    request: String,
    word_count: usize,
    first_word: Option<String>,
}

impl MessageView {
    fn new(full: String) -> Self {
        let words: Vec<&str> = full.split_whitespace().collect();
        let word_count = words.len();
        let first_word = words.first().map(|w| w.to_string());
        let request = if word_count > REQUEST_TAIL_WORDS {
            words[word_count - REQUEST_TAIL_WORDS..].join(" ")
        } else if full.len() > REQUEST_TAIL_BYTES {
            tail(&full, REQUEST_TAIL_BYTES).to_string()
        } else {
            full.clone()
        };
        Self {
            full,
            request,
            word_count,
            first_word,
        }
    }
}

/// True when every word occurs in `haystack`, each after the previous one.
fn contains_in_order(haystack: &str, words: &[&str]) -> bool {
    let mut rest = haystack;
    for word in words {
        match rest.find(word) {
            Some(idx) => rest = &rest[idx + word.len()..],
            None => return false,
        }
    }
    true
}

/// Weight of a multi-word phrase match, 0 if it does not match.
fn phrase_weight(phrase: &str, view: &MessageView) -> usize {
    if view.request.contains(phrase) {
        return 4;
    }
    if view.full.contains(phrase) {
        return 2;
    }
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.len() < 2 {
        return 0;
    }
    if contains_in_order(&view.request, &words) {
        3
    } else if contains_in_order(&view.full, &words) {
        1
    } else {
        0
    }
}

/// A single word already credited through a phrase must not count twice.
fn covered_by_phrase(word: &str, phrases: &[&String], view: &MessageView) -> bool {
    phrases.iter().any(|phrase| {
        let words: Vec<&str> = phrase.split_whitespace().collect();
        words.contains(&word)
            && (view.request.contains(phrase.as_str())
                || contains_in_order(&view.request, &words)
                || view.full.contains(phrase.as_str()))
    })
}

fn keyword_score(role: &str, keywords: &[String], view: &MessageView) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }

    let mut matches = 0usize;
    let mut phrase_total = 0usize;

    if role == "describe"
        && view
            .first_word
            .as_deref()
            .is_some_and(|w| QUESTION_OPENERS.contains(&w))
    {
        matches += QUESTION_OPENER_BONUS;
    }

    let (phrases, singles): (Vec<&String>, Vec<&String>) =
        keywords.iter().partition(|k| k.contains(' '));

    for phrase in &phrases {
        let weight = phrase_weight(phrase, view);
        if weight > 0 {
            phrase_total += weight;
            matches += 1;
        }
    }

    for word in singles {
        let in_request = view.request.contains(word.as_str());
        if !in_request && !view.full.contains(word.as_str()) {
            continue;
        }
        if covered_by_phrase(word, &phrases, view) {
            continue;
        }
        matches += if in_request { 2 } else { 1 };
    }

    if matches == 0 {
        return 0.0;
    }

    let mut score = matches as f64 / keywords.len() as f64;
    if phrase_total > 0 {
        score *= PHRASE_BOOST;
    }
    score.min(1.0)
}

fn add_bonus(scores: &mut [(String, f64)], role: &str) {
    if let Some((_, score)) = scores.iter_mut().find(|(r, _)| r == role) {
        *score = (*score + PATTERN_BONUS).min(1.0);
    }
}

fn score_of(scores: &[(String, f64)], role: &str) -> f64 {
    scores
        .iter()
        .find(|(r, _)| r == role)
        .map(|(_, s)| *s)
        .unwrap_or(0.0)
}

/// Score every available role, in the order given.
pub fn score_roles(
    message: &str,
    available_roles: &[String],
    keywords: &RoleKeywords,
) -> Vec<(String, f64)> {
    let trimmed = message.trim();
    let view = MessageView::new(trimmed.to_lowercase());

    let mut scores: Vec<(String, f64)> = available_roles
        .iter()
        .map(|role| (role.clone(), keyword_score(role, keywords.get(role), &view)))
        .collect();

    if CODE_PATTERNS.iter().any(|p| p.is_match(message)) {
        add_bonus(&mut scores, "code");
    }

    let mentions_commit = view.full.contains("commit") || view.full.contains("changelog");
    let mentions_branch = view.full.contains("branch")
        && ["create", "new", "generate"]
            .iter()
            .any(|w| view.full.contains(w));
    if !mentions_commit
        && !mentions_branch
        && view.word_count > 0
        && view.word_count < SHELL_SHAPE_MAX_WORDS
        && SHELL_SHAPE.is_match(trimmed)
    {
        add_bonus(&mut scores, "shell");
    }

    scores
}

/// Pick the best role for `message`, or `None` if nothing is convincing.
pub fn detect(
    message: &str,
    available_roles: &[String],
    keywords: &RoleKeywords,
) -> Option<HeuristicMatch> {
    let scores = score_roles(message, available_roles, keywords);

    let mut best: Option<(&str, f64)> = None;
    for (role, score) in &scores {
        if *score > best.map(|(_, s)| s).unwrap_or(0.0) {
            best = Some((role.as_str(), *score));
        }
    }
    let (mut role, mut score) = best?;

    let threshold = if role == "describe" {
        MIN_SCORE_DESCRIBE
    } else {
        MIN_SCORE
    };

    if role == "shell" || role == "code" {
        for specific in ["commit", "branch"] {
            let specific_score = score_of(&scores, specific);
            if specific_score >= SPECIFICITY_FLOOR {
                role = specific;
                score = specific_score;
                break;
            }
        }
    }

    if score < threshold {
        return None;
    }

    let keyword_count = keywords.get(role).len();
    Some(HeuristicMatch {
        role: role.to_string(),
        score,
        reason: format!(
            "matched {} keywords with score {:.2}",
            (score * keyword_count as f64) as usize,
            score
        ),
    })
}
