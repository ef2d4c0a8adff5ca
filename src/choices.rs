//! Recovers lettered answer choices from a problem's content.
//!
//! Textual patterns are tried in order and the first one that matches wins,
//! even when its result looks incomplete. Only when none matches are image
//! alt texts searched, since AoPS usually renders the choice line as a LaTeX
//! image.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{AnswerChoice, ChoiceSource, ContentItem};

/// `\textbf{(A)}`, also `\mathrm{(A)}` and `\textbf{(A)~}`.
static FORMATTED_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(?:textbf|mathbf|mathrm|text)\s*\{\s*\(\s*([A-E])\s*\)(?:\\\s|~|\s)*\}").unwrap()
});
static PLAIN_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([A-E])\)").unwrap());
static ALT_LEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:textbf|mathbf|mathrm|text)\s*\{\s*\(\s*A\s*\)(?:\\\s|~|\s)*\}").unwrap()
});

static SPACING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(?:qquad|quad|hspace\*?\s*\{[^}]*\}|[ ,;:!])|~").unwrap()
});
static WRAPPER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(?:textbf|textit|textrm|text|mathrm|mathbf|mbox)\s*\{([^{}]*)\}").unwrap()
});
static STYLE_COMMAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(?:displaystyle|textstyle|left|right|Bigg|bigg|Big|big)\b").unwrap()
});

/// Outcome of one cascade stage.
#[derive(Debug, PartialEq, Eq)]
pub enum Cascade {
    NoMatch,
    Matches(Vec<AnswerChoice>),
}

type Stage = fn(&str) -> Cascade;

const TEXT_STAGES: &[Stage] = &[formatted_letters, parenthesized_letters];

pub fn extract(content: &[ContentItem]) -> Vec<AnswerChoice> {
    let text = search_text(content);
    for stage in TEXT_STAGES {
        if let Cascade::Matches(choices) = stage(&text) {
            return choices;
        }
    }
    from_image_alt(content)
}

/// Text and raw-fragment content joined by single spaces.
pub fn search_text(content: &[ContentItem]) -> String {
    content
        .iter()
        .filter_map(ContentItem::searchable_text)
        .collect::<Vec<_>>()
        .join(" ")
}

fn formatted_letters(text: &str) -> Cascade {
    lettered(text, &FORMATTED_MARKER, true)
}

fn parenthesized_letters(text: &str) -> Cascade {
    lettered(text, &PLAIN_MARKER, false)
}

fn lettered(text: &str, marker: &Regex, in_math: bool) -> Cascade {
    let segments = split_at_markers(text, marker);
    if segments.iter().all(|(_, raw)| raw.trim().is_empty()) {
        return Cascade::NoMatch;
    }

    let mut choices: Vec<AnswerChoice> = vec![];
    for (letter, raw) in segments {
        if choices.iter().any(|c| c.letter == letter) {
            continue;
        }
        let text = clean_choice(raw, in_math);
        if !text.is_empty() {
            choices.push(AnswerChoice::new(letter, text, ChoiceSource::Text));
        }
    }
    Cascade::Matches(choices)
}

/// The first image alt text that carries a choice block, one choice per
/// letter found in it.
fn from_image_alt(content: &[ContentItem]) -> Vec<AnswerChoice> {
    for alt in content.iter().filter_map(ContentItem::image_alt) {
        if !ALT_LEAD.is_match(alt) {
            continue;
        }
        let segments = split_at_markers(alt, &FORMATTED_MARKER);
        let choices: Vec<_> = ('A'..='E')
            .filter_map(|letter| {
                let (_, raw) = segments.iter().find(|(l, _)| *l == letter)?;
                let text = clean_choice(raw, true);
                (!text.is_empty()).then(|| AnswerChoice::new(letter, text, ChoiceSource::ImageAlt))
            })
            .collect();
        if !choices.is_empty() {
            return choices;
        }
    }
    vec![]
}

/// Pairs each marker's letter with the text up to the next marker.
fn split_at_markers<'t>(text: &'t str, marker: &Regex) -> Vec<(char, &'t str)> {
    let found: Vec<_> = marker
        .captures_iter(text)
        .filter_map(|c| {
            let whole = c.get(0)?;
            let letter = c.get(1)?.as_str().chars().next()?;
            Some((letter, whole.start(), whole.end()))
        })
        .collect();

    found
        .iter()
        .enumerate()
        .map(|(i, (letter, _, end))| {
            let stop = found.get(i + 1).map_or(text.len(), |(_, start, _)| *start);
            (*letter, &text[*end..stop])
        })
        .collect()
}

fn clean_choice(raw: &str, in_math: bool) -> String {
    let raw = if in_math { until_math_close(raw) } else { raw };
    let text = SPACING.replace_all(raw, " ");
    let text = WRAPPER.replace_all(&text, "$1");
    let text = STYLE_COMMAND.replace_all(&text, "");
    strip_math_delimiters(&text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text before the first unescaped `$`.
fn until_math_close(raw: &str) -> &str {
    let mut escaped = false;
    for (i, ch) in raw.char_indices() {
        match ch {
            '$' if !escaped => return &raw[..i],
            '\\' => escaped = !escaped,
            _ => escaped = false,
        }
    }
    raw
}

/// Drops `$` delimiters and turns `\$` into a literal dollar sign.
fn strip_math_delimiters(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'$') => {
                out.push('$');
                chars.next();
            }
            '$' => {}
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice(letter: char, text: &str) -> AnswerChoice {
        AnswerChoice::new(letter, text, ChoiceSource::Text)
    }

    fn image(alt: &str) -> ContentItem {
        ContentItem::Image {
            src: "/c.png".into(),
            local_path: "images/c.png".into(),
            alt: alt.into(),
            width: None,
            height: None,
        }
    }

    #[test]
    fn formatted_letters_should_be_extracted_from_text() {
        let content = vec![ContentItem::text(
            r"The answer is $\textbf{(A)}\ 5 \qquad \textbf{(B)}\ 10$",
        )];
        assert_eq!(extract(&content), vec![choice('A', "5"), choice('B', "10")]);
    }

    #[test]
    fn spacing_inside_marker_braces_should_be_accepted() {
        let content = vec![ContentItem::text(
            r"$\textbf{(A)~}5\qquad\textbf{(B)\ }6$",
        )];
        assert_eq!(extract(&content), vec![choice('A', "5"), choice('B', "6")]);

        let content = vec![image(r"$\textbf{(A)~}7\qquad\textbf{(B)~}8$")];
        assert_eq!(
            extract(&content),
            vec![
                AnswerChoice::new('A', "7", ChoiceSource::ImageAlt),
                AnswerChoice::new('B', "8", ChoiceSource::ImageAlt),
            ]
        );
    }

    #[test]
    fn image_alt_should_be_used_when_text_has_no_choices() {
        let content = vec![
            ContentItem::text("What is the value?"),
            image(r"$x+y$"),
            image(r"\textbf{(A)}\ 3\qquad\textbf{(B)}\ 4"),
        ];
        assert_eq!(
            extract(&content),
            vec![
                AnswerChoice::new('A', "3", ChoiceSource::ImageAlt),
                AnswerChoice::new('B', "4", ChoiceSource::ImageAlt),
            ]
        );
    }

    #[test]
    fn full_alt_choice_line_should_yield_five_choices() {
        let content = vec![image(
            r"$\textbf{(A) }\frac{1}{2} \qquad\textbf{(B) }\$1.50 \qquad\textbf{(C) }\text{three} \qquad\textbf{(D) }\sqrt{2} \qquad\textbf{(E) }12$",
        )];
        let choices = extract(&content);
        let texts: Vec<_> = choices.iter().map(|c| (c.letter, c.text.as_str())).collect();
        assert_eq!(
            texts,
            vec![
                ('A', r"\frac{1}{2}"),
                ('B', "$1.50"),
                ('C', "three"),
                ('D', r"\sqrt{2}"),
                ('E', "12"),
            ]
        );
        assert!(choices.iter().all(|c| c.source == ChoiceSource::ImageAlt));
    }

    #[test]
    fn plain_parentheses_should_be_the_second_stage() {
        let content = vec![
            ContentItem::text("Pick one."),
            ContentItem::RawFragment {
                visible_text: "(A) $4$ (B) $6$ (C) 8".into(),
                serialized_markup: "<i>..</i>".into(),
                tag_name: "i".into(),
            },
        ];
        assert_eq!(
            extract(&content),
            vec![choice('A', "4"), choice('B', "6"), choice('C', "8")]
        );
    }

    #[test]
    fn first_matching_stage_should_win_even_if_incomplete() {
        // Only one formatted marker; the plain stage would find more.
        let text = r"$\textbf{(A)}\ 1$ or (B) 2 or (C) 3";
        assert_eq!(
            formatted_letters(text),
            Cascade::Matches(vec![choice('A', "1")])
        );
        assert_eq!(extract(&[ContentItem::text(text)]), vec![choice('A', "1")]);
    }

    #[test]
    fn text_match_should_suppress_image_fallback() {
        let content = vec![
            ContentItem::text("(A) yes (B) no"),
            image(r"\textbf{(A)}\ 3\qquad\textbf{(B)}\ 4"),
        ];
        assert!(extract(&content)
            .iter()
            .all(|c| c.source == ChoiceSource::Text));
    }

    #[test]
    fn repeated_letters_should_keep_the_first() {
        let choices = extract(&[ContentItem::text("(A) 1 (B) 2 (A) 3")]);
        assert_eq!(choices, vec![choice('A', "1"), choice('B', "2")]);
    }

    #[test]
    fn nothing_recognisable_should_yield_no_choices() {
        assert!(extract(&[]).is_empty());
        assert!(extract(&[ContentItem::text("no choices here"), image("[asy] draw(...)")]).is_empty());
        assert_eq!(parenthesized_letters("plain"), Cascade::NoMatch);
    }

    #[test]
    fn image_scan_should_skip_images_without_choices() {
        let content = vec![
            image(r"\textbf{(A)}"),
            image(r"\textbf{(A)}\ 7\qquad\textbf{(C)}\ 9"),
        ];
        let choices = extract(&content);
        assert_eq!(
            choices.iter().map(|c| c.letter).collect::<String>(),
            "AC"
        );
    }

    #[test]
    fn math_helpers_should_respect_escapes() {
        assert_eq!(until_math_close(r"\ \$5 \qquad$ rest"), r"\ \$5 \qquad");
        assert_eq!(strip_math_delimiters(r"$\$5$"), "$5");
    }
}
