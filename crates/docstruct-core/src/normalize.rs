//! Text normalization for noisy OCR output.
//!
//! Applies a fixed, ordered list of character-level corrections: line ending
//! unification, per-line whitespace collapse (line breaks are preserved),
//! duplicate punctuation collapse, and digit/letter de-confusion for the
//! classic OCR misreads (`0`/`O`, `1`/`I`/`l`). De-confusion runs only inside
//! digit-dominant tokens so prose like "PARACIP 650MG TAB" is never damaged.
//!
//! `normalize` is deterministic and idempotent:
//! `normalize(normalize(s)) == normalize(s)` for all inputs.

/// Characters a digit-dominant token may consist of, besides digits and the
/// confusable letters. Pipe is deliberately absent: it is a column delimiter
/// for the line tokenizer and must survive normalization intact.
const DIGIT_TOKEN_PUNCT: &[char] = &['.', ',', '/', '*', 'x', 'X', '%', '-', '+'];

/// Punctuation whose runs get collapsed to a single character.
const COLLAPSIBLE_PUNCT: &[char] = &['.', ',', ':', ';', '-'];

/// Fully normalize OCR text.
///
/// Collapses horizontal whitespace within each line (never across lines),
/// collapses duplicate punctuation, and fixes digit/letter confusions in
/// digit-dominant tokens.
pub fn normalize(text: &str) -> String {
    let text = fix_confusions(text);

    let lines: Vec<String> = text
        .lines()
        .map(|line| {
            line.split_whitespace()
                .map(collapse_punctuation)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();

    lines.join("\n")
}

/// Character-level corrections only, spacing untouched.
///
/// Used by the line tokenizer, which needs multi-space column gaps and tab
/// characters preserved for delimiter detection. Idempotent like `normalize`.
pub fn fix_confusions(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut first = true;

    for line in text.replace("\r\n", "\n").replace('\r', "\n").split('\n') {
        if !first {
            out.push('\n');
        }
        first = false;

        let mut rest = line;
        while !rest.is_empty() {
            // Peel the next whitespace or non-whitespace run.
            let is_ws = rest.chars().next().is_some_and(char::is_whitespace);
            let end = rest
                .find(|c: char| c.is_whitespace() != is_ws)
                .unwrap_or(rest.len());
            let (run, tail) = rest.split_at(end);

            if is_ws {
                out.push_str(run);
            } else {
                out.push_str(&fix_token(run));
            }
            rest = tail;
        }
    }

    out
}

/// Fix digit/letter confusions inside a single token.
///
/// A token qualifies when it contains at least one ASCII digit and consists
/// only of digits, the confusable letters (`O`, `o`, `I`, `l`) and common
/// numeric punctuation. Quantities like "1O" become "10", codes like "650MG"
/// stay untouched.
fn fix_token(token: &str) -> String {
    let digit_dominant = token.chars().any(|c| c.is_ascii_digit())
        && token.chars().all(|c| {
            c.is_ascii_digit()
                || matches!(c, 'O' | 'o' | 'I' | 'l')
                || DIGIT_TOKEN_PUNCT.contains(&c)
        });

    if !digit_dominant {
        return token.to_string();
    }

    token
        .chars()
        .map(|c| match c {
            'O' | 'o' => '0',
            'I' | 'l' => '1',
            other => other,
        })
        .collect()
}

/// Collapse runs of the same duplicated punctuation character to one.
fn collapse_punctuation(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut prev: Option<char> = None;

    for c in token.chars() {
        if prev == Some(c) && COLLAPSIBLE_PUNCT.contains(&c) {
            continue;
        }
        out.push(c);
        prev = Some(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_confusions() {
        assert_eq!(normalize("Qty: 1O"), "Qty: 10");
        assert_eq!(normalize("l0 x 22.84"), "10 x 22.84");
        assert_eq!(normalize("MRP 22.8O"), "MRP 22.80");
    }

    #[test]
    fn test_prose_untouched() {
        assert_eq!(normalize("PARACIP 650MG TAB"), "PARACIP 650MG TAB");
        assert_eq!(normalize("Oil of Olay"), "Oil of Olay");
        assert_eq!(normalize("Invoice"), "Invoice");
    }

    #[test]
    fn test_whitespace_collapse_preserves_newlines() {
        assert_eq!(normalize("a   b\t c\nd  e"), "a b c\nd e");
        assert_eq!(normalize("one\r\ntwo\rthree"), "one\ntwo\nthree");
    }

    #[test]
    fn test_punctuation_collapse() {
        assert_eq!(normalize("Total..: 100"), "Total.: 100");
        assert_eq!(normalize("a,,b"), "a,b");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Patient Name: JOHN SMITH Ph.No. 9876543210",
            "PARACIP 650MG TAB  1*1O  22.84  1O",
            "a |  b  | c\nd | e | f",
            "",
            "   \n\t\n  ",
            "Total..: 1,234.50 Rs",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_fix_confusions_keeps_spacing() {
        assert_eq!(fix_confusions("a  1O   b"), "a  10   b");
        assert_eq!(fix_confusions("a\t1l\tb"), "a\t11\tb");
        // Pipes survive for the delimiter pass.
        assert_eq!(fix_confusions("10 | 2O | 3"), "10 | 20 | 3");
    }
}
