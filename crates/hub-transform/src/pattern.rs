//! Date pattern handling.
//!
//! Schemas written for the router declare date formats as Java-style
//! patterns (`M/d/yyyy`, `yyyyMMddHHmmZZZ`). Patterns containing `%` are
//! taken as chrono strftime patterns and used as they are.

use chrono::format::{Item, StrftimeItems};

/// Translate a declared date pattern into a chrono strftime pattern.
///
/// Returns `None` if the pattern uses a letter without a chrono equivalent,
/// or if it is a strftime pattern chrono rejects.
pub fn to_chrono_pattern(pattern: &str) -> Option<String> {
    let translated = if pattern.contains('%') {
        pattern.to_string()
    } else {
        translate_java_pattern(pattern)?
    };
    if StrftimeItems::new(&translated).any(|item| matches!(item, Item::Error)) {
        return None;
    }
    Some(translated)
}

fn translate_java_pattern(pattern: &str) -> Option<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if ch == '\'' {
            // '' is a literal quote; otherwise quote until the closing quote
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() {
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        out.push('\'');
                        i += 2;
                        continue;
                    }
                    break;
                }
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }
        if ch.is_ascii_alphabetic() {
            let run = chars[i..].iter().take_while(|&&c| c == ch).count();
            out.push_str(field_specifier(ch, run)?);
            i += run;
            continue;
        }
        push_literal(&mut out, ch);
        i += 1;
    }
    Some(out)
}

fn push_literal(out: &mut String, ch: char) {
    if ch == '%' {
        out.push_str("%%");
    } else {
        out.push(ch);
    }
}

fn field_specifier(letter: char, run: usize) -> Option<&'static str> {
    let specifier = match (letter, run) {
        ('y' | 'u', 2) => "%y",
        ('y' | 'u', _) => "%Y",
        ('M' | 'L', 1) => "%-m",
        ('M' | 'L', 2) => "%m",
        ('M' | 'L', 3) => "%b",
        ('M' | 'L', _) => "%B",
        ('d', 1) => "%-d",
        ('d', 2) => "%d",
        ('D', _) => "%j",
        ('H', 1) => "%-H",
        ('H', 2) => "%H",
        ('h', 1) => "%-I",
        ('h', 2) => "%I",
        ('m', 1) => "%-M",
        ('m', 2) => "%M",
        ('s', 1) => "%-S",
        ('s', 2) => "%S",
        ('S', 3) => "%3f",
        ('S', 6) => "%6f",
        ('S', 9) => "%9f",
        ('a', 1) => "%p",
        ('E', 1..=3) => "%a",
        ('E', _) => "%A",
        ('Z', 1..=3) => "%z",
        ('X' | 'x', 1 | 2) => "%z",
        ('X' | 'x', 3) => "%:z",
        _ => return None,
    };
    Some(specifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_patterns() {
        assert_eq!(to_chrono_pattern("yyyyMMdd").as_deref(), Some("%Y%m%d"));
        assert_eq!(
            to_chrono_pattern("yyyyMMddHHmmZZZ").as_deref(),
            Some("%Y%m%d%H%M%z")
        );
    }

    #[test]
    fn short_fields_drop_padding() {
        assert_eq!(to_chrono_pattern("M/d/yyyy").as_deref(), Some("%-m/%-d/%Y"));
        assert_eq!(
            to_chrono_pattern("yyyy-MM-dd'T'HH:mmXXX").as_deref(),
            Some("%Y-%m-%dT%H:%M%:z")
        );
    }

    #[test]
    fn strftime_passes_through() {
        assert_eq!(to_chrono_pattern("%m/%d/%Y").as_deref(), Some("%m/%d/%Y"));
        assert_eq!(to_chrono_pattern("%Q"), None);
    }

    #[test]
    fn unknown_letters_are_rejected() {
        assert_eq!(to_chrono_pattern("yyyy-ww"), None);
        assert_eq!(to_chrono_pattern("GGGG"), None);
    }
}
