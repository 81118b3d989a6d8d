//! Line ending normalization for fetched text.
//!
//! Every CRLF and lone CR becomes LF. The dominant original style is reported (ties
//! resolved CRLF > LF > CR) together with a `mixed` flag, purely for diagnostics: the
//! page never writes the text back.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    Cr,
    Crlf,
}

impl LineEnding {
    /// Short label for logs.
    pub fn name(self) -> &'static str {
        match self {
            LineEnding::Lf => "lf",
            LineEnding::Cr => "cr",
            LineEnding::Crlf => "crlf",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub text: String,
    pub original: LineEnding,
    pub mixed: bool,
}

pub fn normalize_line_endings(input: &str) -> NormalizedText {
    let (mut crlf, mut lf, mut cr) = (0usize, 0usize, 0usize);
    let mut out = String::new();
    let mut copied_to = 0usize;
    let bytes = input.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lf += 1;
                i += 1;
            }
            b'\r' => {
                // Only slice at '\r' so multi-byte sequences are never cut.
                if out.capacity() == 0 {
                    out.reserve(input.len());
                }
                out.push_str(&input[copied_to..i]);
                out.push('\n');
                if bytes.get(i + 1) == Some(&b'\n') {
                    crlf += 1;
                    i += 2;
                } else {
                    cr += 1;
                    i += 1;
                }
                copied_to = i;
            }
            _ => i += 1,
        }
    }

    let text = if crlf == 0 && cr == 0 {
        input.to_string()
    } else {
        out.push_str(&input[copied_to..]);
        out
    };

    let counts = [
        (LineEnding::Crlf, crlf),
        (LineEnding::Lf, lf),
        (LineEnding::Cr, cr),
    ];
    let (original, _) = counts
        .iter()
        .fold((LineEnding::Lf, 0usize), |best, &(style, count)| {
            if count > best.1 { (style, count) } else { best }
        });
    let mixed = counts.iter().filter(|(_, c)| *c > 0).count() > 1;

    NormalizedText {
        text,
        original,
        mixed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_becomes_lf() {
        let n = normalize_line_endings("Amazing grace\r\nhow sweet\r\n");
        assert_eq!(n.text, "Amazing grace\nhow sweet\n");
        assert_eq!(n.original, LineEnding::Crlf);
        assert!(!n.mixed);
    }

    #[test]
    fn lone_cr_becomes_lf() {
        let n = normalize_line_endings("a\rb");
        assert_eq!(n.text, "a\nb");
        assert_eq!(n.original, LineEnding::Cr);
    }

    #[test]
    fn lf_only_is_untouched() {
        let n = normalize_line_endings("grace\ngrace amazing grace");
        assert_eq!(n.text, "grace\ngrace amazing grace");
        assert_eq!(n.original, LineEnding::Lf);
        assert!(!n.mixed);
    }

    #[test]
    fn mixed_majority_reported() {
        let n = normalize_line_endings("α\r\nβ\nγ\r\n");
        assert_eq!(n.text, "α\nβ\nγ\n");
        assert_eq!(n.original, LineEnding::Crlf);
        assert!(n.mixed);
    }

    #[test]
    fn multibyte_around_cr_survives() {
        let n = normalize_line_endings("奇異恩典\r\n何等甘甜\r");
        assert_eq!(n.text, "奇異恩典\n何等甘甜\n");
        assert_eq!(n.original.name(), "crlf");
    }

    #[test]
    fn empty_input() {
        let n = normalize_line_endings("");
        assert!(n.text.is_empty());
        assert_eq!(n.original, LineEnding::Lf);
        assert!(!n.mixed);
    }
}
