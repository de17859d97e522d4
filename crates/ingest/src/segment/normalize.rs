use std::sync::LazyLock;

use regex::Regex;

static TRAILING_WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+\n").unwrap());
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Canonicalize line endings and blank-line runs, then trim.
///
/// CRLF and lone CR become LF, spaces/tabs before a line break are removed,
/// three or more consecutive line breaks collapse to one blank line.
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let stripped = TRAILING_WS_RE.replace_all(&unified, "\n");
    let collapsed = BLANK_RUN_RE.replace_all(&stripped, "\n\n");
    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unifies_line_endings() {
        assert_eq!(normalize("a\r\nb\rc\n"), "a\nb\nc");
    }

    #[test]
    fn strips_trailing_whitespace_before_breaks() {
        assert_eq!(normalize("alpha  \t\nbeta \n gamma"), "alpha\nbeta\n gamma");
    }

    #[test]
    fn collapses_blank_runs() {
        assert_eq!(normalize("a\n\n\n\n\nb\n\nc"), "a\n\nb\n\nc");
    }

    #[test]
    fn whitespace_only_lines_collapse_too() {
        assert_eq!(normalize("a\n \n\t\n  \nb"), "a\n\nb");
    }

    #[test]
    fn empty_and_blank_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \r\n\t \n"), "");
    }

    #[test]
    fn idempotent_on_samples() {
        let samples = [
            "",
            "plain",
            "  leading and trailing  ",
            "a \r\n\r\n\r\n b\t\r\n",
            "x\n\n\n\ny \n \n \n z",
            "\r\r\r",
            "Term — def\n\n\n\"Quote\" — Someone \t\n- bullet\n1) numbered",
            " \t \n \t x \t \n \t ",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }
}
