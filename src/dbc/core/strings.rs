// Utilities for quoted strings in DBC files.
//
// These helpers support escaped quotes (\") and backslashes (\\), and
// multi-line quoted strings, which are common in CM_ comments and string
// attribute values.

// Count unescaped double quotes in a string.
// A quote is considered escaped if immediately preceded by an odd number of backslashes.
pub(crate) fn count_unescaped_quotes(s: &str) -> usize {
    let mut count = 0usize;
    let mut backslashes = 0usize;
    for ch in s.chars() {
        if ch == '\\' {
            backslashes += 1;
            continue;
        }
        if ch == '"' && backslashes % 2 == 0 {
            count += 1;
        }
        backslashes = 0;
    }
    count
}

// Return true if the statement's quoted strings are all closed.
pub(crate) fn has_balanced_quotes(s: &str) -> bool {
    count_unescaped_quotes(s) % 2 == 0
}

// Returns the unescaped content of the first quoted string in `s` and the
// byte offset just past its closing quote. None when there is no complete
// quoted string.
pub(crate) fn take_quoted(s: &str) -> Option<(String, usize)> {
    let bytes: &[u8] = s.as_bytes();
    let start: usize = s.find('"')? + 1;
    let mut out: String = String::new();
    let mut i: usize = start;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' if i + 1 < bytes.len() && (bytes[i + 1] == b'"' || bytes[i + 1] == b'\\') => {
                out.push(bytes[i + 1] as char);
                i += 2;
            }
            b'"' => return Some((out, i + 1)),
            _ => {
                // Multi-byte characters pass through untouched.
                let ch_len: usize = s[i..].chars().next().map_or(1, char::len_utf8);
                out.push_str(&s[i..i + ch_len]);
                i += ch_len;
            }
        }
    }
    None // unclosed quotes
}

// Collect the contents of every quoted string in `s`, in order.
pub(crate) fn collect_all_quoted(s: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut rest: &str = s;
    while let Some((text, end)) = take_quoted(rest) {
        out.push(text);
        rest = &rest[end..];
    }
    out
}

// Quote `s` for emission, escaping backslashes and double quotes.
pub(crate) fn quote(s: &str) -> String {
    let mut out: String = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_unescaped_quotes() {
        assert_eq!(count_unescaped_quotes("\"a\""), 2);
        assert_eq!(count_unescaped_quotes("\\\"a\\\""), 0);
        assert!(has_balanced_quotes("before \"x\" after"));
        assert!(!has_balanced_quotes("before \"x without end"));
    }

    #[test]
    fn test_take_quoted() {
        assert_eq!(
            take_quoted(r#"CM_ "hello world";"#),
            Some(("hello world".to_string(), 17))
        );
        assert_eq!(
            take_quoted(r#""a \"quoted\" part" tail"#).map(|(s, _)| s),
            Some("a \"quoted\" part".to_string())
        );
        assert_eq!(take_quoted("no quotes here"), None);
        assert_eq!(take_quoted("\"unclosed"), None);
    }

    #[test]
    fn test_quote_round_trip() {
        let original: &str = "say \"hi\" with a \\ backslash";
        let quoted: String = quote(original);
        let (back, _) = take_quoted(&quoted).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_collect_all_quoted() {
        assert_eq!(
            collect_all_quoted(r#"0 "Off" 1 "On""#),
            vec!["Off".to_string(), "On".to_string()]
        );
    }
}
