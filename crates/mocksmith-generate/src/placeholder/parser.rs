//! Scanner for `@token`, `@token(args)` and `@a.b.c` expressions.

/// One piece of a placeholder-bearing string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Token(Token<'a>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    /// Source text of the whole expression, including `@` and any argument list.
    pub raw: &'a str,
    pub name: &'a str,
    /// Raw argument texts; `None` when the token has no parenthesised list.
    pub args: Option<Vec<&'a str>>,
}

pub fn parse_segments(text: &str) -> Vec<Segment<'_>> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut index = 0;

    while index < bytes.len() {
        if bytes[index] != b'@' {
            index += 1;
            continue;
        }
        let Some(name_end) = scan_name(bytes, index + 1) else {
            index += 1;
            continue;
        };

        if literal_start < index {
            segments.push(Segment::Literal(&text[literal_start..index]));
        }

        let name = &text[index + 1..name_end];
        let (end, args) = match scan_args(bytes, name_end) {
            Some(close) => (close + 1, Some(split_args(&text[name_end + 1..close]))),
            None => (name_end, None),
        };
        segments.push(Segment::Token(Token {
            raw: &text[index..end],
            name,
            args,
        }));
        index = end;
        literal_start = end;
    }

    if literal_start < text.len() {
        segments.push(Segment::Literal(&text[literal_start..]));
    }
    segments
}

/// End of a `[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z0-9_]+)*` name starting at `start`.
fn scan_name(bytes: &[u8], start: usize) -> Option<usize> {
    if !bytes.get(start)?.is_ascii_alphabetic() {
        return None;
    }
    let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_';
    let mut end = start + 1;
    while end < bytes.len() && is_word(bytes[end]) {
        end += 1;
    }
    while end + 1 < bytes.len() && bytes[end] == b'.' && is_word(bytes[end + 1]) {
        end += 2;
        while end < bytes.len() && is_word(bytes[end]) {
            end += 1;
        }
    }
    Some(end)
}

/// Index of the `)` closing an argument list that opens at `open`.
fn scan_args(bytes: &[u8], open: usize) -> Option<usize> {
    if bytes.get(open) != Some(&b'(') {
        return None;
    }
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    for (index, &byte) in bytes.iter().enumerate().skip(open) {
        match (quote, byte) {
            (Some(q), b) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(byte),
            (None, b'(') => depth += 1,
            (None, b')') => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits an argument list at top-level commas.
pub fn split_args(inner: &str) -> Vec<&str> {
    if inner.trim().is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (index, ch) in inner.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(inner[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(inner[start..].trim());
    parts
}

/// Removes one pair of matching surrounding quotes.
pub fn unquote(arg: &str) -> Option<&str> {
    let bytes = arg.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        return Some(&arg[1..arg.len() - 1]);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<Token<'_>> {
        parse_segments(text)
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Token(token) => Some(token),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    #[test]
    fn splits_literals_and_tokens() {
        let segments = parse_segments("Hi @first @LAST!");
        assert_eq!(segments.len(), 5);
        assert_eq!(segments[0], Segment::Literal("Hi "));
        assert_eq!(segments[4], Segment::Literal("!"));
        assert_eq!(tokens("Hi @first @LAST!")[1].name, "LAST");
    }

    #[test]
    fn lone_at_sign_stays_literal() {
        let found = tokens("@username@@domain");
        assert_eq!(
            found.iter().map(|t| t.name).collect::<Vec<_>>(),
            vec!["username", "domain"]
        );
        assert!(tokens("a @ b @1").is_empty());
    }

    #[test]
    fn parses_nested_arguments() {
        let found = tokens("@SENTENCE(@NATURAL(5, 10))");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].args, Some(vec!["@NATURAL(5, 10)"]));

        let found = tokens("@pick('a,b', \"c)\", 3)");
        assert_eq!(found[0].args, Some(vec!["'a,b'", "\"c)\"", "3"]));
    }

    #[test]
    fn unterminated_argument_list_is_left_as_text() {
        let segments = parse_segments("@NATURAL(");
        assert_eq!(segments.len(), 2);
        assert!(matches!(&segments[0], Segment::Token(t) if t.args.is_none()));
        assert_eq!(segments[1], Segment::Literal("("));
    }

    #[test]
    fn dotted_paths_stop_before_trailing_dot() {
        let found = tokens("see @user.address.city. done");
        assert_eq!(found[0].name, "user.address.city");
        assert_eq!(tokens("@a_b")[0].name, "a_b");
        assert_eq!(tokens("@date()")[0].args, Some(vec![]));
    }
}
