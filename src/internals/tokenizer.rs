//////////////////////////////////////////////////////////////
/// Tokenizer
///
/// Turns a source buffer into the flat token vector the evaluator
/// consumes. Comment stripping runs first, then the cleaned text is
/// split on runs of space, tab and newline.
///

/// remove_comments strips comments and discarded bytes:
///
/// - `\` discards through the end of the line. The newline itself is
///   kept, so the comment still separates tokens.
/// - `(` opens a block comment; comments nest, and a `)` closes one
///   level. A `)` with no open comment passes through as ordinary text.
/// - `#` and carriage returns are discarded wherever they appear.
pub fn remove_comments(input: &str) -> String {
    let mut cleaned = String::with_capacity(input.len());
    let mut depth = 0usize;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            while let Some(&next) = chars.peek() {
                if next == '\n' {
                    break;
                }
                chars.next();
            }
            continue;
        }
        if c == '(' {
            depth += 1;
            continue;
        }
        if c == ')' && depth > 0 {
            depth -= 1;
            continue;
        }
        if depth == 0 && c != '#' && c != '\r' {
            cleaned.push(c);
        }
    }
    cleaned
}

/// tokenize produces the ordered token vector for a source buffer.
/// Empty tokens are never emitted.
pub fn tokenize(source: &str) -> Vec<String> {
    remove_comments(source)
        .split(|c| c == ' ' || c == '\t' || c == '\n')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// One evaluation in flight: the token vector and the cursor into it.
/// Builtins receive the frame by mutable borrow and may advance or
/// rewind the cursor to implement control flow.
pub struct Frame {
    pub tokens: Vec<String>,
    pub cursor: usize,
}

impl Frame {
    pub fn new(tokens: Vec<String>) -> Frame {
        Frame { tokens, cursor: 0 }
    }

    /// next_token advances the cursor and returns the token there, if any.
    /// Used by words that consume their argument from the stream.
    pub fn next_token(&mut self) -> Option<&str> {
        self.cursor += 1;
        self.tokens.get(self.cursor).map(String::as_str)
    }
}

//////////////////////////////////////////
/// TESTS
///
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_splitting() {
        assert_eq!(tokenize("1 2  +\t.\ncr"), vec!["1", "2", "+", ".", "cr"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  \t \n ").is_empty());
    }

    #[test]
    fn test_line_comment() {
        assert_eq!(tokenize("1 \\ two three\n4"), vec!["1", "4"]);
    }

    #[test]
    fn test_line_comment_keeps_token_boundary() {
        // the newline survives, so the tokens on either side stay apart
        assert_eq!(tokenize("1\\ comment\n2"), vec!["1", "2"]);
    }

    #[test]
    fn test_line_comment_at_end_of_input() {
        assert_eq!(tokenize("dup \\ no newline after this"), vec!["dup"]);
    }

    #[test]
    fn test_block_comment() {
        assert_eq!(tokenize("1 ( a comment ) 2"), vec!["1", "2"]);
    }

    #[test]
    fn test_nested_block_comment() {
        assert_eq!(tokenize("1 ( outer ( inner ) still outer ) 2"), vec!["1", "2"]);
    }

    #[test]
    fn test_unmatched_close_paren_passes_through() {
        assert_eq!(tokenize(") drop"), vec![")", "drop"]);
    }

    #[test]
    fn test_hash_and_cr_stripped() {
        assert_eq!(tokenize("1#2 3\r\n4"), vec!["12", "3", "4"]);
    }

    #[test]
    fn test_comment_inside_definition() {
        assert_eq!(
            tokenize(": sq ( n -- n*n ) dup * ;"),
            vec![":", "sq", "dup", "*", ";"]
        );
    }

    #[test]
    fn test_frame_next_token() {
        let mut frame = Frame::new(tokenize("variable x 1"));
        assert_eq!(frame.cursor, 0);
        assert_eq!(frame.next_token(), Some("x"));
        assert_eq!(frame.next_token(), Some("1"));
        assert_eq!(frame.next_token(), None);
    }
}
