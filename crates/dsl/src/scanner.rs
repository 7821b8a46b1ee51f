//! Hand-written scanner for `.schm` sources
//!
//! Whitespace is returned as a token rather than skipped so the parser can
//! use line breaks as statement boundaries inside instance bodies.

use crate::token::Token;
use std::iter::Peekable;
use std::str::Chars;

/// Starts a comment that runs to the end of the line
const COMMENT_MARKER: char = '#';

/// Lazily turns source text into `(Token, literal)` pairs
pub struct Scanner<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
        }
    }

    /// 1-based line of the next unread character
    pub fn line(&self) -> usize {
        self.line
    }

    /// Read the next token
    ///
    /// With `return_on_line_break` a whitespace run ends right after its
    /// first `\n`, so each line break is reported as its own `Ws` token.
    /// Without it a whitespace run is returned whole.
    ///
    /// Never fails: unrecognised input comes back as [`Token::Illegal`]
    /// carrying the offending text.
    pub fn scan(&mut self, return_on_line_break: bool) -> (Token, String) {
        let Some(&ch) = self.chars.peek() else {
            return (Token::Eof, String::new());
        };

        if ch.is_whitespace() {
            return self.scan_whitespace(return_on_line_break);
        }
        if ch == COMMENT_MARKER {
            return self.scan_comment();
        }
        if ch == '"' {
            return self.scan_quoted();
        }
        if is_ident_start(ch) {
            return self.scan_ident();
        }

        self.read();
        match Token::punctuation(ch) {
            Some(token) => (token, ch.to_string()),
            None => (Token::Illegal, ch.to_string()),
        }
    }

    fn read(&mut self) -> Option<char> {
        let ch = self.chars.next();
        if ch == Some('\n') {
            self.line += 1;
        }
        ch
    }

    fn scan_whitespace(&mut self, return_on_line_break: bool) -> (Token, String) {
        let mut literal = String::new();
        while let Some(&ch) = self.chars.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.read();
            literal.push(ch);
            if return_on_line_break && ch == '\n' {
                break;
            }
        }
        (Token::Ws, literal)
    }

    /// Comments are reported as whitespace; the line break is left unread
    fn scan_comment(&mut self) -> (Token, String) {
        let mut literal = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch == '\n' {
                break;
            }
            self.read();
            literal.push(ch);
        }
        (Token::Ws, literal)
    }

    fn scan_ident(&mut self) -> (Token, String) {
        let mut literal = String::new();
        while let Some(&ch) = self.chars.peek() {
            if !is_ident_char(ch) {
                break;
            }
            self.read();
            literal.push(ch);
        }

        match Token::keyword(&literal) {
            Some(keyword) => (keyword, literal),
            None => (Token::Ident, literal),
        }
    }

    /// A double-quoted literal becomes an identifier without its quotes
    fn scan_quoted(&mut self) -> (Token, String) {
        let mut raw = String::new();
        let mut value = String::new();

        if let Some(quote) = self.read() {
            raw.push(quote);
        }

        loop {
            match self.chars.peek().copied() {
                None | Some('\n') => return (Token::Illegal, raw),
                Some('"') => {
                    self.read();
                    return (Token::Ident, value);
                }
                Some('\\') => {
                    self.read();
                    raw.push('\\');
                    let Some(escaped) = self.chars.peek().copied() else {
                        return (Token::Illegal, raw);
                    };
                    self.read();
                    raw.push(escaped);
                    match escaped {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        '"' | '\\' => value.push(escaped),
                        other => {
                            value.push('\\');
                            value.push(other);
                        }
                    }
                }
                Some(ch) => {
                    self.read();
                    raw.push(ch);
                    value.push(ch);
                }
            }
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

fn is_ident_char(ch: char) -> bool {
    is_ident_start(ch) || ch == '.' || ch == ':'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(source: &str, return_on_line_break: bool) -> Vec<(Token, String)> {
        let mut scanner = Scanner::new(source);
        let mut tokens = Vec::new();
        loop {
            let (token, literal) = scanner.scan(return_on_line_break);
            if token == Token::Eof {
                break;
            }
            tokens.push((token, literal));
        }
        tokens
    }

    fn kinds(tokens: &[(Token, String)]) -> Vec<Token> {
        tokens.iter().map(|(t, _)| *t).collect()
    }

    #[test]
    fn test_variable_block() {
        let tokens = scan_all("variable n { value = 42 }", false);
        assert_eq!(
            kinds(&tokens),
            vec![
                Token::Variable,
                Token::Ws,
                Token::Ident,
                Token::Ws,
                Token::OpenBrace,
                Token::Ws,
                Token::Ident,
                Token::Ws,
                Token::Equals,
                Token::Ws,
                Token::Ident,
                Token::Ws,
                Token::ClosedBrace,
            ]
        );
        assert_eq!(tokens[10].1, "42");
    }

    #[test]
    fn test_provider_reference_and_var_ref_are_single_idents() {
        let tokens = scan_all("capsule::config var.limit 2.5", false);
        let idents: Vec<&str> = tokens
            .iter()
            .filter(|(t, _)| *t == Token::Ident)
            .map(|(_, l)| l.as_str())
            .collect();
        assert_eq!(idents, vec!["capsule::config", "var.limit", "2.5"]);
    }

    #[test]
    fn test_whitespace_split_on_line_break() {
        let tokens = scan_all("a \n\n b", true);
        assert_eq!(
            tokens,
            vec![
                (Token::Ident, "a".to_string()),
                (Token::Ws, " \n".to_string()),
                (Token::Ws, "\n".to_string()),
                (Token::Ws, " ".to_string()),
                (Token::Ident, "b".to_string()),
            ]
        );
    }

    #[test]
    fn test_whitespace_whole_without_line_break_mode() {
        let tokens = scan_all("a \n\n b", false);
        assert_eq!(tokens[1], (Token::Ws, " \n\n ".to_string()));
    }

    #[test]
    fn test_illegal_character() {
        let tokens = scan_all("a = @", false);
        assert_eq!(tokens.last(), Some(&(Token::Illegal, "@".to_string())));
    }

    #[test]
    fn test_quoted_literal() {
        let tokens = scan_all(r#"name = "hello \"world\"""#, false);
        assert_eq!(
            tokens.last(),
            Some(&(Token::Ident, "hello \"world\"".to_string()))
        );
    }

    #[test]
    fn test_unterminated_quote_is_illegal() {
        let tokens = scan_all("name = \"open\nnext", true);
        assert!(tokens.contains(&(Token::Illegal, "\"open".to_string())));
    }

    #[test]
    fn test_comment_is_whitespace() {
        let tokens = scan_all("a # note\nb", true);
        assert_eq!(
            kinds(&tokens),
            vec![Token::Ident, Token::Ws, Token::Ws, Token::Ws, Token::Ident]
        );
        assert_eq!(tokens[2].1, "# note");
    }

    #[test]
    fn test_line_tracking() {
        let mut scanner = Scanner::new("a\nb\n");
        assert_eq!(scanner.line(), 1);
        scanner.scan(true);
        scanner.scan(true);
        assert_eq!(scanner.line(), 2);
        scanner.scan(true);
        scanner.scan(true);
        assert_eq!(scanner.line(), 3);
        assert_eq!(scanner.scan(true).0, Token::Eof);
    }

    #[test]
    fn test_punctuation() {
        let tokens = scan_all("[](),.", false);
        assert_eq!(
            kinds(&tokens),
            vec![
                Token::OpenBracket,
                Token::ClosedBracket,
                Token::OpenParen,
                Token::ClosedParen,
                Token::Comma,
                Token::Period,
            ]
        );
    }
}
