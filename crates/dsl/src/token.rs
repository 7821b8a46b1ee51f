//! Token kinds produced by the scanner

use std::fmt;

/// Lexical token kind
///
/// The literal text travels alongside the kind; see [`crate::Scanner::scan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    // Special tokens
    Illegal,
    Eof,
    Ws,

    // Literals
    Ident,

    // Misc characters
    OpenBrace,
    ClosedBrace,
    OpenBracket,
    ClosedBracket,
    OpenParen,
    ClosedParen,
    Equals,
    Comma,
    Period,

    // Keywords
    Instance,
    Data,
    Capture,
    Variable,
}

impl Token {
    /// Keyword token for a bare word, if it is one
    pub fn keyword(word: &str) -> Option<Self> {
        match word {
            "instance" => Some(Self::Instance),
            "data" => Some(Self::Data),
            "capture" => Some(Self::Capture),
            "variable" => Some(Self::Variable),
            _ => None,
        }
    }

    /// Identifiers and keywords; keywords only mean something at the top level
    pub fn is_word(self) -> bool {
        matches!(
            self,
            Self::Ident | Self::Instance | Self::Data | Self::Capture | Self::Variable
        )
    }

    /// Token for a single punctuation character
    pub fn punctuation(ch: char) -> Option<Self> {
        match ch {
            '{' => Some(Self::OpenBrace),
            '}' => Some(Self::ClosedBrace),
            '[' => Some(Self::OpenBracket),
            ']' => Some(Self::ClosedBracket),
            '(' => Some(Self::OpenParen),
            ')' => Some(Self::ClosedParen),
            '=' => Some(Self::Equals),
            ',' => Some(Self::Comma),
            '.' => Some(Self::Period),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Illegal => "illegal token",
            Self::Eof => "end of input",
            Self::Ws => "whitespace",
            Self::Ident => "identifier",
            Self::OpenBrace => "'{'",
            Self::ClosedBrace => "'}'",
            Self::OpenBracket => "'['",
            Self::ClosedBracket => "']'",
            Self::OpenParen => "'('",
            Self::ClosedParen => "')'",
            Self::Equals => "'='",
            Self::Comma => "','",
            Self::Period => "'.'",
            Self::Instance => "'instance'",
            Self::Data => "'data'",
            Self::Capture => "'capture'",
            Self::Variable => "'variable'",
        };
        f.write_str(name)
    }
}
