use std::fmt;

use thiserror::Error;

use crate::source::{SourceCursor, SourcePosition};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Unknown escape sequence '\\{escape}' at {position}")]
    UnknownEscape {
        escape: char,
        position: SourcePosition,
    },
    #[error("Unterminated string literal starting at {position}")]
    UnterminatedString { position: SourcePosition },
}

pub type LexResult<T> = Result<T, LexError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    OpenParen,
    CloseParen,
    Number,
    Str,
    Bool,
    Identifier,
}

/// A single token. `text` holds the literal text, already unescaped for
/// string tokens; `start`/`end` span exactly the consumed characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::OpenParen => write!(f, "open '('"),
            TokenKind::CloseParen => write!(f, "close ')'"),
            TokenKind::Number => write!(f, "number '{}'", self.text),
            TokenKind::Str => write!(f, "string {:?}", self.text),
            TokenKind::Bool => write!(f, "bool '{}'", self.text),
            TokenKind::Identifier => write!(f, "identifier '{}'", self.text),
        }
    }
}

/// Common contract for anything the parser can pull tokens from: the live
/// lexer, or a pre-recorded token list for replay.
pub trait TokenSource {
    /// Next token without consuming it, or `None` at end of input.
    fn peek(&mut self) -> LexResult<Option<&Token>>;
    /// Consume and return the next token, or `None` at end of input.
    fn get(&mut self) -> LexResult<Option<Token>>;
    fn is_eof(&mut self) -> LexResult<bool>;
    /// Position of the next unconsumed token, for error reporting.
    fn tell(&mut self) -> SourcePosition;
}

/// Lazy tokenizer over a source cursor, with a single-token lookahead cache.
pub struct Lexer<'a> {
    source: SourceCursor<'a>,
    lookahead: Option<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            source: SourceCursor::new(text),
            lookahead: None,
        }
    }

    fn fill(&mut self) -> LexResult<()> {
        if self.lookahead.is_some() {
            return Ok(());
        }

        self.skip_whitespace();

        let start = self.source.tell();
        let Some(first) = self.source.peek() else {
            return Ok(());
        };

        let (kind, text) = match first {
            '(' => {
                self.source.get();
                (TokenKind::OpenParen, "(".to_string())
            }
            ')' => {
                self.source.get();
                (TokenKind::CloseParen, ")".to_string())
            }
            '"' => (TokenKind::Str, self.consume_string(start)?),
            c if c.is_ascii_digit() => (TokenKind::Number, self.consume_number()),
            _ => {
                let word = self.consume_word();
                let kind = if word == "true" || word == "false" {
                    TokenKind::Bool
                } else {
                    TokenKind::Identifier
                };
                (kind, word)
            }
        };

        self.lookahead = Some(Token {
            kind,
            text,
            start,
            end: self.source.tell(),
        });
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while self.source.peek().is_some_and(char::is_whitespace) {
            self.source.get();
        }
    }

    /// Consumes a double-quoted string, resolving escape sequences. The
    /// returned text is the decoded content without the quotes.
    fn consume_string(&mut self, start: SourcePosition) -> LexResult<String> {
        self.source.get();
        let mut text = String::new();
        loop {
            match self.source.get() {
                None => return Err(LexError::UnterminatedString { position: start }),
                Some('"') => return Ok(text),
                Some('\\') => {
                    let escape_position = self.source.tell();
                    let Some(escape) = self.source.get() else {
                        return Err(LexError::UnterminatedString { position: start });
                    };
                    text.push(match escape {
                        't' => '\t',
                        'n' => '\n',
                        'r' => '\r',
                        'a' => '\u{07}',
                        'f' => '\u{0C}',
                        '0' => '\0',
                        '\\' => '\\',
                        other => {
                            return Err(LexError::UnknownEscape {
                                escape: other,
                                position: escape_position,
                            });
                        }
                    });
                }
                Some(c) => text.push(c),
            }
        }
    }

    /// Longest match of `\d+(\.\d*)?`: no sign, no exponent, no leading dot.
    fn consume_number(&mut self) -> String {
        let mut text = String::new();
        while self.source.peek().is_some_and(|c| c.is_ascii_digit()) {
            text.extend(self.source.get());
        }
        if self.source.peek() == Some('.') {
            text.extend(self.source.get());
            while self.source.peek().is_some_and(|c| c.is_ascii_digit()) {
                text.extend(self.source.get());
            }
        }
        text
    }

    /// Longest run of non-whitespace, non-paren characters.
    fn consume_word(&mut self) -> String {
        let mut text = String::new();
        while self
            .source
            .peek()
            .is_some_and(|c| !c.is_whitespace() && c != '(' && c != ')')
        {
            text.extend(self.source.get());
        }
        text
    }
}

impl TokenSource for Lexer<'_> {
    fn peek(&mut self) -> LexResult<Option<&Token>> {
        self.fill()?;
        Ok(self.lookahead.as_ref())
    }

    fn get(&mut self) -> LexResult<Option<Token>> {
        self.fill()?;
        Ok(self.lookahead.take())
    }

    fn is_eof(&mut self) -> LexResult<bool> {
        self.fill()?;
        Ok(self.lookahead.is_none())
    }

    fn tell(&mut self) -> SourcePosition {
        match &self.lookahead {
            Some(token) => token.start,
            None => self.source.tell(),
        }
    }
}

/// Replay source over a fixed token list; lets callers re-parse recorded
/// tokens without keeping the original text around.
pub struct FixedTokens {
    tokens: Vec<Token>,
    index: usize,
}

impl FixedTokens {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }
}

impl TokenSource for FixedTokens {
    fn peek(&mut self) -> LexResult<Option<&Token>> {
        Ok(self.tokens.get(self.index))
    }

    fn get(&mut self) -> LexResult<Option<Token>> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        Ok(token)
    }

    fn is_eof(&mut self) -> LexResult<bool> {
        Ok(self.index >= self.tokens.len())
    }

    fn tell(&mut self) -> SourcePosition {
        match self.tokens.get(self.index) {
            Some(token) => token.start,
            None => match self.tokens.last() {
                Some(token) => token.end,
                None => SourcePosition::start(),
            },
        }
    }
}

/// Drains a full source text into a token list.
pub fn tokenize(text: &str) -> LexResult<Vec<Token>> {
    let mut lexer = Lexer::new(text);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.get()? {
        tokens.push(token);
    }
    Ok(tokens)
}
