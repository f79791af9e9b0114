use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// A 1-indexed line/column pair. Advancing produces a new value; positions
/// already handed out never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
}

impl SourcePosition {
    pub fn start() -> Self {
        Self { line: 1, column: 1 }
    }

    #[must_use]
    pub fn next_column(self) -> Self {
        Self {
            line: self.line,
            column: self.column + 1,
        }
    }

    #[must_use]
    pub fn next_line(self) -> Self {
        Self {
            line: self.line + 1,
            column: 1,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Single-character lookahead over script text.
///
/// `peek` never consumes and is idempotent; `get` consumes one character and
/// advances the position, moving to the next line on `'\n'`.
pub struct SourceCursor<'a> {
    chars: Peekable<Chars<'a>>,
    position: SourcePosition,
}

impl<'a> SourceCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            position: SourcePosition::start(),
        }
    }

    pub fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    pub fn get(&mut self) -> Option<char> {
        let consumed = self.chars.next();
        match consumed {
            Some('\n') => self.position = self.position.next_line(),
            Some(_) => self.position = self.position.next_column(),
            None => {}
        }
        consumed
    }

    pub fn is_eof(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    /// Position of the next character `get` would consume.
    pub fn tell(&self) -> SourcePosition {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_column_within_a_line() {
        let mut cursor = SourceCursor::new("ab");
        assert_eq!(cursor.tell(), SourcePosition { line: 1, column: 1 });
        assert_eq!(cursor.get(), Some('a'));
        assert_eq!(cursor.tell(), SourcePosition { line: 1, column: 2 });
        assert_eq!(cursor.get(), Some('b'));
        assert_eq!(cursor.tell(), SourcePosition { line: 1, column: 3 });
        assert!(cursor.is_eof());
        assert_eq!(cursor.get(), None);
    }

    #[test]
    fn newline_resets_column_and_advances_line() {
        let mut cursor = SourceCursor::new("a\nb");
        cursor.get();
        assert_eq!(cursor.get(), Some('\n'));
        assert_eq!(cursor.tell(), SourcePosition { line: 2, column: 1 });
        cursor.get();
        assert_eq!(cursor.tell(), SourcePosition { line: 2, column: 2 });
    }

    #[test]
    fn peek_does_not_move_the_position() {
        let mut cursor = SourceCursor::new("xy");
        let before = cursor.tell();
        assert_eq!(cursor.peek(), Some('x'));
        assert_eq!(cursor.peek(), Some('x'));
        assert_eq!(cursor.tell(), before);
        assert_eq!(cursor.get(), Some('x'));
    }

    #[test]
    fn positions_are_immutable_values() {
        let position = SourcePosition::start();
        let advanced = position.next_column().next_line();
        assert_eq!(position, SourcePosition { line: 1, column: 1 });
        assert_eq!(advanced, SourcePosition { line: 2, column: 1 });
    }
}
