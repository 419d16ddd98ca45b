//! Kotlin tokenizer.
//!
//! Produces just enough token structure for declaration parsing: identifiers,
//! literals and the punctuation that shapes signatures. Operators are lumped
//! together since bodies and initializers are only ever skipped. Every token
//! records whether a line break preceded it, which the parser uses to find
//! the end of expression bodies and property initializers.

use std::path::Path;

use crate::diagnostic::GeneratorError;

/// Punctuation the parser distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    At,
    Dot,
    Comma,
    Colon,
    ColonColon,
    Semicolon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Lt,
    Gt,
    Question,
    Star,
    Eq,
    Arrow,
    Plus,
}

/// Kind of token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier or keyword.
    Ident(String),
    /// A backtick-quoted identifier; never a keyword.
    EscapedIdent(String),
    /// String literal contents with escapes decoded.
    String(String),
    /// A string literal containing `$name` or `${...}`. Its value is only
    /// known to the Kotlin compiler.
    Template,
    Char,
    Number,
    Punct(Punct),
    /// Any other operator character run (`==`, `&&`, `!`, ...).
    Operator,
    Eof,
}

/// A token with its position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offsets into the source.
    pub start: usize,
    pub end: usize,
    /// 1-based position of the first character.
    pub line: usize,
    pub column: usize,
    /// A line break appeared between the previous token and this one.
    pub newline_before: bool,
}

impl Token {
    pub fn is_punct(&self, punct: Punct) -> bool {
        self.kind == TokenKind::Punct(punct)
    }

    /// Whether this is the unescaped identifier `word`.
    pub fn is_word(&self, word: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(name) if name == word)
    }

    /// The identifier name, escaped or not.
    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(name) | TokenKind::EscapedIdent(name) => Some(name),
            _ => None,
        }
    }
}

/// Kotlin tokenizer over a single source file.
pub struct Lexer<'a> {
    source: &'a str,
    path: &'a Path,
    chars: Vec<(usize, char)>,
    pos: usize,
    line: usize,
    column: usize,
    newline_pending: bool,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, path: &'a Path) -> Self {
        Self {
            source,
            path,
            chars: source.char_indices().collect(),
            pos: 0,
            line: 1,
            column: 1,
            newline_pending: false,
            tokens: Vec::new(),
        }
    }

    /// Consumes the lexer and returns the token stream, ending with `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, GeneratorError> {
        if self.source.starts_with("#!") {
            self.skip_line();
        }

        loop {
            self.skip_trivia()?;
            let Some(c) = self.peek() else {
                break;
            };
            let (start, line, column) = (self.offset(), self.line, self.column);

            let kind = if c == '"' {
                self.scan_string()?
            } else if c == '\'' {
                self.scan_char()?
            } else if c == '`' {
                self.scan_escaped_ident()?
            } else if c.is_ascii_digit() {
                self.scan_number();
                TokenKind::Number
            } else if is_ident_start(c) {
                self.scan_identifier()
            } else {
                self.scan_punct(c)
            };

            self.push(kind, start, line, column);
        }

        let end = self.source.len();
        let (line, column) = (self.line, self.column);
        self.push(TokenKind::Eof, end, line, column);
        Ok(self.tokens)
    }

    // ------------------------------------------------------------------------
    // Cursor helpers
    // ------------------------------------------------------------------------

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).map(|(_, c)| *c)
    }

    fn offset(&self) -> usize {
        self.chars.get(self.pos).map(|(i, _)| *i).unwrap_or(self.source.len())
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
            self.newline_pending = true;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: usize, column: usize) {
        let end = self.offset();
        self.tokens.push(Token {
            kind,
            start,
            end,
            line,
            column,
            newline_before: self.newline_pending && !self.tokens.is_empty(),
        });
        self.newline_pending = false;
    }

    fn error(&self, line: usize, column: usize, message: impl Into<String>) -> GeneratorError {
        GeneratorError::syntax(self.path, line, column, message)
    }

    // ------------------------------------------------------------------------
    // Trivia
    // ------------------------------------------------------------------------

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn skip_trivia(&mut self) -> Result<(), GeneratorError> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.advance();
                }
                (Some('/'), Some('/')) => self.skip_line(),
                (Some('/'), Some('*')) => self.skip_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    /// Block comments nest in Kotlin.
    fn skip_block_comment(&mut self) -> Result<(), GeneratorError> {
        let (line, column) = (self.line, self.column);
        self.advance();
        self.advance();
        let mut depth = 1;
        while depth > 0 {
            match (self.peek(), self.peek_at(1)) {
                (Some('/'), Some('*')) => {
                    self.advance();
                    self.advance();
                    depth += 1;
                }
                (Some('*'), Some('/')) => {
                    self.advance();
                    self.advance();
                    depth -= 1;
                }
                (Some(_), _) => {
                    self.advance();
                }
                (None, _) => return Err(self.error(line, column, "unterminated block comment")),
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Literals
    // ------------------------------------------------------------------------

    fn scan_string(&mut self) -> Result<TokenKind, GeneratorError> {
        let (line, column) = (self.line, self.column);
        if self.peek_at(1) == Some('"') && self.peek_at(2) == Some('"') {
            return self.scan_raw_string(line, column);
        }

        self.advance();
        let mut value = String::new();
        let mut templated = false;
        loop {
            match self.peek() {
                None | Some('\n') => return Err(self.error(line, column, "unterminated string literal")),
                Some('"') => {
                    self.advance();
                    return Ok(string_token(value, templated));
                }
                Some('\\') => {
                    self.advance();
                    let escaped = self
                        .advance()
                        .ok_or_else(|| self.error(line, column, "unterminated string literal"))?;
                    match escaped {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        'b' => value.push('\u{8}'),
                        'u' => value.push(self.scan_unicode_escape(line, column)?),
                        other => value.push(other),
                    }
                }
                Some('$') if self.peek_at(1) == Some('{') => {
                    templated = true;
                    self.scan_template_expression(&mut value, line, column)?;
                }
                Some('$') if self.peek_at(1).is_some_and(is_template_start) => {
                    templated = true;
                    self.advance();
                    value.push('$');
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
            }
        }
    }

    fn scan_raw_string(&mut self, line: usize, column: usize) -> Result<TokenKind, GeneratorError> {
        for _ in 0..3 {
            self.advance();
        }
        let mut value = String::new();
        let mut templated = false;
        loop {
            match self.peek() {
                None => return Err(self.error(line, column, "unterminated raw string literal")),
                Some('"') if self.peek_at(1) == Some('"') && self.peek_at(2) == Some('"') => {
                    // `""""` ends with the last three quotes
                    while self.peek_at(3) == Some('"') {
                        self.advance();
                        value.push('"');
                    }
                    for _ in 0..3 {
                        self.advance();
                    }
                    return Ok(string_token(value, templated));
                }
                Some('$') if self.peek_at(1) == Some('{') => {
                    templated = true;
                    self.scan_template_expression(&mut value, line, column)?;
                }
                Some('$') if self.peek_at(1).is_some_and(is_template_start) => {
                    templated = true;
                    self.advance();
                    value.push('$');
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
            }
        }
    }

    /// Copies a `${ ... }` template verbatim, honouring nested braces and strings.
    fn scan_template_expression(&mut self, value: &mut String, line: usize, column: usize) -> Result<(), GeneratorError> {
        let mut depth = 0usize;
        loop {
            let c = self
                .advance()
                .ok_or_else(|| self.error(line, column, "unterminated string template"))?;
            value.push(c);
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                '"' => {
                    // Nested string inside the template
                    loop {
                        let inner = self
                            .advance()
                            .ok_or_else(|| self.error(line, column, "unterminated string template"))?;
                        value.push(inner);
                        if inner == '\\' {
                            if let Some(next) = self.advance() {
                                value.push(next);
                            }
                        } else if inner == '"' {
                            break;
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn scan_unicode_escape(&mut self, line: usize, column: usize) -> Result<char, GeneratorError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .advance()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error(line, column, "invalid unicode escape"))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| self.error(line, column, "invalid unicode escape"))
    }

    fn scan_char(&mut self) -> Result<TokenKind, GeneratorError> {
        let (line, column) = (self.line, self.column);
        self.advance();
        loop {
            match self.advance() {
                None | Some('\n') => return Err(self.error(line, column, "unterminated character literal")),
                Some('\\') => {
                    self.advance();
                }
                Some('\'') => return Ok(TokenKind::Char),
                Some(_) => {}
            }
        }
    }

    fn scan_number(&mut self) {
        while let Some(c) = self.peek() {
            let continues = c.is_ascii_alphanumeric()
                || c == '_'
                || (c == '.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit()));
            if !continues {
                break;
            }
            self.advance();
        }
    }

    fn scan_escaped_ident(&mut self) -> Result<TokenKind, GeneratorError> {
        let (line, column) = (self.line, self.column);
        self.advance();
        let mut name = String::new();
        loop {
            match self.advance() {
                Some('`') => return Ok(TokenKind::EscapedIdent(name)),
                Some('\n') | None => return Err(self.error(line, column, "unterminated quoted identifier")),
                Some(c) => name.push(c),
            }
        }
    }

    fn scan_identifier(&mut self) -> TokenKind {
        let start = self.offset();
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                self.advance();
            } else {
                break;
            }
        }
        TokenKind::Ident(self.source[start..self.offset()].to_string())
    }

    fn scan_punct(&mut self, c: char) -> TokenKind {
        self.advance();
        let punct = match c {
            '@' => Punct::At,
            '.' => Punct::Dot,
            ',' => Punct::Comma,
            ';' => Punct::Semicolon,
            '(' => Punct::LParen,
            ')' => Punct::RParen,
            '{' => Punct::LBrace,
            '}' => Punct::RBrace,
            '[' => Punct::LBracket,
            ']' => Punct::RBracket,
            // `<` and `>` are never merged so `List<List<T>>` closes cleanly
            '<' => Punct::Lt,
            '>' => Punct::Gt,
            '?' => Punct::Question,
            '*' => Punct::Star,
            '+' => Punct::Plus,
            ':' => {
                if self.peek() == Some(':') {
                    self.advance();
                    Punct::ColonColon
                } else {
                    Punct::Colon
                }
            }
            '-' if self.peek() == Some('>') => {
                self.advance();
                Punct::Arrow
            }
            '=' if !matches!(self.peek(), Some('=') | Some('>')) => Punct::Eq,
            _ => {
                while let Some(next) = self.peek() {
                    if is_operator_char(next) {
                        self.advance();
                    } else {
                        break;
                    }
                }
                return TokenKind::Operator;
            }
        };
        TokenKind::Punct(punct)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '=' | '!' | '&' | '|' | '%' | '/' | '^' | '~' | '-' | '>')
}

fn string_token(value: String, templated: bool) -> TokenKind {
    if templated {
        TokenKind::Template
    } else {
        TokenKind::String(value)
    }
}

/// A `$` followed by this starts a `$name` template.
fn is_template_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Convenience function to lex a source string.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str, path: &Path) -> Result<Vec<Token>, GeneratorError> {
    Lexer::new(source, path).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source, Path::new("test.kt"))
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Ident(name.to_string())
    }

    #[test]
    fn test_generic_closers_stay_separate() {
        assert_eq!(
            kinds("Observable<List<T>>"),
            vec![
                ident("Observable"),
                TokenKind::Punct(Punct::Lt),
                ident("List"),
                TokenKind::Punct(Punct::Lt),
                ident("T"),
                TokenKind::Punct(Punct::Gt),
                TokenKind::Punct(Punct::Gt),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped_and_nest() {
        assert_eq!(
            kinds("/* outer /* inner */ still comment */ fun // trailing\n"),
            vec![ident("fun"), TokenKind::Eof]
        );
    }

    #[test]
    fn test_string_escapes_and_templates() {
        assert_eq!(
            kinds(r#""a\"b\n" "x${f("}")}y""#),
            vec![
                TokenKind::String("a\"b\n".to_string()),
                TokenKind::Template,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_escaped_dollar_is_plain_text() {
        assert_eq!(
            kinds(r#""\$HOST/api" "$HOST/api" "cost: $5" """$name""""#),
            vec![
                TokenKind::String("$HOST/api".to_string()),
                TokenKind::Template,
                TokenKind::String("cost: $5".to_string()),
                TokenKind::Template,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_raw_string() {
        assert_eq!(
            kinds("\"\"\"line \"quoted\"\n\"\"\""),
            vec![TokenKind::String("line \"quoted\"\n".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_arrow_and_operators() {
        assert_eq!(
            kinds("(A) -> B == c = d"),
            vec![
                TokenKind::Punct(Punct::LParen),
                ident("A"),
                TokenKind::Punct(Punct::RParen),
                TokenKind::Punct(Punct::Arrow),
                ident("B"),
                TokenKind::Operator,
                ident("c"),
                TokenKind::Punct(Punct::Eq),
                ident("d"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_escaped_identifier() {
        assert_eq!(
            kinds("`in` `fun name`"),
            vec![
                TokenKind::EscapedIdent("in".to_string()),
                TokenKind::EscapedIdent("fun name".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_newline_tracking() {
        let tokens = lex("a b\n  c /* x\n */ d", Path::new("test.kt")).unwrap();
        let flags: Vec<bool> = tokens.iter().map(|t| t.newline_before).collect();
        assert_eq!(flags, vec![false, false, true, true, false]);
        assert_eq!((tokens[2].line, tokens[2].column), (2, 3));
    }

    #[test]
    fn test_unterminated_string_reports_position() {
        let err = lex("val x = \"oops\n", Path::new("Api.kt")).unwrap_err();
        match err {
            GeneratorError::SyntaxError { line, column, .. } => assert_eq!((line, column), (1, 9)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("1_000L 0x1F 2.5f"),
            vec![TokenKind::Number, TokenKind::Number, TokenKind::Number, TokenKind::Eof]
        );
    }
}
