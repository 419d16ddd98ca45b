//! Kotlin declaration parser.
//!
//! Recursive descent over the token stream from [`super::lexer`]. Signatures,
//! annotations and types are parsed in full; anything executable (bodies,
//! initializers, default values, supertype calls) is skipped by bracket
//! balancing, using line breaks to find where an unbraced expression ends.

use std::path::Path;

use crate::diagnostic::{GeneratorError, Span};
use crate::ir::{DeclarationKind, Variance};
use super::ast::*;
use super::lexer::{self, Punct, Token, TokenKind};

/// Words that may precede a declaration keyword.
const MODIFIERS: &[&str] = &[
    "public", "private", "protected", "internal",
    "abstract", "final", "open", "override", "sealed",
    "data", "enum", "annotation", "inner", "companion", "value",
    "lateinit", "const", "suspend", "inline", "noinline", "crossinline",
    "reified", "tailrec", "operator", "infix", "external", "vararg",
    "expect", "actual",
];

/// Words that start a declaration after the modifiers.
const DECLARATION_KEYWORDS: &[&str] = &[
    "fun", "val", "var", "class", "interface", "object", "typealias", "init", "constructor",
];

/// Annotation use-site targets (`@file:`, `@get:`, ...).
const USE_SITE_TARGETS: &[&str] = &[
    "file", "property", "field", "get", "set", "receiver", "param", "setparam", "delegate",
];

/// Kotlin parser.
#[derive(Debug, Default)]
pub struct KotlinParser;

impl KotlinParser {
    /// Creates a new Kotlin parser.
    pub fn new() -> Self {
        Self
    }

    /// Parses a Kotlin source file.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn parse(&mut self, source: &str, path: &Path) -> Result<ParsedFile, GeneratorError> {
        let tokens = lexer::lex(source, path)?;
        Parser::new(source, path, tokens).parse_file()
    }
}

/// A declaration found at top level or inside a class body.
enum Item {
    Class(ClassDecl),
    Function(FunctionDecl),
    Property { name: String, annotations: Vec<AnnotationNode>, span: Span },
    TypeAlias { name: String, annotations: Vec<AnnotationNode>, span: Span },
}

struct Parser<'a> {
    source: &'a str,
    path: &'a Path,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, path: &'a Path, tokens: Vec<Token>) -> Self {
        Self { source, path, tokens, pos: 0 }
    }

    // ------------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------------

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + ahead).min(last)]
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn at_punct(&self, punct: Punct) -> bool {
        self.peek().is_punct(punct)
    }

    fn eat_punct(&mut self, punct: Punct) -> bool {
        if self.at_punct(punct) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, punct: Punct, what: &str) -> Result<Token, GeneratorError> {
        if self.at_punct(punct) {
            Ok(self.bump())
        } else {
            Err(self.error_here(format!("expected {}", what)))
        }
    }

    fn at_word(&self, word: &str) -> bool {
        self.peek().is_word(word)
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.at_word(word) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, GeneratorError> {
        match self.peek().ident() {
            Some(name) => {
                let name = name.to_string();
                self.bump();
                Ok(name)
            }
            None => Err(self.error_here(format!("expected {}", what))),
        }
    }

    fn error_here(&self, message: impl Into<String>) -> GeneratorError {
        let token = self.peek();
        let found = match &token.kind {
            TokenKind::Eof => "end of file".to_string(),
            _ => format!("'{}'", &self.source[token.start..token.end]),
        };
        GeneratorError::syntax(
            self.path,
            token.line,
            token.column,
            format!("{}, found {}", message.into(), found),
        )
    }

    /// End offset of the most recently consumed token.
    fn prev_end(&self) -> usize {
        if self.pos == 0 {
            0
        } else {
            self.tokens[self.pos - 1].end
        }
    }

    /// Source text from `start` to the end of the last consumed token, whitespace collapsed.
    fn text_since(&self, start: usize) -> String {
        let end = self.prev_end().max(start);
        self.source[start..end].split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn span_from(&self, start: &Token) -> Span {
        let end = if self.pos == 0 { start } else { &self.tokens[self.pos - 1] };
        Span::new(self.path.to_path_buf(), start.line, start.column, end.line, end.column)
    }

    /// Whether the current token can begin a member or top-level declaration.
    fn is_declaration_start(&self) -> bool {
        let token = self.peek();
        if token.is_punct(Punct::At) {
            return true;
        }
        match &token.kind {
            TokenKind::Ident(word) if DECLARATION_KEYWORDS.contains(&word.as_str()) => true,
            TokenKind::Ident(word) if MODIFIERS.contains(&word.as_str()) => {
                let next = self.peek_at(1);
                next.ident().is_some() || next.is_punct(Punct::At)
            }
            _ => false,
        }
    }

    // ------------------------------------------------------------------------
    // Skipping
    // ------------------------------------------------------------------------

    /// Skips a balanced `(...)`, `[...]` or `{...}` group starting at the current token.
    fn skip_balanced(&mut self) -> Result<(), GeneratorError> {
        let open = self.peek().clone();
        let mut depth = 0usize;
        loop {
            match self.peek().kind {
                TokenKind::Eof => {
                    return Err(GeneratorError::syntax(
                        self.path,
                        open.line,
                        open.column,
                        "unbalanced bracket",
                    ))
                }
                TokenKind::Punct(Punct::LParen | Punct::LBracket | Punct::LBrace) => depth += 1,
                TokenKind::Punct(Punct::RParen | Punct::RBracket | Punct::RBrace) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.bump();
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.bump();
        }
    }

    /// Skips `<...>` on a class header.
    fn skip_angle(&mut self) -> Result<(), GeneratorError> {
        let open = self.peek().clone();
        let mut depth = 0usize;
        loop {
            match self.peek().kind {
                TokenKind::Eof => {
                    return Err(GeneratorError::syntax(self.path, open.line, open.column, "unclosed '<'"))
                }
                TokenKind::Punct(Punct::Lt) => depth += 1,
                TokenKind::Punct(Punct::Gt) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.bump();
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.bump();
        }
    }

    /// Skips an initializer, expression body or other unbraced tail.
    ///
    /// Stops before a `;`, before an unmatched closing bracket, or before a
    /// declaration that starts on a new line.
    fn skip_to_boundary(&mut self) {
        let mut depth = 0usize;
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof => return,
                TokenKind::Punct(Punct::LParen | Punct::LBracket | Punct::LBrace) => depth += 1,
                TokenKind::Punct(Punct::RParen | Punct::RBracket | Punct::RBrace) => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                TokenKind::Punct(Punct::Semicolon) if depth == 0 => return,
                _ if depth == 0 && token.newline_before && self.is_declaration_start() => return,
                _ => {}
            }
            self.bump();
        }
    }

    /// Skips the rest of an argument or default value, up to `,` `)` or `]`.
    fn skip_value_rest(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.peek().kind {
                TokenKind::Eof => return,
                TokenKind::Punct(Punct::LParen | Punct::LBracket | Punct::LBrace) => depth += 1,
                TokenKind::Punct(Punct::RParen | Punct::RBracket | Punct::RBrace) => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                TokenKind::Punct(Punct::Comma) if depth == 0 => return,
                _ => {}
            }
            self.bump();
        }
    }

    /// Skips a class header: primary constructor, supertypes, `where` clause.
    fn skip_class_header(&mut self) {
        let mut depth = 0usize;
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof => return,
                TokenKind::Punct(Punct::LBrace) if depth == 0 => return,
                TokenKind::Punct(Punct::LParen | Punct::LBracket | Punct::LBrace) => depth += 1,
                TokenKind::Punct(Punct::RParen | Punct::RBracket | Punct::RBrace) => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                TokenKind::Punct(Punct::Semicolon) if depth == 0 => return,
                _ if depth == 0 && token.newline_before && self.is_declaration_start() => return,
                _ => {}
            }
            self.bump();
        }
    }

    // ------------------------------------------------------------------------
    // File structure
    // ------------------------------------------------------------------------

    fn parse_file(mut self) -> Result<ParsedFile, GeneratorError> {
        // @file:JvmName("...") and friends
        while self.at_punct(Punct::At) && self.peek_at(1).is_word("file") && self.peek_at(2).is_punct(Punct::Colon) {
            self.parse_annotation()?;
        }

        let mut package = String::new();
        if self.eat_word("package") {
            package = self.parse_dotted_name("package name")?;
            self.eat_punct(Punct::Semicolon);
        }

        let mut imports = Vec::new();
        while self.at_word("import") {
            imports.push(self.parse_import()?);
        }

        let mut declarations = Vec::new();
        while !self.at_eof() {
            if self.eat_punct(Punct::Semicolon) {
                continue;
            }
            if self.at_punct(Punct::RBrace) {
                return Err(self.error_here("unexpected '}'"));
            }
            match self.parse_declaration()? {
                Some(Item::Class(class)) => declarations.push(class),
                Some(Item::Function(function)) => declarations.push(ClassDecl {
                    name: function.name,
                    kind: DeclarationKind::Function,
                    annotations: function.annotations,
                    modifiers: function.modifiers,
                    functions: Vec::new(),
                    properties: Vec::new(),
                    nested: Vec::new(),
                    span: function.span,
                }),
                Some(Item::Property { name, annotations, span }) => {
                    declarations.push(leaf_decl(name, DeclarationKind::Property, annotations, span))
                }
                Some(Item::TypeAlias { name, annotations, span }) => {
                    declarations.push(leaf_decl(name, DeclarationKind::TypeAlias, annotations, span))
                }
                None => {}
            }
        }

        Ok(ParsedFile {
            path: self.path.to_path_buf(),
            package,
            imports,
            declarations,
        })
    }

    fn parse_dotted_name(&mut self, what: &str) -> Result<String, GeneratorError> {
        let mut name = self.expect_ident(what)?;
        while self.at_punct(Punct::Dot) && self.peek_at(1).ident().is_some() {
            self.bump();
            name.push('.');
            name.push_str(&self.expect_ident(what)?);
        }
        Ok(name)
    }

    fn parse_import(&mut self) -> Result<ImportDecl, GeneratorError> {
        let start = self.bump();
        let mut path = self.expect_ident("import path")?;
        let mut wildcard = false;
        while self.at_punct(Punct::Dot) {
            self.bump();
            if self.eat_punct(Punct::Star) {
                wildcard = true;
                break;
            }
            path.push('.');
            path.push_str(&self.expect_ident("import path")?);
        }
        let alias = if self.eat_word("as") {
            Some(self.expect_ident("import alias")?)
        } else {
            None
        };
        self.eat_punct(Punct::Semicolon);

        Ok(ImportDecl {
            path,
            alias,
            wildcard,
            span: self.span_from(&start),
        })
    }

    // ------------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------------

    /// Annotations and modifiers, in any interleaving.
    fn parse_prefix(&mut self) -> Result<(Vec<AnnotationNode>, Vec<String>), GeneratorError> {
        let mut annotations = Vec::new();
        let mut modifiers = Vec::new();
        loop {
            if self.at_punct(Punct::At) {
                annotations.extend(self.parse_annotation()?);
                continue;
            }
            if let TokenKind::Ident(word) = &self.peek().kind {
                let next = self.peek_at(1);
                let is_modifier = if word == "fun" {
                    // `fun interface`
                    next.is_word("interface")
                } else {
                    MODIFIERS.contains(&word.as_str()) && (next.ident().is_some() || next.is_punct(Punct::At))
                };
                if is_modifier {
                    modifiers.push(word.clone());
                    self.bump();
                    continue;
                }
            }
            return Ok((annotations, modifiers));
        }
    }

    /// Parses one declaration. Always consumes at least one token unless at
    /// `}` or end of file.
    fn parse_declaration(&mut self) -> Result<Option<Item>, GeneratorError> {
        let start = self.peek().clone();
        let (annotations, modifiers) = self.parse_prefix()?;

        let word = match &self.peek().kind {
            TokenKind::Ident(word) => word.clone(),
            TokenKind::Punct(Punct::RBrace) | TokenKind::Eof => return Ok(None),
            _ => {
                let stray = self.bump();
                tracing::debug!(line = stray.line, column = stray.column, "skipping stray token");
                return Ok(None);
            }
        };

        match word.as_str() {
            "interface" => {
                self.bump();
                let class = self.parse_class_like(DeclarationKind::Interface, annotations, modifiers, &start)?;
                Ok(Some(Item::Class(class)))
            }
            "class" => {
                self.bump();
                let kind = if modifiers.iter().any(|m| m == "enum") {
                    DeclarationKind::Enum
                } else if modifiers.iter().any(|m| m == "annotation") {
                    DeclarationKind::AnnotationClass
                } else {
                    DeclarationKind::Class
                };
                let class = self.parse_class_like(kind, annotations, modifiers, &start)?;
                Ok(Some(Item::Class(class)))
            }
            "object" => {
                self.bump();
                let class = self.parse_class_like(DeclarationKind::Object, annotations, modifiers, &start)?;
                Ok(Some(Item::Class(class)))
            }
            "fun" => {
                self.bump();
                let function = self.parse_function(annotations, modifiers, &start)?;
                Ok(Some(Item::Function(function)))
            }
            "val" | "var" => {
                self.bump();
                if self.at_punct(Punct::Lt) {
                    self.skip_angle()?;
                }
                let name = self.peek().ident().unwrap_or_default().to_string();
                self.skip_to_boundary();
                Ok(Some(Item::Property {
                    name,
                    annotations,
                    span: self.span_from(&start),
                }))
            }
            "typealias" => {
                self.bump();
                let name = self.expect_ident("type alias name")?;
                self.skip_to_boundary();
                Ok(Some(Item::TypeAlias {
                    name,
                    annotations,
                    span: self.span_from(&start),
                }))
            }
            "init" => {
                self.bump();
                if self.at_punct(Punct::LBrace) {
                    self.skip_balanced()?;
                }
                Ok(None)
            }
            "constructor" => {
                self.bump();
                if self.at_punct(Punct::LParen) {
                    self.skip_balanced()?;
                }
                if self.eat_punct(Punct::Colon) {
                    self.skip_class_header();
                }
                if self.at_punct(Punct::LBrace) {
                    self.skip_balanced()?;
                }
                Ok(None)
            }
            _ => {
                let stray = self.bump();
                tracing::debug!(line = stray.line, column = stray.column, word = %word, "skipping unknown declaration");
                Ok(None)
            }
        }
    }

    fn parse_class_like(
        &mut self,
        kind: DeclarationKind,
        annotations: Vec<AnnotationNode>,
        modifiers: Vec<String>,
        start: &Token,
    ) -> Result<ClassDecl, GeneratorError> {
        let name = if kind == DeclarationKind::Object && self.peek().ident().is_none() {
            // `companion object { ... }`
            "Companion".to_string()
        } else {
            self.expect_ident("declaration name")?
        };

        if self.at_punct(Punct::Lt) {
            self.skip_angle()?;
        }
        self.skip_class_header();

        let mut class = ClassDecl {
            name,
            kind,
            annotations,
            modifiers,
            functions: Vec::new(),
            properties: Vec::new(),
            nested: Vec::new(),
            span: self.span_from(start),
        };

        if self.at_punct(Punct::LBrace) {
            if kind == DeclarationKind::Enum {
                self.parse_enum_body(&mut class)?;
            } else {
                self.bump();
                self.parse_class_body(&mut class)?;
            }
        }
        class.span = self.span_from(start);
        Ok(class)
    }

    /// Parses members up to and including the closing `}`.
    fn parse_class_body(&mut self, class: &mut ClassDecl) -> Result<(), GeneratorError> {
        loop {
            if self.at_eof() {
                return Err(self.error_here(format!("expected '}}' to close '{}'", class.name)));
            }
            if self.eat_punct(Punct::RBrace) {
                return Ok(());
            }
            if self.eat_punct(Punct::Semicolon) {
                continue;
            }
            match self.parse_declaration()? {
                Some(Item::Class(nested)) => class.nested.push(nested),
                Some(Item::Function(function)) => class.functions.push(function),
                Some(Item::Property { name, .. }) => class.properties.push(name),
                Some(Item::TypeAlias { .. }) | None => {}
            }
        }
    }

    /// Skips enum entries, then parses any members after the `;`.
    fn parse_enum_body(&mut self, class: &mut ClassDecl) -> Result<(), GeneratorError> {
        let open = self.bump();
        let mut depth = 0usize;
        loop {
            match self.peek().kind {
                TokenKind::Eof => {
                    return Err(GeneratorError::syntax(self.path, open.line, open.column, "unterminated enum body"))
                }
                TokenKind::Punct(Punct::LParen | Punct::LBracket | Punct::LBrace) => depth += 1,
                TokenKind::Punct(Punct::RParen | Punct::RBracket) => depth = depth.saturating_sub(1),
                TokenKind::Punct(Punct::RBrace) => {
                    if depth == 0 {
                        self.bump();
                        return Ok(());
                    }
                    depth -= 1;
                }
                TokenKind::Punct(Punct::Semicolon) if depth == 0 => {
                    self.bump();
                    return self.parse_class_body(class);
                }
                _ => {}
            }
            self.bump();
        }
    }

    fn parse_function(
        &mut self,
        annotations: Vec<AnnotationNode>,
        modifiers: Vec<String>,
        start: &Token,
    ) -> Result<FunctionDecl, GeneratorError> {
        let type_parameters = if self.at_punct(Punct::Lt) {
            self.parse_type_parameters()?
        } else {
            Vec::new()
        };

        let (receiver, name) = self.parse_function_name()?;
        let parameters = self.parse_value_parameters()?;
        let return_type = if self.eat_punct(Punct::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        if self.at_word("where") {
            // Constraints are not carried over; skip to the body.
            while !self.at_eof()
                && !self.at_punct(Punct::LBrace)
                && !self.at_punct(Punct::Eq)
                && !self.at_punct(Punct::RBrace)
                && !(self.peek().newline_before && self.is_declaration_start())
            {
                self.bump();
            }
        }

        let mut has_body = false;
        let mut expression_body = false;
        if self.at_punct(Punct::LBrace) {
            self.skip_balanced()?;
            has_body = true;
        } else if self.eat_punct(Punct::Eq) {
            self.skip_to_boundary();
            has_body = true;
            expression_body = return_type.is_none();
        }

        Ok(FunctionDecl {
            name,
            annotations,
            modifiers,
            type_parameters,
            receiver,
            parameters,
            return_type,
            has_body,
            expression_body,
            span: self.span_from(start),
        })
    }

    /// `name` or `Receiver.name`.
    fn parse_function_name(&mut self) -> Result<(Option<TypeNode>, String), GeneratorError> {
        let head = self.parse_type()?;
        if self.eat_punct(Punct::Dot) {
            let name = self.expect_ident("function name")?;
            return Ok((Some(head), name));
        }
        match head {
            TypeNode::Named { mut segments, arguments, nullable } if arguments.is_empty() && !nullable => {
                let name = segments.pop().unwrap_or_default();
                let receiver = if segments.is_empty() {
                    None
                } else {
                    Some(TypeNode::Named {
                        segments,
                        arguments: Vec::new(),
                        nullable: false,
                    })
                };
                Ok((receiver, name))
            }
            _ => Err(self.error_here("expected function name")),
        }
    }

    fn parse_type_parameters(&mut self) -> Result<Vec<TypeParameter>, GeneratorError> {
        self.bump();
        let mut parameters = Vec::new();
        loop {
            let start = self.peek().start;
            let mut name: Option<String> = None;
            let mut depth = 0usize;
            let mut after_at = false;
            loop {
                let token = self.peek();
                match &token.kind {
                    TokenKind::Eof => return Err(self.error_here("expected '>' after type parameters")),
                    TokenKind::Punct(Punct::Lt | Punct::LParen) => depth += 1,
                    TokenKind::Punct(Punct::RParen) => depth = depth.saturating_sub(1),
                    TokenKind::Punct(Punct::Gt) if depth == 0 => break,
                    TokenKind::Punct(Punct::Gt) => depth -= 1,
                    TokenKind::Punct(Punct::Comma) if depth == 0 => break,
                    TokenKind::Ident(word) | TokenKind::EscapedIdent(word) => {
                        if name.is_none() && !after_at && !matches!(word.as_str(), "reified" | "in" | "out") {
                            name = Some(word.clone());
                        }
                    }
                    _ => {}
                }
                after_at = token.is_punct(Punct::At);
                self.bump();
            }
            let text = self.text_since(start);
            if let Some(name) = name {
                parameters.push(TypeParameter { name, text });
            }
            if self.eat_punct(Punct::Gt) {
                return Ok(parameters);
            }
            self.bump(); // ','
        }
    }

    fn parse_value_parameters(&mut self) -> Result<Vec<ParameterNode>, GeneratorError> {
        self.expect_punct(Punct::LParen, "'(' after function name")?;
        let mut parameters = Vec::new();
        loop {
            if self.eat_punct(Punct::RParen) {
                return Ok(parameters);
            }
            // Parameter annotations such as Retrofit's @Query are not carried over.
            let (_annotations, modifiers) = self.parse_prefix()?;
            let name = self.expect_ident("parameter name")?;
            self.expect_punct(Punct::Colon, "':' after parameter name")?;
            let type_node = self.parse_type()?;
            let has_default = if self.eat_punct(Punct::Eq) {
                self.skip_value_rest();
                true
            } else {
                false
            };
            parameters.push(ParameterNode {
                name,
                type_node,
                vararg: modifiers.iter().any(|m| m == "vararg"),
                has_default,
            });
            if self.eat_punct(Punct::Comma) {
                continue;
            }
            self.expect_punct(Punct::RParen, "',' or ')' in parameter list")?;
            return Ok(parameters);
        }
    }

    // ------------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------------

    fn parse_type(&mut self) -> Result<TypeNode, GeneratorError> {
        while self.at_punct(Punct::At) {
            self.parse_annotation()?;
        }
        let start = self.peek().start;

        if self.at_word("suspend") && self.peek_at(1).is_punct(Punct::LParen) {
            self.bump();
            return self.parse_parenthesized_type(start);
        }
        if self.at_punct(Punct::LParen) {
            return self.parse_parenthesized_type(start);
        }

        let mut segments = vec![self.expect_ident("type")?];
        let mut arguments = Vec::new();
        loop {
            if self.at_punct(Punct::Lt) {
                arguments = self.parse_type_arguments()?;
            }
            if self.at_punct(Punct::Dot) && self.peek_at(1).ident().is_some() {
                self.bump();
                segments.push(self.expect_ident("type")?);
                arguments = Vec::new();
                continue;
            }
            break;
        }
        let nullable = self.eat_nullable();

        // Function type with receiver: `Builder.(Int) -> Unit`
        if self.at_punct(Punct::Dot) && self.peek_at(1).is_punct(Punct::LParen) {
            self.bump();
            return self.parse_parenthesized_type(start);
        }

        Ok(TypeNode::Named {
            segments,
            arguments,
            nullable,
        })
    }

    /// `(A)`, `(A)?`, `(A, B) -> C` or `((A) -> B)?`.
    fn parse_parenthesized_type(&mut self, start: usize) -> Result<TypeNode, GeneratorError> {
        self.expect_punct(Punct::LParen, "'('")?;
        let mut items = Vec::new();
        while !self.at_punct(Punct::RParen) {
            if self.peek().ident().is_some() && self.peek_at(1).is_punct(Punct::Colon) {
                // Named parameter in a function type
                self.bump();
                self.bump();
            }
            items.push(self.parse_type()?);
            if !self.eat_punct(Punct::Comma) {
                break;
            }
        }
        self.expect_punct(Punct::RParen, "')' in type")?;

        if self.eat_punct(Punct::Arrow) {
            self.parse_type()?;
            return Ok(TypeNode::Function { text: self.text_since(start) });
        }

        let nullable = self.eat_nullable();
        match (items.pop(), items.is_empty()) {
            (Some(TypeNode::Named { segments, arguments, nullable: inner }), true) => Ok(TypeNode::Named {
                segments,
                arguments,
                nullable: inner || nullable,
            }),
            (Some(TypeNode::Function { .. }), true) => Ok(TypeNode::Function { text: self.text_since(start) }),
            _ => Err(self.error_here("expected '->' after function type parameters")),
        }
    }

    fn parse_type_arguments(&mut self) -> Result<Vec<TypeNode>, GeneratorError> {
        self.bump();
        let mut arguments = Vec::new();
        loop {
            if self.eat_punct(Punct::Gt) {
                return Ok(arguments);
            }
            let argument = if self.eat_punct(Punct::Star) {
                TypeNode::Star
            } else if (self.at_word("in") || self.at_word("out"))
                && (self.peek_at(1).ident().is_some()
                    || self.peek_at(1).is_punct(Punct::LParen)
                    || self.peek_at(1).is_punct(Punct::At))
            {
                let variance = if self.bump().is_word("in") { Variance::In } else { Variance::Out };
                TypeNode::Projection {
                    variance,
                    inner: Box::new(self.parse_type()?),
                }
            } else {
                self.parse_type()?
            };
            arguments.push(argument);
            if self.eat_punct(Punct::Comma) {
                continue;
            }
            self.expect_punct(Punct::Gt, "'>' in type arguments")?;
            return Ok(arguments);
        }
    }

    fn eat_nullable(&mut self) -> bool {
        let mut nullable = false;
        while self.eat_punct(Punct::Question) {
            nullable = true;
        }
        nullable
    }

    // ------------------------------------------------------------------------
    // Annotations
    // ------------------------------------------------------------------------

    /// Parses `@Name(...)`, `@target:Name` or `@[A B]`.
    fn parse_annotation(&mut self) -> Result<Vec<AnnotationNode>, GeneratorError> {
        let start = self.expect_punct(Punct::At, "'@'")?;

        if let Some(target) = self.peek().ident() {
            if USE_SITE_TARGETS.contains(&target) && self.peek_at(1).is_punct(Punct::Colon) {
                self.bump();
                self.bump();
            }
        }

        if self.eat_punct(Punct::LBracket) {
            let mut annotations = Vec::new();
            while !self.eat_punct(Punct::RBracket) {
                if self.at_eof() {
                    return Err(self.error_here("expected ']' after annotation list"));
                }
                annotations.push(self.parse_annotation_body(&start)?);
            }
            return Ok(annotations);
        }

        Ok(vec![self.parse_annotation_body(&start)?])
    }

    fn parse_annotation_body(&mut self, start: &Token) -> Result<AnnotationNode, GeneratorError> {
        let name = self.parse_dotted_name("annotation name")?;
        if self.at_punct(Punct::Lt) {
            self.skip_angle()?;
        }
        // Arguments must follow on the same line; otherwise `(` opens something else.
        let arguments = if self.at_punct(Punct::LParen) && !self.peek().newline_before {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(AnnotationNode {
            name,
            arguments,
            span: self.span_from(start),
        })
    }

    fn parse_arguments(&mut self) -> Result<Vec<ArgumentNode>, GeneratorError> {
        self.expect_punct(Punct::LParen, "'('")?;
        let mut arguments = Vec::new();
        loop {
            if self.eat_punct(Punct::RParen) {
                return Ok(arguments);
            }
            let name = if self.peek().ident().is_some() && self.peek_at(1).is_punct(Punct::Eq) {
                let name = self.expect_ident("argument name")?;
                self.bump();
                Some(name)
            } else {
                None
            };
            let value = self.parse_value()?;
            arguments.push(ArgumentNode { name, value });
            if self.eat_punct(Punct::Comma) {
                continue;
            }
            self.expect_punct(Punct::RParen, "',' or ')' in argument list")?;
            return Ok(arguments);
        }
    }

    fn at_value_end(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Eof | TokenKind::Punct(Punct::Comma | Punct::RParen | Punct::RBracket)
        )
    }

    fn parse_value(&mut self) -> Result<ValueNode, GeneratorError> {
        let start = self.peek().start;
        let primary = self.parse_primary_value()?;
        match primary {
            Some(value) if self.at_value_end() => Ok(value),
            _ => {
                self.skip_value_rest();
                Ok(ValueNode::Other(self.text_since(start)))
            }
        }
    }

    fn parse_primary_value(&mut self) -> Result<Option<ValueNode>, GeneratorError> {
        match self.peek().kind.clone() {
            TokenKind::String(mut value) => {
                self.bump();
                // "a" + "b"
                while self.at_punct(Punct::Plus) {
                    match &self.peek_at(1).kind {
                        TokenKind::String(next) => {
                            value.push_str(next);
                            self.bump();
                            self.bump();
                        }
                        _ => break,
                    }
                }
                Ok(Some(ValueNode::String(value)))
            }
            TokenKind::Punct(Punct::LBracket) => {
                self.bump();
                let mut items = Vec::new();
                while !self.eat_punct(Punct::RBracket) {
                    if self.at_eof() {
                        return Err(self.error_here("expected ']'"));
                    }
                    items.push(self.parse_value()?);
                    self.eat_punct(Punct::Comma);
                }
                Ok(Some(ValueNode::Array(items)))
            }
            TokenKind::Ident(_) | TokenKind::EscapedIdent(_) => {
                let name = self.parse_dotted_name("value")?;
                if self.at_punct(Punct::LParen) {
                    let arguments = self.parse_arguments()?;
                    if name.ends_with("arrayOf") || name.ends_with("ArrayOf") {
                        return Ok(Some(ValueNode::Array(arguments.into_iter().map(|a| a.value).collect())));
                    }
                    return Ok(Some(ValueNode::Call { callee: name, arguments }));
                }
                Ok(Some(ValueNode::Reference(name)))
            }
            _ => Ok(None),
        }
    }
}

fn leaf_decl(name: String, kind: DeclarationKind, annotations: Vec<AnnotationNode>, span: Span) -> ClassDecl {
    ClassDecl {
        name,
        kind,
        annotations,
        modifiers: Vec::new(),
        functions: Vec::new(),
        properties: Vec::new(),
        nested: Vec::new(),
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParsedFile {
        KotlinParser::new().parse(source, Path::new("Api.kt")).unwrap()
    }

    fn named(segments: &[&str], arguments: Vec<TypeNode>) -> TypeNode {
        TypeNode::Named {
            segments: segments.iter().map(|s| s.to_string()).collect(),
            arguments,
            nullable: false,
        }
    }

    #[test]
    fn test_package_and_imports() {
        let file = parse(
            r#"
            @file:JvmName("Apis")
            package com.app.api

            import io.reactivex.Observable
            import com.app.model.*
            import com.baselib.model.response.BaseResponse as Resp;
            "#,
        );
        assert_eq!(file.package, "com.app.api");
        assert_eq!(file.imports.len(), 3);
        assert_eq!(file.imports[0].path, "io.reactivex.Observable");
        assert!(file.imports[1].wildcard);
        assert_eq!(file.imports[1].path, "com.app.model");
        assert_eq!(file.imports[2].alias.as_deref(), Some("Resp"));
    }

    #[test]
    fn test_annotated_interface_with_methods() {
        let file = parse(
            r#"
            package com.app.api

            @Autogen(host = "https://api.example.com")
            interface UserApi {
                @FormUrlEncoded
                @POST("user/login")
                fun login(@Field("name") name: String, @Field("pass") pass: String): Observable<BaseResponse<Token>>

                @CloseScheduler
                @GET("user/{id}")
                fun profile(@Path("id") id: Long = 0L): Observable<Profile>

                fun logout()
            }
            "#,
        );
        assert_eq!(file.declarations.len(), 1);
        let api = &file.declarations[0];
        assert_eq!(api.name, "UserApi");
        assert_eq!(api.kind, DeclarationKind::Interface);
        assert_eq!(api.annotations[0].name, "Autogen");
        assert_eq!(api.annotations[0].arguments[0].name.as_deref(), Some("host"));
        assert!(matches!(&api.annotations[0].arguments[0].value, ValueNode::String(s) if s == "https://api.example.com"));

        let names: Vec<&str> = api.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["login", "profile", "logout"]);

        let login = &api.functions[0];
        assert_eq!(login.annotations.len(), 2);
        assert_eq!(login.parameters.len(), 2);
        assert_eq!(login.parameters[1].name, "pass");
        assert_eq!(
            login.return_type,
            Some(named(
                &["Observable"],
                vec![named(&["BaseResponse"], vec![named(&["Token"], vec![])])]
            ))
        );

        let profile = &api.functions[1];
        assert!(profile.parameters[0].has_default);
        assert!(api.functions[2].return_type.is_none());
    }

    #[test]
    fn test_deprecated_api_arguments() {
        let file = parse(
            r#"
            interface Api {
                @DeprecatedApi(
                    message = "use " + "v2",
                    replaceWith = ReplaceWith("loginV2(name)"),
                    level = DeprecationLevel.ERROR,
                )
                fun login(name: String): Observable<Token>
            }
            "#,
        );
        let annotation = &file.declarations[0].functions[0].annotations[0];
        assert_eq!(annotation.name, "DeprecatedApi");
        assert_eq!(annotation.arguments.len(), 3);
        assert!(matches!(&annotation.arguments[0].value, ValueNode::String(s) if s == "use v2"));
        match &annotation.arguments[1].value {
            ValueNode::Call { callee, arguments } => {
                assert_eq!(callee, "ReplaceWith");
                assert!(matches!(&arguments[0].value, ValueNode::String(s) if s == "loginV2(name)"));
            }
            other => panic!("unexpected value: {other:?}"),
        }
        assert!(matches!(&annotation.arguments[2].value, ValueNode::Reference(r) if r == "DeprecationLevel.ERROR"));
    }

    #[test]
    fn test_types() {
        let file = parse(
            r#"
            interface Api {
                fun a(cb: (String, Int) -> Unit, opt: (() -> Unit)?, s: suspend () -> Unit)
                fun b(map: Map<String, List<out Number>>, any: List<*>, n: io.reactivex.Observable<Token?>?)
                fun <T : Any, reified R> c(vararg ids: Long): Observable<T>
            }
            "#,
        );
        let api = &file.declarations[0];
        let a = &api.functions[0];
        assert_eq!(a.parameters[0].type_node, TypeNode::Function { text: "(String, Int) -> Unit".to_string() });
        assert_eq!(a.parameters[1].type_node, TypeNode::Function { text: "(() -> Unit)?".to_string() });
        assert_eq!(a.parameters[2].type_node, TypeNode::Function { text: "suspend () -> Unit".to_string() });

        let b = &api.functions[1];
        assert_eq!(
            b.parameters[0].type_node,
            named(
                &["Map"],
                vec![
                    named(&["String"], vec![]),
                    named(
                        &["List"],
                        vec![TypeNode::Projection {
                            variance: Variance::Out,
                            inner: Box::new(named(&["Number"], vec![])),
                        }]
                    ),
                ]
            )
        );
        assert_eq!(b.parameters[1].type_node, named(&["List"], vec![TypeNode::Star]));
        assert_eq!(
            b.parameters[2].type_node,
            TypeNode::Named {
                segments: vec!["io".into(), "reactivex".into(), "Observable".into()],
                arguments: vec![TypeNode::Named {
                    segments: vec!["Token".into()],
                    arguments: vec![],
                    nullable: true,
                }],
                nullable: true,
            }
        );

        let c = &api.functions[2];
        let params: Vec<(&str, &str)> =
            c.type_parameters.iter().map(|p| (p.name.as_str(), p.text.as_str())).collect();
        assert_eq!(params, vec![("T", "T : Any"), ("R", "reified R")]);
        assert!(c.parameters[0].vararg);
    }

    #[test]
    fn test_bodies_and_properties_are_skipped() {
        let file = parse(
            r#"
            interface Api {
                val baseUrl: String
                    get() = "https://example.com/{x}"

                fun withDefault(): Int {
                    val inner = mapOf("a" to listOf(1, 2))
                    return inner.size
                }

                fun expression() =
                    listOf(1, 2)
                        .map { it * 2 }
                        .size

                private fun hidden(): String = "x"

                companion object {
                    const val VERSION = 2
                }

                fun last(): Observable<Token>
            }
            "#,
        );
        let api = &file.declarations[0];
        let names: Vec<&str> = api.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["withDefault", "expression", "hidden", "last"]);
        assert!(api.functions[1].expression_body);
        assert!(!api.functions[2].expression_body);
        assert!(api.functions[2].has_modifier("private"));
        assert_eq!(api.properties, vec!["baseUrl"]);
        assert_eq!(api.nested.len(), 1);
        assert_eq!(api.nested[0].name, "Companion");
        assert_eq!(api.nested[0].kind, DeclarationKind::Object);
    }

    #[test]
    fn test_other_declarations() {
        let file = parse(
            r#"
            package com.app

            @Autogen
            data class Token(val value: String) : Parcelable, Comparable<Token> {
                override fun compareTo(other: Token): Int = value.compareTo(other.value)
            }

            enum class Level(val code: Int) {
                LOW(1) { override fun toString() = "low" },
                HIGH(2);

                fun isHigh() = this == HIGH
            }

            sealed interface Outer {
                @Autogen
                fun interface Inner {
                    fun call(): Observable<Token>
                }
            }

            typealias Tokens = List<Token>

            @Autogen
            fun topLevel() = Unit

            object Registry
            "#,
        );
        let kinds: Vec<(&str, DeclarationKind)> =
            file.declarations.iter().map(|d| (d.name.as_str(), d.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("Token", DeclarationKind::Class),
                ("Level", DeclarationKind::Enum),
                ("Outer", DeclarationKind::Interface),
                ("Tokens", DeclarationKind::TypeAlias),
                ("topLevel", DeclarationKind::Function),
                ("Registry", DeclarationKind::Object),
            ]
        );
        assert_eq!(file.declarations[1].functions[0].name, "isHigh");
        let inner = &file.declarations[2].nested[0];
        assert_eq!(inner.name, "Inner");
        assert_eq!(inner.kind, DeclarationKind::Interface);
        assert_eq!(inner.functions[0].name, "call");
    }

    #[test]
    fn test_extension_function_receiver() {
        let file = parse("interface Api { fun String.shout(): String; fun List<Int>.total(): Int }");
        let api = &file.declarations[0];
        assert_eq!(api.functions[0].name, "shout");
        assert!(api.functions[0].receiver.is_some());
        assert_eq!(api.functions[1].name, "total");
        assert!(api.functions[1].receiver.is_some());
    }

    #[test]
    fn test_syntax_error_location() {
        let err = KotlinParser::new()
            .parse("interface Api {\n    fun broken(name String)\n}", Path::new("Api.kt"))
            .unwrap_err();
        match err {
            GeneratorError::SyntaxError { line, column, message, .. } => {
                assert_eq!((line, column), (2, 21));
                assert!(message.contains("':' after parameter name"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
