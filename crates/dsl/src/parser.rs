//! Schema-aware parser
//!
//! Top-level declarations are whitespace-insensitive. Instance bodies are
//! line-oriented: each line is a closing `}` or a `field = value` /
//! `field = {` assignment, and every assignment is validated against the
//! provider schema before it is stored.

use crate::error::{ParseError, Result};
use crate::fields::{FieldValue, assign, ensure_nested, get_field};
use crate::instance::{Instance, ParsedState};
use crate::reference::{ProviderReference, REFERENCE_SEPARATOR};
use crate::scanner::Scanner;
use crate::token::Token;
use crate::value::{Literal, Variable};
use schema::{InstanceKind, PATH_SEPARATOR, Registry, join_path};

/// Prefix marking a variable reference in a field value
pub const VARIABLE_PREFIX: &str = "var.";

/// A token, its text and the line it started on
#[derive(Debug, Clone)]
struct Lexeme {
    token: Token,
    literal: String,
    line: usize,
}

/// One line of an instance body, whitespace removed
#[derive(Debug)]
struct Line {
    number: usize,
    lexemes: Vec<Lexeme>,
    at_eof: bool,
}

impl Line {
    fn text(&self) -> String {
        self.lexemes
            .iter()
            .map(|l| l.literal.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn illegal(&self) -> Option<&Lexeme> {
        self.lexemes.iter().find(|l| l.token == Token::Illegal)
    }
}

pub struct Parser<'a> {
    scanner: Scanner<'a>,
    buf: Option<Lexeme>,
    registry: &'a Registry,
    state: ParsedState,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, registry: &'a Registry) -> Self {
        Self {
            scanner: Scanner::new(source),
            buf: None,
            registry,
            state: ParsedState::default(),
        }
    }

    /// Parse the whole source, stopping at the first error
    pub fn parse(mut self) -> Result<ParsedState> {
        loop {
            let lexeme = self.scan_ignore_whitespace();
            match lexeme.token {
                Token::Eof => break,
                Token::Variable => {
                    let (variable, line) = self.parse_variable()?;
                    if self.state.variables.contains_key(&variable.name) {
                        return Err(ParseError::Duplicate {
                            line,
                            kind: "variable",
                            name: variable.name,
                        });
                    }
                    log::debug!(
                        "variable {} = {} ({})",
                        variable.name,
                        variable.value,
                        variable.base_type()
                    );
                    self.state
                        .variables
                        .insert(variable.name.clone(), variable);
                }
                Token::Instance => self.parse_instance()?,
                Token::Ident if lexeme.literal.contains(REFERENCE_SEPARATOR) => {
                    self.unscan(lexeme);
                    self.parse_instance()?;
                }
                Token::Data | Token::Capture => {
                    return Err(ParseError::UnsupportedBlock {
                        line: lexeme.line,
                        kind: lexeme.literal,
                    });
                }
                Token::Illegal => {
                    return Err(ParseError::Lexical {
                        line: lexeme.line,
                        text: lexeme.literal,
                    });
                }
                _ => {
                    return Err(ParseError::UnexpectedTopLevel {
                        line: lexeme.line,
                        found: lexeme.literal,
                    });
                }
            }
        }

        log::debug!(
            "parsed {} variable(s) and {} instance(s)",
            self.state.variables.len(),
            self.state.instances.len()
        );
        Ok(self.state)
    }

    fn scan(&mut self, return_on_line_break: bool) -> Lexeme {
        if let Some(lexeme) = self.buf.take() {
            return lexeme;
        }
        let line = self.scanner.line();
        let (token, literal) = self.scanner.scan(return_on_line_break);
        Lexeme {
            token,
            literal,
            line,
        }
    }

    fn unscan(&mut self, lexeme: Lexeme) {
        self.buf = Some(lexeme);
    }

    fn scan_ignore_whitespace(&mut self) -> Lexeme {
        loop {
            let lexeme = self.scan(false);
            if lexeme.token != Token::Ws {
                return lexeme;
            }
        }
    }

    /// Collect the non-whitespace tokens up to and including the next line break
    fn scan_line(&mut self) -> Line {
        let mut line = Line {
            number: self.scanner.line(),
            lexemes: Vec::new(),
            at_eof: false,
        };
        loop {
            let lexeme = self.scan(true);
            match lexeme.token {
                Token::Eof => {
                    line.at_eof = true;
                    break;
                }
                Token::Ws if lexeme.literal.contains('\n') => break,
                Token::Ws => {}
                _ => {
                    if line.lexemes.is_empty() {
                        line.number = lexeme.line;
                    }
                    line.lexemes.push(lexeme);
                }
            }
        }
        line
    }

    /// Next non-whitespace token, which must be `token`
    fn expect(&mut self, token: Token, expected: &str) -> Result<Lexeme> {
        let lexeme = self.scan_ignore_whitespace();
        if lexeme.token == token {
            return Ok(lexeme);
        }
        Err(unexpected(lexeme, expected))
    }

    /// Next non-whitespace token as a bare word, keywords included
    fn expect_word(&mut self, expected: &str) -> Result<Lexeme> {
        let lexeme = self.scan_ignore_whitespace();
        if lexeme.token.is_word() {
            return Ok(lexeme);
        }
        Err(unexpected(lexeme, expected))
    }

    /// `variable <name> { value = <literal> }`, keyword already consumed
    fn parse_variable(&mut self) -> Result<(Variable, usize)> {
        let name = self.expect(Token::Ident, "variable name")?;
        self.expect(Token::OpenBrace, "'{' after variable name")?;

        let key = self.expect(Token::Ident, "'value'")?;
        if key.literal != "value" {
            return Err(unexpected(key, "'value'"));
        }
        self.expect(Token::Equals, "'=' after 'value'")?;
        let value = self.expect_word("literal value")?;
        self.expect(Token::ClosedBrace, "'}' closing variable block")?;

        let variable = Variable::new(&name.literal, Literal::infer(&value.literal));
        Ok((variable, name.line))
    }

    /// `<provider>::<kind> <name> {` followed by the body
    fn parse_instance(&mut self) -> Result<()> {
        let head = self.expect(Token::Ident, "<provider>::<kind>")?;
        let reference: ProviderReference =
            head.literal
                .parse()
                .map_err(|_| ParseError::InvalidProviderReference {
                    line: head.line,
                    text: head.literal.clone(),
                })?;

        let registry = self.registry;
        let kind = registry
            .lookup(&reference.provider, &reference.kind)
            .map_err(|source| ParseError::Schema {
                line: head.line,
                instance: reference.to_string(),
                source,
            })?;

        let name = self.expect(Token::Ident, "instance name")?;
        self.expect(Token::OpenBrace, "'{' after instance name")?;

        if self.state.instances.contains_key(&name.literal) {
            return Err(ParseError::Duplicate {
                line: name.line,
                kind: "instance",
                name: name.literal,
            });
        }

        let mut instance = Instance::new(&reference.provider, &reference.kind, &name.literal);
        self.parse_instance_body(&mut instance, kind)?;

        log::debug!(
            "instance {} {} with {} top-level field(s)",
            instance.reference(),
            instance.name,
            instance.fields.len()
        );
        self.state.instances.insert(instance.name.clone(), instance);
        Ok(())
    }

    fn parse_instance_body(&mut self, instance: &mut Instance, kind: &InstanceKind) -> Result<()> {
        let mut nesting: Vec<String> = Vec::new();

        loop {
            let line = self.scan_line();

            if let Some(illegal) = line.illegal() {
                return Err(ParseError::Lexical {
                    line: illegal.line,
                    text: illegal.literal.clone(),
                });
            }

            match line.lexemes.as_slice() {
                [] => {}
                [close] if close.token == Token::ClosedBrace => {
                    if nesting.pop().is_none() {
                        check_required(instance, kind, line.number)?;
                        return Ok(());
                    }
                }
                [field, equals, value] => {
                    if !field.token.is_word() {
                        return Err(ParseError::InvalidAssignment {
                            line: line.number,
                            text: line.text(),
                        });
                    }
                    if equals.token != Token::Equals {
                        return Err(ParseError::MissingEquals {
                            line: line.number,
                            text: line.text(),
                        });
                    }

                    let mut path = nesting.clone();
                    path.push(field.literal.clone());

                    match value.token {
                        Token::OpenBrace => {
                            kind.schema
                                .validate_block(path.as_slice())
                                .map_err(|source| schema_error(instance, line.number, source))?;
                            ensure_nested(&mut instance.fields, path.as_slice()).map_err(|e| {
                                ParseError::Nesting {
                                    line: line.number,
                                    path: e.path,
                                }
                            })?;
                            nesting.push(field.literal.clone());
                        }
                        token if token.is_word() => {
                            self.assign_field(instance, kind, &path, &value.literal, line.number)?;
                        }
                        _ => {
                            return Err(ParseError::InvalidAssignment {
                                line: line.number,
                                text: line.text(),
                            });
                        }
                    }
                }
                _ => {
                    return Err(ParseError::InvalidAssignment {
                        line: line.number,
                        text: line.text(),
                    });
                }
            }

            if line.at_eof {
                return Err(ParseError::UnterminatedBlock {
                    line: line.number,
                    instance: instance.name.clone(),
                });
            }
        }
    }

    /// Validate the path, resolve the value and store it
    fn assign_field(
        &self,
        instance: &mut Instance,
        kind: &InstanceKind,
        path: &[String],
        raw: &str,
        line: usize,
    ) -> Result<()> {
        let leaf = kind
            .schema
            .validate_fields(path)
            .map_err(|source| schema_error(instance, line, source))?;

        let value = self.resolve_value(raw, line)?;
        leaf.check_value(&join_path(path), &value)
            .map_err(|source| schema_error(instance, line, source))?;

        assign(&mut instance.fields, path, FieldValue::Scalar(value)).map_err(|e| {
            ParseError::Nesting {
                line,
                path: e.path,
            }
        })
    }

    /// Substitute `var.NAME` references with the variable's rendered value
    fn resolve_value(&self, raw: &str, line: usize) -> Result<String> {
        let Some(name) = raw.strip_prefix(VARIABLE_PREFIX) else {
            return Ok(raw.to_string());
        };
        self.state
            .variables
            .get(name)
            .map(|variable| variable.value.to_external())
            .ok_or_else(|| ParseError::UnknownVariable {
                line,
                name: name.to_string(),
            })
    }
}

fn unexpected(lexeme: Lexeme, expected: &str) -> ParseError {
    if lexeme.token == Token::Illegal {
        return ParseError::Lexical {
            line: lexeme.line,
            text: lexeme.literal,
        };
    }
    let found = if lexeme.token == Token::Eof {
        lexeme.token.to_string()
    } else {
        lexeme.literal
    };
    ParseError::Syntax {
        line: lexeme.line,
        expected: expected.to_string(),
        found,
    }
}

fn schema_error(instance: &Instance, line: usize, source: schema::Error) -> ParseError {
    ParseError::Schema {
        line,
        instance: instance.reference(),
        source,
    }
}

/// Every always-required field must have been assigned by the closing `}`
fn check_required(instance: &Instance, kind: &InstanceKind, line: usize) -> Result<()> {
    for path in kind.schema.required_paths() {
        let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        if get_field(&instance.fields, &segments).is_none() {
            return Err(schema_error(
                instance,
                line,
                schema::Error::MissingRequired { path },
            ));
        }
    }
    Ok(())
}
