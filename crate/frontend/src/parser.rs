use kasm_error::{ErrorCode, ParseError};
use kasm_ir::{
    DirectiveStmt, IdentifierOperand, ImmediateOperand, InstructionStmt, LabelStmt, MemoryOperand,
    NamespaceStmt, Operand, Program, RegisterOperand, SectionStmt, Statement, StringOperand,
    Token, TokenKind, UseStmt,
};

/// Result of a parse: the statements that were recognized plus every error
/// encountered along the way. The parser never aborts early; a statement
/// that triggered an error is simply not emitted.
#[derive(Debug)]
pub struct ParseOutput {
    pub program: Program,
    pub errors: Vec<ParseError>,
}

/// Parser that converts tokens into an abstract syntax tree
pub struct Parser<'a> {
    /// The tokens being parsed
    tokens: &'a [Token],
    /// Current position in the token list
    current: usize,
    /// Errors collected during parsing
    errors: Vec<ParseError>,
}

/// Parses a token stream into statements and accumulated errors
pub fn parse(tokens: &[Token]) -> ParseOutput {
    let mut parser = Parser::new(tokens);
    parser.parse()
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Parser {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    /// Parses the tokens into a list of statements, recovering to the next
    /// statement boundary whenever a statement fails to parse.
    fn parse(&mut self) -> ParseOutput {
        let mut program = Vec::new();

        while !self.is_at_end() {
            match self.statement() {
                Ok(stmt) => program.push(stmt),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }

        ParseOutput {
            program,
            errors: std::mem::take(&mut self.errors),
        }
    }

    /// Creates an error at the given token's position
    fn error_at(&self, code: ErrorCode, message: impl Into<String>, token: &Token) -> ParseError {
        ParseError::new(code, message, token.line, token.column)
    }

    /// Skip to a safe synchronization point: the next statement-start token
    /// or the end of input. Always consumes at least one token so the
    /// parser makes progress.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() && !self.peek().is_statement_start() {
            self.advance();
        }
    }

    /// Parses a single statement by dispatching on the current token kind
    fn statement(&mut self) -> Result<Statement, ParseError> {
        let token = self.peek().clone();

        match token.kind {
            TokenKind::Instruction => {
                if token.literal.eq_ignore_ascii_case("use") {
                    self.use_statement()
                } else {
                    self.instruction()
                }
            }
            TokenKind::Identifier if token.is_label() => {
                self.advance();
                let name = token.literal.trim_end_matches(':').to_string();
                Ok(Statement::Label(LabelStmt {
                    name,
                    line: token.line,
                    column: token.column,
                }))
            }
            TokenKind::Identifier => Err(self.error_at(
                ErrorCode::UnexpectedIdentifier,
                format!(
                    "unexpected identifier '{}' outside instruction context",
                    token.literal
                ),
                &token,
            )),
            TokenKind::Keyword => {
                if token.literal.eq_ignore_ascii_case("namespace") {
                    self.namespace_statement()
                } else {
                    Err(self.error_at(
                        ErrorCode::UnknownKeyword,
                        format!("unknown keyword '{}'", token.literal),
                        &token,
                    ))
                }
            }
            TokenKind::Directive => self.directive(),
            TokenKind::Section => self.section_statement(),
            TokenKind::Register | TokenKind::Immediate | TokenKind::String => Err(self.error_at(
                ErrorCode::UnexpectedToken,
                format!(
                    "unexpected {} '{}' outside instruction context",
                    token.kind, token.literal
                ),
                &token,
            )),
            // Whitespace and comments are never emitted by the lexer
            TokenKind::Whitespace | TokenKind::Comment => Err(self.error_at(
                ErrorCode::UnexpectedToken,
                format!("unexpected {} token", token.kind),
                &token,
            )),
        }
    }

    /// Parses an instruction and its operand list
    fn instruction(&mut self) -> Result<Statement, ParseError> {
        let mnemonic_token = self.advance().clone();
        let operands = self.operand_list()?;

        Ok(Statement::Instruction(InstructionStmt {
            mnemonic: mnemonic_token.literal,
            operands,
            line: mnemonic_token.line,
            column: mnemonic_token.column,
        }))
    }

    /// Parses operands until a statement-start token or a stop token
    /// (`]`, `,` without a preceding operand, end of input).
    fn operand_list(&mut self) -> Result<Vec<Operand>, ParseError> {
        let mut operands: Vec<Operand> = Vec::new();
        let mut expect_separator = false;

        while !self.is_at_end() {
            let token = self.peek().clone();

            if token.is_statement_start() {
                break;
            }

            match token.kind {
                TokenKind::Register => {
                    self.advance();
                    operands.push(Operand::Register(RegisterOperand {
                        name: token.literal,
                        line: token.line,
                        column: token.column,
                    }));
                    expect_separator = true;
                }
                TokenKind::Immediate => {
                    self.advance();
                    operands.push(Operand::Immediate(ImmediateOperand {
                        value: token.literal,
                        line: token.line,
                        column: token.column,
                    }));
                    expect_separator = true;
                }
                TokenKind::String => {
                    self.advance();
                    operands.push(Operand::String(StringOperand {
                        value: token.literal,
                        line: token.line,
                        column: token.column,
                    }));
                    expect_separator = true;
                }
                TokenKind::Identifier => match token.literal.as_str() {
                    "," => {
                        if !expect_separator {
                            // A ',' with no operand before it ends the list
                            break;
                        }
                        self.advance();
                        expect_separator = false;
                    }
                    "[" => {
                        let operand = self.memory_operand()?;
                        operands.push(operand);
                        expect_separator = true;
                    }
                    "]" => break,
                    _ => {
                        self.advance();
                        operands.push(Operand::Identifier(IdentifierOperand {
                            name: token.literal,
                            line: token.line,
                            column: token.column,
                        }));
                        expect_separator = true;
                    }
                },
                // Anything else cannot continue an operand list
                _ => break,
            }
        }

        Ok(operands)
    }

    /// Parses a memory operand: collects raw component tokens until the
    /// matching `]`. When the statement ends first, the error is recorded
    /// and the partial operand is still returned.
    fn memory_operand(&mut self) -> Result<Operand, ParseError> {
        let open = self.advance().clone(); // consume '['
        let mut components = Vec::new();

        while !self.is_at_end() {
            let token = self.peek().clone();

            if token.kind == TokenKind::Identifier && token.literal == "]" {
                self.advance();
                return Ok(Operand::Memory(MemoryOperand {
                    components,
                    line: open.line,
                    column: open.column,
                }));
            }
            if token.is_statement_start() {
                break;
            }

            self.advance();
            components.push(token);
        }

        self.errors.push(self.error_at(
            ErrorCode::UnterminatedMemoryOperand,
            "unterminated memory operand, expected ']'",
            &open,
        ));
        Ok(Operand::Memory(MemoryOperand {
            components,
            line: open.line,
            column: open.column,
        }))
    }

    /// Parses `use <module>`
    fn use_statement(&mut self) -> Result<Statement, ParseError> {
        let keyword = self.advance().clone();

        let token = self.peek_checked(&keyword)?.clone();
        if token.kind != TokenKind::Identifier || token.is_label() {
            return Err(self.error_at(
                ErrorCode::ExpectedIdentifier,
                format!("expected module name after 'use', got '{}'", token.literal),
                &token,
            ));
        }
        self.advance();

        Ok(Statement::Use(UseStmt {
            module_name: token.literal,
            line: keyword.line,
            column: keyword.column,
        }))
    }

    /// Parses `namespace <name>`
    fn namespace_statement(&mut self) -> Result<Statement, ParseError> {
        let keyword = self.advance().clone();

        let token = self.peek_checked(&keyword)?.clone();
        if token.kind != TokenKind::Identifier || token.is_label() {
            return Err(self.error_at(
                ErrorCode::ExpectedIdentifier,
                format!(
                    "expected namespace name after 'namespace', got '{}'",
                    token.literal
                ),
                &token,
            ));
        }
        self.advance();

        Ok(Statement::Namespace(NamespaceStmt {
            name: token.literal,
            line: keyword.line,
            column: keyword.column,
        }))
    }

    /// Parses a directive and collects its argument tokens. Collection
    /// stops at the next statement-start token or at another directive.
    fn directive(&mut self) -> Result<Statement, ParseError> {
        let directive = self.advance().clone();
        let mut args = Vec::new();

        while !self.is_at_end() {
            let token = self.peek();
            if token.is_statement_start() || token.kind == TokenKind::Directive {
                break;
            }
            args.push(self.advance().clone());
        }

        Ok(Statement::Directive(DirectiveStmt {
            literal: directive.literal,
            args,
            line: directive.line,
            column: directive.column,
        }))
    }

    /// Parses `section .name[:]`
    fn section_statement(&mut self) -> Result<Statement, ParseError> {
        let keyword = self.advance().clone();

        let token = self.peek_checked(&keyword)?.clone();
        if token.kind != TokenKind::Identifier {
            return Err(self.error_at(
                ErrorCode::ExpectedIdentifier,
                format!("expected section name, got '{}'", token.literal),
                &token,
            ));
        }
        self.advance();

        let name = token.literal.trim_end_matches(':').to_string();
        let section_type = name.to_lowercase();

        Ok(Statement::Section(SectionStmt {
            name,
            section_type,
            line: keyword.line,
            column: keyword.column,
        }))
    }

    /// Peeks at the current token, erroring at `anchor` on end of input
    fn peek_checked(&self, anchor: &Token) -> Result<&Token, ParseError> {
        if self.is_at_end() {
            return Err(self.error_at(
                ErrorCode::ExpectedIdentifier,
                format!("unexpected end of input after '{}'", anchor.literal),
                anchor,
            ));
        }
        Ok(self.peek())
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }
}
