use kasm_arch::ArchitectureProfile;
use kasm_error::Severity;
use kasm_ir::{Token, TokenKind};
use kasm_shared::DiagnosticContext;

/// Lexer state for tracking position during tokenization
struct LexerState<'a> {
    /// Iterator over source characters
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    /// The vocabulary words are classified against
    profile: &'a ArchitectureProfile,
    /// Optional sink for lexer warnings
    diagnostics: Option<&'a DiagnosticContext>,
    /// Current line number (1-based)
    current_line: usize,
    /// Current column (0-based, reset on newline)
    current_column: usize,
    /// Tokens generated so far
    tokens: Vec<Token>,
}

impl<'a> LexerState<'a> {
    fn new(
        input: &'a str,
        profile: &'a ArchitectureProfile,
        diagnostics: Option<&'a DiagnosticContext>,
    ) -> Self {
        LexerState {
            chars: input.chars().peekable(),
            profile,
            diagnostics,
            current_line: 1,
            current_column: 0,
            tokens: Vec::new(),
        }
    }

    /// Advances to the next character, updating line and column counters
    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next();
        match c {
            Some('\n') => {
                self.current_line += 1;
                self.current_column = 0;
            }
            Some(_) => self.current_column += 1,
            None => {}
        }
        c
    }

    /// Peeks at the next character without consuming it
    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    /// Adds a token starting at the given position to the token list
    fn add_token(&mut self, kind: TokenKind, literal: String, line: usize, column: usize) {
        self.tokens.push(Token::new(kind, literal, line, column));
    }

    /// Kind of the most recently emitted token, if any
    fn previous_kind(&self) -> Option<TokenKind> {
        self.tokens.last().map(|t| t.kind)
    }
}

/// True for the characters that may appear inside a word: letters, digits,
/// underscore, and dot (section names such as `.text`).
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c.is_ascii_digit() || c == '_' || c == '.'
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '.'
}

/// Converts preprocessed source text into a flat token list.
///
/// Whitespace and comments are consumed but never emitted. Words are
/// classified against the architecture profile; any other single character
/// becomes a one-character identifier so separators like `,`, `[`, `]`,
/// `+`, and `-` flow through to the parser.
///
/// ### Arguments
/// * `input` - The preprocessed source to tokenize
/// * `profile` - The architecture vocabulary for word classification
/// * `diagnostics` - Optional sink for lexer warnings
///
/// ### Returns
/// The token list in source order
pub fn tokenize(
    input: &str,
    profile: &ArchitectureProfile,
    diagnostics: Option<&DiagnosticContext>,
) -> Vec<Token> {
    let mut state = LexerState::new(input, profile, diagnostics);

    while let Some(&c) = state.peek() {
        let line = state.current_line;
        let column = state.current_column;

        match c {
            ' ' | '\t' | '\r' | '\n' => {
                state.advance();
            }
            ';' => handle_comment(&mut state),
            '%' => handle_directive(&mut state, line, column),
            '"' => handle_string(&mut state, line, column),
            c if c.is_ascii_digit() => handle_immediate(&mut state, line, column),
            c if is_word_start(c) => handle_word(&mut state, line, column),
            _ => handle_single_char(&mut state, line, column),
        }
    }

    state.tokens
}

/// Consumes a `;` comment through the end of the line
fn handle_comment(state: &mut LexerState) {
    while let Some(&c) = state.peek() {
        if c == '\n' {
            break;
        }
        state.advance();
    }
}

/// Handles a `%`-prefixed directive token
fn handle_directive(state: &mut LexerState, line: usize, column: usize) {
    state.advance(); // consume '%'
    let mut literal = String::from("%");

    while let Some(&c) = state.peek() {
        if is_word_char(c) {
            literal.push(c);
            state.advance();
        } else {
            break;
        }
    }

    // A bare '%' with no word after it is not a directive
    if literal == "%" {
        state.add_token(TokenKind::Identifier, literal, line, column);
    } else {
        state.add_token(TokenKind::Directive, literal, line, column);
    }
}

/// Handles a string literal; the delimiters are stripped. An unterminated
/// string at end of input degrades to a warning.
fn handle_string(state: &mut LexerState, line: usize, column: usize) {
    state.advance(); // consume opening quote
    let mut value = String::new();
    let mut terminated = false;

    while let Some(&c) = state.peek() {
        if c == '"' {
            state.advance();
            terminated = true;
            break;
        }
        value.push(c);
        state.advance();
    }

    if !terminated {
        if let Some(context) = state.diagnostics {
            context
                .record(
                    Severity::Warning,
                    context.loc(line, column + 1),
                    "unterminated string literal",
                )
                .with_hint("add a closing '\"'");
        }
    }

    state.add_token(TokenKind::String, value, line, column);
}

/// Handles a numeric immediate. The literal is preserved verbatim; numeric
/// parsing happens in the code generator. Hex (`0x`) continues through hex
/// digits, binary (`0b`) through binary digits, anything else through
/// decimal digits.
fn handle_immediate(state: &mut LexerState, line: usize, column: usize) {
    let mut literal = String::new();
    let first = state.advance().unwrap();
    literal.push(first);

    let prefix = if first == '0' {
        match state.peek() {
            Some(&'x') | Some(&'X') => Some('x'),
            Some(&'b') | Some(&'B') => Some('b'),
            _ => None,
        }
    } else {
        None
    };

    if let Some(marker) = prefix {
        literal.push(*state.peek().unwrap());
        state.advance();
        while let Some(&c) = state.peek() {
            let in_class = match marker {
                'x' => c.is_ascii_hexdigit(),
                _ => c == '0' || c == '1',
            };
            if in_class {
                literal.push(c);
                state.advance();
            } else {
                break;
            }
        }
    } else {
        while let Some(&c) = state.peek() {
            if c.is_ascii_digit() {
                literal.push(c);
                state.advance();
            } else {
                break;
            }
        }
    }

    state.add_token(TokenKind::Immediate, literal, line, column);
}

/// Reads a word and classifies it. A trailing `:` is absorbed into the
/// literal, marking a label identifier.
fn handle_word(state: &mut LexerState, line: usize, column: usize) {
    let mut word = String::new();

    while let Some(&c) = state.peek() {
        if is_word_char(c) {
            word.push(c);
            state.advance();
        } else {
            break;
        }
    }

    if state.peek() == Some(&':') {
        state.advance();
        word.push(':');
        state.add_token(TokenKind::Identifier, word, line, column);
        return;
    }

    let kind = classify_word(state, &word);
    state.add_token(kind, word, line, column);
}

/// Classifies a word against the architecture profile.
///
/// Arguments of `keyword` and `section` tokens must never be reclassified
/// by the vocabulary, so the previous emitted token is checked first.
fn classify_word(state: &LexerState, word: &str) -> TokenKind {
    if matches!(
        state.previous_kind(),
        Some(TokenKind::Keyword) | Some(TokenKind::Section)
    ) {
        return TokenKind::Identifier;
    }

    if word.eq_ignore_ascii_case("section") {
        TokenKind::Section
    } else if state.profile.is_register(word) {
        TokenKind::Register
    } else if state.profile.is_instruction(word) {
        TokenKind::Instruction
    } else if state.profile.is_keyword(word) {
        TokenKind::Keyword
    } else {
        TokenKind::Identifier
    }
}

/// Any other single character becomes a one-character identifier; this is
/// how `,`, `[`, `]`, `+`, `-` reach the parser as operand-stream markers.
fn handle_single_char(state: &mut LexerState, line: usize, column: usize) {
    let c = state.advance().unwrap();
    state.add_token(TokenKind::Identifier, c.to_string(), line, column);
}
