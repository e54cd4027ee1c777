/// Structured error codes for every failure the assembler can report.
///
/// Each variant maps to a unique u16 code and has an associated description.
///
/// Error code ranges:
/// - 1000-1999: Preprocessing and dependency-graph errors (fatal-first stages)
/// - 2000-2999: Parse errors (syntax and structural issues)
/// - 3000-3999: Semantic analysis errors (symbol tables, operand validation)
/// - 4000-4999: Code generation errors (labels, encodings, immediates)
/// - 5000-5999: Generic errors (not specifically categorized)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Preprocessing Errors (1000-1999)

    /// An %include directive names a file without the .kasm extension
    InvalidIncludeExtension = 1001,
    /// An included file could not be read
    UnreadableInclude = 1002,
    /// A %macro block is missing its closing %endmacro
    MissingEndmacro = 1003,
    /// A macro call supplies the wrong number of arguments
    MacroArgumentCount = 1004,
    /// A conditional block contains more than one %else
    DuplicateElse = 1005,
    /// An %else appears outside any open conditional block
    UnmatchedElse = 1006,
    /// An %endif appears outside any open conditional block
    UnmatchedEndif = 1007,
    /// An %ifdef/%ifndef block is never closed
    UnterminatedConditional = 1008,
    /// A %define directive has an empty symbol name
    EmptyDefineName = 1009,
    /// The same symbol is defined twice
    DuplicateDefine = 1010,
    /// The working directory does not exist or is not a directory
    InvalidWorkingDirectory = 1011,

    // Parse Errors (2000-2999)

    /// An identifier appeared outside any instruction context
    UnexpectedIdentifier = 2001,
    /// A keyword with no statement form was encountered
    UnknownKeyword = 2002,
    /// Expected an identifier
    ExpectedIdentifier = 2003,
    /// A memory operand was not closed with ']'
    UnterminatedMemoryOperand = 2004,
    /// A token appeared where no statement can start
    UnexpectedToken = 2005,

    // Semantic Analysis Errors (3000-3999)

    /// Instruction mnemonic not present in the instruction table
    UnknownInstruction = 3001,
    /// Instruction called with the wrong number of operands
    OperandCountMismatch = 3002,
    /// No variant of the instruction accepts the supplied operand types
    NoMatchingVariant = 3003,
    /// Immediate literal is neither hex nor decimal
    InvalidImmediate = 3004,
    /// Memory operand has no components
    EmptyMemoryOperand = 3005,
    /// Memory operand base is an immediate
    InvalidMemoryBase = 3006,
    /// Memory operand contains an operator other than '+' or '-'
    InvalidMemoryOperator = 3007,
    /// Identifier operand does not resolve to a collected label
    UndefinedReference = 3008,
    /// A label, namespace, or module was declared twice
    DuplicateSymbol = 3009,
    /// Namespace name is empty or starts with a digit
    InvalidNamespaceName = 3010,
    /// Use statement has an empty module name
    EmptyModuleName = 3011,
    /// A directive survived preprocessing
    UnrecognisedDirective = 3012,

    // Code Generation Errors (4000-4999)

    /// The same (section, name) label pair was declared twice
    DuplicateLabel = 4001,
    /// Mnemonic not present in the instruction table at emission time
    UnknownMnemonic = 4002,
    /// The matched variant uses an encoding the emitter does not support
    UnsupportedEncoding = 4003,
    /// A label was referenced from a different section than its declaration
    CrossSectionReference = 4004,
    /// A referenced label was never declared
    UnresolvedLabel = 4005,
    /// An immediate literal failed to parse at emission time
    InvalidImmediateLiteral = 4006,
    /// No variant matches the operand signature at emission time
    NoEncodableVariant = 4007,

    // Generic Errors (5000-5999)

    /// Generic assembly error not categorized
    GenericAssemblyError = 5000,
}

impl ErrorCode {
    /// Get the numeric error code as a u16
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get a short description of the error
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::InvalidIncludeExtension => "Include requires a .kasm file",
            ErrorCode::UnreadableInclude => "Included file could not be read",
            ErrorCode::MissingEndmacro => "Macro definition missing %endmacro",
            ErrorCode::MacroArgumentCount => "Wrong number of macro arguments",
            ErrorCode::DuplicateElse => "Duplicate %else in conditional block",
            ErrorCode::UnmatchedElse => "%else without open conditional",
            ErrorCode::UnmatchedEndif => "%endif without open conditional",
            ErrorCode::UnterminatedConditional => "Conditional block never closed",
            ErrorCode::EmptyDefineName => "Empty %define symbol name",
            ErrorCode::DuplicateDefine => "Symbol defined twice",
            ErrorCode::InvalidWorkingDirectory => "Invalid working directory",

            ErrorCode::UnexpectedIdentifier => "Identifier outside instruction context",
            ErrorCode::UnknownKeyword => "Unknown keyword",
            ErrorCode::ExpectedIdentifier => "Expected identifier",
            ErrorCode::UnterminatedMemoryOperand => "Memory operand missing ']'",
            ErrorCode::UnexpectedToken => "Unexpected token",

            ErrorCode::UnknownInstruction => "Unknown instruction",
            ErrorCode::OperandCountMismatch => "Wrong number of operands",
            ErrorCode::NoMatchingVariant => "No variant accepts these operands",
            ErrorCode::InvalidImmediate => "Invalid immediate value",
            ErrorCode::EmptyMemoryOperand => "Empty memory operand",
            ErrorCode::InvalidMemoryBase => "Invalid memory operand base",
            ErrorCode::InvalidMemoryOperator => "Invalid operator in memory operand",
            ErrorCode::UndefinedReference => "Undefined reference",
            ErrorCode::DuplicateSymbol => "Symbol already declared",
            ErrorCode::InvalidNamespaceName => "Invalid namespace name",
            ErrorCode::EmptyModuleName => "Empty module name",
            ErrorCode::UnrecognisedDirective => "Unrecognised directive",

            ErrorCode::DuplicateLabel => "Label already declared in section",
            ErrorCode::UnknownMnemonic => "Unknown mnemonic",
            ErrorCode::UnsupportedEncoding => "Unsupported encoding",
            ErrorCode::CrossSectionReference => "Cross-section label reference",
            ErrorCode::UnresolvedLabel => "Unresolved label",
            ErrorCode::InvalidImmediateLiteral => "Invalid immediate literal",
            ErrorCode::NoEncodableVariant => "No encodable variant",

            ErrorCode::GenericAssemblyError => "Generic assembly error",
        }
    }

    /// Check if this is a preprocessing error (1000-1999 range)
    pub fn is_preprocessing_error(&self) -> bool {
        let code = self.code();
        (1000..2000).contains(&code)
    }

    /// Check if this is a parse error (2000-2999 range)
    pub fn is_parse_error(&self) -> bool {
        let code = self.code();
        (2000..3000).contains(&code)
    }

    /// Check if this is a semantic error (3000-3999 range)
    pub fn is_semantic_error(&self) -> bool {
        let code = self.code();
        (3000..4000).contains(&code)
    }

    /// Check if this is a code generation error (4000-4999 range)
    pub fn is_codegen_error(&self) -> bool {
        let code = self.code();
        (4000..5000).contains(&code)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[E{:04}]", self.code())
    }
}
