use std::collections::HashSet;

/// Immutable vocabulary the lexer classifies words against.
///
/// All three sets are stored lower-cased; membership tests lower-case the
/// query, so classification is case-insensitive. An empty profile is valid
/// and classifies every word as an identifier, which is useful when
/// debugging the lexer in isolation.
#[derive(Debug, Clone, Default)]
pub struct ArchitectureProfile {
    registers: HashSet<String>,
    instructions: HashSet<String>,
    keywords: HashSet<String>,
}

impl ArchitectureProfile {
    /// Builds a profile from the given word sets (lower-cased on entry)
    pub fn new<I, J, K>(registers: I, instructions: J, keywords: K) -> Self
    where
        I: IntoIterator<Item = &'static str>,
        J: IntoIterator<Item = &'static str>,
        K: IntoIterator<Item = &'static str>,
    {
        ArchitectureProfile {
            registers: lowered(registers),
            instructions: lowered(instructions),
            keywords: lowered(keywords),
        }
    }

    /// A profile with empty vocabulary sets
    pub fn empty() -> Self {
        ArchitectureProfile::default()
    }

    pub fn is_register(&self, word: &str) -> bool {
        self.registers.contains(&word.to_lowercase())
    }

    pub fn is_instruction(&self, word: &str) -> bool {
        self.instructions.contains(&word.to_lowercase())
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(&word.to_lowercase())
    }

    pub fn register_count(&self) -> usize {
        self.registers.len()
    }

    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }
}

fn lowered<I: IntoIterator<Item = &'static str>>(words: I) -> HashSet<String> {
    words.into_iter().map(|w| w.to_lowercase()).collect()
}
