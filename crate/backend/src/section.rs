use std::collections::HashMap;

/// A named region of the output image.
///
/// `.text` and `.data` accumulate bytes; `.bss` only reserves space and
/// never contributes bytes to the image. `size` is the running byte
/// counter both encoder passes advance in lockstep.
#[derive(Debug, Clone)]
pub struct Section {
    pub name: String,
    pub bytes: Vec<u8>,
    /// Running byte size; reset between the sizing and emission passes
    pub size: usize,
    /// Space reserved by `.bss` (no bytes emitted)
    pub reserved: usize,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Section {
            name: name.into(),
            bytes: Vec::new(),
            size: 0,
            reserved: 0,
        }
    }

    pub fn is_bss(&self) -> bool {
        self.name == ".bss"
    }

    /// Advances the running size without emitting (the sizing pass)
    pub fn advance(&mut self, bytes: usize) {
        self.size += bytes;
    }

    /// Emits one byte (the emission pass). `.bss` reserves instead.
    pub fn push_byte(&mut self, byte: u8) {
        if self.is_bss() {
            self.reserved += 1;
        } else {
            self.bytes.push(byte);
        }
        self.size += 1;
    }

    /// Ordering key for the final image: `.text`, `.data`, `.bss`, then
    /// unknown sections lexicographically
    fn order_key(&self) -> (u8, &str) {
        match self.name.as_str() {
            ".text" => (0, ""),
            ".data" => (1, ""),
            ".bss" => (2, ""),
            other => (3, other),
        }
    }
}

/// Sections keyed by name, preserving creation order
#[derive(Debug, Clone, Default)]
pub struct SectionTable {
    sections: Vec<Section>,
    index: HashMap<String, usize>,
}

impl SectionTable {
    pub fn new() -> Self {
        SectionTable::default()
    }

    /// The section with the given name, created on first use
    pub fn get_or_create(&mut self, name: &str) -> &mut Section {
        if let Some(&i) = self.index.get(name) {
            return &mut self.sections[i];
        }
        let i = self.sections.len();
        self.sections.push(Section::new(name));
        self.index.insert(name.to_string(), i);
        &mut self.sections[i]
    }

    pub fn get(&self, name: &str) -> Option<&Section> {
        self.index.get(name).map(|&i| &self.sections[i])
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Resets every running size counter to zero, leaving buffers intact.
    /// Called between the sizing and emission passes.
    pub fn reset_sizes(&mut self) {
        for section in &mut self.sections {
            section.size = 0;
        }
    }

    /// Sections in image order
    pub fn ordered(&self) -> Vec<&Section> {
        let mut ordered: Vec<&Section> = self.sections.iter().collect();
        ordered.sort_by(|a, b| a.order_key().cmp(&b.order_key()));
        ordered
    }

    /// The flat byte image: ordered section bytes concatenated, `.bss`
    /// contributing nothing
    pub fn image(&self) -> Vec<u8> {
        let mut image = Vec::new();
        for section in self.ordered() {
            if !section.is_bss() {
                image.extend_from_slice(&section.bytes);
            }
        }
        image
    }
}
