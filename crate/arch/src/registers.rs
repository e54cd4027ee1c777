/// x86_64 register numbering used by the ModR/M and REX synthesis.
///
/// Names compare case-insensitively. Registers numbered 8 and above (R8-R15)
/// are the "extended" set and require a REX.R or REX.B bit.
pub fn register_number(name: &str) -> Option<u8> {
    let number = match name.to_uppercase().as_str() {
        "RAX" => 0,
        "RCX" => 1,
        "RDX" => 2,
        "RBX" => 3,
        "RSP" => 4,
        "RBP" => 5,
        "RSI" => 6,
        "RDI" => 7,
        "R8" => 8,
        "R9" => 9,
        "R10" => 10,
        "R11" => 11,
        "R12" => 12,
        "R13" => 13,
        "R14" => 14,
        "R15" => 15,
        _ => return None,
    };
    Some(number)
}

/// True for R8-R15, which need a REX extension bit
pub fn is_extended(number: u8) -> bool {
    number >= 8
}
