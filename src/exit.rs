use std::process;

/// Process exit codes for CLI failures, following the BSD sysexits
/// convention so shell scripts can tell usage mistakes from bad input.
#[derive(Debug, Copy, Clone)]
pub enum Code {
    /// The command line itself was wrong (bad extension, bad flags)
    Usage = 64,
    /// The source did not assemble (any recorded pipeline error)
    Dataerr = 65,
    /// An input file could not be opened
    NoInput = 66,
    /// The output image could not be written
    CantCreat = 73,
}

impl Code {
    /// Prints `message` to stderr and terminates the process with this
    /// code. Never returns.
    pub fn exit(self, message: &str) -> ! {
        eprintln!("{}", message);
        process::exit(self as i32)
    }
}
