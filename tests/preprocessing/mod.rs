mod defines;
mod macros;
