mod instructions;
mod symbols;
