//! Tree-form printer for parsed programs, compiled in with the
//! `print-ast` feature.

use crate::ast::{Operand, Program, Statement};

/// Renders a program as an indented tree with box-drawing connectors
pub struct AstPrinter {
    output: String,
}

impl Default for AstPrinter {
    fn default() -> Self {
        AstPrinter::new()
    }
}

impl AstPrinter {
    pub fn new() -> Self {
        AstPrinter { output: String::new() }
    }

    /// Prints the rendered tree to stdout
    pub fn print(&mut self, program: &Program) {
        println!("{}", self.render(program));
    }

    /// Renders the tree into a string
    pub fn render(&mut self, program: &Program) -> String {
        self.output.clear();
        self.output.push_str("Program\n");

        for (i, statement) in program.iter().enumerate() {
            let last = i == program.len() - 1;
            self.render_statement(statement, last);
        }
        std::mem::take(&mut self.output)
    }

    fn render_statement(&mut self, statement: &Statement, last: bool) {
        let connector = if last { "└── " } else { "├── " };
        let (line, column) = statement.location();

        match statement {
            Statement::Instruction(instruction) => {
                self.output.push_str(&format!(
                    "{}Instruction {} [{}:{}]\n",
                    connector, instruction.mnemonic, line, column
                ));
                let child_prefix = if last { "    " } else { "│   " };
                for (i, operand) in instruction.operands.iter().enumerate() {
                    let operand_last = i == instruction.operands.len() - 1;
                    self.render_operand(operand, child_prefix, operand_last);
                }
            }
            Statement::Label(label) => {
                self.output.push_str(&format!(
                    "{}Label {} [{}:{}]\n",
                    connector, label.name, line, column
                ));
            }
            Statement::Namespace(namespace) => {
                self.output.push_str(&format!(
                    "{}Namespace {} [{}:{}]\n",
                    connector, namespace.name, line, column
                ));
            }
            Statement::Use(import) => {
                self.output.push_str(&format!(
                    "{}Use {} [{}:{}]\n",
                    connector, import.module_name, line, column
                ));
            }
            Statement::Directive(directive) => {
                self.output.push_str(&format!(
                    "{}Directive {} ({} arg(s)) [{}:{}]\n",
                    connector,
                    directive.literal,
                    directive.args.len(),
                    line,
                    column
                ));
            }
            Statement::Section(section) => {
                self.output.push_str(&format!(
                    "{}Section {} [{}:{}]\n",
                    connector, section.name, line, column
                ));
            }
        }
    }

    fn render_operand(&mut self, operand: &Operand, prefix: &str, last: bool) {
        let connector = if last { "└── " } else { "├── " };
        let kind = match operand {
            Operand::Register(_) => "Register",
            Operand::Immediate(_) => "Immediate",
            Operand::String(_) => "String",
            Operand::Identifier(_) => "Identifier",
            Operand::Memory(_) => "Memory",
        };
        self.output
            .push_str(&format!("{}{}{} {}\n", prefix, connector, kind, operand));
    }
}
