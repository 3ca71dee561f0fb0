use std::io::{self, Write};

use crate::ast::{
    BlockStatement, Expression, Func, Node, ReturnStatement, SourceFile, Type,
};

/// Renders a parsed source file as Go source. Covers functions, returns and
/// the plain expression subset; nodes without a Go rendering are skipped.
pub struct GoEmitter<W: Write> {
    writer: W,
    package_name: String,
    indent_level: usize,
    indent_size: usize,
}

impl<W: Write> GoEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            package_name: "main".to_string(),
            indent_level: 0,
            indent_size: 4,
        }
    }

    pub fn emit(&mut self, file: &SourceFile) -> io::Result<()> {
        write!(self.writer, "package {}\n\n", self.package_name)?;
        for decl in &file.declarations {
            self.node(decl)?;
        }
        Ok(())
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn outdent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    fn emit_indent(&mut self) -> io::Result<()> {
        if self.indent_level > 0 {
            let pad = " ".repeat(self.indent_level * self.indent_size);
            write!(self.writer, "{pad}")?;
        }
        Ok(())
    }

    fn node(&mut self, node: &Node) -> io::Result<()> {
        match node {
            Node::Func(func) => self.func(func),
            Node::Return(ret) => self.return_statement(ret),
            Node::Block(block) => self.block_statement(block),
            _ => Ok(()),
        }
    }

    fn ty(&mut self, ty: &Type) -> io::Result<()> {
        match ty {
            Type::Identifier(t) => write!(self.writer, "{}", t.name),
            Type::Literal(t) => write!(self.writer, "{}", t.name),
            _ => Ok(()),
        }
    }

    // Declarations

    fn func(&mut self, node: &Func) -> io::Result<()> {
        write!(self.writer, "func {}", node.name)?;

        write!(self.writer, "(")?;
        let count = node.params.len();
        for (i, param) in node.params.iter().enumerate() {
            write!(self.writer, "{} ", param.name)?;
            if let Some(ty) = &param.ty {
                self.ty(ty)?;
            }
            if i < count - 1 {
                write!(self.writer, ", ")?;
            }
        }
        write!(self.writer, ")")?;

        if let Some(ret) = &node.return_type {
            write!(self.writer, " ")?;
            self.ty(ret)?;
        }

        write!(self.writer, " ")?;
        match &node.body {
            Some(body) => self.block_statement(body),
            None => write!(self.writer, "{{}}"),
        }
    }

    // Statements

    fn block_statement(&mut self, node: &BlockStatement) -> io::Result<()> {
        write!(self.writer, "{{")?;
        self.indent();
        for stmt in &node.statements {
            writeln!(self.writer)?;
            self.emit_indent()?;
            self.node(stmt)?;
        }
        self.outdent();
        if !node.statements.is_empty() {
            writeln!(self.writer)?;
        }
        write!(self.writer, "}}")
    }

    fn return_statement(&mut self, node: &ReturnStatement) -> io::Result<()> {
        write!(self.writer, "return")?;
        if let Some(value) = &node.value {
            write!(self.writer, " ")?;
            self.expression(value)?;
        }
        Ok(())
    }

    // Expressions

    fn expression(&mut self, expr: &Expression) -> io::Result<()> {
        match expr {
            Expression::Binary(e) => {
                self.expression(&e.left)?;
                write!(self.writer, " {} ", e.operator)?;
                if let Some(right) = &e.right {
                    self.expression(right)?;
                }
                Ok(())
            }
            Expression::Unary(e) => {
                write!(self.writer, "{}", e.operator)?;
                if let Some(right) = &e.right {
                    self.expression(right)?;
                }
                Ok(())
            }
            Expression::Integer(e) => write!(self.writer, "{}", e.value),
            Expression::Identifier(e) => write!(self.writer, "{}", e.name),
            _ => Ok(()),
        }
    }
}
