// AST (Abstract Syntax Tree) definitions for HypnoScript

use std::fmt;
use std::rc::Rc;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Binary operators, after synonym normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Equality
    Eq,
    Ne,
    // Comparison
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
}

impl BinaryOp {
    /// Canonical operator spelling
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,  // !x
    Neg,  // -x
    Plus, // +x
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Not => f.write_str("!"),
            UnaryOp::Neg => f.write_str("-"),
            UnaryOp::Plus => f.write_str("+"),
        }
    }
}

/// Variable declaration: `induce name: type = init;` or `induce name from external;`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub type_name: Option<String>, // None means "infer"
    pub initializer: Option<Expr>,
    pub from_external: bool,
    pub location: SourceLocation,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub type_name: Option<String>,
}

/// Function declaration (`suggestion`, `imperative suggestion`, `dominant suggestion`)
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<String>,
    pub body: Vec<Stmt>,
    pub imperative: bool,
    pub dominant: bool,
    pub location: SourceLocation,
}

/// The declaration wrapped by a session member
#[derive(Debug, Clone, PartialEq)]
pub enum MemberDecl {
    Field(VarDecl),
    Method(Rc<FunctionDecl>),
}

/// Session member with its exposure and dominance flags
#[derive(Debug, Clone, PartialEq)]
pub struct SessionMember {
    pub declaration: MemberDecl,
    pub exposed: bool,
    pub dominant: bool,
}

impl SessionMember {
    pub fn name(&self) -> &str {
        match &self.declaration {
            MemberDecl::Field(field) => &field.name,
            MemberDecl::Method(method) => &method.name,
        }
    }

    pub fn location(&self) -> SourceLocation {
        match &self.declaration {
            MemberDecl::Field(field) => field.location,
            MemberDecl::Method(method) => method.location,
        }
    }
}

/// Session (structured type with fields and methods)
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDecl {
    pub name: String,
    pub members: Vec<SessionMember>,
    pub location: SourceLocation,
}

impl SessionDecl {
    /// The `constructor` method, if declared
    pub fn constructor(&self) -> Option<&Rc<FunctionDecl>> {
        self.members.iter().find_map(|member| match &member.declaration {
            MemberDecl::Method(method) if method.name == CONSTRUCTOR_NAME => Some(method),
            _ => None,
        })
    }
}

/// Name under which a session constructor is stored
pub const CONSTRUCTOR_NAME: &str = "constructor";

/// Tranceify (plain record type)
#[derive(Debug, Clone, PartialEq)]
pub struct TranceifyDecl {
    pub name: String,
    pub members: Vec<VarDecl>,
    pub location: SourceLocation,
}

/// Statements
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDecl(VarDecl),
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
        location: SourceLocation,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
        location: SourceLocation,
    },
    Loop {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        iteration: Option<Expr>,
        body: Vec<Stmt>,
        location: SourceLocation,
    },
    FunctionDecl(Rc<FunctionDecl>),
    SessionDecl(Rc<SessionDecl>),
    TranceifyDecl(Rc<TranceifyDecl>),
    Observe {
        expr: Expr,
        location: SourceLocation,
    },
    Return {
        expr: Option<Expr>,
        location: SourceLocation,
    },
    Break {
        location: SourceLocation,
    },
    Continue {
        location: SourceLocation,
    },
    Jump {
        label: String,
        location: SourceLocation,
    },
    Label {
        name: String,
        location: SourceLocation,
    },
    Assert {
        condition: Expr,
        message: Option<String>,
        location: SourceLocation,
    },
    Entrance {
        body: Vec<Stmt>,
        location: SourceLocation,
    },
    MindLink {
        path: String,
        location: SourceLocation,
    },
    Expression {
        expr: Expr,
        location: SourceLocation,
    },
}

impl Stmt {
    /// Get the source location of this statement
    pub fn location(&self) -> SourceLocation {
        match self {
            Stmt::VarDecl(decl) => decl.location,
            Stmt::FunctionDecl(decl) => decl.location,
            Stmt::SessionDecl(decl) => decl.location,
            Stmt::TranceifyDecl(decl) => decl.location,
            Stmt::If { location, .. }
            | Stmt::While { location, .. }
            | Stmt::Loop { location, .. }
            | Stmt::Observe { location, .. }
            | Stmt::Return { location, .. }
            | Stmt::Break { location }
            | Stmt::Continue { location }
            | Stmt::Jump { location, .. }
            | Stmt::Label { location, .. }
            | Stmt::Assert { location, .. }
            | Stmt::Entrance { location, .. }
            | Stmt::MindLink { location, .. }
            | Stmt::Expression { location, .. } => *location,
        }
    }

    /// Name introduced by a declaration statement
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            Stmt::VarDecl(decl) => Some(&decl.name),
            Stmt::FunctionDecl(decl) => Some(&decl.name),
            Stmt::SessionDecl(decl) => Some(&decl.name),
            Stmt::TranceifyDecl(decl) => Some(&decl.name),
            _ => None,
        }
    }
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64, SourceLocation),
    String(String, SourceLocation),
    Boolean(bool, SourceLocation),
    Identifier(String, SourceLocation),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        location: SourceLocation,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        location: SourceLocation,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        location: SourceLocation,
    },
    FieldAccess {
        object: Box<Expr>,
        field: String,
        location: SourceLocation,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        location: SourceLocation,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
        location: SourceLocation,
    },
    RecordLiteral {
        type_name: String,
        fields: Vec<(String, Expr)>,
        location: SourceLocation,
    },
    ArrayLiteral(Vec<Expr>, SourceLocation),
}

impl Expr {
    /// Get the source location of this expression
    pub fn location(&self) -> SourceLocation {
        match self {
            Expr::Number(_, loc)
            | Expr::String(_, loc)
            | Expr::Boolean(_, loc)
            | Expr::Identifier(_, loc)
            | Expr::ArrayLiteral(_, loc) => *loc,
            Expr::Binary { location, .. }
            | Expr::Unary { location, .. }
            | Expr::Call { location, .. }
            | Expr::FieldAccess { location, .. }
            | Expr::Index { location, .. }
            | Expr::Assign { location, .. }
            | Expr::RecordLiteral { location, .. } => *location,
        }
    }

    /// True when this expression is the bare identifier `this`
    pub fn is_this(&self) -> bool {
        matches!(self, Expr::Identifier(name, _) if name == THIS_NAME)
    }
}

/// Identifier bound to the receiving session inside methods
pub const THIS_NAME: &str = "this";

/// Top-level program structure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }
}
