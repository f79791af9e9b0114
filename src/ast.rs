use std::fmt;

/// A numeric literal, kept as written: a literal with a `.` is a float,
/// anything else an int. The two compare numerically against each other.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(value) => value as f64,
            Number::Float(value) => value,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(left), Number::Int(right)) => left == right,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(value) => write!(f, "{value}"),
            // Keep a fraction part so the text re-reads as a float.
            Number::Float(value) if value.fract() == 0.0 => write!(f, "{value:.1}"),
            Number::Float(value) => write!(f, "{value}"),
        }
    }
}

/// The typed syntax tree. A closed sum: consumers match or visit over
/// exactly these variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Comment(String),
    Bool(bool),
    Number(Number),
    Str(String),
    Identifier(String),
    List(Vec<Node>),
    MakeMap(Vec<(Node, Node)>),
    If {
        condition: Box<Node>,
        when_true: Box<Node>,
        when_false: Box<Node>,
    },
    Let {
        name: String,
        expression: Box<Node>,
    },
    ForEach {
        binding: String,
        collection: Box<Node>,
        body: Box<Node>,
    },
    Do(Vec<Node>),
    Call {
        target: String,
        arguments: Vec<Node>,
    },
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Comment(_) => NodeKind::Comment,
            Node::Bool(_) => NodeKind::Bool,
            Node::Number(_) => NodeKind::Number,
            Node::Str(_) => NodeKind::Str,
            Node::Identifier(_) => NodeKind::Identifier,
            Node::List(_) => NodeKind::List,
            Node::MakeMap(_) => NodeKind::MakeMap,
            Node::If { .. } => NodeKind::If,
            Node::Let { .. } => NodeKind::Let,
            Node::ForEach { .. } => NodeKind::ForEach,
            Node::Do(_) => NodeKind::Do,
            Node::Call { .. } => NodeKind::Call,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Comment,
    Bool,
    Number,
    Str,
    Identifier,
    List,
    MakeMap,
    If,
    Let,
    ForEach,
    Do,
    Call,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Comment => "comment",
            NodeKind::Bool => "bool",
            NodeKind::Number => "number",
            NodeKind::Str => "string",
            NodeKind::Identifier => "identifier",
            NodeKind::List => "list",
            NodeKind::MakeMap => "make-map",
            NodeKind::If => "if",
            NodeKind::Let => "let",
            NodeKind::ForEach => "for-each",
            NodeKind::Do => "do",
            NodeKind::Call => "call",
        };
        write!(f, "{name}")
    }
}
