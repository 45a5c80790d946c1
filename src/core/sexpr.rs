//! Generic S-expression reader for the runtime's textual protocol.
//!
//! Reading is purely structural: atoms, lists and `'`-quoted forms.  Every
//! node remembers the byte range it was read from, so a sub-expression can be
//! relayed to the runtime exactly as the runtime wrote it.

use std::fmt;
use std::ops::Range;

// ───────────────────────────────────────── values ────────────

/// A protocol value.  Mirrors the serialisable subset of the runtime's values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Nil,
    Bool(bool),
    Int(i64),
    String(String),
    Symbol(String),
    /// Stored without the leading `:`.
    Keyword(String),
    List(Vec<Expr>),
}

impl Expr {
    pub fn symbol(name: &str) -> Self {
        Self::Symbol(name.to_string())
    }

    pub fn keyword(name: &str) -> Self {
        Self::Keyword(name.to_string())
    }

    /// `'expr`, i.e. `(quote expr)`.
    pub fn quoted(expr: Expr) -> Self {
        Self::List(vec![Self::symbol("quote"), expr])
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Nil => write!(f, "nil"),
            Expr::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Expr::Int(i) => write!(f, "{i}"),
            // The runtime prints strings raw, without escapes.
            Expr::String(s) => write!(f, "\"{s}\""),
            Expr::Symbol(s) => write!(f, "{s}"),
            Expr::Keyword(k) => write!(f, ":{k}"),
            Expr::List(items) => match &items[..] {
                [Expr::Symbol(q), inner] if q == "quote" => write!(f, "'{inner}"),
                _ => {
                    write!(f, "(")?;
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            write!(f, " ")?;
                        }
                        write!(f, "{item}")?;
                    }
                    write!(f, ")")
                }
            },
        }
    }
}

// ───────────────────────────────────────── syntax tree ───────

/// A parsed expression together with its position in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Never holds [`Expr::List`]; lists are [`NodeKind::List`].
    Atom(Expr),
    List(Vec<Node>),
}

impl Node {
    pub fn as_list(&self) -> Option<&[Node]> {
        match &self.kind {
            NodeKind::List(items) => Some(items),
            NodeKind::Atom(_) => None,
        }
    }

    pub fn as_keyword(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Atom(Expr::Keyword(k)) => Some(k),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self.kind, NodeKind::Atom(Expr::Nil))
    }

    /// The exact text this node was read from.
    pub fn source<'s>(&self, src: &'s str) -> &'s str {
        &src[self.span.clone()]
    }

    pub fn to_expr(&self) -> Expr {
        match &self.kind {
            NodeKind::Atom(expr) => expr.clone(),
            NodeKind::List(items) => Expr::List(items.iter().map(Node::to_expr).collect()),
        }
    }
}

// ───────────────────────────────────────── reader ────────────

/// Syntax errors, each carrying the byte offset where the problem starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unbalanced `)` at byte {0}")]
    UnexpectedClose(usize),
    #[error("list opened at byte {0} is never closed")]
    UnclosedList(usize),
    #[error("string starting at byte {0} is never terminated")]
    UnterminatedString(usize),
    #[error("quote at byte {0} has nothing to quote")]
    DanglingQuote(usize),
}

/// Read every top-level expression in `src`.
pub fn parse_all(src: &str) -> Result<Vec<Node>, ParseError> {
    let mut reader = Reader { src, pos: 0 };
    let mut nodes = Vec::new();
    loop {
        reader.skip_trivia();
        if reader.peek().is_none() {
            return Ok(nodes);
        }
        nodes.push(reader.read_node()?);
    }
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '\'' | '"' | ';')
}

impl<'a> Reader<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skip whitespace and `;` line comments.
    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == ';' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    /// Read one expression.  The caller has skipped trivia and checked that
    /// input remains.
    fn read_node(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        match self.peek() {
            Some('(') => {
                self.bump();
                let mut items = Vec::new();
                loop {
                    self.skip_trivia();
                    match self.peek() {
                        None => return Err(ParseError::UnclosedList(start)),
                        Some(')') => {
                            self.bump();
                            break;
                        }
                        Some(_) => items.push(self.read_node()?),
                    }
                }
                Ok(Node {
                    kind: NodeKind::List(items),
                    span: start..self.pos,
                })
            }
            Some(')') => Err(ParseError::UnexpectedClose(start)),
            Some('\'') => {
                self.bump();
                self.skip_trivia();
                if matches!(self.peek(), None | Some(')')) {
                    return Err(ParseError::DanglingQuote(start));
                }
                let inner = self.read_node()?;
                let quote = Node {
                    kind: NodeKind::Atom(Expr::symbol("quote")),
                    span: start..start + 1,
                };
                Ok(Node {
                    kind: NodeKind::List(vec![quote, inner]),
                    span: start..self.pos,
                })
            }
            Some('"') => self.read_string(start),
            _ => Ok(self.read_atom(start)),
        }
    }

    /// Strings run to the next `"`.  Backslashes are ordinary characters,
    /// matching how the runtime prints them.
    fn read_string(&mut self, start: usize) -> Result<Node, ParseError> {
        self.bump(); // opening quote
        let body = start + 1;
        loop {
            match self.bump() {
                None => return Err(ParseError::UnterminatedString(start)),
                Some('"') => break,
                Some(_) => {}
            }
        }
        let text = self.src[body..self.pos - 1].to_string();
        Ok(Node {
            kind: NodeKind::Atom(Expr::String(text)),
            span: start..self.pos,
        })
    }

    fn read_atom(&mut self, start: usize) -> Node {
        while let Some(c) = self.peek() {
            if is_delimiter(c) {
                break;
            }
            self.bump();
        }
        let word = &self.src[start..self.pos];
        let expr = match word {
            "nil" => Expr::Nil,
            "true" => Expr::Bool(true),
            "false" => Expr::Bool(false),
            _ => {
                if let Ok(i) = word.parse::<i64>() {
                    Expr::Int(i)
                } else if let Some(k) = word.strip_prefix(':').filter(|k| !k.is_empty()) {
                    Expr::keyword(k)
                } else {
                    Expr::symbol(word)
                }
            }
        };
        Node {
            kind: NodeKind::Atom(expr),
            span: start..self.pos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exprs(src: &str) -> Vec<Expr> {
        parse_all(src).unwrap().iter().map(Node::to_expr).collect()
    }

    #[test]
    fn reads_atoms() {
        assert_eq!(
            exprs(r#"nil true false -42 "hi" sym :kw"#),
            vec![
                Expr::Nil,
                Expr::Bool(true),
                Expr::Bool(false),
                Expr::Int(-42),
                Expr::String("hi".into()),
                Expr::symbol("sym"),
                Expr::keyword("kw"),
            ]
        );
    }

    #[test]
    fn reads_nested_lists_and_quotes() {
        assert_eq!(
            exprs("(call (pid 0) '(:get_items))"),
            vec![Expr::List(vec![
                Expr::symbol("call"),
                Expr::List(vec![Expr::symbol("pid"), Expr::Int(0)]),
                Expr::quoted(Expr::List(vec![Expr::keyword("get_items")])),
            ])]
        );
    }

    #[test]
    fn display_matches_wire_syntax() {
        let src = "(call (pid 0) '(:get_items))";
        assert_eq!(exprs(src)[0].to_string(), src);
        assert_eq!(Expr::String(r"C:\tmp\".into()).to_string(), r#""C:\tmp\""#);
    }

    #[test]
    fn spans_cover_exact_source() {
        let src = "(:on_click   (spawn  \"x y\"))";
        let nodes = parse_all(src).unwrap();
        let items = nodes[0].as_list().unwrap();
        assert_eq!(items[1].source(src), "(spawn  \"x y\")");
    }

    #[test]
    fn strings_are_read_raw() {
        assert_eq!(
            exprs(r#"; leading comment
"C:\tmp" "dir\" "a\nb" ; trailing"#),
            vec![
                Expr::String(r"C:\tmp".into()),
                Expr::String(r"dir\".into()),
                Expr::String(r"a\nb".into()),
            ]
        );
    }

    #[test]
    fn lone_colon_is_a_symbol() {
        assert_eq!(exprs(":"), vec![Expr::symbol(":")]);
    }

    #[test]
    fn reports_syntax_errors_with_offsets() {
        assert_eq!(parse_all("(a (b)"), Err(ParseError::UnclosedList(0)));
        assert_eq!(parse_all("(a))"), Err(ParseError::UnexpectedClose(3)));
        assert_eq!(parse_all("(\"abc)"), Err(ParseError::UnterminatedString(1)));
        assert_eq!(parse_all("(a ')"), Err(ParseError::DanglingQuote(3)));
    }

    #[test]
    fn empty_input_has_no_nodes() {
        assert!(parse_all("  \n\t ").unwrap().is_empty());
    }
}
