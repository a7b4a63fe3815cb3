//! Parser for overpassify source text
//!
//! Accepts a Python-like subset: an optional decorated `def` whose body is
//! translated (or bare top-level statements), `for`/`if`/`elif`/`else` blocks
//! by indentation, assignments and expression statements. Produces
//! `surface::Stmt`s which `lower` then recognizes.
//!
//! Source is first split into logical lines (comments stripped, bracketed
//! continuations joined); winnow parses each line, and the block structure is
//! rebuilt from indentation.

use winnow::ascii::{digit1, multispace0};
use winnow::combinator::{alt, delimited, not, opt, preceded, repeat, separated, terminated};
use winnow::prelude::*;
use winnow::token::{one_of, take_until, take_while};

use crate::ast::surface::{Expr, Stmt, StmtKind, SurfaceArg};
use crate::ast::{BinOp, Literal, UnaryOp};

type PResult<T> = winnow::ModalResult<T>;

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (line {}, column {}, offset {})",
            self.message, self.line, self.column, self.offset
        )
    }
}

impl std::error::Error for ParseError {}

/// Parse a source function (or bare statements) into surface statements
pub fn parse(source: &str) -> Result<Vec<Stmt>, ParseError> {
    let lines = logical_lines(source)?;
    let mut parser = BlockParser {
        source,
        lines: &lines,
        pos: 0,
    };
    parser.program()
}

/// Parse a single expression
pub fn parse_expr(input: &str) -> Result<Expr, ParseError> {
    let input = input.trim();
    let mut stream = input;
    match expr.parse_next(&mut stream) {
        Ok(parsed) => {
            if stream.trim().is_empty() {
                Ok(parsed)
            } else {
                let offset = trailing_input_offset(input, stream);
                Err(build_parse_error(
                    "unexpected trailing input".to_string(),
                    input,
                    offset,
                ))
            }
        }
        Err(e) => {
            let offset = input.len().saturating_sub(stream.len());
            Err(build_parse_error(format!("{:?}", e), input, offset))
        }
    }
}

fn build_parse_error(message: String, input: &str, offset: usize) -> ParseError {
    let (line, column) = offset_to_line_column(input, offset);
    ParseError {
        message,
        offset,
        line,
        column,
    }
}

fn offset_to_line_column(input: &str, offset: usize) -> (usize, usize) {
    let bounded = offset.min(input.len());
    let mut line = 1usize;
    let mut column = 1usize;

    for ch in input[..bounded].chars() {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    (line, column)
}

fn trailing_input_offset(input: &str, trailing: &str) -> usize {
    let base = input.len().saturating_sub(trailing.len());
    let non_ws = trailing
        .char_indices()
        .find(|(_, ch)| !ch.is_whitespace())
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    base + non_ws
}

// ============ Logical lines ============

#[derive(Debug)]
struct Line {
    /// Indentation width of the first physical line
    indent: usize,
    /// Statement text, comments removed, continuation lines joined
    text: String,
    /// 1-based number of the first physical line
    number: usize,
    /// Byte offset of `text` in the source
    offset: usize,
}

fn logical_lines(source: &str) -> Result<Vec<Line>, ParseError> {
    let mut lines = Vec::new();
    let mut current: Option<Line> = None;
    let mut depth = 0usize;
    let mut quote: Option<&'static str> = None;
    let mut offset = 0usize;

    for (index, raw) in source.split('\n').enumerate() {
        let line_offset = offset;
        offset += raw.len() + 1;
        let raw = raw.strip_suffix('\r').unwrap_or(raw);

        let content = if current.is_some() {
            raw
        } else {
            let trimmed = raw.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            current = Some(Line {
                indent: indentation(raw),
                text: String::new(),
                number: index + 1,
                offset: line_offset + (raw.len() - trimmed.len()),
            });
            trimmed
        };
        let Some(line) = current.as_mut() else {
            continue;
        };

        let mut chars = content.char_indices();
        while let Some((i, c)) = chars.next() {
            match quote {
                Some(delimiter) => {
                    line.text.push(c);
                    if c == '\\' {
                        if let Some((_, escaped)) = chars.next() {
                            line.text.push(escaped);
                        }
                    } else if content[i..].starts_with(delimiter) {
                        for _ in 1..delimiter.len() {
                            if let Some((_, next)) = chars.next() {
                                line.text.push(next);
                            }
                        }
                        quote = None;
                    }
                }
                None => match c {
                    '#' => break,
                    '"' | '\'' => {
                        let delimiter = string_delimiter(&content[i..], c);
                        line.text.push_str(delimiter);
                        for _ in 1..delimiter.len() {
                            chars.next();
                        }
                        quote = Some(delimiter);
                    }
                    '(' | '[' | '{' => {
                        depth += 1;
                        line.text.push(c);
                    }
                    ')' | ']' | '}' => {
                        depth = depth.saturating_sub(1);
                        line.text.push(c);
                    }
                    _ => line.text.push(c),
                },
            }
        }

        if let Some(delimiter) = quote
            && delimiter.len() == 1
        {
            return Err(build_parse_error(
                "unterminated string literal".to_string(),
                source,
                line_offset,
            ));
        }

        let trimmed_len = line.text.trim_end().len();
        line.text.truncate(trimmed_len);
        let explicit_join = quote.is_none() && line.text.ends_with('\\');
        if explicit_join {
            line.text.pop();
        }
        if depth > 0 || quote.is_some() || explicit_join {
            line.text.push('\n');
            continue;
        }
        if let Some(done) = current.take() {
            lines.push(done);
        }
    }

    if let Some(unfinished) = current {
        return Err(build_parse_error(
            "unexpected end of input (unclosed bracket or string)".to_string(),
            source,
            unfinished.offset,
        ));
    }
    Ok(lines)
}

fn string_delimiter(rest: &str, quote: char) -> &'static str {
    match quote {
        '"' if rest.starts_with("\"\"\"") => "\"\"\"",
        '\'' if rest.starts_with("'''") => "'''",
        '"' => "\"",
        _ => "'",
    }
}

fn indentation(raw: &str) -> usize {
    let mut width = 0;
    for c in raw.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / 8 + 1) * 8,
            _ => break,
        }
    }
    width
}

// ============ Blocks ============

struct BlockParser<'a> {
    source: &'a str,
    lines: &'a [Line],
    pos: usize,
}

/// Text left after a compound statement's `:` and where it starts
struct Header<'a, O> {
    value: O,
    rest: &'a str,
    rest_offset: usize,
}

impl<'a> BlockParser<'a> {
    fn peek(&self) -> Option<&'a Line> {
        self.lines.get(self.pos)
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> ParseError {
        build_parse_error(message.into(), self.source, offset)
    }

    fn program(&mut self) -> Result<Vec<Stmt>, ParseError> {
        // Decorators carry no meaning for translation
        while let Some(line) = self.peek()
            && line.text.starts_with('@')
        {
            self.pos += 1;
        }
        let Some(first) = self.peek() else {
            return Ok(Vec::new());
        };

        let body = if starts_with_keyword(&first.text, "def") {
            self.pos += 1;
            let header = self.header(first, def_header)?;
            self.suite(first, &header)?
        } else {
            self.block(first.indent)?
        };

        if let Some(extra) = self.peek() {
            let message = if starts_with_keyword(&extra.text, "def") {
                "only a single function definition is supported"
            } else {
                "unexpected statement after the end of the body"
            };
            return Err(self.error_at(extra.offset, message));
        }
        Ok(body)
    }

    fn block(&mut self, indent: usize) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        while let Some(line) = self.peek() {
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(self.error_at(line.offset, "unexpected indent"));
            }
            stmts.push(self.statement(line)?);
        }
        Ok(stmts)
    }

    fn statement(&mut self, line: &'a Line) -> Result<Stmt, ParseError> {
        self.pos += 1;
        let text = line.text.as_str();

        let kind = if starts_with_keyword(text, "for") {
            let header = self.header(line, for_header)?;
            let body = self.suite(line, &header)?;
            let orelse = self.else_clause(line)?;
            let (target, iter) = header.value;
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
            }
        } else if starts_with_keyword(text, "if") {
            self.if_statement(line, "if")?
        } else if starts_with_keyword(text, "elif") || starts_with_keyword(text, "else") {
            return Err(self.error_at(line.offset, "`else` without a matching `if` or `for`"));
        } else if let Some(word) = UNSUPPORTED_STATEMENTS
            .iter()
            .find(|word| starts_with_keyword(text, word))
        {
            return Err(self.error_at(line.offset, format!("`{word}` statements are not supported")));
        } else {
            self.simple(text, line.offset)?
        };

        Ok(Stmt {
            kind,
            line: line.number,
        })
    }

    fn if_statement(&mut self, line: &'a Line, word: &'static str) -> Result<StmtKind, ParseError> {
        let header = self.header(line, conditional_header(word))?;
        let body = self.suite(line, &header)?;
        let orelse = match self.peek() {
            Some(next) if next.indent == line.indent && starts_with_keyword(&next.text, "elif") => {
                self.pos += 1;
                let kind = self.if_statement(next, "elif")?;
                vec![Stmt {
                    kind,
                    line: next.number,
                }]
            }
            _ => self.else_clause(line)?,
        };
        Ok(StmtKind::If {
            test: header.value,
            body,
            orelse,
        })
    }

    fn else_clause(&mut self, owner: &Line) -> Result<Vec<Stmt>, ParseError> {
        match self.peek() {
            Some(next) if next.indent == owner.indent && starts_with_keyword(&next.text, "else") => {
                self.pos += 1;
                let header = self.header(next, else_header)?;
                self.suite(next, &header)
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Body of a compound statement: inline after the colon or an indented block
    fn suite<O>(&mut self, owner: &Line, header: &Header<'a, O>) -> Result<Vec<Stmt>, ParseError> {
        if !header.rest.is_empty() {
            let kind = self.simple(header.rest, header.rest_offset)?;
            return Ok(vec![Stmt {
                kind,
                line: owner.number,
            }]);
        }
        match self.peek() {
            Some(next) if next.indent > owner.indent => self.block(next.indent),
            _ => Err(self.error_at(
                owner.offset + owner.text.len(),
                "expected an indented block",
            )),
        }
    }

    fn header<O>(
        &self,
        line: &'a Line,
        mut parser: impl FnMut(&mut &'a str) -> PResult<O>,
    ) -> Result<Header<'a, O>, ParseError> {
        let text: &'a str = line.text.as_str();
        let mut stream = text;
        match parser.parse_next(&mut stream) {
            Ok(value) => {
                let rest = stream.trim();
                let rest_offset = line.offset + trailing_input_offset(text, stream);
                Ok(Header {
                    value,
                    rest,
                    rest_offset,
                })
            }
            Err(e) => Err(self.error_at(
                line.offset + text.len().saturating_sub(stream.len()),
                format!("{:?}", e),
            )),
        }
    }

    fn simple(&self, text: &str, offset: usize) -> Result<StmtKind, ParseError> {
        let mut stream = text;
        match simple_stmt.parse_next(&mut stream) {
            Ok(kind) if stream.trim().is_empty() => Ok(kind),
            Ok(_) => Err(self.error_at(
                offset + trailing_input_offset(text, stream),
                "unexpected trailing input",
            )),
            Err(e) => Err(self.error_at(
                offset + text.len().saturating_sub(stream.len()),
                format!("{:?}", e),
            )),
        }
    }
}

const UNSUPPORTED_STATEMENTS: [&str; 12] = [
    "def", "class", "while", "return", "import", "from", "with", "try", "del", "global",
    "raise", "lambda",
];

const RESERVED_WORDS: [&str; 35] = [
    "and", "or", "not", "if", "else", "elif", "for", "in", "is", "True", "False", "None",
    "lambda", "def", "return", "while", "pass", "break", "continue", "class", "import", "from",
    "with", "as", "del", "global", "yield", "try", "except", "finally", "raise", "assert",
    "nonlocal", "async", "await",
];

fn starts_with_keyword(text: &str, word: &str) -> bool {
    text.strip_prefix(word)
        .is_some_and(|rest| !rest.starts_with(is_ident_char))
}

// ============ Statement lines ============

fn def_header(input: &mut &str) -> PResult<()> {
    (
        keyword("def"),
        ws,
        ident_str,
        ws,
        delimited('(', take_while(0.., |c: char| c != ')'), ')'),
        ws,
        opt(("->", take_while(0.., |c: char| c != ':'))),
        ':',
    )
        .void()
        .parse_next(input)
}

fn for_header(input: &mut &str) -> PResult<(Expr, Expr)> {
    (
        keyword("for"),
        ws,
        target_list,
        ws,
        keyword("in"),
        ws,
        expr,
        ws,
        ':',
    )
        .map(|(_, _, target, _, _, _, iter, _, _)| (target, iter))
        .parse_next(input)
}

fn conditional_header<'a>(word: &'static str) -> impl FnMut(&mut &'a str) -> PResult<Expr> {
    move |input: &mut &'a str| {
        delimited((keyword(word), ws), expr, (ws, ':')).parse_next(input)
    }
}

fn else_header(input: &mut &str) -> PResult<()> {
    (keyword("else"), ws, ':').void().parse_next(input)
}

fn simple_stmt(input: &mut &str) -> PResult<StmtKind> {
    alt((
        keyword("pass").value(StmtKind::Pass),
        keyword("break").value(StmtKind::Break),
        keyword("continue").value(StmtKind::Continue),
        assignment,
        expr.map(StmtKind::Expr),
    ))
    .parse_next(input)
}

fn assignment(input: &mut &str) -> PResult<StmtKind> {
    let targets: Vec<Expr> =
        repeat(1.., terminated(target_list, (ws, '=', not('='), ws))).parse_next(input)?;
    let value = expr.parse_next(input)?;
    Ok(StmtKind::Assign { targets, value })
}

/// `a` or `a, b`
fn target_list(input: &mut &str) -> PResult<Expr> {
    let first = postfix_expr.parse_next(input)?;
    let rest: Vec<Expr> = repeat(0.., preceded((ws, ','), postfix_expr)).parse_next(input)?;
    if rest.is_empty() {
        Ok(first)
    } else {
        let mut items = vec![first];
        items.extend(rest);
        Ok(Expr::Tuple(items))
    }
}

// ============ Top-level expression (handles precedence) ============

pub(crate) fn expr(input: &mut &str) -> PResult<Expr> {
    ternary.parse_next(input)
}

fn ternary(input: &mut &str) -> PResult<Expr> {
    let body = or_expr.parse_next(input)?;
    let branch = opt((
        ws,
        keyword("if"),
        ws,
        or_expr,
        ws,
        keyword("else"),
        ws,
        ternary,
    ))
    .parse_next(input)?;
    match branch {
        Some((_, _, _, test, _, _, _, orelse)) => Ok(Expr::IfExp {
            test: Box::new(test),
            body: Box::new(body),
            orelse: Box::new(orelse),
        }),
        None => Ok(body),
    }
}

fn or_expr(input: &mut &str) -> PResult<Expr> {
    let first = and_expr.parse_next(input)?;
    let rest: Vec<Expr> =
        repeat(0.., preceded((ws, keyword("or"), ws), and_expr)).parse_next(input)?;
    Ok(rest.into_iter().fold(first, |l, r| {
        Expr::BinaryOp(Box::new(l), BinOp::Or, Box::new(r))
    }))
}

fn and_expr(input: &mut &str) -> PResult<Expr> {
    let first = not_expr.parse_next(input)?;
    let rest: Vec<Expr> =
        repeat(0.., preceded((ws, keyword("and"), ws), not_expr)).parse_next(input)?;
    Ok(rest.into_iter().fold(first, |l, r| {
        Expr::BinaryOp(Box::new(l), BinOp::And, Box::new(r))
    }))
}

fn not_expr(input: &mut &str) -> PResult<Expr> {
    alt((
        preceded((ws, keyword("not"), ws), not_expr)
            .map(|e| Expr::UnaryOp(UnaryOp::Not, Box::new(e))),
        cmp_expr,
    ))
    .parse_next(input)
}

fn cmp_expr(input: &mut &str) -> PResult<Expr> {
    let left = add_expr.parse_next(input)?;
    let rest: Option<(BinOp, Expr)> =
        opt((ws, cmp_op, ws, add_expr).map(|(_, op, _, e)| (op, e))).parse_next(input)?;
    match rest {
        Some((op, right)) => Ok(Expr::BinaryOp(Box::new(left), op, Box::new(right))),
        None => Ok(left),
    }
}

fn cmp_op(input: &mut &str) -> PResult<BinOp> {
    alt((
        "==".value(BinOp::Eq),
        "!=".value(BinOp::Ne),
        "<=".value(BinOp::Le),
        ">=".value(BinOp::Ge),
        "<".value(BinOp::Lt),
        ">".value(BinOp::Gt),
    ))
    .parse_next(input)
}

fn add_expr(input: &mut &str) -> PResult<Expr> {
    let first = mul_expr.parse_next(input)?;
    let rest: Vec<(BinOp, Expr)> =
        repeat(0.., (ws, add_op, ws, mul_expr).map(|(_, op, _, e)| (op, e))).parse_next(input)?;
    Ok(rest.into_iter().fold(first, |l, (op, r)| {
        Expr::BinaryOp(Box::new(l), op, Box::new(r))
    }))
}

fn add_op(input: &mut &str) -> PResult<BinOp> {
    alt(('+'.value(BinOp::Add), '-'.value(BinOp::Sub))).parse_next(input)
}

fn mul_expr(input: &mut &str) -> PResult<Expr> {
    let first = unary_expr.parse_next(input)?;
    let rest: Vec<(BinOp, Expr)> = repeat(
        0..,
        (ws, mul_op, ws, unary_expr).map(|(_, op, _, e)| (op, e)),
    )
    .parse_next(input)?;
    Ok(rest.into_iter().fold(first, |l, (op, r)| {
        Expr::BinaryOp(Box::new(l), op, Box::new(r))
    }))
}

fn mul_op(input: &mut &str) -> PResult<BinOp> {
    alt((
        "//".value(BinOp::FloorDiv),
        '*'.value(BinOp::Mul),
        '/'.value(BinOp::Div),
        '%'.value(BinOp::Mod),
    ))
    .parse_next(input)
}

fn unary_expr(input: &mut &str) -> PResult<Expr> {
    alt((
        preceded((ws, '-', ws), unary_expr).map(|e| Expr::UnaryOp(UnaryOp::Neg, Box::new(e))),
        preceded((ws, '+', ws), unary_expr),
        postfix_expr,
    ))
    .parse_next(input)
}

// ============ Postfix expressions (.attr, (call), [index]) ============

enum Postfix {
    Attr(String),
    Call(Vec<SurfaceArg>),
    Index(Expr),
}

fn postfix_expr(input: &mut &str) -> PResult<Expr> {
    let base = primary.parse_next(input)?;
    let ops: Vec<Postfix> = repeat(0.., postfix_op).parse_next(input)?;

    Ok(ops.into_iter().fold(base, |acc, op| match op {
        Postfix::Attr(name) => Expr::Attr(Box::new(acc), name),
        Postfix::Call(args) => Expr::Call(Box::new(acc), args),
        Postfix::Index(index) => Expr::Subscript(Box::new(acc), Box::new(index)),
    }))
}

fn postfix_op(input: &mut &str) -> PResult<Postfix> {
    preceded(ws, alt((attr_access, call_expr, subscript))).parse_next(input)
}

fn attr_access(input: &mut &str) -> PResult<Postfix> {
    preceded('.', ident_str)
        .map(Postfix::Attr)
        .parse_next(input)
}

fn call_expr(input: &mut &str) -> PResult<Postfix> {
    delimited(
        '(',
        (ws, opt(call_args), ws).map(|(_, args, _)| args.unwrap_or_default()),
        ')',
    )
    .map(Postfix::Call)
    .parse_next(input)
}

fn subscript(input: &mut &str) -> PResult<Postfix> {
    delimited(('[', ws), expr, (ws, ']'))
        .map(Postfix::Index)
        .parse_next(input)
}

fn call_args(input: &mut &str) -> PResult<Vec<SurfaceArg>> {
    terminated(
        separated(1.., call_arg, (ws, ',', ws)),
        opt((ws, ',')), // trailing comma
    )
    .parse_next(input)
}

fn call_arg(input: &mut &str) -> PResult<SurfaceArg> {
    alt((
        // keyword arg: name=expr (but not name == expr)
        (ident_str, ws, '=', not('='), ws, expr)
            .map(|(name, _, _, _, _, e)| SurfaceArg::Keyword(name, e)),
        // positional arg
        expr.map(SurfaceArg::Positional),
    ))
    .parse_next(input)
}

// ============ Primary expressions ============

fn primary(input: &mut &str) -> PResult<Expr> {
    preceded(
        ws,
        alt((
            paren_expr,
            list_expr,
            "...".value(Expr::Ellipsis),
            literal.map(Expr::Literal),
            name,
        )),
    )
    .parse_next(input)
}

/// `(expr)` or a tuple: `()`, `(a,)`, `(a, b)`
fn paren_expr(input: &mut &str) -> PResult<Expr> {
    ('(', ws).parse_next(input)?;
    if opt(')').parse_next(input)?.is_some() {
        return Ok(Expr::Tuple(Vec::new()));
    }
    let first = expr.parse_next(input)?;
    let rest: Vec<Expr> = repeat(0.., preceded((ws, ',', ws), expr)).parse_next(input)?;
    let trailing = opt((ws, ',')).parse_next(input)?;
    (ws, ')').parse_next(input)?;

    if rest.is_empty() && trailing.is_none() {
        Ok(first)
    } else {
        let mut items = vec![first];
        items.extend(rest);
        Ok(Expr::Tuple(items))
    }
}

fn list_expr(input: &mut &str) -> PResult<Expr> {
    delimited(
        ('[', ws),
        opt(terminated(
            separated(1.., expr, (ws, ',', ws)),
            opt((ws, ',')),
        ))
        .map(|items: Option<Vec<Expr>>| items.unwrap_or_default()),
        (ws, ']'),
    )
    .map(Expr::List)
    .parse_next(input)
}

// ============ Identifiers ============

fn name(input: &mut &str) -> PResult<Expr> {
    ident_str
        .verify(|s: &str| !RESERVED_WORDS.contains(&s))
        .map(Expr::Name)
        .parse_next(input)
}

fn ident_str(input: &mut &str) -> PResult<String> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., is_ident_char),
    )
        .take()
        .map(|s: &str| s.to_string())
        .parse_next(input)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A reserved word not followed by further identifier characters
fn keyword<'a>(word: &'static str) -> impl FnMut(&mut &'a str) -> PResult<&'a str> {
    move |input: &mut &'a str| terminated(word, not(one_of(is_ident_char))).parse_next(input)
}

// ============ Literals ============

fn literal(input: &mut &str) -> PResult<Literal> {
    alt((
        keyword("True").value(Literal::Bool(true)),
        keyword("False").value(Literal::Bool(false)),
        keyword("None").value(Literal::Null),
        float_lit,
        int_lit,
        string_lit,
    ))
    .parse_next(input)
}

fn int_lit(input: &mut &str) -> PResult<Literal> {
    digit1
        .try_map(|s: &str| s.parse::<i64>())
        .map(Literal::Int)
        .parse_next(input)
}

fn float_lit(input: &mut &str) -> PResult<Literal> {
    (digit1, '.', digit1)
        .take()
        .try_map(|s: &str| s.parse::<f64>())
        .map(Literal::Float)
        .parse_next(input)
}

fn string_lit(input: &mut &str) -> PResult<Literal> {
    let raw = opt(one_of(['r', 'R'])).parse_next(input)?.is_some();
    alt((
        delimited("\"\"\"", take_until(0.., "\"\"\""), "\"\"\"").map(|s: &str| s.to_string()),
        delimited("'''", take_until(0.., "'''"), "'''").map(|s: &str| s.to_string()),
        delimited('"', string_contents('"', raw), '"'),
        delimited('\'', string_contents('\'', raw), '\''),
    ))
    .map(Literal::String)
    .parse_next(input)
}

fn string_contents<'a>(quote: char, raw: bool) -> impl FnMut(&mut &'a str) -> PResult<String> {
    move |input: &mut &'a str| {
        let text: &'a str = *input;
        let mut result = String::new();
        let mut chars = text.char_indices();
        loop {
            let Some((i, c)) = chars.next() else {
                return Err(backtrack());
            };
            if c == quote {
                *input = &text[i..];
                return Ok(result);
            }
            if c != '\\' {
                result.push(c);
                continue;
            }
            let Some((_, escaped)) = chars.next() else {
                return Err(backtrack());
            };
            if raw {
                result.push('\\');
                result.push(escaped);
                continue;
            }
            match escaped {
                'n' => result.push('\n'),
                't' => result.push('\t'),
                'r' => result.push('\r'),
                '\\' => result.push('\\'),
                '"' => result.push('"'),
                '\'' => result.push('\''),
                '0' => result.push('\0'),
                // Unknown escapes keep their backslash: "\d" stays \d
                other => {
                    result.push('\\');
                    result.push(other);
                }
            }
        }
    }
}

fn backtrack() -> winnow::error::ErrMode<winnow::error::ContextError> {
    winnow::error::ErrMode::Backtrack(winnow::error::ContextError::new())
}

// ============ Whitespace ============

fn ws(input: &mut &str) -> PResult<()> {
    multispace0.void().parse_next(input)
}

// ============ Sanity Tests ============
// End-to-end behavior is covered in tests/integration.rs
