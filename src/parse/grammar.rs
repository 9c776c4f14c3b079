use winnow::combinator::{
    alt, cut_err, fail, not, opt, preceded, repeat, separated, terminated,
};
use winnow::error::{ContextError, ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_while};

use crate::types::{kind_of, OperatorKind, Rule, RuleValue};

use super::expr::Expr;

// -- Whitespace & keywords --------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_whitespace())
        .void()
        .parse_next(input)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// A keyword that is not the prefix of a longer identifier.
fn word<'i>(kw: &'static str) -> impl Parser<&'i str, (), ErrMode<ContextError>> {
    terminated(kw, not(one_of(is_ident_char))).void()
}

fn and_kw(input: &mut &str) -> ModalResult<()> {
    alt(("&&".void(), word("AND"), word("and"))).parse_next(input)
}

fn or_kw(input: &mut &str) -> ModalResult<()> {
    alt(("||".void(), word("OR"), word("or"))).parse_next(input)
}

fn not_kw(input: &mut &str) -> ModalResult<()> {
    alt((
        terminated("!", not('=')).void(),
        word("NOT"),
        word("not"),
    ))
    .parse_next(input)
}

/// Words that cannot be used as bare names.
pub(crate) const KEYWORDS: &[&str] = &[
    "AND", "and", "OR", "or", "NOT", "not", "true", "false", "is",
];

// -- Names ------------------------------------------------------------------

fn plain_name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    let checkpoint = input.checkpoint();
    let name = (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., is_ident_char),
    )
        .take()
        .parse_next(input)?;
    if KEYWORDS.contains(&name) {
        input.reset(&checkpoint);
        return Err(ErrMode::from_input(input));
    }
    Ok(name)
}

fn quoted_name(input: &mut &str) -> ModalResult<String> {
    '`'.parse_next(input)?;
    let mut s = String::new();
    loop {
        match any.parse_next(input)? {
            '`' => return Ok(s),
            '\\' => s.push(any.parse_next(input)?),
            c => s.push(c),
        }
    }
}

fn name(input: &mut &str) -> ModalResult<String> {
    alt((quoted_name, plain_name.map(str::to_owned))).parse_next(input)
}

// -- Values -----------------------------------------------------------------

fn string_literal(input: &mut &str) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = any.parse_next(input)?;
        match ch {
            '"' => return Ok(s),
            '\\' => {
                let esc = any.parse_next(input)?;
                match esc {
                    '"' => s.push('"'),
                    '\\' => s.push('\\'),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

fn number_literal<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        opt('-'),
        take_while(1.., |c: char| c.is_ascii_digit()),
        opt(('.', take_while(1.., |c: char| c.is_ascii_digit()))),
    )
        .take()
        .parse_next(input)
}

fn scalar(input: &mut &str) -> ModalResult<String> {
    ws.parse_next(input)?;
    alt((string_literal, number_literal.map(str::to_owned)))
        .context(StrContext::Expected(StrContextValue::Description("value")))
        .parse_next(input)
}

fn list(input: &mut &str) -> ModalResult<Vec<String>> {
    ws.parse_next(input)?;
    '['.parse_next(input)?;
    let items: Vec<String> = separated(0.., scalar, (ws, ',')).parse_next(input)?;
    ws.parse_next(input)?;
    cut_err(']')
        .context(StrContext::Expected(StrContextValue::CharLiteral(']')))
        .parse_next(input)?;
    Ok(items)
}

// -- Comparisons ------------------------------------------------------------

fn symbol_op(input: &mut &str) -> ModalResult<&'static str> {
    alt((
        "==".value("="),
        "!=".value("!="),
        "<=".value("<="),
        ">=".value(">="),
        "<".value("<"),
        ">".value(">"),
        "=".value("="),
    ))
    .parse_next(input)
}

fn null_check(input: &mut &str) -> ModalResult<&'static str> {
    (word("is"), ws, opt((word("not"), ws)), word("null"))
        .map(|(_, _, negated, _)| if negated.is_some() { "notNull" } else { "null" })
        .parse_next(input)
}

fn operator(input: &mut &str) -> ModalResult<String> {
    alt((
        symbol_op.map(str::to_owned),
        null_check.map(str::to_owned),
        name,
    ))
    .parse_next(input)
}

fn comparison(input: &mut &str) -> ModalResult<Rule> {
    let field = name.parse_next(input)?;
    ws.parse_next(input)?;
    let op = cut_err(operator)
        .context(StrContext::Expected(StrContextValue::Description(
            "operator",
        )))
        .parse_next(input)?;
    let value = match kind_of(&op) {
        OperatorKind::NoOperand => RuleValue::default(),
        OperatorKind::Membership => RuleValue::List(
            cut_err(list)
                .context(StrContext::Expected(StrContextValue::Description(
                    "list of values",
                )))
                .parse_next(input)?,
        ),
        OperatorKind::Scalar => RuleValue::Scalar(cut_err(scalar).parse_next(input)?),
    };
    Ok(Rule::new(&field, &op, value))
}

// -- Expressions (precedence: OR < AND < NOT < primary) ---------------------

/// Deepest parenthesized nesting accepted. Bounds the parser's recursion.
pub(crate) const MAX_NESTING: usize = 64;

fn too_deep(input: &mut &str) -> ModalResult<Expr> {
    cut_err(fail)
        .context(StrContext::Label("nesting"))
        .context(StrContext::Expected(StrContextValue::Description(
            "at most 64 nested groups",
        )))
        .parse_next(input)
}

fn paren(input: &mut &str, depth: usize) -> ModalResult<Expr> {
    '('.parse_next(input)?;
    if depth >= MAX_NESTING {
        return too_deep(input);
    }
    cut_err(terminated(|i: &mut &str| expr(i, depth + 1), (ws, ')')))
        .context(StrContext::Expected(StrContextValue::CharLiteral(')')))
        .parse_next(input)
}

fn primary(input: &mut &str, depth: usize) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    alt((
        (|i: &mut &str| paren(i, depth)).map(|inner| Expr::Paren {
            not: false,
            inner: Box::new(inner),
        }),
        word("true").value(Expr::Literal(true)),
        word("false").value(Expr::Literal(false)),
        comparison.map(Expr::Compare),
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "expression",
    )))
    .parse_next(input)
}

fn unary(input: &mut &str, depth: usize) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    if opt(not_kw).parse_next(input)?.is_some() {
        ws.parse_next(input)?;
        let inner = cut_err(|i: &mut &str| paren(i, depth))
            .context(StrContext::Expected(StrContextValue::CharLiteral('(')))
            .parse_next(input)?;
        Ok(Expr::Paren {
            not: true,
            inner: Box::new(inner),
        })
    } else {
        primary(input, depth)
    }
}

fn and_expr(input: &mut &str, depth: usize) -> ModalResult<Expr> {
    let first = unary(input, depth)?;
    let rest: Vec<Expr> = repeat(
        0..,
        preceded((ws, and_kw), cut_err(|i: &mut &str| unary(i, depth))),
    )
    .parse_next(input)?;
    if rest.is_empty() {
        return Ok(first);
    }
    let mut terms = vec![first];
    terms.extend(rest);
    Ok(Expr::And(terms))
}

fn or_expr(input: &mut &str, depth: usize) -> ModalResult<Expr> {
    let first = and_expr(input, depth)?;
    let rest: Vec<Expr> = repeat(
        0..,
        preceded((ws, or_kw), cut_err(|i: &mut &str| and_expr(i, depth))),
    )
    .parse_next(input)?;
    if rest.is_empty() {
        return Ok(first);
    }
    let mut terms = vec![first];
    terms.extend(rest);
    Ok(Expr::Or(terms))
}

fn expr(input: &mut &str, depth: usize) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    or_expr(input, depth)
}

// -- Top-level parser -------------------------------------------------------

/// A whole query. `None` for blank input.
pub(crate) fn query(input: &mut &str) -> ModalResult<Option<Expr>> {
    ws.parse_next(input)?;
    if input.is_empty() {
        return Ok(None);
    }
    let e = expr(input, 0)?;
    ws.parse_next(input)?;
    Ok(Some(e))
}
