//! The nom grammar.
//!
//! Precedence, loosest to tightest: `,` (conjunction, clause bodies and
//! queries only), prefix `\+`, the non-associative comparison level
//! (`= \= == \== is < > =< >=`), additive `+ -`, multiplicative
//! `* / // mod`, unary minus, primary terms.

use super::ParseError;
use crate::logic::{Clause, Term};
use crate::resolver::next_id;
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_while},
    character::complete::{char, digit1, multispace1, satisfy},
    combinator::{map, map_res, not, opt, recognize, value},
    multi::{fold_many0, many0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

/// Parse a program: a sequence of clauses and directives. Directives
/// (`:- Goal.`) are accepted and ignored. Anonymous `_` occurrences are
/// freshened so they never co-refer.
pub fn parse_program(input: &str) -> Result<Vec<Clause>, ParseError> {
    let mut clauses = Vec::new();
    let mut rest = input;
    loop {
        rest = skip_space(rest);
        if rest.is_empty() {
            break;
        }
        if let Ok((after, ())) = directive(rest) {
            rest = after;
            continue;
        }
        match clause(rest) {
            Ok((after, parsed)) => {
                if !parsed.head.is_callable() {
                    return Err(error_at(
                        input,
                        rest,
                        "clause head must be an atom or a compound term",
                    ));
                }
                clauses.push(Clause {
                    head: freshen_anonymous(parsed.head),
                    body: parsed.body.into_iter().map(freshen_anonymous).collect(),
                });
                rest = after;
            }
            Err(err) => return Err(convert_error(input, err)),
        }
    }
    Ok(clauses)
}

/// Parse a query: a conjunction of goals, with optional leading `?-` and
/// optional trailing `.`.
pub fn parse_query(input: &str) -> Result<Vec<Term>, ParseError> {
    let parsed: IResult<&str, Vec<Term>> = (|i| {
        let (i, _) = opt(ws(tag("?-")))(i)?;
        let (i, goals) = conjunction(i)?;
        let (i, _) = opt(ws(char('.')))(i)?;
        Ok((i, goals))
    })(input);

    match parsed {
        Ok((rest, goals)) => {
            let rest = skip_space(rest);
            if !rest.is_empty() {
                return Err(error_at(input, rest, "unexpected input after query"));
            }
            Ok(goals.into_iter().map(freshen_anonymous).collect())
        }
        Err(err) => Err(convert_error(input, err)),
    }
}

// === clauses ===

fn clause(i: &str) -> IResult<&str, Clause> {
    let (i, head) = term(i)?;
    let (i, neck) = opt(ws(tag(":-")))(i)?;
    if neck.is_some() {
        let (i, body) = conjunction(i)?;
        let (i, _) = ws(char('.'))(i)?;
        Ok((i, Clause::rule(head, body)))
    } else {
        let (i, _) = ws(char('.'))(i)?;
        Ok((i, Clause::fact(head)))
    }
}

fn directive(i: &str) -> IResult<&str, ()> {
    value((), tuple((ws(tag(":-")), conjunction, ws(char('.')))))(i)
}

fn conjunction(i: &str) -> IResult<&str, Vec<Term>> {
    separated_list1(ws(char(',')), term)(i)
}

// === the expression ladder ===

fn term(i: &str) -> IResult<&str, Term> {
    alt((negation, comparison))(i)
}

fn negation(i: &str) -> IResult<&str, Term> {
    map(preceded(ws(tag("\\+")), term), |goal| {
        Term::compound("\\+", vec![goal])
    })(i)
}

fn comparison(i: &str) -> IResult<&str, Term> {
    let (i, lhs) = additive(i)?;
    let (i, rest) = opt(pair(ws(comparison_op), additive))(i)?;
    Ok(match rest {
        Some((op, rhs)) => (i, Term::compound(op, vec![lhs, rhs])),
        None => (i, lhs),
    })
}

fn comparison_op(i: &str) -> IResult<&str, &str> {
    alt((
        tag("=<"),
        tag("=="),
        tag("\\=="),
        tag("\\="),
        tag(">="),
        tag("="),
        tag("<"),
        tag(">"),
        keyword("is"),
    ))(i)
}

fn additive(i: &str) -> IResult<&str, Term> {
    let (i, first) = multiplicative(i)?;
    fold_many0(
        pair(ws(alt((tag("+"), tag("-")))), multiplicative),
        move || first.clone(),
        |lhs, (op, rhs)| Term::compound(op, vec![lhs, rhs]),
    )(i)
}

fn multiplicative(i: &str) -> IResult<&str, Term> {
    let (i, first) = unary(i)?;
    fold_many0(
        pair(
            ws(alt((tag("//"), tag("*"), tag("/"), keyword("mod")))),
            unary,
        ),
        move || first.clone(),
        |lhs, (op, rhs)| Term::compound(op, vec![lhs, rhs]),
    )(i)
}

fn unary(i: &str) -> IResult<&str, Term> {
    alt((
        map(preceded(ws(char('-')), unary), |operand| match operand {
            // negative literals fold at parse time
            Term::Integer(v) => Term::int(-v),
            Term::Float(v) => Term::float(-v),
            other => Term::compound("-", vec![other]),
        }),
        primary,
    ))(i)
}

fn primary(i: &str) -> IResult<&str, Term> {
    ws(alt((
        parenthesised,
        list_term,
        string_term,
        float_literal,
        integer_literal,
        cut_literal,
        variable_term,
        atom_or_compound,
    )))(i)
}

fn parenthesised(i: &str) -> IResult<&str, Term> {
    delimited(char('('), term, ws(char(')')))(i)
}

fn cut_literal(i: &str) -> IResult<&str, Term> {
    value(Term::atom("!"), char('!'))(i)
}

// === leaf tokens ===

fn ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn lower_ident(i: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_lowercase()),
        take_while(ident_char),
    ))(i)
}

fn upper_ident(i: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_uppercase() || c == '_'),
        take_while(ident_char),
    ))(i)
}

/// A word operator like `is` or `mod`: the spelling must not continue as an
/// identifier.
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag(word), not(satisfy(ident_char)))
}

fn variable_term(i: &str) -> IResult<&str, Term> {
    map(upper_ident, |name| Term::var(name))(i)
}

fn atom_or_compound(i: &str) -> IResult<&str, Term> {
    let (i, name) = alt((map(lower_ident, str::to_string), quoted('\'')))(i)?;
    // the argument list must open immediately after the functor
    let (i, args) = opt(delimited(
        char('('),
        separated_list1(ws(char(',')), term),
        ws(char(')')),
    ))(i)?;
    Ok(match args {
        Some(args) => (i, Term::compound(name, args)),
        None => (i, Term::Atom(name)),
    })
}

fn string_term(i: &str) -> IResult<&str, Term> {
    map(quoted('"'), Term::Str)(i)
}

fn list_term(i: &str) -> IResult<&str, Term> {
    let (i, _) = char('[')(i)?;
    let (i, close) = opt(ws(char(']')))(i)?;
    if close.is_some() {
        return Ok((i, Term::nil()));
    }
    let (i, items) = separated_list1(ws(char(',')), term)(i)?;
    let (i, tail) = opt(preceded(ws(char('|')), term))(i)?;
    let (i, _) = ws(char(']'))(i)?;
    Ok((
        i,
        match tail {
            Some(tail) => Term::list_with_tail(items, tail),
            None => Term::list(items),
        },
    ))
}

fn integer_literal(i: &str) -> IResult<&str, Term> {
    map_res(digit1, |digits: &str| digits.parse::<i64>().map(Term::int))(i)
}

fn float_literal(i: &str) -> IResult<&str, Term> {
    map_res(
        recognize(tuple((digit1, char('.'), digit1))),
        |text: &str| text.parse::<f64>().map(Term::float),
    )(i)
}

/// Delimited text with C-style escapes, shared by `'atoms'` and
/// `"strings"`.
fn quoted(delim: char) -> impl Fn(&str) -> IResult<&str, String> {
    move |i: &str| {
        let (body, _) = char(delim)(i)?;
        let mut out = String::new();
        let mut chars = body.char_indices();
        while let Some((index, c)) = chars.next() {
            if c == delim {
                return Ok((&body[index + c.len_utf8()..], out));
            }
            if c == '\\' {
                match chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, 'r')) => out.push('\r'),
                    Some((_, '0')) => out.push('\0'),
                    Some((_, escaped)) => out.push(escaped),
                    None => break,
                }
            } else {
                out.push(c);
            }
        }
        Err(nom::Err::Error(nom::error::Error::new(
            i,
            nom::error::ErrorKind::Char,
        )))
    }
}

// === whitespace, comments, errors ===

fn sp(i: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            value((), pair(char('%'), opt(is_not("\n")))),
        ))),
    )(i)
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    preceded(sp, inner)
}

fn skip_space(i: &str) -> &str {
    sp(i).map(|(rest, ())| rest).unwrap_or(i)
}

fn error_at(input: &str, rest: &str, message: &str) -> ParseError {
    ParseError {
        offset: input.len() - rest.len(),
        message: message.to_string(),
    }
}

fn convert_error(input: &str, err: nom::Err<nom::error::Error<&str>>) -> ParseError {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => ParseError {
            offset: input.len() - e.input.len(),
            message: format!("unexpected input ({:?})", e.code),
        },
        nom::Err::Incomplete(_) => ParseError {
            offset: input.len(),
            message: "unexpected end of input".to_string(),
        },
    }
}

/// Replace every occurrence of the anonymous variable `_` with a fresh
/// `_G<n>` name. Each occurrence gets its own name, so two `_` in one
/// clause never co-refer; the `_` prefix keeps them out of variable
/// collection and solution reporting.
fn freshen_anonymous(term: Term) -> Term {
    match term {
        Term::Variable(name) if name == "_" => Term::var(format!("_G{}", next_id())),
        Term::Compound { functor, args } => Term::Compound {
            functor,
            args: args.into_iter().map(freshen_anonymous).collect(),
        },
        Term::List { items, tail } => Term::List {
            items: items.into_iter().map(freshen_anonymous).collect(),
            tail: tail.map(|t| Box::new(freshen_anonymous(*t))),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_clause(src: &str) -> Clause {
        let clauses = parse_program(src).unwrap();
        assert_eq!(clauses.len(), 1);
        clauses.into_iter().next().unwrap()
    }

    #[test]
    fn test_fact_and_rule() {
        let fact = one_clause("parent(tom, bob).");
        assert!(fact.is_fact());
        assert_eq!(
            fact.head,
            Term::compound("parent", vec![Term::atom("tom"), Term::atom("bob")])
        );

        let rule = one_clause("grandparent(X, Z) :- parent(X, Y), parent(Y, Z).");
        assert_eq!(rule.body.len(), 2);
        assert_eq!(
            rule.body[1],
            Term::compound("parent", vec![Term::var("Y"), Term::var("Z")])
        );
    }

    #[test]
    fn test_comments_and_whitespace() {
        let clauses = parse_program(
            "% a family database\nparent(tom, bob). % inline trailer\n\n% done\n",
        )
        .unwrap();
        assert_eq!(clauses.len(), 1);
    }

    #[test]
    fn test_directives_are_skipped() {
        let clauses = parse_program(":- discontiguous(test_case/1).\np(a).").unwrap();
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].head, Term::compound("p", vec![Term::atom("a")]));
    }

    #[test]
    fn test_literals() {
        let c = one_clause("data(42, -7, 3.5, \"hi\\n\", 'Quoted atom').");
        let Term::Compound { args, .. } = &c.head else {
            panic!("expected compound head");
        };
        assert_eq!(args[0], Term::int(42));
        assert_eq!(args[1], Term::int(-7));
        assert_eq!(args[2], Term::float(3.5));
        assert_eq!(args[3], Term::string("hi\n"));
        assert_eq!(args[4], Term::atom("Quoted atom"));
    }

    #[test]
    fn test_lists() {
        let c = one_clause("l([], [a, b], [H | T], [1, 2 | R]).");
        let Term::Compound { args, .. } = &c.head else {
            panic!("expected compound head");
        };
        assert_eq!(args[0], Term::nil());
        assert_eq!(args[1], Term::list(vec![Term::atom("a"), Term::atom("b")]));
        assert_eq!(
            args[2],
            Term::list_with_tail(vec![Term::var("H")], Term::var("T"))
        );
        assert_eq!(
            args[3],
            Term::list_with_tail(vec![Term::int(1), Term::int(2)], Term::var("R"))
        );
    }

    #[test]
    fn test_operator_precedence() {
        let goals = parse_query("X is (10 * 2 + 5) / 5 - 1").unwrap();
        assert_eq!(goals.len(), 1);
        let expected = Term::compound(
            "is",
            vec![
                Term::var("X"),
                Term::compound(
                    "-",
                    vec![
                        Term::compound(
                            "/",
                            vec![
                                Term::compound(
                                    "+",
                                    vec![
                                        Term::compound("*", vec![Term::int(10), Term::int(2)]),
                                        Term::int(5),
                                    ],
                                ),
                                Term::int(5),
                            ],
                        ),
                        Term::int(1),
                    ],
                ),
            ],
        );
        assert_eq!(goals[0], expected);
    }

    #[test]
    fn test_comparison_and_unification_operators() {
        let goals = parse_query("X = f(Y), X \\== Y, 1 < 2, 3 =< 3, A \\= b").unwrap();
        assert_eq!(goals.len(), 5);
        assert_eq!(
            goals[0],
            Term::compound("=", vec![Term::var("X"), Term::compound("f", vec![Term::var("Y")])])
        );
        assert_eq!(
            goals[1],
            Term::compound("\\==", vec![Term::var("X"), Term::var("Y")])
        );
        assert_eq!(goals[2], Term::compound("<", vec![Term::int(1), Term::int(2)]));
        assert_eq!(goals[3], Term::compound("=<", vec![Term::int(3), Term::int(3)]));
        assert_eq!(
            goals[4],
            Term::compound("\\=", vec![Term::var("A"), Term::atom("b")])
        );
    }

    #[test]
    fn test_negation_and_cut() {
        let goals = parse_query("\\+ fruit(carrot), !").unwrap();
        assert_eq!(
            goals[0],
            Term::compound("\\+", vec![Term::compound("fruit", vec![Term::atom("carrot")])])
        );
        assert_eq!(goals[1], Term::atom("!"));
    }

    #[test]
    fn test_mod_and_floor_division() {
        let goals = parse_query("X is 7 mod 3, Y is 7 // 2").unwrap();
        assert_eq!(
            goals[0],
            Term::compound(
                "is",
                vec![Term::var("X"), Term::compound("mod", vec![Term::int(7), Term::int(3)])]
            )
        );
        assert_eq!(
            goals[1],
            Term::compound(
                "is",
                vec![Term::var("Y"), Term::compound("//", vec![Term::int(7), Term::int(2)])]
            )
        );
        // modern(X) must not be read as `mod ern(X)`
        let goals = parse_query("modern(X)").unwrap();
        assert_eq!(goals[0], Term::compound("modern", vec![Term::var("X")]));
    }

    #[test]
    fn test_query_wrappers() {
        assert_eq!(
            parse_query("?- parent(tom, X).").unwrap(),
            parse_query("parent(tom, X)").unwrap()
        );
    }

    #[test]
    fn test_anonymous_variables_are_fresh_per_occurrence() {
        let clause = one_clause("pair(_, _).");
        let Term::Compound { args, .. } = &clause.head else {
            panic!("expected compound head");
        };
        let (Term::Variable(a), Term::Variable(b)) = (&args[0], &args[1]) else {
            panic!("expected variables");
        };
        assert_ne!(a, b);
        assert!(a.starts_with('_'));
        // and they stay out of variable collection
        assert!(clause.head.variables().is_empty());
    }

    #[test]
    fn test_parse_error_carries_offset() {
        let err = parse_program("p(a). q(").unwrap_err();
        assert!(err.offset >= 6, "offset {} should point at q(", err.offset);

        let err = parse_query("p(a) q(b)").unwrap_err();
        assert!(err.offset >= 4);
        assert!(err.to_string().contains("parse error"));
    }

    #[test]
    fn test_invalid_head_rejected() {
        let err = parse_program("3 :- p.").unwrap_err();
        assert!(err.message.contains("head"));
    }

    #[test]
    fn test_atom_goal_clause() {
        let clauses = parse_program("halt. go :- halt.").unwrap();
        assert_eq!(clauses[0].head, Term::atom("halt"));
        assert_eq!(clauses[1].body, vec![Term::atom("halt")]);
    }
}
