// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::ops::Range;

use chumsky::{
    error::Simple,
    primitive::{end, filter, just},
    text::{self, TextParser},
    Parser,
};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    Start,
    End,
    String(String),
    Ident(String),
    Variable(String),
    Dot,
    Comma,
    Eq,
    Ne,
    Gt,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Integer(i64),
    Real(String),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Token::Start => f.write_str("${{"),
            Token::End => f.write_str("}}"),
            Token::String(value) => write!(f, "{:?}", value),
            Token::Ident(name) => f.write_str(name),
            Token::Variable(name) => write!(f, "${}", name),
            Token::Dot => f.write_str("."),
            Token::Comma => f.write_str(","),
            Token::Eq => f.write_str("=="),
            Token::Ne => f.write_str("!="),
            Token::Gt => f.write_str(">"),
            Token::LBracket => f.write_str("["),
            Token::RBracket => f.write_str("]"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Integer(i) => write!(f, "{}", i),
            Token::Real(string) => f.write_str(string),
        }
    }
}

pub fn gen_lexer() -> impl Parser<char, Vec<(Token, Range<usize>)>, Error = Simple<char>> {
    let delimiter = just("${{").to(Token::Start).or(just("}}").to(Token::End));

    let frac = just('.').chain(text::digits(10));

    let number = just('-')
        .or_not()
        .chain::<char, _, _>(text::int(10))
        .chain::<char, _, _>(frac.or_not().flatten())
        .collect::<String>()
        .map(|string| match string.parse::<i64>() {
            Ok(i) => Token::Integer(i),
            Err(_) => Token::Real(string),
        })
        .labelled("number");

    // Templates often live inside quoted YAML scalars, so both quote styles are accepted.
    let string = quoted('"').or(quoted('\'')).map(Token::String).labelled("string");

    let word = text::ident().map(Token::Ident);
    let variable = just('$').ignore_then(text::ident()).map(Token::Variable);

    let operator = just("==")
        .to(Token::Eq)
        .or(just("!=").to(Token::Ne))
        .or(just('>').to(Token::Gt))
        .labelled("operator");

    let punctuation = just('.')
        .to(Token::Dot)
        .or(just(',').to(Token::Comma))
        .or(just('[').to(Token::LBracket))
        .or(just(']').to(Token::RBracket))
        .or(just('(').to(Token::LParen))
        .or(just(')').to(Token::RParen));

    let token = delimiter
        .or(string)
        .or(number)
        .or(variable)
        .or(word)
        .or(punctuation)
        .or(operator);

    token
        .map_with_span(|tok, span| (tok, span))
        .padded()
        .repeated()
        .then_ignore(end())
}

fn quoted(quote: char) -> impl Parser<char, String, Error = Simple<char>> + Clone {
    let escape = just('\\').ignore_then(
        just('\\')
            .or(just(quote))
            .or(just('n').to('\n'))
            .or(just('t').to('\t')),
    );

    just(quote)
        .ignore_then(filter(move |c: &char| *c != '\\' && *c != quote).or(escape).repeated())
        .then_ignore(just(quote))
        .collect::<String>()
}
