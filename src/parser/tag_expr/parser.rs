// Copyright (c) Chris Gunn.
// Licensed under the MIT license.


use std::ops::Range;

use chumsky::{prelude::*, Stream};

use crate::ast::{Expr, ExprCall, ExprIndex, ExprOpBinary, ExprQuery, Helper, Tag, TagEach};

use super::lexer::{gen_lexer, Token};

/// Parses the contents of one `${{ ... }}` tag.
pub struct TagExprParser {
    lexer: Box<dyn Parser<char, Vec<(Token, Range<usize>)>, Error = Simple<char>>>,
    parser: Box<dyn Parser<Token, Tag, Error = Simple<Token>>>,
}

impl TagExprParser {
    pub fn new() -> TagExprParser {
        let lexer = gen_lexer();
        let parser = gen_tag_parser();
        TagExprParser {
            lexer: Box::new(lexer),
            parser: Box::new(parser),
        }
    }

    pub fn parse(&self, tag_str: &str) -> Result<Tag, Vec<String>> {
        let tokens = self
            .lexer
            .parse(tag_str)
            .map_err(|errs| errs.iter().map(|err| err.to_string()).collect::<Vec<_>>())?;

        let tag_str_len = tag_str.chars().count();
        let eoi = tag_str_len..tag_str_len + 1;

        self.parser
            .parse(Stream::from_iter(eoi, tokens.into_iter()))
            .map_err(|errs| errs.iter().map(|err| err.to_string()).collect())
    }
}

fn keyword(name: &str) -> impl Parser<Token, Token, Error = Simple<Token>> + Clone {
    just(Token::Ident(name.to_string()))
}

fn binary(left: Expr, right: Expr) -> ExprOpBinary {
    ExprOpBinary {
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn gen_tag_parser() -> impl Parser<Token, Tag, Error = Simple<Token>> {
    let expr = recursive(|expr| {
        let value = select! {
            Token::String(value) => Expr::String(value),
            Token::Integer(value) => Expr::Integer(value),
            Token::Real(value) => Expr::Real(value),
            Token::Ident(ident) if ident == "true" => Expr::True,
            Token::Ident(ident) if ident == "false" => Expr::False,
            Token::Ident(ident) if ident == "null" => Expr::Null,
        }
        .labelled("value");

        let ident = select! { Token::Ident(name) => name }.labelled("identifier");

        enum SubQuery {
            Field(String),
            Index(Expr),
        }

        let subquery_fold = |object: ExprQuery, subquery: SubQuery| -> ExprQuery {
            let index = match subquery {
                SubQuery::Field(name) => Expr::String(name),
                SubQuery::Index(index) => index,
            };
            ExprQuery::Index(ExprIndex {
                object: Box::new(object),
                index: Box::new(index),
            })
        };

        let subquery_field = just(Token::Dot).ignore_then(ident.clone()).map(SubQuery::Field);

        let subquery_index = expr
            .clone()
            .delimited_by(just(Token::LBracket), just(Token::RBracket))
            .map(SubQuery::Index);

        let subquery = subquery_field.or(subquery_index);

        // `.` alone is the record root; `.kids` reads its first field directly.
        let query_root = just(Token::Dot)
            .ignore_then(ident.clone().or_not())
            .map(move |first| match first {
                Some(name) => subquery_fold(ExprQuery::Root, SubQuery::Field(name)),
                None => ExprQuery::Root,
            });

        let query_var = select! { Token::Variable(name) => ExprQuery::Var(name) }.labelled("variable");

        let query = query_root
            .or(query_var)
            .then(subquery.repeated())
            .foldl(subquery_fold)
            .map(Expr::Query);

        let call = ident
            .then(
                expr.clone()
                    .separated_by(just(Token::Comma))
                    .allow_trailing()
                    .delimited_by(just(Token::LParen), just(Token::RParen)),
            )
            .try_map(|(name, args), span| match Helper::from_name(&name) {
                Some(helper) => Ok(Expr::Call(ExprCall { helper, args })),
                None => Err(Simple::custom(span, format!("unknown helper '{}'", name))),
            });

        let group = expr.clone().delimited_by(just(Token::LParen), just(Token::RParen));

        let atom = call.or(value).or(query).or(group);

        let unary = keyword("not")
            .repeated()
            .then(atom)
            .foldr(|_, operand| Expr::Not(Box::new(operand)));

        let compare_op = just(Token::Eq).or(just(Token::Ne)).or(just(Token::Gt));

        let compare = unary
            .clone()
            .then(compare_op.then(unary).repeated())
            .foldl(|left, (token, right)| match token {
                Token::Eq => Expr::Eq(binary(left, right)),
                Token::Ne => Expr::Ne(binary(left, right)),
                Token::Gt => Expr::Gt(binary(left, right)),
                _ => unreachable!(),
            });

        let conjunction = compare
            .clone()
            .then(keyword("and").ignore_then(compare).repeated())
            .foldl(|left, right| Expr::And(binary(left, right)));

        conjunction
            .clone()
            .then(keyword("or").ignore_then(conjunction).repeated())
            .foldl(|left, right| Expr::Or(binary(left, right)))
    });

    let binding = select! { Token::Variable(name) => name }.labelled("binding");

    let each_tail = expr
        .clone()
        .then_ignore(keyword("as"))
        .then(binding)
        .map(|(iterable, binding)| TagEach { iterable, binding });

    let each = keyword("each").ignore_then(each_tail.clone()).map(Tag::Each);
    let each_group = keyword("each_group").ignore_then(each_tail).map(Tag::EachGroup);
    let if_tag = keyword("if").ignore_then(expr.clone()).map(Tag::If);
    let else_if_tag = keyword("else")
        .ignore_then(keyword("if"))
        .ignore_then(expr.clone())
        .map(Tag::ElseIf);
    let else_tag = keyword("else").to(Tag::Else);
    let end_tag = keyword("end").to(Tag::End);
    let expr_tag = expr.map(Tag::Expr);

    let tag = each
        .or(each_group)
        .or(if_tag)
        .or(else_if_tag)
        .or(else_tag)
        .or(end_tag)
        .or(expr_tag);

    just(Token::Start)
        .ignore_then(tag)
        .then_ignore(just(Token::End))
        .then_ignore(end())
}
