// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

#[cfg(test)]
mod tests;

mod tag_expr {
    pub mod lexer;
    pub mod parser;
}

use thiserror::Error;

use crate::ast::{Branch, Conditional, Directive, Expr, Iteration, Tag, TagEach, Template};

use tag_expr::parser::TagExprParser;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("tag at byte {offset} is never closed with '}}}}'")]
    UnterminatedTag { offset: usize },
    #[error("invalid tag at byte {offset}: {message}")]
    InvalidTag { offset: usize, message: String },
    #[error("'{tag}' at byte {offset} does not close any block")]
    UnmatchedTag { tag: &'static str, offset: usize },
    #[error("block opened at byte {offset} is never closed with 'end'")]
    UnclosedBlock { offset: usize },
}

/// Parses template strings (prose with `${{ ... }}` tags) into directive trees.
pub struct TemplateParser {
    tag_parser: TagExprParser,
}

impl Default for TemplateParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateParser {
    pub fn new() -> TemplateParser {
        TemplateParser {
            tag_parser: TagExprParser::new(),
        }
    }

    pub fn parse(&self, input: &str) -> Result<Template, ParseError> {
        let segments = self.scan(input)?;
        let mut segments = segments.into_iter();

        let (directives, terminator) = build_block(&mut segments)?;
        if let Some((terminator, offset)) = terminator {
            return Err(ParseError::UnmatchedTag {
                tag: terminator.name(),
                offset,
            });
        }

        Ok(Template { directives })
    }

    fn scan(&self, input: &str) -> Result<Vec<Segment>, ParseError> {
        let mut curr_index = 0;
        let mut segments = Vec::new();
        loop {
            // Find next tag.
            let Some(tag_index) = input[curr_index..].find("${{").map(|index| curr_index + index) else {
                break;
            };

            // Add non-tag characters.
            if tag_index > curr_index {
                segments.push(Segment::Text(input[curr_index..tag_index].to_string()));
            }

            let Some(tag_len) = find_tag_end(&input[tag_index..]) else {
                return Err(ParseError::UnterminatedTag { offset: tag_index });
            };

            let tag_str = &input[tag_index..tag_index + tag_len];
            let tag = self
                .tag_parser
                .parse(tag_str)
                .map_err(|messages| ParseError::InvalidTag {
                    offset: tag_index,
                    message: messages.join("; "),
                })?;
            segments.push(Segment::Tag { tag, offset: tag_index });

            curr_index = tag_index + tag_len;
        }

        // Add trailing non-tag characters.
        if input.len() > curr_index {
            segments.push(Segment::Text(input[curr_index..].to_string()));
        }

        Ok(segments)
    }
}

enum Segment {
    Text(String),
    Tag { tag: Tag, offset: usize },
}

enum Terminator {
    ElseIf(Expr),
    Else,
    End,
}

impl Terminator {
    fn name(&self) -> &'static str {
        match self {
            Terminator::ElseIf(_) => "else if",
            Terminator::Else => "else",
            Terminator::End => "end",
        }
    }
}

// Length of the tag at the start of `input`, including both delimiters.
// A "}}" inside a string literal does not close the tag.
fn find_tag_end(input: &str) -> Option<usize> {
    let mut quote = None;
    let mut escaped = false;
    let mut prev_brace = false;
    for (index, c) in input.char_indices().skip(3) {
        if let Some(open) = quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                _ if c == open => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                prev_brace = false;
            }
            '}' if prev_brace => return Some(index + 1),
            '}' => prev_brace = true,
            _ => prev_brace = false,
        }
    }
    None
}

type Segments = std::vec::IntoIter<Segment>;

// Collects directives until a tag that closes the enclosing block, or the end of input.
fn build_block(segments: &mut Segments) -> Result<(Vec<Directive>, Option<(Terminator, usize)>), ParseError> {
    let mut directives = Vec::new();
    while let Some(segment) = segments.next() {
        let (tag, offset) = match segment {
            Segment::Text(text) => {
                directives.push(Directive::Literal(text));
                continue;
            }
            Segment::Tag { tag, offset } => (tag, offset),
        };

        let directive = match tag {
            Tag::Expr(expr) => Directive::Invocation(expr),
            Tag::If(condition) => Directive::Conditional(build_conditional(segments, condition, offset)?),
            Tag::Each(each) => Directive::Iteration(build_iteration(segments, each, offset)?),
            Tag::EachGroup(each) => Directive::GroupedIteration(build_iteration(segments, each, offset)?),
            Tag::ElseIf(condition) => return Ok((directives, Some((Terminator::ElseIf(condition), offset)))),
            Tag::Else => return Ok((directives, Some((Terminator::Else, offset)))),
            Tag::End => return Ok((directives, Some((Terminator::End, offset)))),
        };
        directives.push(directive);
    }
    Ok((directives, None))
}

fn build_conditional(segments: &mut Segments, condition: Expr, offset: usize) -> Result<Conditional, ParseError> {
    let mut branches = Vec::new();
    let mut condition = condition;
    loop {
        let (body, terminator) = build_block(segments)?;
        match terminator {
            Some((Terminator::ElseIf(next), _)) => {
                branches.push(Branch { condition, body });
                condition = next;
            }
            Some((Terminator::Else, _)) => {
                branches.push(Branch { condition, body });
                let otherwise = expect_end(segments, offset)?;
                return Ok(Conditional { branches, otherwise });
            }
            Some((Terminator::End, _)) => {
                branches.push(Branch { condition, body });
                return Ok(Conditional {
                    branches,
                    otherwise: Vec::new(),
                });
            }
            None => return Err(ParseError::UnclosedBlock { offset }),
        }
    }
}

fn build_iteration(segments: &mut Segments, each: TagEach, offset: usize) -> Result<Iteration, ParseError> {
    let body = expect_end(segments, offset)?;
    Ok(Iteration {
        iterable: each.iterable,
        binding: each.binding,
        body,
    })
}

fn expect_end(segments: &mut Segments, offset: usize) -> Result<Vec<Directive>, ParseError> {
    let (body, terminator) = build_block(segments)?;
    match terminator {
        Some((Terminator::End, _)) => Ok(body),
        Some((terminator, offset)) => Err(ParseError::UnmatchedTag {
            tag: terminator.name(),
            offset,
        }),
        None => Err(ParseError::UnclosedBlock { offset }),
    }
}
