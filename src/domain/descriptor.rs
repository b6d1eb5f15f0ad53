//! Decay descriptor parsing: `D*+ -> [D0 -> K- pi+] pi+`.
//!
//! Grammar:
//! ```text
//! decay    := particle ( '->' daughter+ )?
//! daughter := '[' decay ']' | particle
//! particle := '^'? name ( ':' label )?
//! ```
//! Selection markers (`^`) and list labels (`:myTrk`) are accepted and ignored.

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{char, multispace0};
use nom::combinator::{all_consuming, map, opt};
use nom::error::{Error, ErrorKind, ParseError};
use nom::multi::many1;
use nom::sequence::{delimited, preceded};
use nom::{IResult, Parser};
use tracing::{debug, instrument};

use crate::domain::error::DomainError;
use crate::domain::node::{DecayNode, MatchPolicy};
use crate::domain::particle::ParticleTable;

/// Syntax tree of a descriptor, names not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorTree {
    pub name: String,
    pub daughters: Vec<DescriptorTree>,
}

impl DescriptorTree {
    fn leaf(name: &str) -> Self {
        Self {
            name: name.to_string(),
            daughters: Vec::new(),
        }
    }

    /// Resolve names through `table` into a canonical decay tree.
    pub fn resolve(
        &self,
        table: &ParticleTable,
        policy: &MatchPolicy,
    ) -> Result<DecayNode, DomainError> {
        // report the head before any daughter
        table.code_of(&self.name)?;
        let children = self
            .daughters
            .iter()
            .map(|d| d.resolve(table, policy))
            .collect::<Result<Vec<_>, _>>()?;
        DecayNode::from_name(&self.name, children, table, policy)
    }
}

/// A combinator that takes a parser `inner` and produces a parser that also consumes both leading and
/// trailing whitespace, returning the output of `inner`.
fn ws<'a, F, O, E: ParseError<&'a str>>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O, E>
where
    F: Parser<&'a str, O, E>,
{
    delimited(multispace0, inner, multispace0)
}

/// Particle name: everything up to whitespace, a bracket, a label separator or an arrow.
fn particle_name(input: &str) -> IResult<&str, &str> {
    let end = input
        .char_indices()
        .find(|&(i, c)| {
            c.is_whitespace() || matches!(c, '[' | ']' | ':' | '^') || input[i..].starts_with("->")
        })
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    if end == 0 {
        return Err(nom::Err::Error(Error::from_error_kind(
            input,
            ErrorKind::TakeWhile1,
        )));
    }
    Ok((&input[end..], &input[..end]))
}

fn label(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)
}

fn particle(input: &str) -> IResult<&str, &str> {
    let (input, _) = opt(char('^'))(input)?;
    let (input, name) = particle_name(input)?;
    let (input, _) = opt(preceded(char(':'), label))(input)?;
    Ok((input, name))
}

fn daughter(input: &str) -> IResult<&str, DescriptorTree> {
    alt((
        delimited(char('['), decay, char(']')),
        map(particle, DescriptorTree::leaf),
    ))(input)
}

fn decay(input: &str) -> IResult<&str, DescriptorTree> {
    let (input, name) = ws(particle)(input)?;
    let (input, daughters) = opt(preceded(ws(tag("->")), many1(ws(daughter))))(input)?;
    Ok((
        input,
        DescriptorTree {
            name: name.to_string(),
            daughters: daughters.unwrap_or_default(),
        },
    ))
}

/// Parse a descriptor without resolving particle names.
#[instrument(level = "trace")]
pub fn parse_descriptor(input: &str) -> Result<DescriptorTree, DomainError> {
    let top = alt((ws(delimited(char('['), decay, char(']'))), decay));
    match all_consuming(top)(input) {
        Ok((_, tree)) => {
            debug!("parsed descriptor: {:?}", tree);
            Ok(tree)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(DomainError::InvalidDescriptor {
                input: input.to_string(),
                message: if e.input.trim().is_empty() {
                    "unexpected end of descriptor".to_string()
                } else {
                    format!("unexpected input at '{}'", e.input.trim())
                },
            })
        }
        Err(nom::Err::Incomplete(_)) => Err(DomainError::InvalidDescriptor {
            input: input.to_string(),
            message: "incomplete descriptor".to_string(),
        }),
    }
}

/// Parse a descriptor and build the canonical pattern tree.
pub fn parse_pattern(
    input: &str,
    table: &ParticleTable,
    policy: &MatchPolicy,
) -> Result<DecayNode, DomainError> {
    parse_descriptor(input)?.resolve(table, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn given_nested_descriptor_when_parsing_then_builds_syntax_tree() {
        let tree = parse_descriptor("D*+ -> [D0 -> K- pi+] pi+").unwrap();
        assert_eq!(tree.name, "D*+");
        assert_eq!(tree.daughters.len(), 2);
        assert_eq!(tree.daughters[0].name, "D0");
        assert_eq!(tree.daughters[0].daughters.len(), 2);
        assert_eq!(tree.daughters[1], DescriptorTree::leaf("pi+"));
    }

    #[rstest]
    #[case("^D*+ -> [^D0 -> ^pi+ ^K-] ^pi+")]
    #[case("D*+:good -> D0:merged pi+:soft")]
    #[case("  D*+->[D0->K- pi+]pi+  ")]
    #[case("[D*+ -> [D0 -> K- pi+] pi+]")]
    fn given_steering_syntax_when_parsing_then_accepted(#[case] input: &str) {
        let tree = parse_descriptor(input).unwrap();
        assert_eq!(tree.name, "D*+");
        assert_eq!(tree.daughters.len(), 2);
    }

    #[test]
    fn given_bare_particle_when_parsing_then_leaf() {
        let tree = parse_descriptor("K_S0").unwrap();
        assert_eq!(tree, DescriptorTree::leaf("K_S0"));
    }

    #[rstest]
    #[case("")]
    #[case("D0 ->")]
    #[case("D0 -> [K- pi+")]
    #[case("D0 -> K- pi+]")]
    #[case("-> K- pi+")]
    fn given_malformed_descriptor_when_parsing_then_invalid_descriptor(#[case] input: &str) {
        let err = parse_descriptor(input).unwrap_err();
        assert!(
            matches!(err, DomainError::InvalidDescriptor { .. }),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn given_unknown_name_when_resolving_then_unknown_particle() {
        let table = ParticleTable::new();
        let policy = MatchPolicy::default();
        let err = parse_pattern("D0 -> K- piplus", &table, &policy).unwrap_err();
        assert_eq!(err, DomainError::UnknownParticle("piplus".into()));
    }

    #[test]
    fn given_charge_conjugate_descriptors_when_resolving_then_equal() {
        let table = ParticleTable::new();
        let policy = MatchPolicy::default();
        let a = parse_pattern("D*+ -> [D0 -> K- pi+] pi+", &table, &policy).unwrap();
        let b = parse_pattern("D*- -> pi- [anti-D0 -> pi- K+]", &table, &policy).unwrap();
        assert_eq!(a, b);
    }
}
