//! Free-form node parameters and the parsers for their values.
//!
//! Authored graphs carry parameters as plain strings.
//! Parsing is lenient on purpose: a malformed value falls back to the caller's default
//! instead of failing the bake, the same way an unknown action does.

use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, digit1, one_of, space0},
    combinator::{all_consuming, map_res, opt, recognize, value},
    number::complete::float,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};
use std::collections::BTreeMap;

use crate::blackboard::Vec3;

pub type ParamMap = BTreeMap<String, String>;

fn int(i: &str) -> IResult<&str, i32> {
    map_res(recognize(pair(opt(one_of("+-")), digit1)), str::parse)(i)
}

fn boolean(i: &str) -> IResult<&str, bool> {
    alt((
        value(true, alt((tag_no_case("true"), tag_no_case("1")))),
        value(false, alt((tag_no_case("false"), tag_no_case("0")))),
    ))(i)
}

fn comma(i: &str) -> IResult<&str, char> {
    delimited(space0, char(','), space0)(i)
}

fn vec3(i: &str) -> IResult<&str, Vec3> {
    let (i, _) = opt(pair(char('('), space0))(i)?;
    let (i, (x, y, z)) = tuple((float, preceded(comma, float), preceded(comma, float)))(i)?;
    let (i, _) = opt(pair(space0, char(')')))(i)?;
    Ok((i, [x, y, z]))
}

fn trimmed<'a, O>(
    parser: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    all_consuming(delimited(space0, parser, space0))
}

pub fn parse_f32(s: &str) -> Option<f32> {
    trimmed(float)(s).ok().map(|(_, v)| v)
}

pub fn parse_i32(s: &str) -> Option<i32> {
    trimmed(int)(s).ok().map(|(_, v)| v)
}

pub fn parse_bool(s: &str) -> Option<bool> {
    trimmed(boolean)(s).ok().map(|(_, v)| v)
}

/// Parses `x, y, z`, optionally in parentheses.
pub fn parse_vec3(s: &str) -> Option<Vec3> {
    trimmed(vec3)(s).ok().map(|(_, v)| v)
}

/// Read-only view over a node's parameters with typed, defaulted accessors.
#[derive(Debug, Clone, Copy)]
pub struct Params<'a> {
    map: &'a ParamMap,
}

impl<'a> Params<'a> {
    pub fn new(map: &'a ParamMap) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.map.get(key).map(String::as_str)
    }

    pub fn str_or(&self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn f32_or(&self, key: &str, default: f32) -> f32 {
        self.get(key).and_then(parse_f32).unwrap_or(default)
    }

    pub fn i32_or(&self, key: &str, default: i32) -> i32 {
        self.get(key).and_then(parse_i32).unwrap_or(default)
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(parse_bool).unwrap_or(default)
    }

    pub fn vec3_or(&self, key: &str, default: Vec3) -> Vec3 {
        self.get(key).and_then(parse_vec3).unwrap_or(default)
    }
}
