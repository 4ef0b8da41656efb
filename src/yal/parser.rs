// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! nom grammar for YAL documents.
//!
//! The grammar runs over preprocessed text (comments already blanked out) and
//! produces a parse tree of borrowed tokens. Numeric tokens are kept as text;
//! coercion and defaulting happen once, in [`super::builder`].
//!
//! Every section is keyword anchored. Once `MODULE` or a section's opening
//! keyword has matched the grammar commits with `cut`, so a failure deep inside
//! a block is reported where it happened instead of at the start of the block.

use log::debug;
use nom::{
    branch::alt, bytes::complete::take_while1, combinator::cut, combinator::opt,
    error::ErrorKind, IResult, Offset, Parser,
};

use super::preprocessor::{describe_found, PreprocessedYal};
use super::{Keyword, Layer, ModuleType, Reflection, Rotation, Side, TerminalType};
use crate::error::{Result, YalError};

pub type PResult<'a, O> = IResult<&'a str, O, GrammarError<'a>>;

/// Parse tree of one `MODULE ... ENDMODULE;` block.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleTree<'a> {
    pub name: &'a str,
    pub module_type: ModuleType,
    pub dimensions: Vec<(&'a str, &'a str)>,
    pub terminals: Vec<TerminalTree<'a>>,
    pub network: Option<Vec<NetworkTree<'a>>>,
    pub placement: Option<Vec<PlacementTree<'a>>>,
    pub critical_nets: Option<Vec<CriticalNetTree<'a>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeometryTree<'a> {
    Absolute { x: &'a str, y: &'a str },
    Relative { side: Side, position: &'a str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TerminalTree<'a> {
    pub signal_name: &'a str,
    pub terminal_type: TerminalType,
    pub geometry: GeometryTree<'a>,
    pub width: Option<(&'a str, Layer)>,
    pub current: Option<&'a str>,
    pub voltage: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkTree<'a> {
    pub instance_name: &'a str,
    pub module_name: &'a str,
    pub signal_names: Vec<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacementTree<'a> {
    pub instance_name: &'a str,
    pub x: &'a str,
    pub y: &'a str,
    pub reflection: Option<Reflection>,
    pub rotation: Option<Rotation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CriticalNetTree<'a> {
    pub signal_name: &'a str,
    pub max_length: &'a str,
}

/// What the grammar wanted at the failing position
#[derive(Debug, Clone, PartialEq)]
pub enum GrammarErrorKind {
    Expected(Vec<String>),
    EmptySection {
        section: &'static str,
        end: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GrammarError<'a> {
    pub input: &'a str,
    pub kind: GrammarErrorKind,
}

impl<'a> GrammarError<'a> {
    pub fn expected(input: &'a str, what: &str) -> Self {
        Self {
            input,
            kind: GrammarErrorKind::Expected(vec![what.to_string()]),
        }
    }

    fn also_expected(mut self, what: &[&str]) -> Self {
        if let GrammarErrorKind::Expected(list) = &mut self.kind {
            for w in what {
                if !list.iter().any(|e| e == w) {
                    list.push(w.to_string());
                }
            }
        }
        self
    }

    /// Convert into a positioned error against the text the grammar ran on
    pub fn into_yal_error(self, pre: &PreprocessedYal) -> YalError {
        let offset = pre.text.as_str().offset(self.input);
        let (line, column) = pre.line_col(offset);
        match self.kind {
            GrammarErrorKind::Expected(list) => YalError::Syntax {
                line,
                column,
                offset,
                expected: join_alternatives(&list),
                found: describe_found(self.input),
            },
            GrammarErrorKind::EmptySection { section, end } => YalError::IncompleteSection {
                section,
                end,
                line,
                column,
                offset,
            },
        }
    }
}

impl<'a> nom::error::ParseError<&'a str> for GrammarError<'a> {
    fn from_error_kind(input: &'a str, _kind: ErrorKind) -> Self {
        Self {
            input,
            kind: GrammarErrorKind::Expected(Vec::new()),
        }
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    /// Keep the alternative that got furthest; merge expectations on a tie
    fn or(self, other: Self) -> Self {
        match self.input.len().cmp(&other.input.len()) {
            std::cmp::Ordering::Less => self,
            std::cmp::Ordering::Greater => other,
            std::cmp::Ordering::Equal => match other.kind {
                GrammarErrorKind::Expected(list) => {
                    let refs: Vec<&str> = list.iter().map(String::as_str).collect();
                    self.also_expected(&refs)
                }
                GrammarErrorKind::EmptySection { .. } => other,
            },
        }
    }
}

fn join_alternatives(list: &[String]) -> String {
    match list {
        [] => "valid input".to_string(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_integer_char(c: char) -> bool {
    c.is_ascii_digit() || c == '-'
}

fn is_decimal_char(c: char) -> bool {
    c.is_ascii_digit() || c == '-' || c == '.'
}

/// A run of characters from one class, reported as `what` when absent
fn token<'a>(
    what: &'static str,
    accept: fn(char) -> bool,
) -> impl Fn(&'a str) -> PResult<'a, &'a str> {
    move |input: &'a str| {
        let input = input.trim_start();
        take_while1::<_, _, GrammarError<'a>>(accept)(input)
            .map_err(|_| nom::Err::Error(GrammarError::expected(input, what)))
    }
}

fn identifier(input: &str) -> PResult<'_, &str> {
    token("identifier", is_word_char)(input)
}

fn integer(input: &str) -> PResult<'_, &str> {
    token("integer", is_integer_char)(input)
}

fn unsigned(input: &str) -> PResult<'_, &str> {
    token("non-negative integer", |c| c.is_ascii_digit())(input)
}

fn decimal(input: &str) -> PResult<'_, &str> {
    token("decimal", is_decimal_char)(input)
}

/// A reserved word that must end at a word boundary
fn keyword<'a>(kw: &'static str) -> impl Fn(&'a str) -> PResult<'a, &'a str> {
    move |input: &'a str| {
        let input = input.trim_start();
        match input.strip_prefix(kw) {
            Some(rest) if !rest.starts_with(is_word_char) => Ok((rest, &input[..kw.len()])),
            _ => Err(nom::Err::Error(GrammarError::expected(input, kw))),
        }
    }
}

fn semicolon(input: &str) -> PResult<'_, ()> {
    let input = input.trim_start();
    match input.strip_prefix(';') {
        Some(rest) => Ok((rest, ())),
        None => Err(nom::Err::Error(GrammarError::expected(input, "';'"))),
    }
}

/// One value of a keyword enumeration
fn one_of<K: Keyword>(input: &str) -> PResult<'_, K> {
    let input = input.trim_start();
    let end = input.find(|c: char| !is_word_char(c)).unwrap_or(input.len());
    let word = &input[..end];
    match K::ALL.iter().copied().find(|k| k.keyword() == word) {
        Some(k) => Ok((&input[end..], k)),
        None => {
            let names: Vec<&str> = K::ALL.iter().map(|k| k.keyword()).collect();
            let what = format!("{} ({})", K::WHAT, names.join("|"));
            Err(nom::Err::Error(GrammarError::expected(input, &what)))
        }
    }
}

/// One or more items, stopping in front of the terminating `;`
fn one_or_more<'a, O>(
    item: impl Fn(&'a str) -> PResult<'a, O>,
) -> impl Fn(&'a str) -> PResult<'a, Vec<O>> {
    move |input: &'a str| {
        let (mut rest, first) = item(input)?;
        let mut items = vec![first];
        while !rest.trim_start().starts_with(';') {
            let start = rest.trim_start();
            let (after, next) = item(rest).map_err(|e| {
                e.map(|err| {
                    if err.input.len() == start.len() {
                        err.also_expected(&["';'"])
                    } else {
                        err
                    }
                })
            })?;
            items.push(next);
            rest = after;
        }
        Ok((rest, items))
    }
}

/// `OPEN ; (entry ;)+ CLOSE ;`
///
/// Fails softly only when the opening keyword is missing. An opened section
/// with no entries is rejected as incomplete.
fn section<'a, O>(
    open: &'static str,
    close: &'static str,
    entry: fn(&'a str) -> PResult<'a, O>,
) -> impl Fn(&'a str) -> PResult<'a, Vec<O>> {
    move |input: &'a str| {
        let (input, _) = keyword(open)(input)?;
        let (mut rest, _) = cut(semicolon).parse(input)?;
        let mut entries = Vec::new();
        loop {
            if let Ok((after, _)) = keyword(close)(rest) {
                if entries.is_empty() {
                    return Err(nom::Err::Failure(GrammarError {
                        input: rest.trim_start(),
                        kind: GrammarErrorKind::EmptySection {
                            section: open,
                            end: close,
                        },
                    }));
                }
                let (after, _) = cut(semicolon).parse(after)?;
                debug!("[GRAMMAR]   {open}: {} entries", entries.len());
                return Ok((after, entries));
            }
            let start = rest.trim_start();
            let (after, item) = cut(entry).parse(rest).map_err(|e| {
                e.map(|err| {
                    if err.input.len() == start.len() {
                        err.also_expected(&[close])
                    } else {
                        err
                    }
                })
            })?;
            let (after, _) = cut(semicolon).parse(after)?;
            entries.push(item);
            rest = after;
        }
    }
}

fn point(input: &str) -> PResult<'_, (&str, &str)> {
    let (input, x) = integer(input)?;
    let (input, y) = integer(input)?;
    Ok((input, (x, y)))
}

fn absolute_geometry(input: &str) -> PResult<'_, GeometryTree<'_>> {
    let (input, x) = integer(input)?;
    let (input, y) = integer(input)?;
    Ok((input, GeometryTree::Absolute { x, y }))
}

fn relative_geometry(input: &str) -> PResult<'_, GeometryTree<'_>> {
    let (input, side) = one_of::<Side>(input)?;
    let (input, position) = integer(input)?;
    Ok((input, GeometryTree::Relative { side, position }))
}

/// `<signal> <type> (<x> <y> | <side> <pos>) [<width> <layer>] [CURRENT v] [VOLTAGE v]`
fn terminal(input: &str) -> PResult<'_, TerminalTree<'_>> {
    let (input, signal_name) = identifier(input)?;
    let (input, terminal_type) = one_of::<TerminalType>(input)?;
    let (input, geometry) = alt((absolute_geometry, relative_geometry)).parse(input)?;
    let (input, width) = opt(unsigned).parse(input)?;
    let (input, width) = match width {
        Some(width) => {
            let (input, layer) = cut(one_of::<Layer>).parse(input)?;
            (input, Some((width, layer)))
        }
        None => (input, None),
    };
    let (input, current) = opt((keyword("CURRENT"), cut(decimal))).parse(input)?;
    let (input, voltage) = opt((keyword("VOLTAGE"), cut(decimal))).parse(input)?;

    Ok((
        input,
        TerminalTree {
            signal_name,
            terminal_type,
            geometry,
            width,
            current: current.map(|(_, v)| v),
            voltage: voltage.map(|(_, v)| v),
        },
    ))
}

/// `<instance> <module> <signal>+`
fn network_entry(input: &str) -> PResult<'_, NetworkTree<'_>> {
    let (input, instance_name) = identifier(input)?;
    let (input, module_name) = identifier(input)?;
    let (input, signal_names) = one_or_more(identifier)(input)?;
    Ok((
        input,
        NetworkTree {
            instance_name,
            module_name,
            signal_names,
        },
    ))
}

/// `<instance> <x> <y> [<reflection>] [<rotation>]`
fn placement_entry(input: &str) -> PResult<'_, PlacementTree<'_>> {
    let (input, instance_name) = identifier(input)?;
    let (input, x) = integer(input)?;
    let (input, y) = integer(input)?;
    let (input, reflection) = opt(one_of::<Reflection>).parse(input)?;
    let (input, rotation) = opt(one_of::<Rotation>).parse(input)?;
    Ok((
        input,
        PlacementTree {
            instance_name,
            x,
            y,
            reflection,
            rotation,
        },
    ))
}

/// `<signal> <max length>`
fn critical_net(input: &str) -> PResult<'_, CriticalNetTree<'_>> {
    let (input, signal_name) = identifier(input)?;
    let (input, max_length) = unsigned(input)?;
    Ok((
        input,
        CriticalNetTree {
            signal_name,
            max_length,
        },
    ))
}

fn module_body(input: &str) -> PResult<'_, ModuleTree<'_>> {
    let (input, name) = identifier(input)?;
    let (input, _) = semicolon(input)?;
    debug!("[GRAMMAR] Parsing MODULE: {name}");

    let (input, _) = keyword("TYPE")(input)?;
    let (input, module_type) = one_of::<ModuleType>(input)?;
    let (input, _) = semicolon(input)?;

    let (input, _) = keyword("DIMENSIONS")(input)?;
    let (input, dimensions) = one_or_more(point)(input)?;
    let (input, _) = semicolon(input)?;

    let (input, terminals) = section("IOLIST", "ENDIOLIST", terminal)(input)?;
    let (input, network) = opt(section("NETWORK", "ENDNETWORK", network_entry)).parse(input)?;
    let (input, placement) =
        opt(section("PLACEMENT", "ENDPLACEMENT", placement_entry)).parse(input)?;
    let (input, critical_nets) =
        opt(section("CRITICALNETS", "ENDCRITICALNETS", critical_net)).parse(input)?;

    // Sections that could still legally appear in front of ENDMODULE
    let mut followers = Vec::new();
    if network.is_none() && placement.is_none() && critical_nets.is_none() {
        followers.push("NETWORK");
    }
    if placement.is_none() && critical_nets.is_none() {
        followers.push("PLACEMENT");
    }
    if critical_nets.is_none() {
        followers.push("CRITICALNETS");
    }
    followers.push("ENDMODULE");
    let (input, _) = keyword("ENDMODULE")(input).map_err(|e| {
        e.map(|err| {
            GrammarError {
                input: err.input,
                kind: GrammarErrorKind::Expected(Vec::new()),
            }
            .also_expected(&followers)
        })
    })?;
    let (input, _) = semicolon(input)?;

    Ok((
        input,
        ModuleTree {
            name,
            module_type,
            dimensions,
            terminals,
            network,
            placement,
            critical_nets,
        },
    ))
}

/// `MODULE` followed by a committed module body
pub fn module(input: &str) -> PResult<'_, ModuleTree<'_>> {
    let (input, _) = keyword("MODULE")(input)?;
    cut(module_body).parse(input)
}

/// One or more modules that together consume the whole input
pub fn document(input: &str) -> PResult<'_, Vec<ModuleTree<'_>>> {
    let mut modules = Vec::new();
    let mut rest = input;
    loop {
        match module(rest) {
            Ok((after, tree)) => {
                modules.push(tree);
                rest = after;
            }
            Err(nom::Err::Error(err)) => {
                if !modules.is_empty() && rest.trim().is_empty() {
                    return Ok(("", modules));
                }
                return Err(nom::Err::Error(err));
            }
            Err(e) => return Err(e),
        }
    }
}

/// Run the grammar over preprocessed text
pub fn parse_tree(pre: &PreprocessedYal) -> Result<Vec<ModuleTree<'_>>> {
    match document(&pre.text) {
        Ok((_, modules)) => Ok(modules),
        Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => Err(err.into_yal_error(pre)),
        Err(nom::Err::Incomplete(_)) => Err(pre.syntax_error(pre.text.len(), "more input")),
    }
}
