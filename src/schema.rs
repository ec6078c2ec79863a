//! Template parser: text schemas into member trees.
//!
//! A template names its schema on the first meaningful line, then declares
//! one member per line as `name kind [count]`. `STRUCT` and `ENUM` open
//! nested blocks closed by a lone `}`; blank lines and lines starting with
//! `#` are skipped anywhere.

use crate::error::{CodecError, CodecResult};
use crate::member::{ArraySize, EnumFlag, MemberDef, MemberId, MemberTree, INDEFINITE_ARRAY};
use crate::value::ValueKind;

/// A named tree of member definitions describing one entity kind's payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    pub name: String,
    pub tree: MemberTree,
}

impl Schema {
    /// A schema with no fields; the fallback payload for unknown entity
    /// kinds.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tree: MemberTree::new(),
        }
    }

    /// Parses one template.
    ///
    /// # Errors
    /// Missing schema name, unknown kind keywords, unresolved count
    /// references, and blocks left open at end of input are all fatal for
    /// the template.
    pub fn parse(source: &str) -> CodecResult<Self> {
        let mut parser = Parser::new(source);
        let Some((_, name)) = parser.next_line() else {
            return Err(CodecError::Schema(
                "template is empty: expected a schema name on the first line".into(),
            ));
        };
        let mut schema = Self::empty(name);
        let mut scopes = Vec::new();
        parser.parse_block(&mut schema.tree, None, &mut scopes)?;
        Ok(schema)
    }
}

struct Parser<'a> {
    /// Meaningful lines only, with their 1-based source line numbers.
    lines: Vec<(usize, &'a str)>,
    cursor: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        let lines = source
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
            .collect();
        Self { lines, cursor: 0 }
    }

    fn next_line(&mut self) -> Option<(usize, &'a str)> {
        let line = self.lines.get(self.cursor).copied();
        if line.is_some() {
            self.cursor += 1;
        }
        line
    }

    fn parse_block(
        &mut self,
        tree: &mut MemberTree,
        parent: Option<MemberId>,
        scopes: &mut Vec<Vec<(String, MemberId)>>,
    ) -> CodecResult<()> {
        scopes.push(Vec::new());
        loop {
            let Some((line_no, line)) = self.next_line() else {
                scopes.pop();
                if parent.is_some() {
                    return Err(CodecError::Schema(
                        "unterminated struct: reached end of template before '}'".into(),
                    ));
                }
                return Ok(());
            };
            if line == "}" {
                scopes.pop();
                if parent.is_none() {
                    return Err(CodecError::Schema(format!("line {line_no}: unmatched '}}'")));
                }
                return Ok(());
            }

            let mut tokens = line.split_whitespace();
            let name = tokens.next().unwrap_or_default();
            let kind_word = tokens.next().ok_or_else(|| {
                CodecError::Schema(format!("line {line_no}: member '{name}' is missing a kind"))
            })?;
            let kind = ValueKind::from_keyword(kind_word).ok_or_else(|| {
                CodecError::Schema(format!("line {line_no}: unknown kind '{kind_word}'"))
            })?;

            let mut def = MemberDef::new(name, kind);
            if kind == ValueKind::Comment {
                let text = tokens.next().ok_or_else(|| {
                    CodecError::Schema(format!(
                        "line {line_no}: COMMENT member '{name}' is missing its text"
                    ))
                })?;
                def = def.with_description(text);
            } else if let Some(bracket) = tokens.next() {
                def = def.with_array_size(parse_count(bracket, scopes, line_no)?);
            }
            if let Some(extra) = tokens.next() {
                return Err(CodecError::Schema(format!(
                    "line {line_no}: unexpected token '{extra}'"
                )));
            }

            let id = match parent {
                Some(parent) => tree.add_child(parent, def),
                None => tree.add_root(def),
            }
            .map_err(|err| CodecError::Schema(format!("line {line_no}: {err}")))?;
            if let Some(scope) = scopes.last_mut() {
                scope.push((name.to_owned(), id));
            }

            match kind {
                ValueKind::Struct => self.parse_block(tree, Some(id), scopes)?,
                ValueKind::Enum => self.parse_flag_block(tree, id)?,
                _ => {}
            }
        }
    }

    fn parse_flag_block(&mut self, tree: &mut MemberTree, id: MemberId) -> CodecResult<()> {
        loop {
            let Some((line_no, line)) = self.next_line() else {
                return Err(CodecError::Schema(
                    "unterminated enum: reached end of template before '}'".into(),
                ));
            };
            if line == "}" {
                return Ok(());
            }
            let mut tokens = line.split_whitespace();
            let name = tokens.next().unwrap_or_default();
            let mask_word = tokens.next().ok_or_else(|| {
                CodecError::Schema(format!("line {line_no}: flag '{name}' is missing its mask"))
            })?;
            let mask = parse_mask(mask_word).ok_or_else(|| {
                CodecError::Schema(format!("line {line_no}: invalid flag mask '{mask_word}'"))
            })?;
            if let Some(extra) = tokens.next() {
                return Err(CodecError::Schema(format!(
                    "line {line_no}: unexpected token '{extra}'"
                )));
            }
            tree.add_flag(
                id,
                EnumFlag {
                    name: name.to_owned(),
                    mask,
                },
            )
            .map_err(|err| CodecError::Schema(format!("line {line_no}: {err}")))?;
        }
    }
}

/// Resolves a bracketed count: `[*]` is the indefinite sentinel, a number is
/// a literal, anything else must name an already-parsed member of this or an
/// enclosing block.
fn parse_count(
    token: &str,
    scopes: &[Vec<(String, MemberId)>],
    line_no: usize,
) -> CodecResult<ArraySize> {
    let inner = token
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| {
            CodecError::Schema(format!(
                "line {line_no}: expected a bracketed count, found '{token}'"
            ))
        })?;
    if inner == "*" {
        return Ok(ArraySize::Literal(INDEFINITE_ARRAY));
    }
    if let Ok(count) = inner.parse::<i32>() {
        return Ok(ArraySize::Literal(count));
    }
    for scope in scopes.iter().rev() {
        if let Some((_, id)) = scope.iter().find(|(name, _)| name == inner) {
            return Ok(ArraySize::Ref(*id));
        }
    }
    Err(CodecError::Schema(format!(
        "line {line_no}: unresolved count reference '{inner}'"
    )))
}

fn parse_mask(word: &str) -> Option<u32> {
    if let Some(hex) = word.strip_prefix("0x").or_else(|| word.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        word.parse().ok()
    }
}

#[cfg(test)]
#[path = "tests/schema_tests.rs"]
mod tests;
