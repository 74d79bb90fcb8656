//! The block resolver.
//!
//! Control flow lives in the same postfix stream as data, so the
//! evaluator cannot discover block boundaries on the fly. A single
//! forward pass pairs every opener (`if`, `while`, `for`, `times`,
//! `def`) with its `else` and `end` and records the pairing in jump
//! tables, reducing control-flow dispatch to O(1) per opener.
//!
//! Procedure bodies are extracted into their own [`Chunk`]s at resolve
//! time, so a procedure defined on one REPL line can be called from the
//! next. The runtime `def` token only skips past its body.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::token::{Span, Token};

/// Which opener started a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    If,
    While,
    For,
    Times,
    Def,
}

impl BlockKind {
    fn word(self) -> &'static str {
        match self {
            BlockKind::If => "if",
            BlockKind::While => "while",
            BlockKind::For => "for",
            BlockKind::Times => "times",
            BlockKind::Def => "def",
        }
    }
}

/// Jump targets for one opener token.
#[derive(Debug, Clone)]
pub struct JumpEntry {
    pub kind: BlockKind,
    /// Token index of the block's `else`, if it has one.
    pub else_idx: Option<usize>,
    /// Token index of the matching `end`. Always greater than the opener.
    pub end_idx: usize,
}

/// Reverse mapping consulted when the evaluator reaches an `end`.
#[derive(Debug, Clone)]
pub struct EndInfo {
    pub kind: BlockKind,
    pub opener_idx: usize,
}

/// A procedure registered by `def NAME … end`.
#[derive(Debug, Clone)]
pub struct ProcDef {
    pub name: String,
    /// The body, exclusive of `def NAME` and the closing `end`.
    pub body: Rc<Chunk>,
}

/// A resolved unit of execution: a top-level program or a procedure body.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    pub tokens: Vec<Token>,
    /// Source span for each token (parallel to `tokens`).
    pub spans: Vec<Span>,
    /// Opener token index → jump targets.
    pub jumps: HashMap<usize, JumpEntry>,
    /// `end` token index → its opener.
    pub ends: HashMap<usize, EndInfo>,
    /// `else` token index → the matching `end` index.
    pub elses: HashMap<usize, usize>,
    /// Procedures defined directly in this chunk.
    pub procs: Vec<ProcDef>,
}

/// An open block during the forward pass.
struct OpenFrame {
    kind: BlockKind,
    opener: usize,
    else_idx: Option<usize>,
    /// Procedure name, for `def` frames.
    name: Option<String>,
}

/// Pair openers with `else`/`end` and extract procedure bodies.
pub fn resolve(tokens: Vec<Token>, spans: Vec<Span>) -> Result<Chunk> {
    let mut chunk = Chunk {
        tokens,
        spans,
        ..Chunk::default()
    };
    let mut open: Vec<OpenFrame> = Vec::new();

    let mut i = 0;
    while i < chunk.tokens.len() {
        let word = match &chunk.tokens[i] {
            Token::Word(w) => w.as_str(),
            _ => {
                i += 1;
                continue;
            }
        };
        match word {
            "if" | "while" | "for" | "times" => {
                let kind = match word {
                    "if" => BlockKind::If,
                    "while" => BlockKind::While,
                    "for" => BlockKind::For,
                    _ => BlockKind::Times,
                };
                open.push(OpenFrame {
                    kind,
                    opener: i,
                    else_idx: None,
                    name: None,
                });
            }
            "def" => {
                let name = match chunk.tokens.get(i + 1) {
                    Some(Token::Word(name)) => name.clone(),
                    _ => {
                        return Err(Error::Parse(
                            "`def` must be followed by a procedure name".to_string(),
                        ));
                    }
                };
                open.push(OpenFrame {
                    kind: BlockKind::Def,
                    opener: i,
                    else_idx: None,
                    name: Some(name),
                });
                // The name token is part of the header, not the body.
                i += 1;
            }
            "else" => {
                let frame = open.last_mut().ok_or_else(|| {
                    Error::Parse("`else` without an open `if`".to_string())
                })?;
                if frame.kind != BlockKind::If {
                    return Err(Error::Parse(format!(
                        "`else` inside a `{}` block",
                        frame.kind.word()
                    )));
                }
                if frame.else_idx.is_some() {
                    return Err(Error::Parse("duplicate `else` in `if` block".to_string()));
                }
                frame.else_idx = Some(i);
            }
            "end" => {
                let frame = open
                    .pop()
                    .ok_or_else(|| Error::Parse("`end` without an open block".to_string()))?;
                chunk.jumps.insert(
                    frame.opener,
                    JumpEntry {
                        kind: frame.kind,
                        else_idx: frame.else_idx,
                        end_idx: i,
                    },
                );
                chunk.ends.insert(
                    i,
                    EndInfo {
                        kind: frame.kind,
                        opener_idx: frame.opener,
                    },
                );
                if let Some(else_idx) = frame.else_idx {
                    chunk.elses.insert(else_idx, i);
                }
                if let Some(name) = frame.name {
                    // Body range: past `def NAME`, up to (not including) `end`.
                    let body_tokens = chunk.tokens[frame.opener + 2..i].to_vec();
                    let body_spans = chunk.spans[frame.opener + 2..i].to_vec();
                    let body = resolve(body_tokens, body_spans)?;
                    chunk.procs.push(ProcDef {
                        name,
                        body: Rc::new(body),
                    });
                }
            }
            _ => {}
        }
        i += 1;
    }

    if let Some(frame) = open.last() {
        return Err(Error::UnexpectedEof {
            open: frame.kind.word(),
        });
    }

    Ok(chunk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;

    fn resolve_src(src: &str) -> Result<Chunk> {
        let (tokens, spans) = tokenize(src)?;
        resolve(tokens, spans)
    }

    #[test]
    fn test_if_else_pairing() {
        // tokens: 0:1 1:if 2:"a" 3:else 4:"b" 5:end
        let chunk = resolve_src(r#"1 if "a" else "b" end"#).unwrap();
        let entry = &chunk.jumps[&1];
        assert_eq!(entry.kind, BlockKind::If);
        assert_eq!(entry.else_idx, Some(3));
        assert_eq!(entry.end_idx, 5);
        assert_eq!(chunk.elses[&3], 5);
        assert_eq!(chunk.ends[&5].opener_idx, 1);
    }

    #[test]
    fn test_every_end_follows_its_opener() {
        let chunk = resolve_src("1 5 for 0 1 gt if dup end 3 times dup end end").unwrap();
        for (opener, entry) in &chunk.jumps {
            assert!(entry.end_idx > *opener);
        }
    }

    #[test]
    fn test_def_body_extraction() {
        // tokens: 0:def 1:f 2:dup 3:add 4:end 5:2 6:f
        let chunk = resolve_src("def f dup add end 2 f").unwrap();
        assert_eq!(chunk.procs.len(), 1);
        let proc = &chunk.procs[0];
        assert_eq!(proc.name, "f");
        assert_eq!(
            proc.body.tokens,
            vec![Token::Word("dup".into()), Token::Word("add".into())]
        );
        assert_eq!(chunk.jumps[&0].end_idx, 4);
    }

    #[test]
    fn test_nested_def_registers_inside_body() {
        let chunk = resolve_src("def outer def inner 1 end inner end").unwrap();
        assert_eq!(chunk.procs.len(), 1);
        assert_eq!(chunk.procs[0].body.procs.len(), 1);
        assert_eq!(chunk.procs[0].body.procs[0].name, "inner");
    }

    #[test]
    fn test_stray_end() {
        let err = resolve_src("1 end").unwrap_err();
        assert!(err.to_string().contains("`end`"), "got: {}", err);
    }

    #[test]
    fn test_stray_else() {
        let err = resolve_src("else").unwrap_err();
        assert!(err.to_string().contains("`else`"), "got: {}", err);

        let err = resolve_src("3 times 1 else end").unwrap_err();
        assert!(err.to_string().contains("`times`"), "got: {}", err);
    }

    #[test]
    fn test_unclosed_block() {
        let err = resolve_src("1 if 2").unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { open: "if" }));
    }

    #[test]
    fn test_def_without_name() {
        let err = resolve_src("def").unwrap_err();
        assert!(err.to_string().contains("procedure name"), "got: {}", err);

        let err = resolve_src("def 1 end").unwrap_err();
        assert!(err.to_string().contains("procedure name"), "got: {}", err);
    }
}
