//! # semhl
//!
//! Grammar-driven semantic highlighting and character-weighted accuracy scoring.
//!
//! File Layout
//!
//! The classification engine runs in two stages over the output of an external parser:
//! a per-token lexical table, then a post-order walk of the parse tree that emits
//! grammatical overrides. The scorer then compares per-character projections of two
//! classifications (ours, a learned model's or a baseline lexer's) against an oracle.
//!
//! src/semhl
//!   ├── hcode          The highlight categories
//!   ├── syntax         Parser-facing interface: tokens, parse tree, builder, walker
//!   ├── annotation     Token annotations (ETA) and their classified form (HETA)
//!   ├── lexical        Token kind -> highlight category tables
//!   ├── overrides      Override buffer, descendant scans and the resolver
//!   ├── grammatical    The override engine driven by per-language rule catalogs
//!   ├── languages      C++, C# and JavaScript vocabularies, tables and catalogs
//!   ├── highlighter    Both stages for one language
//!   ├── projection     Per-character projection of classified spans
//!   ├── baseline       Baseline lexer payloads
//!   ├── task           Coarsening tables for the evaluation tasks
//!   ├── scoring        Character-weighted accuracy
//!   ├── evaluation     Oracle records, predictors and batch reports
//!   ├── render         HTML debug output
//!   ├── config         Layered configuration
//!   ├── logging        tracing subscriber setup
//!   └── testing        Parse-tree fixtures
//!
//! The parser itself is not part of this crate: adapters build a
//! [`ParseTree`](semhl::syntax::ParseTree) through
//! [`TreeBuilder`](semhl::syntax::TreeBuilder) and hand it to the
//! [`Highlighter`](semhl::highlighter::Highlighter).

pub mod semhl;

pub use semhl::{Eta, HCharSeq, HCode, Heta, Highlighter, Language, TaskCode};
