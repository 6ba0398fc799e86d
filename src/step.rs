//! The step log: one immutable record per execution event.
//!
//! A run appends [`Step`]s in the exact order the algorithm performs its
//! calls, returns, cache hits and table writes. Nothing in the log is ever
//! reordered or rewritten, so replaying a prefix `0..=i` reproduces the state
//! of the run at step `i` (see [`crate::replay`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tree::NodeId;

/// Event category of a [`Step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    /// A recursive invocation was entered (push).
    Call,
    /// A recursive invocation returned after computing its value (pop).
    Return,
    /// A recursive invocation resolved through the memo (pop, terminal).
    MemoHit,
    /// A tabulation cell was written.
    TableFill,
    /// Terminal event of a tabulated run, carrying the overall answer.
    Solution,
}

impl StepKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::Call => "call",
            StepKind::Return => "return",
            StepKind::MemoHit => "memo-hit",
            StepKind::TableFill => "table-fill",
            StepKind::Solution => "solution",
        }
    }

    /// True for the events that close an open call frame.
    #[inline]
    pub fn closes_frame(self) -> bool {
        matches!(self, StepKind::Return | StepKind::MemoHit)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coordinates of a tabulation cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableIndex {
    /// Cell of a 1-D table (Fibonacci).
    Linear(usize),
    /// `(row, col)` cell of a 2-D table.
    Grid(usize, usize),
}

impl TableIndex {
    /// Normalize to `(row, col)`; a linear index lives on row 0.
    #[inline]
    pub fn as_pair(self) -> (usize, usize) {
        match self {
            TableIndex::Linear(i) => (0, i),
            TableIndex::Grid(r, c) => (r, c),
        }
    }
}

impl fmt::Display for TableIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableIndex::Linear(i) => write!(f, "[{i}]"),
            TableIndex::Grid(r, c) => write!(f, "[{r}][{c}]"),
        }
    }
}

/// A memo or table value.
///
/// `Infinity` is the "impossible" sentinel of minimisation problems. It is
/// valid algorithmic output and propagates through memo and recursion like
/// any other value.
///
/// In JSON an integer is a number, text is a string and infinity is the
/// object `{"infinite": true}`, so it never collides with `null` (an unset
/// field or unwritten cell) or with any string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "ValueRepr", try_from = "ValueRepr")]
pub enum Value {
    Int(i64),
    Infinity,
    Text(String),
}

/// Wire form of [`Value`].
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ValueRepr {
    Int(i64),
    Infinite { infinite: bool },
    Text(String),
}

impl From<Value> for ValueRepr {
    fn from(v: Value) -> Self {
        match v {
            Value::Int(n) => ValueRepr::Int(n),
            Value::Infinity => ValueRepr::Infinite { infinite: true },
            Value::Text(s) => ValueRepr::Text(s),
        }
    }
}

impl TryFrom<ValueRepr> for Value {
    type Error = &'static str;

    fn try_from(repr: ValueRepr) -> Result<Self, Self::Error> {
        match repr {
            ValueRepr::Int(n) => Ok(Value::Int(n)),
            ValueRepr::Infinite { infinite: true } => Ok(Value::Infinity),
            ValueRepr::Infinite { infinite: false } => Err("finite values are plain numbers"),
            ValueRepr::Text(s) => Ok(Value::Text(s)),
        }
    }
}

impl Value {
    /// Numeric payload, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn is_infinite(&self) -> bool {
        matches!(self, Value::Infinity)
    }

    /// Map the internal sentinel to the caller-facing answer: infinity
    /// becomes `-1`, everything else passes through.
    pub fn into_answer(self) -> Value {
        match self {
            Value::Infinity => Value::Int(-1),
            other => other,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<Option<i64>> for Value {
    /// `None` is read as "unreachable".
    fn from(v: Option<i64>) -> Self {
        v.map_or(Value::Infinity, Value::Int)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Infinity => f.write_str("∞"),
            Value::Text(s) => write!(f, "\"{s}\""),
        }
    }
}

/// One event of a run.
///
/// Which optional fields are populated depends on [`StepKind`]:
/// - `Call` / `Return` / `MemoHit`: `node_id`;
/// - `Return` that caches, and `MemoHit`: `memo_key` + `memo_value`;
/// - `TableFill` / `Solution`: `table_index`, `table_value`, `dependencies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub kind: StepKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_index: Option<TableIndex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<TableIndex>,
    pub message: String,
}

impl Step {
    fn bare(kind: StepKind, message: String) -> Self {
        Self {
            kind,
            node_id: None,
            memo_key: None,
            memo_value: None,
            table_index: None,
            table_value: None,
            dependencies: Vec::new(),
            message,
        }
    }

    pub fn call(node: NodeId, message: impl Into<String>) -> Self {
        Self {
            node_id: Some(node),
            ..Self::bare(StepKind::Call, message.into())
        }
    }

    /// A return; `cached` carries the memo entry written by this return.
    pub fn ret(node: NodeId, cached: Option<(String, Value)>, message: impl Into<String>) -> Self {
        let (memo_key, memo_value) = match cached {
            Some((k, v)) => (Some(k), Some(v)),
            None => (None, None),
        };
        Self {
            node_id: Some(node),
            memo_key,
            memo_value,
            ..Self::bare(StepKind::Return, message.into())
        }
    }

    pub fn memo_hit(node: NodeId, key: String, value: Value, message: impl Into<String>) -> Self {
        Self {
            node_id: Some(node),
            memo_key: Some(key),
            memo_value: Some(value),
            ..Self::bare(StepKind::MemoHit, message.into())
        }
    }

    pub fn table_fill(
        index: TableIndex,
        value: Value,
        dependencies: Vec<TableIndex>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            table_index: Some(index),
            table_value: Some(value),
            dependencies,
            ..Self::bare(StepKind::TableFill, message.into())
        }
    }

    pub fn solution(
        index: TableIndex,
        value: Value,
        dependencies: Vec<TableIndex>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            table_index: Some(index),
            table_value: Some(value),
            dependencies,
            ..Self::bare(StepKind::Solution, message.into())
        }
    }

    /// The memo entry this step writes or reads, if any.
    pub fn memo_entry(&self) -> Option<(&str, &Value)> {
        match (&self.memo_key, &self.memo_value) {
            (Some(k), Some(v)) => Some((k.as_str(), v)),
            _ => None,
        }
    }
}
