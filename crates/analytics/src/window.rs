//! Ordered, optionally partitioned window statistics.
//!
//! Rows are stable-sorted by the order key (ties keep input order), then each
//! partition is evaluated independently while the output stays in global
//! sorted order. Several expressions can share one partition/order definition, the
//! way several `OVER (...)` clauses share a window in a query.

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use warehouse_core::{AnalyticsError, AnalyticsResult};

use crate::aggregate::StableSum;

/// Window frame for `sum` / `avg`. Ignored by `rank` / `row_number`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frame {
    /// From the first row of the partition to the current row.
    UnboundedPreceding,
    /// The current row plus up to `n` rows before it.
    Preceding(usize),
}

/// Window function.
pub enum WindowFn<'f, T> {
    Sum(Box<dyn Fn(&T) -> f64 + 'f>),
    /// Exact integer sum; overflow aborts the window.
    SumInt(Box<dyn Fn(&T) -> i64 + 'f>),
    Avg(Box<dyn Fn(&T) -> f64 + 'f>),
    /// Competition ranking: ties share the lower rank, the next distinct key
    /// skips ahead by the tie-group size.
    Rank,
    /// 1..N within the partition, ties broken by input order.
    RowNumber,
}

/// A window function bound to its frame.
pub struct WindowExpr<'f, T> {
    pub func: WindowFn<'f, T>,
    pub frame: Frame,
}

impl<'f, T> WindowExpr<'f, T> {
    pub fn sum(value: impl Fn(&T) -> f64 + 'f, frame: Frame) -> Self {
        Self {
            func: WindowFn::Sum(Box::new(value)),
            frame,
        }
    }

    pub fn sum_int(value: impl Fn(&T) -> i64 + 'f, frame: Frame) -> Self {
        Self {
            func: WindowFn::SumInt(Box::new(value)),
            frame,
        }
    }

    pub fn avg(value: impl Fn(&T) -> f64 + 'f, frame: Frame) -> Self {
        Self {
            func: WindowFn::Avg(Box::new(value)),
            frame,
        }
    }

    pub fn rank() -> Self {
        Self {
            func: WindowFn::Rank,
            frame: Frame::UnboundedPreceding,
        }
    }

    pub fn row_number() -> Self {
        Self {
            func: WindowFn::RowNumber,
            frame: Frame::UnboundedPreceding,
        }
    }
}

/// Computed window value.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum WindowValue {
    Number(f64),
    Integer(i64),
    Position(u64),
}

impl WindowValue {
    pub fn as_f64(self) -> f64 {
        match self {
            WindowValue::Number(x) => x,
            WindowValue::Integer(n) => n as f64,
            WindowValue::Position(p) => p as f64,
        }
    }

    pub fn as_integer(self) -> Option<i64> {
        match self {
            WindowValue::Integer(n) => Some(n),
            WindowValue::Number(_) | WindowValue::Position(_) => None,
        }
    }

    pub fn as_position(self) -> Option<u64> {
        match self {
            WindowValue::Position(p) => Some(p),
            WindowValue::Number(_) | WindowValue::Integer(_) => None,
        }
    }
}

/// Input row plus one value per window expression, in expression order.
#[derive(Debug, Clone, PartialEq)]
pub struct Windowed<T> {
    pub row: T,
    pub values: Vec<WindowValue>,
}

impl<T> Windowed<T> {
    pub fn number(&self, expr: usize) -> f64 {
        self.values.get(expr).map_or(0.0, |v| v.as_f64())
    }

    pub fn integer(&self, expr: usize) -> i64 {
        self.values
            .get(expr)
            .and_then(|v| v.as_integer())
            .unwrap_or_default()
    }

    pub fn position(&self, expr: usize) -> u64 {
        self.values
            .get(expr)
            .and_then(|v| v.as_position())
            .unwrap_or_default()
    }
}

/// Totally ordered `f64` for use as a sort key (IEEE 754 `totalOrder`).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatKey(pub f64);

impl Eq for FloatKey {}

impl PartialOrd for FloatKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Default)]
struct FrameState {
    total: StableSum,
    int_total: i64,
    count: usize,
    recent: VecDeque<f64>,
    recent_ints: VecDeque<i64>,
}

/// Keep at most the current row plus `n` preceding rows.
fn slide<V>(recent: &mut VecDeque<V>, n: usize) {
    while recent.len() - 1 > n {
        recent.pop_front();
    }
}

fn int_overflow() -> AnalyticsError {
    AnalyticsError::invalid_parameter("window integer sum overflows i64")
}

impl FrameState {
    /// Push the current row's value and return (frame sum, frame row count).
    fn push(&mut self, x: f64, frame: Frame) -> (f64, usize) {
        match frame {
            Frame::UnboundedPreceding => {
                self.total.add(x);
                self.count += 1;
                (self.total.value(), self.count)
            }
            Frame::Preceding(n) => {
                self.recent.push_back(x);
                slide(&mut self.recent, n);
                let sum: StableSum = self.recent.iter().copied().collect();
                (sum.value(), self.recent.len())
            }
        }
    }

    fn push_int(&mut self, x: i64, frame: Frame) -> AnalyticsResult<i64> {
        match frame {
            Frame::UnboundedPreceding => {
                self.int_total = self.int_total.checked_add(x).ok_or_else(int_overflow)?;
                Ok(self.int_total)
            }
            Frame::Preceding(n) => {
                self.recent_ints.push_back(x);
                slide(&mut self.recent_ints, n);
                self.recent_ints
                    .iter()
                    .try_fold(0i64, |acc, v| acc.checked_add(*v))
                    .ok_or_else(int_overflow)
            }
        }
    }
}

#[derive(Debug)]
struct PartitionState {
    row_number: u64,
    rank: u64,
    last_row: Option<usize>,
    frames: Vec<FrameState>,
}

impl PartitionState {
    fn new(exprs: usize) -> Self {
        Self {
            row_number: 0,
            rank: 0,
            last_row: None,
            frames: (0..exprs).map(|_| FrameState::default()).collect(),
        }
    }
}

/// Sort `rows` by `order` ascending (stable), then evaluate `exprs` per
/// partition. Row count in equals row count out.
///
/// Fails only when an integer sum overflows.
///
/// Use `|_| ()` as `partition` for a partition-free window and
/// `std::cmp::Reverse` in `order` for descending order.
pub fn window<T, P, O, FP, FO>(
    rows: Vec<T>,
    partition: FP,
    order: FO,
    exprs: &[WindowExpr<'_, T>],
) -> AnalyticsResult<Vec<Windowed<T>>>
where
    P: Eq + Hash,
    O: Ord,
    FP: Fn(&T) -> P,
    FO: Fn(&T) -> O,
{
    let mut keyed: Vec<(O, T)> = rows.into_iter().map(|r| (order(&r), r)).collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    let mut states: HashMap<P, PartitionState> = HashMap::new();
    let mut computed: Vec<Vec<WindowValue>> = Vec::with_capacity(keyed.len());

    for (pos, (key, row)) in keyed.iter().enumerate() {
        let state = states
            .entry(partition(row))
            .or_insert_with(|| PartitionState::new(exprs.len()));

        state.row_number += 1;
        let tied = state.last_row.is_some_and(|prev| keyed[prev].0 == *key);
        if !tied {
            state.rank = state.row_number;
        }
        state.last_row = Some(pos);

        let (rank, row_number) = (state.rank, state.row_number);
        let values = exprs
            .iter()
            .zip(state.frames.iter_mut())
            .map(|(expr, frame_state)| -> AnalyticsResult<WindowValue> {
                Ok(match &expr.func {
                    WindowFn::Rank => WindowValue::Position(rank),
                    WindowFn::RowNumber => WindowValue::Position(row_number),
                    WindowFn::Sum(value) => {
                        WindowValue::Number(frame_state.push(value(row), expr.frame).0)
                    }
                    WindowFn::SumInt(value) => {
                        WindowValue::Integer(frame_state.push_int(value(row), expr.frame)?)
                    }
                    WindowFn::Avg(value) => {
                        let (sum, n) = frame_state.push(value(row), expr.frame);
                        WindowValue::Number(sum / n as f64)
                    }
                })
            })
            .collect::<AnalyticsResult<Vec<WindowValue>>>()?;
        computed.push(values);
    }

    tracing::trace!(
        rows = keyed.len(),
        partitions = states.len(),
        exprs = exprs.len(),
        "window evaluated"
    );

    Ok(keyed
        .into_iter()
        .zip(computed)
        .map(|((_, row), values)| Windowed { row, values })
        .collect())
}
