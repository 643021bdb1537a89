//! Grouped summary statistics.
//!
//! Groups are identified by value equality of the key and emitted in order of
//! first appearance. Grouping never sorts; a later window or sort stage does.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use warehouse_core::{AnalyticsError, AnalyticsResult};

/// Compensated (Neumaier) summation.
///
/// Keeps the running error term separately so long money columns add up the
/// same regardless of magnitude ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StableSum {
    sum: f64,
    compensation: f64,
}

impl StableSum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.compensation += (self.sum - t) + x;
        } else {
            self.compensation += (x - t) + self.sum;
        }
        self.sum = t;
    }

    pub fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

impl FromIterator<f64> for StableSum {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut s = StableSum::new();
        for x in iter {
            s.add(x);
        }
        s
    }
}

/// What a reducer does with an absent value (e.g. the right side of an
/// unmatched left-outer row).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OnAbsent {
    /// Treat as 0 and count the row.
    Zero,
    /// Ignore the row entirely.
    Skip,
}

type ValueFn<'f, T> = Box<dyn Fn(&T) -> Option<f64> + 'f>;
type IntFn<'f, T> = Box<dyn Fn(&T) -> Option<i64> + 'f>;

/// Per-group reduction.
pub enum Reducer<'f, T> {
    /// Number of rows in the group.
    Count,
    /// Number of rows satisfying the predicate.
    CountWhere(Box<dyn Fn(&T) -> bool + 'f>),
    /// Number of distinct present values.
    CountDistinct(Box<dyn Fn(&T) -> Option<String> + 'f>),
    Sum(ValueFn<'f, T>, OnAbsent),
    /// Exact integer sum; overflow is an error rather than a wrap.
    SumInt(IntFn<'f, T>, OnAbsent),
    Avg(ValueFn<'f, T>, OnAbsent),
}

impl<'f, T> Reducer<'f, T> {
    pub fn count() -> Self {
        Reducer::Count
    }

    pub fn count_where(predicate: impl Fn(&T) -> bool + 'f) -> Self {
        Reducer::CountWhere(Box::new(predicate))
    }

    pub fn count_distinct(value: impl Fn(&T) -> Option<String> + 'f) -> Self {
        Reducer::CountDistinct(Box::new(value))
    }

    pub fn sum(value: impl Fn(&T) -> Option<f64> + 'f, on_absent: OnAbsent) -> Self {
        Reducer::Sum(Box::new(value), on_absent)
    }

    pub fn sum_int(value: impl Fn(&T) -> Option<i64> + 'f, on_absent: OnAbsent) -> Self {
        Reducer::SumInt(Box::new(value), on_absent)
    }

    pub fn avg(value: impl Fn(&T) -> Option<f64> + 'f, on_absent: OnAbsent) -> Self {
        Reducer::Avg(Box::new(value), on_absent)
    }

    fn reduce(&self, members: &[&T]) -> AnalyticsResult<Aggregate> {
        match self {
            Reducer::Count => Ok(Aggregate::count(members.len())),
            Reducer::CountWhere(pred) => Ok(Aggregate::count(
                members.iter().filter(|m| pred(**m)).count(),
            )),
            Reducer::CountDistinct(value) => {
                let distinct: HashSet<String> =
                    members.iter().filter_map(|m| value(*m)).collect();
                Ok(Aggregate::count(distinct.len()))
            }
            Reducer::Sum(value, on_absent) => Ok(Aggregate::Float(
                present_values(members, value, *on_absent).0.value(),
            )),
            Reducer::SumInt(value, _) => members
                .iter()
                .filter_map(|m| value(*m))
                .try_fold(0i64, |acc, x| acc.checked_add(x))
                .map(Aggregate::Int)
                .ok_or_else(|| AnalyticsError::invalid_parameter("integer sum overflows i64")),
            Reducer::Avg(value, on_absent) => {
                let (total, n) = present_values(members, value, *on_absent);
                if n == 0 {
                    return Err(AnalyticsError::empty_group(
                        "avg evaluated over a group with no present values",
                    ));
                }
                Ok(Aggregate::Float(total.value() / n as f64))
            }
        }
    }
}

fn present_values<T>(
    members: &[&T],
    value: &ValueFn<'_, T>,
    on_absent: OnAbsent,
) -> (StableSum, usize) {
    let mut total = StableSum::new();
    let mut n = 0usize;
    for m in members {
        match (value(*m), on_absent) {
            (Some(x), _) => {
                total.add(x);
                n += 1;
            }
            (None, OnAbsent::Zero) => n += 1,
            (None, OnAbsent::Skip) => {}
        }
    }
    (total, n)
}

/// A reduced value. Counts and integer sums stay exact.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Aggregate {
    Int(i64),
    Float(f64),
}

impl Aggregate {
    fn count(n: usize) -> Self {
        Aggregate::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Aggregate::Int(n) => n as f64,
            Aggregate::Float(x) => x,
        }
    }

    pub fn as_i64(self) -> Option<i64> {
        match self {
            Aggregate::Int(n) => Some(n),
            Aggregate::Float(_) => None,
        }
    }
}

/// One output row of [`aggregate`]: the key plus one value per reducer, in
/// reducer order.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<K> {
    pub key: K,
    pub size: usize,
    pub values: Vec<Aggregate>,
}

impl<K> Group<K> {
    pub fn value(&self, reducer: usize) -> f64 {
        self.values.get(reducer).map_or(0.0, |v| v.as_f64())
    }

    /// Exact value of a count or integer-sum reducer; 0 for anything else.
    pub fn int(&self, reducer: usize) -> i64 {
        self.values
            .get(reducer)
            .and_then(|v| v.as_i64())
            .unwrap_or_default()
    }
}

/// Partition `rows` by key, preserving first-appearance order of keys and
/// input order within each group.
pub fn group_by<'a, T, K, F>(rows: &'a [T], key: F) -> Vec<(K, Vec<&'a T>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&'a T>)> = Vec::new();

    for row in rows {
        let k = key(row);
        match positions.get(&k) {
            Some(&i) => groups[i].1.push(row),
            None => {
                positions.insert(k.clone(), groups.len());
                groups.push((k, vec![row]));
            }
        }
    }
    groups
}

/// Group `rows` and evaluate `reducers` per group.
///
/// Emits exactly one row per distinct key. Fails with
/// [`AnalyticsError::EmptyGroup`] when an `avg` has nothing to average and
/// with [`AnalyticsError::InvalidParameter`] when an integer sum overflows.
pub fn aggregate<T, K, F>(
    rows: &[T],
    key: F,
    reducers: &[Reducer<'_, T>],
) -> AnalyticsResult<Vec<Group<K>>>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let groups = group_by(rows, key);
    tracing::trace!(rows = rows.len(), groups = groups.len(), "grouped rows");

    groups
        .into_iter()
        .map(|(key, members)| {
            let values = reducers
                .iter()
                .map(|r| r.reduce(&members))
                .collect::<AnalyticsResult<Vec<Aggregate>>>()?;
            Ok(Group {
                key,
                size: members.len(),
                values,
            })
        })
        .collect()
}
