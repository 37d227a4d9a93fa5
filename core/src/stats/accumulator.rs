//! Statistics Accumulator

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, OnceLock};

/// Return the global statistics accumulator.
pub fn stats_accumulator() -> &'static Mutex<StatsAccumulator> {
    static DATA: OnceLock<Mutex<StatsAccumulator>> = OnceLock::new();
    DATA.get_or_init(|| Mutex::new(StatsAccumulator::default()))
}

/// Running summary of integer samples such as path lengths.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StatsDistribution {
    /// Sum of all samples.
    sum: i64,

    /// Number of samples.
    count: u64,

    /// Smallest sample; meaningless while `count` is 0.
    min: i64,

    /// Largest sample; meaningless while `count` is 0.
    max: i64,
}

impl StatsDistribution {
    /// Adds a sample.
    ///
    /// * `val` - Sample value.
    pub fn report(&mut self, val: i64) {
        if self.count == 0 {
            self.min = val;
            self.max = val;
        } else {
            self.min = self.min.min(val);
            self.max = self.max.max(val);
        }
        self.sum += val;
        self.count += 1;
    }

    /// Folds another summary into this one.
    ///
    /// * `other` - The summary to merge.
    pub fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        self.sum += other.sum;
        self.count += other.count;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Number of samples.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the mean or `None` if there are no samples.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum as f64 / self.count as f64)
    }

    /// Returns the `(min, max)` range or `None` if there are no samples.
    pub fn range(&self) -> Option<(i64, i64)> {
        (self.count > 0).then_some((self.min, self.max))
    }
}

/// A single statistic as reported by one thread or accumulated over all of
/// them.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Stat {
    /// Event count, e.g. shadow rays traced.
    Count(i64),

    /// Memory in bytes.
    Bytes(u64),

    /// Integer samples, e.g. path lengths.
    Distribution(StatsDistribution),

    /// Part of a total, shown as a percentage.
    Percent(i64, i64),

    /// Quotient of two counts, e.g. nodes visited per query.
    Ratio(i64, i64),
}

impl Stat {
    /// Folds another report of the same statistic into this one. Returns
    /// false if the two are of different kinds.
    ///
    /// * `other` - The report to merge.
    fn merge(&mut self, other: &Stat) -> bool {
        match (self, other) {
            (Stat::Count(a), Stat::Count(b)) => *a += b,
            (Stat::Bytes(a), Stat::Bytes(b)) => *a += b,
            (Stat::Distribution(a), Stat::Distribution(b)) => a.merge(b),
            (Stat::Percent(n, d), Stat::Percent(m, e)) | (Stat::Ratio(n, d), Stat::Ratio(m, e)) => {
                *n += m;
                *d += e;
            }
            _ => return false,
        }
        true
    }

    /// Returns true if the statistic has nothing worth printing.
    fn is_empty(&self) -> bool {
        match self {
            Stat::Count(v) => *v == 0,
            Stat::Bytes(v) => *v == 0,
            Stat::Distribution(d) => d.count == 0,
            Stat::Percent(_, d) | Stat::Ratio(_, d) => *d == 0,
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Stat::Count(v) => write!(f, "{v:12}"),
            Stat::Bytes(v) => {
                let kb = v as f64 / 1024.0;
                if kb < 1024.0 {
                    write!(f, "{kb:12.2} kB")
                } else if kb < 1024.0 * 1024.0 {
                    write!(f, "{:12.2} MiB", kb / 1024.0)
                } else {
                    write!(f, "{:12.2} GiB", kb / (1024.0 * 1024.0))
                }
            }
            Stat::Distribution(d) => match (d.mean(), d.range()) {
                (Some(avg), Some((lo, hi))) => write!(f, "{avg:12.3} avg [range {lo} - {hi}]"),
                _ => write!(f, "{:>12}", "-"),
            },
            Stat::Percent(n, d) => write!(f, "{n:12} / {d:12} ({:.2}%)", 100.0 * n as f64 / d as f64),
            Stat::Ratio(n, d) => write!(f, "{n:12} / {d:12} ({:.2}x)", n as f64 / d as f64),
        }
    }
}

/// Totals of every statistic reported by the render threads, keyed by a
/// `Category/Title` name. Keys are kept sorted so reports are stable.
#[derive(Default)]
pub struct StatsAccumulator {
    stats: BTreeMap<String, Stat>,
}

impl StatsAccumulator {
    /// Adds a thread's report of a statistic.
    ///
    /// * `name` - `Category/Title` name of the statistic.
    /// * `stat` - The reported value.
    pub fn report(&mut self, name: &str, stat: Stat) {
        match self.stats.get_mut(name) {
            Some(total) => {
                if !total.merge(&stat) {
                    warn!("Statistic '{name}' reported as {stat:?} but accumulated as {total:?}");
                }
            }
            None => {
                self.stats.insert(name.to_string(), stat);
            }
        }
    }

    /// Returns the accumulated statistic.
    ///
    /// * `name` - `Category/Title` name of the statistic.
    pub fn get(&self, name: &str) -> Option<&Stat> {
        self.stats.get(name)
    }

    /// Returns the accumulated value of a counter or 0.
    ///
    /// * `name` - `Category/Title` name of the statistic.
    pub fn counter(&self, name: &str) -> i64 {
        match self.stats.get(name) {
            Some(Stat::Count(v)) => *v,
            _ => 0,
        }
    }

    /// Prints the report to standard output.
    pub fn print(&self) {
        print!("{self}");
    }

    /// Clear the accumulated statistics.
    pub fn clear(&mut self) {
        self.stats.clear();
    }
}

impl fmt::Display for StatsAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Statistics:")?;
        let mut current = None;
        for (name, stat) in self.stats.iter().filter(|(_, s)| !s.is_empty()) {
            let (category, title) = split_name(name);
            if current != Some(category) {
                writeln!(f, "  {category}")?;
                current = Some(category);
            }
            writeln!(f, "    {title:<42}{stat}")?;
        }
        Ok(())
    }
}

/// Splits a statistic name at the first `/` into category and title. Names
/// without a `/` have an empty category.
///
/// * `s` - The statistic name.
fn split_name(s: &str) -> (&str, &str) {
    s.split_once('/').unwrap_or(("", s))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let mut accum = StatsAccumulator::default();
        accum.report("Integrator/Rays", Stat::Count(3));
        accum.report("Integrator/Rays", Stat::Count(4));
        assert_eq!(accum.counter("Integrator/Rays"), 7);
        assert_eq!(accum.counter("Integrator/Missing"), 0);
        accum.clear();
        assert_eq!(accum.counter("Integrator/Rays"), 0);
    }

    #[test]
    fn mismatched_kind_keeps_total() {
        let mut accum = StatsAccumulator::default();
        accum.report("BVH/Leaf nodes", Stat::Count(2));
        accum.report("BVH/Leaf nodes", Stat::Bytes(100));
        assert_eq!(accum.get("BVH/Leaf nodes"), Some(&Stat::Count(2)));
    }

    #[test]
    fn distribution_tracks_range() {
        let mut a = StatsDistribution::default();
        assert_eq!(a.mean(), None);
        a.report(4);
        a.report(1);
        a.report(7);

        let mut b = StatsDistribution::default();
        b.report(10);
        b.report(0);
        b.merge(&a);
        b.merge(&StatsDistribution::default());

        assert_eq!(b.count(), 5);
        assert_eq!(b.range(), Some((0, 10)));
        assert_eq!(b.mean(), Some(22.0 / 5.0));
    }

    #[test]
    fn report_groups_by_category_and_skips_empty() {
        let mut accum = StatsAccumulator::default();
        accum.report("Integrator/Shadow rays traced", Stat::Count(12));
        accum.report("BVH/Primitives per leaf node", Stat::Ratio(9, 3));
        accum.report("BVH/Leaf nodes", Stat::Count(3));
        accum.report("Integrator/Paths terminated by Russian roulette", Stat::Percent(0, 0));
        accum.report("Memory/Film pixels", Stat::Bytes(2048));

        let report = accum.to_string();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "Statistics:");
        assert_eq!(lines[1], "  BVH");
        assert!(lines[2].starts_with("    Leaf nodes"));
        assert!(lines[3].ends_with("(3.00x)"));
        assert_eq!(lines[4], "  Integrator");
        assert!(lines[5].trim_end().ends_with("12"));
        assert_eq!(lines[6], "  Memory");
        assert!(lines[7].ends_with("2.00 kB"));
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn name_split() {
        assert_eq!(split_name("BVH/Leaf nodes"), ("BVH", "Leaf nodes"));
        assert_eq!(split_name("Rays"), ("", "Rays"));
    }
}
