//! Macros
//!
//! Every statistic is a thread local cell updated without locking from the
//! render loops. Each definition macro also creates a callback that moves the
//! thread's value into the global `StatsAccumulator` and leaves the cell
//! zeroed, so calling `report_stats!` again on the same thread never counts a
//! value twice.

/// Defines an `i64` event counter, e.g. shadow rays traced.
///
/// * `$title`      - `Category/Title` name, e.g. "BVH/Leaf nodes".
/// * `$var`        - Name of the thread local cell.
/// * `$stats_func` - Name of the generated report callback.
#[macro_export]
macro_rules! stat_counter {
    ($title: expr, $var: ident, $stats_func: ident $(,)?) => {
        thread_local! { pub(crate) static $var: std::cell::Cell<i64> = std::cell::Cell::new(0); }

        pub(crate) fn $stats_func(accum: &mut $crate::stats::StatsAccumulator) {
            accum.report($title, $crate::stats::Stat::Count($var.with(std::cell::Cell::take)));
        }
    };
}

/// Defines a byte counter for memory held by films and trees.
///
/// * `$title`      - `Category/Title` name, e.g. "Memory/BVH tree".
/// * `$var`        - Name of the thread local cell.
/// * `$stats_func` - Name of the generated report callback.
#[macro_export]
macro_rules! stat_memory_counter {
    ($title: expr, $var: ident, $stats_func: ident $(,)?) => {
        thread_local! { pub(crate) static $var: std::cell::Cell<u64> = std::cell::Cell::new(0); }

        pub(crate) fn $stats_func(accum: &mut $crate::stats::StatsAccumulator) {
            accum.report($title, $crate::stats::Stat::Bytes($var.with(std::cell::Cell::take)));
        }
    };
}

/// Defines a summary of integer samples. Update it with `stat_dist!`.
///
/// * `$title`      - `Category/Title` name, e.g. "Integrator/Path length".
/// * `$var`        - Name of the thread local cell.
/// * `$stats_func` - Name of the generated report callback.
#[macro_export]
macro_rules! stat_int_distribution {
    ($title: expr, $var: ident, $stats_func: ident $(,)?) => {
        thread_local! {
            pub(crate) static $var: std::cell::RefCell<$crate::stats::StatsDistribution> =
                std::cell::RefCell::new($crate::stats::StatsDistribution::default());
        }

        pub(crate) fn $stats_func(accum: &mut $crate::stats::StatsAccumulator) {
            accum.report($title, $crate::stats::Stat::Distribution($var.with(std::cell::RefCell::take)));
        }
    };
}

/// Defines a pair of counters shown as a percentage of the second.
///
/// * `$title`      - `Category/Title` name.
/// * `$var_num`    - Cell counting the events of interest.
/// * `$var_denom`  - Cell counting all events.
/// * `$stats_func` - Name of the generated report callback.
#[macro_export]
macro_rules! stat_percent {
    ($title: expr, $var_num: ident, $var_denom: ident, $stats_func: ident $(,)?) => {
        $crate::stat_fraction!($title, $var_num, $var_denom, $stats_func, $crate::stats::Stat::Percent);
    };
}

/// Defines a pair of counters shown as the quotient of the first by the
/// second.
///
/// * `$title`      - `Category/Title` name.
/// * `$var_num`    - Cell holding the numerator.
/// * `$var_denom`  - Cell holding the denominator.
/// * `$stats_func` - Name of the generated report callback.
#[macro_export]
macro_rules! stat_ratio {
    ($title: expr, $var_num: ident, $var_denom: ident, $stats_func: ident $(,)?) => {
        $crate::stat_fraction!($title, $var_num, $var_denom, $stats_func, $crate::stats::Stat::Ratio);
    };
}

/// Shared expansion of `stat_percent!` and `stat_ratio!`.
#[doc(hidden)]
#[macro_export]
macro_rules! stat_fraction {
    ($title: expr, $var_num: ident, $var_denom: ident, $stats_func: ident, $kind: path) => {
        thread_local! {
            pub(crate) static $var_num: std::cell::Cell<i64> = std::cell::Cell::new(0);
            pub(crate) static $var_denom: std::cell::Cell<i64> = std::cell::Cell::new(0);
        }

        pub(crate) fn $stats_func(accum: &mut $crate::stats::StatsAccumulator) {
            let num = $var_num.with(std::cell::Cell::take);
            let denom = $var_denom.with(std::cell::Cell::take);
            accum.report($title, $kind(num, denom));
        }
    };
}

/// Adds to a counter, memory counter or either half of a fraction.
#[macro_export]
macro_rules! stat_inc {
    ($var: ident, $e: expr) => {
        $var.with(|v| v.set(v.get() + $e));
    };
}

/// Adds a sample to a distribution.
#[macro_export]
macro_rules! stat_dist {
    ($var: ident, $e: expr) => {
        $var.with(|v| v.borrow_mut().report($e));
    };
}

/// Generates `register_stats()` which adds the given callbacks to the global
/// registrar the first time it is called. Call it from the constructor of the
/// type that owns the statistics, e.g. `BVH::new()` or `Film::new()`.
///
/// * `$stat_func` - One or more callbacks created by the `stat_*` macros.
#[macro_export]
macro_rules! stat_register_fns {
    ($($stat_func: ident),+ $(,)?) => {
        pub(crate) fn register_stats() {
            static REGISTERED: std::sync::Once = std::sync::Once::new();
            REGISTERED.call_once(|| {
                let mut sr = $crate::stats::lock($crate::stats::stats_registrar());
                $(
                    sr.register_stat_func($stat_func);
                )+
            });
        }
    };
}

/// Moves the calling thread's statistics into the global `StatsAccumulator`.
/// Call it at the end of each render worker and once on the main thread.
#[macro_export]
macro_rules! report_stats {
    () => {{
        let mut accum = $crate::stats::lock($crate::stats::stats_accumulator());
        $crate::stats::lock($crate::stats::stats_registrar()).call_stat_funcs(&mut accum);
    }};
}

/// Prints the global `StatsAccumulator`.
#[macro_export]
macro_rules! print_stats {
    () => {{
        $crate::stats::lock($crate::stats::stats_accumulator()).print();
    }};
}

/// Clears the global `StatsAccumulator`.
#[macro_export]
macro_rules! clear_stats {
    () => {{
        $crate::stats::lock($crate::stats::stats_accumulator()).clear();
    }};
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
