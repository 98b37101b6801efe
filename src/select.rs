//! Three-way integer selector.

/// Pick one of three values by an integer selector.
///
/// Returns `a` when `cond` is 0, `b` when it is 1, and `c` for every other
/// value, negative ones included.
///
/// ```
/// use triple_if::select;
///
/// assert_eq!(select(10, 20, 30, 0), 10);
/// assert_eq!(select(10, 20, 30, 1), 20);
/// assert_eq!(select(10, 20, 30, -5), 30);
/// ```
#[inline]
pub const fn select(a: i64, b: i64, c: i64, cond: i64) -> i64 {
    match cond {
        0 => a,
        1 => b,
        _ => c,
    }
}
