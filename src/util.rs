/// Numeric conversion helpers.
///
/// The language has a single numeric type, the double, but several places
/// need integral views of it: list indices, `range` bounds, and the `int`
/// cast. These helpers centralize the truncation and range checks so the
/// call sites stay small.
pub mod num;
