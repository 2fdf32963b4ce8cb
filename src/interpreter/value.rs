/// The runtime value sum type.
///
/// Defines the `Value` enum with all ten variants of the language, together
/// with display formatting, truthiness, equality, and checked accessors.
pub mod core;

/// Callable runtime values.
///
/// Defines user functions (a declaration plus its captured environment),
/// host-registered native functions, classes, and instances.
pub mod function;
