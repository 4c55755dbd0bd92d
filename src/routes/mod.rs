/// Router Module Index
///
/// One module per access level. Each group is mounted behind its own layout boundary in
/// `create_router`, so a screen's protection is decided by where it is declared.

/// Screens open to everyone.
pub mod public;

/// Screens behind `Layout::authenticated()`.
pub mod authenticated;

/// Screens behind `Layout::authenticated()` and `Layout::admin()`.
pub mod admin;
