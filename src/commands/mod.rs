pub mod check;
pub mod serve;
pub mod sweep;

// Re-export command functions for convenience
pub use check::check;
pub use serve::serve;
pub use sweep::sweep;
