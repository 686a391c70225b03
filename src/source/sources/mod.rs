/// JSON-lines file-backed source implementation.
pub mod file_source;

/// Seeded random sales generator.
pub mod synthetic;
