//! Property-based tests for editor version parsing and ordering.
