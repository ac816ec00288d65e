//! End-to-end tests for Idea Hub live under `tests/`.
