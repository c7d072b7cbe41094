//! Host package for the workspace-level integration tests under `tests/`.
