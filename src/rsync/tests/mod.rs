//! Unit tests for the rsync translator, split by concern.

mod sync;
