//! Builtin entropy, gathered without any I/O.
//!
//! The builtin source is the fallback that always works: it mixes in the
//! wall-clock time, the process id and a window of runtime state. None of
//! this is strong entropy. It only supplements the other sources.

mod generator;

pub use generator::{
    choose_offset, BuiltinGenerator, RuntimeState, SystemState, BUILTIN_BYTES, SCRATCH_LEN,
    STAMP_LEN, WINDOW_LEN,
};
