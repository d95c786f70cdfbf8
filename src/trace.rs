//! Build-time diagnostic tracing, gated by the `trace` Cargo feature.
//!
//! Grounded on `mm.c`'s `DEBUG`/`debugprint` macro pair: `spec.md` §6
//! calls for "debug toggles for tracing ... as build-time flags with no
//! runtime surface," which this reproduces without pulling in a logging
//! facade the teacher and the rest of the pack don't carry for this kind
//! of component. With the feature disabled, `trace!` expands to nothing
//! and costs zero bytes in the compiled artifact.

#[macro_export]
macro_rules! trace {
  ($($arg:tt)*) => {
    #[cfg(feature = "trace")]
    {
      eprintln!($($arg)*);
    }
  };
}
