//! Feature-gated logging macros.
//!
//! Messages fan out to `defmt` and/or `log` depending on the enabled
//! features and compile to nothing when neither is enabled. Format strings
//! must stay within the subset understood by both: positional `{}` and the
//! hex forms `{:x}` / `{:#x}`. Captured identifiers (`{id}`) are not
//! portable to `defmt`.

macro_rules! log_at {
    ($level:ident, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        defmt::$level!($fmt $(, $arg)*);
        #[cfg(feature = "log")]
        log::$level!($fmt $(, $arg)*);
        #[cfg(not(any(feature = "defmt", feature = "log")))]
        {
            $( let _ = &$arg; )*
        }
    }};
}

macro_rules! trace_debug {
    ($($t:tt)*) => { log_at!(debug, $($t)*) };
}

macro_rules! trace_warn {
    ($($t:tt)*) => { log_at!(warn, $($t)*) };
}

macro_rules! trace_error {
    ($($t:tt)*) => { log_at!(error, $($t)*) };
}
