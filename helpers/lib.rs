#![cfg_attr(not(feature = "std"), no_std)]

pub mod math;
pub mod types;

/// Evaluates `$condition` and returns early with `$error` when it does not hold.
#[macro_export]
macro_rules! ensure {
    ($condition:expr, $error:expr $(,)?) => {
        if !$condition {
            return Err($error.into());
        }
    };
}
