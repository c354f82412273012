// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Two-phase "ask for the size, then fill" queries.
//
// Many spooler calls (`GetDefaultPrinterW`, `EnumPrintersW`) first report how
// large a buffer they need and only fill it on a second call. The printer set
// can change between the two calls, so a fill may report that it needs more.

use tracing::debug;

use crate::error::{Result, SpoolError};

/// How many size/fill rounds are attempted before giving up.
pub const MAX_SIZING_ATTEMPTS: u32 = 3;

/// Result of one fill call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// The buffer held the result; this many leading elements are meaningful.
    Filled(usize),
    /// The result grew since it was sized; at least this many elements are needed now.
    NeedsMore(usize),
}

/// Run a variable-length query.
///
/// `sizer` returns the required element count; zero means there is no result
/// at all and yields `Ok(None)`. `filler` receives a zeroed buffer of the
/// requested length.
pub fn query_variable_length<T, S, F>(
    query: &'static str,
    mut sizer: S,
    mut filler: F,
) -> Result<Option<Vec<T>>>
where
    T: Default + Clone,
    S: FnMut() -> Result<usize>,
    F: FnMut(&mut [T]) -> Result<FillOutcome>,
{
    let mut required = sizer()?;
    if required == 0 {
        debug!(query, "query reported no result");
        return Ok(None);
    }

    for attempt in 1..=MAX_SIZING_ATTEMPTS {
        let mut buffer = vec![T::default(); required];
        match filler(&mut buffer)? {
            FillOutcome::Filled(len) => {
                buffer.truncate(len.min(required));
                debug!(query, len = buffer.len(), attempt, "query filled");
                return Ok(Some(buffer));
            }
            FillOutcome::NeedsMore(more) => {
                debug!(query, had = required, needs = more, attempt, "result grew, resizing");
                // Always grow, even if the OS reports a stale size.
                required = more.max(required + 1);
            }
        }
    }

    Err(SpoolError::BufferSizing {
        query,
        attempts: MAX_SIZING_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_means_no_result() {
        let mut fills = 0;
        let out: Option<Vec<u16>> = query_variable_length(
            "empty",
            || Ok(0),
            |_buf| {
                fills += 1;
                Ok(FillOutcome::Filled(0))
            },
        )
        .expect("query");
        assert!(out.is_none());
        assert_eq!(fills, 0);
    }

    #[test]
    fn fills_requested_size() {
        let out = query_variable_length(
            "name",
            || Ok(4),
            |buf: &mut [u16]| {
                assert_eq!(buf.len(), 4);
                buf[..3].copy_from_slice(&[65, 66, 0]);
                Ok(FillOutcome::Filled(3))
            },
        )
        .expect("query")
        .expect("some");
        assert_eq!(out, vec![65, 66, 0]);
    }

    #[test]
    fn grows_when_result_changes_between_calls() {
        let mut calls = Vec::new();
        let out = query_variable_length(
            "grow",
            || Ok(2),
            |buf: &mut [u8]| {
                calls.push(buf.len());
                if buf.len() < 5 {
                    Ok(FillOutcome::NeedsMore(5))
                } else {
                    Ok(FillOutcome::Filled(5))
                }
            },
        )
        .expect("query")
        .expect("some");
        assert_eq!(calls, vec![2, 5]);
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let err = query_variable_length(
            "runaway",
            || Ok(1),
            |buf: &mut [u8]| Ok(FillOutcome::NeedsMore(buf.len())),
        )
        .expect_err("never settles");
        assert!(matches!(
            err,
            SpoolError::BufferSizing {
                query: "runaway",
                attempts: MAX_SIZING_ATTEMPTS
            }
        ));
    }

    #[test]
    fn sizer_errors_propagate() {
        let err = query_variable_length::<u8, _, _>(
            "broken",
            || Err(SpoolError::Enumeration("access denied".into())),
            |_| Ok(FillOutcome::Filled(0)),
        )
        .expect_err("sizer failed");
        assert!(matches!(err, SpoolError::Enumeration(_)));
    }
}
