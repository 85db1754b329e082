//! Run-length diff application.
//!
//! The server sends each changing buffer as a diff against the previous
//! turn's version:
//!
//! ```text
//! [match, mismatch, lit_0 .. lit_{mismatch-1}, match, mismatch, ...]
//! ```
//!
//! A match run copies from the previous buffer at the current output length
//! (not at an independent read cursor); a mismatch run appends the literals
//! that follow its marker. A trailing match with no mismatch marker is valid.

use crate::error::PatchError;

/// Apply `diff` to `previous`, producing the next buffer.
///
/// An empty diff yields an empty buffer.
///
/// # Errors
///
/// Returns [`PatchError`] if a length marker is negative, a mismatch run
/// declares more literals than the diff holds, or a match run copies past the
/// end of `previous`.
pub fn patch(previous: &[i32], diff: &[i32]) -> Result<Vec<i32>, PatchError> {
    let mut out = Vec::with_capacity(previous.len());
    let mut i = 0;

    while i < diff.len() {
        // matching
        let wanted = run_length(diff, i)?;
        if wanted > 0 {
            let offset = out.len();
            let run = previous
                .get(offset..offset + wanted)
                .ok_or(PatchError::CopyPastPrevious {
                    position: i,
                    offset,
                    wanted,
                    previous_len: previous.len(),
                })?;
            out.extend_from_slice(run);
        }
        i += 1;

        // mismatching
        if i >= diff.len() {
            break;
        }
        let wanted = run_length(diff, i)?;
        let literals = diff
            .get(i + 1..i + 1 + wanted)
            .ok_or(PatchError::LiteralsPastEnd {
                position: i,
                wanted,
                available: diff.len() - i - 1,
            })?;
        out.extend_from_slice(literals);
        i += 1 + wanted;
    }

    Ok(out)
}

fn run_length(diff: &[i32], position: usize) -> Result<usize, PatchError> {
    let value = diff[position];
    usize::try_from(value).map_err(|_| PatchError::NegativeLength { position, value })
}

/// Build a diff that replaces any previous buffer with `next` outright.
#[must_use]
pub fn full_replacement(next: &[i32]) -> Vec<i32> {
    let mut diff = Vec::with_capacity(next.len() + 2);
    diff.push(0);
    diff.push(i32::try_from(next.len()).unwrap_or(i32::MAX));
    diff.extend_from_slice(next);
    diff
}
