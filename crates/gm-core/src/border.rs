/// Maps a possibly out-of-range coordinate onto `[0, len)` by edge
/// replication.
///
/// # Panics
/// If `len == 0`.
#[inline]
pub fn clamp_index(i: isize, len: usize) -> usize {
    assert!(len > 0, "cannot clamp into an empty range");
    if i < 0 {
        0
    } else {
        (i as usize).min(len - 1)
    }
}
