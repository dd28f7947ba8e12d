// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Packed coordinate buffers.
//!
//! Points are stored as `[x0, y0, x1, y1, ..]` (2D) or
//! `[x0, y0, z0, x1, ..]` (3D). All ranges are checked before the first
//! write.

use crate::error::TransformError;
use crate::geometry::Point3;

fn check_range(len: usize, off: usize, n: usize, dim: usize) -> Result<(), TransformError> {
    let required = n
        .checked_mul(dim)
        .and_then(|count| count.checked_add(off))
        .ok_or(TransformError::BufferOutOfBounds {
            len,
            required: usize::MAX,
        })?;
    if required > len {
        return Err(TransformError::BufferOutOfBounds { len, required });
    }
    Ok(())
}

#[inline]
fn read(buf: &[f64], at: usize, dim: usize) -> Point3 {
    let z = if dim == 3 { buf[at + 2] } else { 0.0 };
    Point3::new(buf[at], buf[at + 1], z)
}

#[inline]
fn write(buf: &mut [f64], at: usize, dim: usize, p: Point3) {
    buf[at] = p.x;
    buf[at + 1] = p.y;
    if dim == 3 {
        buf[at + 2] = p.z;
    }
}

/// Maps `n` points from `src` into a separate `dst`.
pub(crate) fn map(
    src: &[f64],
    src_off: usize,
    dst: &mut [f64],
    dst_off: usize,
    n: usize,
    dim: usize,
    f: impl Fn(Point3) -> Point3,
) -> Result<(), TransformError> {
    check_range(src.len(), src_off, n, dim)?;
    check_range(dst.len(), dst_off, n, dim)?;
    for i in 0..n {
        let p = read(src, src_off + i * dim, dim);
        write(dst, dst_off + i * dim, dim, f(p));
    }
    Ok(())
}

/// Maps `n` points within one buffer.
///
/// When the destination starts inside the source span, the source is first
/// moved to the destination and then mapped in place, so no unread
/// coordinate is overwritten.
pub(crate) fn map_within(
    buf: &mut [f64],
    src_off: usize,
    dst_off: usize,
    n: usize,
    dim: usize,
    f: impl Fn(Point3) -> Point3,
) -> Result<(), TransformError> {
    check_range(buf.len(), src_off, n, dim)?;
    check_range(buf.len(), dst_off, n, dim)?;
    let span = n * dim;
    let mut src_off = src_off;
    if dst_off > src_off && dst_off < src_off + span {
        buf.copy_within(src_off..src_off + span, dst_off);
        src_off = dst_off;
    }
    for i in 0..n {
        let p = read(buf, src_off + i * dim, dim);
        write(buf, dst_off + i * dim, dim, f(p));
    }
    Ok(())
}
