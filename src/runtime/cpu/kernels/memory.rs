//! Memory movement kernels

use crate::tensor::{Layout, NdIter};

/// Gather the elements addressed by `layout` into a contiguous buffer
///
/// Offsets produced by the iterator are relative to `src`, the start of the
/// underlying allocation. Contiguous layouts degenerate to one `memcpy`.
///
/// # Safety
/// - every byte range `[src + off, src + off + elsize)` visited by `layout`
///   must be readable
/// - `dst` must be valid for `layout.elem_count() * layout.elsize()` writes
///   and must not overlap the source range
pub unsafe fn copy_strided(src: *const u8, layout: &Layout, dst: *mut u8) {
    let elsize = layout.elsize();
    let count = layout.elem_count();
    if count == 0 {
        return;
    }

    if layout.is_contiguous() {
        unsafe {
            std::ptr::copy_nonoverlapping(src.add(layout.offset()), dst, count * elsize);
        }
        return;
    }

    for (i, offset) in NdIter::new(layout).enumerate() {
        unsafe {
            std::ptr::copy_nonoverlapping(src.offset(offset), dst.add(i * elsize), elsize);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gather(data: &[f32], layout: &Layout) -> Vec<f32> {
        let mut out = vec![0.0f32; layout.elem_count()];
        unsafe {
            copy_strided(
                data.as_ptr() as *const u8,
                layout,
                out.as_mut_ptr() as *mut u8,
            )
        };
        out
    }

    #[test]
    fn test_contiguous_copy_honours_offset() {
        let data = [0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0];
        let layout = Layout::contiguous(&[3], 4).narrow(0, 0, 3).unwrap();
        assert_eq!(gather(&data, &layout), vec![0.0, 1.0, 2.0]);
        let shifted = Layout::contiguous(&[6], 4).narrow(0, 2, 3).unwrap();
        assert_eq!(gather(&data, &shifted), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_transposed_copy() {
        let data = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let layout = Layout::contiguous(&[2, 3], 4).transpose(0, 1).unwrap();
        assert_eq!(gather(&data, &layout), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_broadcast_copy() {
        let data = [1.0f32, 2.0, 3.0];
        let layout = Layout::contiguous(&[3], 4).broadcast_to(&[2, 3]).unwrap();
        assert_eq!(gather(&data, &layout), vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);
    }
}
