//! Thread tools
//!
//! Every parallel phase in the crate runs through these helpers so that the same code path can be
//! forced onto the calling thread when `sequential` is set.

use itertools::Itertools;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::ops::Range;

/// Create a pool
pub fn create_pool(num_threads: usize) -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
    ThreadPoolBuilder::new().num_threads(num_threads).build()
}

/// Run `op` over `0..len` in chunks of `grain` indices, with one accumulator per worker.
///
/// The accumulators are returned in index order: concatenating their contents reproduces the
/// output of a serial run.
pub fn fold_ranges<L, I, F>(sequential: bool, len: usize, grain: usize, init: I, op: F) -> Vec<L>
where
    L: Send,
    I: Fn() -> L + Sync + Send,
    F: Fn(&mut L, Range<usize>) + Sync + Send,
{
    if len == 0 {
        return vec![];
    }
    let grain = grain.max(1);
    if sequential || len <= grain {
        let mut local = init();
        op(&mut local, 0..len);
        return vec![local];
    }
    let num_chunks = (len - 1) / grain + 1;
    (0..num_chunks)
        .into_par_iter()
        .fold(&init, |mut local, chunk| {
            let start = chunk * grain;
            op(&mut local, start..usize::min(start + grain, len));
            local
        })
        .collect()
}

/// The index of the pool thread running the caller, `None` outside of a pool
pub fn current_thread() -> Option<usize> {
    rayon::current_thread_index()
}

/// Count the distinct threads among the recorded ones, a caller outside of a pool counting once
pub fn count_threads<T: IntoIterator<Item = Option<usize>>>(threads: T) -> usize {
    threads.into_iter().unique().count()
}

/// Copy each source slice into consecutive parts of `dest`.
///
/// `dest` must be exactly as long as the sources combined.
pub fn copy_with_offsets<T: Copy + Send + Sync>(sequential: bool, sources: &[&[T]], dest: &mut [T]) {
    debug_assert_eq!(sources.iter().map(|s| s.len()).sum::<usize>(), dest.len());
    let mut pieces = Vec::with_capacity(sources.len());
    let mut rest = dest;
    for s in sources {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(s.len());
        pieces.push(head);
        rest = tail;
    }
    if sequential {
        for (d, s) in pieces.into_iter().zip(sources) {
            d.copy_from_slice(s);
        }
    } else {
        pieces
            .into_par_iter()
            .zip(sources.par_iter())
            .for_each(|(d, s)| d.copy_from_slice(s));
    }
}

/// Call `op(index, chunk)` on every `size` long chunk of `data`
pub fn for_each_chunk_mut<T, F>(sequential: bool, data: &mut [T], size: usize, op: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    if data.is_empty() {
        return;
    }
    if sequential {
        data.chunks_mut(size).enumerate().for_each(|(i, c)| op(i, c));
    } else {
        data.par_chunks_mut(size)
            .enumerate()
            .for_each(|(i, c)| op(i, c));
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fold_ranges_preserves_order() {
        for sequential in [true, false] {
            let locals = fold_ranges(sequential, 1000, 7, Vec::new, |local, range| {
                local.extend(range);
            });
            let flat = locals.concat();
            assert_eq!(flat, (0..1000).collect::<Vec<_>>());
        }
        assert!(fold_ranges(false, 0, 7, Vec::<usize>::new, |_, _| {}).is_empty());
    }

    #[test]
    fn test_copy_with_offsets() {
        let a = [1, 2, 3];
        let b: [i32; 0] = [];
        let c = [4, 5];
        let mut out = vec![0; 5];
        copy_with_offsets(false, &[&a, &b, &c], &mut out);
        assert_eq!(out, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_for_each_chunk_mut() {
        let mut data = vec![0usize; 12];
        for_each_chunk_mut(false, &mut data, 3, |i, c| c.fill(i));
        assert_eq!(data, vec![0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3]);
    }

    #[test]
    fn test_pool() {
        let pool = create_pool(2).unwrap();
        assert_eq!(pool.current_num_threads(), 2);
    }

    #[test]
    fn test_count_threads() {
        assert_eq!(count_threads(Vec::<Option<usize>>::new()), 0);
        assert_eq!(count_threads([None, None]), 1);
        assert_eq!(count_threads([Some(0), Some(1), Some(0), Some(1)]), 2);

        let pool = create_pool(2).unwrap();
        let locals = pool.install(|| {
            fold_ranges(false, 10000, 1, || (current_thread(), 0), |local, range| {
                local.1 += range.len();
            })
        });
        assert!(!locals.is_empty());
        assert_eq!(locals.iter().map(|l| l.1).sum::<usize>(), 10000);
        let used = count_threads(locals.iter().map(|l| l.0));
        assert!((1..=2).contains(&used));
        assert!(locals.iter().all(|l| l.0.is_some()));

        let serial = fold_ranges(true, 100, 1, || (current_thread(), 0), |_, _| {});
        assert_eq!(count_threads(serial.iter().map(|l| l.0)), 1);
    }
}
