//! Line partitioning shared by the convolution and morphology engines.
//!
//! A planar image is a sequence of `channels * height` lines of `width`
//! samples each, with line `l = c * height + y`. Work is split into
//! contiguous line ranges so that every worker writes to a disjoint slice of
//! the output buffer.

use std::ops::Range;

use rayon::prelude::*;

/// Split `total` lines into `workers` contiguous ranges `[i*N/w, (i+1)*N/w)`.
///
/// Ranges may be empty when there are more workers than lines.
pub fn partition_lines(total: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    (0..workers)
        .map(|i| (i * total / workers)..((i + 1) * total / workers))
        .collect()
}

/// Fill `output` line by line, calling `compute(line_index, line)` for each
/// `line_len`-sized chunk.
///
/// With `workers <= 1` every line is computed on the calling thread;
/// otherwise each partition runs as one task on the Rayon pool and the call
/// returns once all of them have finished.
pub fn fill_lines<T, F>(output: &mut [T], line_len: usize, workers: usize, compute: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync,
{
    if line_len == 0 || output.is_empty() {
        return;
    }
    let total = output.len() / line_len;

    if workers <= 1 || total < 2 {
        for (line, chunk) in output.chunks_mut(line_len).enumerate() {
            compute(line, chunk);
        }
        return;
    }

    let mut jobs: Vec<(usize, &mut [T])> = Vec::with_capacity(workers);
    let mut rest = output;
    for range in partition_lines(total, workers) {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(range.len() * line_len);
        if !head.is_empty() {
            jobs.push((range.start, head));
        }
        rest = tail;
    }

    jobs.into_par_iter().for_each(|(first, slice)| {
        for (offset, chunk) in slice.chunks_mut(line_len).enumerate() {
            compute(first + offset, chunk);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_covers_all_lines() {
        let ranges = partition_lines(10, 3);
        assert_eq!(ranges, vec![0..3, 3..6, 6..10]);
    }

    #[test]
    fn test_partition_more_workers_than_lines() {
        let ranges = partition_lines(2, 4);
        let covered: usize = ranges.iter().map(|r| r.len()).sum();
        assert_eq!(covered, 2);
        assert_eq!(ranges.len(), 4);
    }

    #[test]
    fn test_fill_lines_same_for_any_worker_count() {
        let expected: Vec<usize> = (0..35).map(|i| (i / 5) * 100 + i % 5).collect();
        for workers in [1, 2, 3, 8] {
            let mut out = vec![0usize; 35];
            fill_lines(&mut out, 5, workers, |line, chunk| {
                for (x, v) in chunk.iter_mut().enumerate() {
                    *v = line * 100 + x;
                }
            });
            assert_eq!(out, expected, "workers = {workers}");
        }
    }
}
