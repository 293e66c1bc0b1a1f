/// `parallelize_op!` macro for repeating an operation across
/// chunks of arrays, usually a destination and the source it is
/// filled from.
///
/// - `parallelize_op!((dest, source), chunk_size, Axis(axis), op)`
///
///    Chunks `dest` (mutably) and `source` (immutably) along `axis`,
///    `chunk_size` slices at a time,
///    zips corresponding chunks together and calls
///    `op(chunk_idx, &mut dest_chunk, &source_chunk)` on each pair
///    in parallel.
///
///    _The arrays must have the same shape! Otherwise the chunks
///    will not line up._
///
/// Every `op` returns a `Result` and the macro evaluates to the
/// first error encountered (or `Ok(())`). Chunks are disjoint, so
/// no element is touched by more than one task.
macro_rules! parallelize_op {
    (   ( $dest : ident, $source : ident ),
        $chunk_size : expr,
        Axis($axis : expr),
        $op : expr
    ) => {{
        debug_assert_eq!($dest.shape(), $source.shape());
        // Zip the chunked arrays back into pairs of corresponding
        // chunks to pass to `into_par_iter`.
        let array_chunks = itertools::izip!(
            $dest.axis_chunks_iter_mut(ndarray::Axis($axis), $chunk_size),
            $source.axis_chunks_iter(ndarray::Axis($axis), $chunk_size)
        ).collect::<Vec<_>>();

        array_chunks.into_par_iter().enumerate().try_for_each(
            |(chunk_idx, (mut dest_chunk, source_chunk))| {
                $op(chunk_idx, &mut dest_chunk, &source_chunk)
            }
        )
    }};
}

pub (crate) use parallelize_op;
