mod parallelize_op;

pub (crate) use parallelize_op::parallelize_op as parallelize_op;

/// Number of slices handed to each parallel task when no chunk
/// size is configured: aims for a few tasks per rayon thread so
/// uneven chunks still balance.
pub (crate) fn default_chunk_size(n_slices : usize) -> usize {
    let n_tasks = rayon::current_num_threads() * 4;
    (n_slices / n_tasks.max(1)).max(1)
}

/// Index of the first axis with more than one element, which is
/// the outermost axis worth splitting work along.
pub (crate) fn outermost_split_axis(shape : &[usize]) -> usize {
    shape.iter().position(|&dim| dim > 1).unwrap_or(0)
}
