// SPDX-License-Identifier: MIT OR Apache-2.0
//! Length reconciliation for parallel parameter streams.
//!
//! Nodes with several inputs rarely receive streams of equal length.
//! Before zipping them element-wise, a node picks one of two policies:
//! [`match_long_repeat`] pads shorter streams by repeating their last
//! element, [`match_cross`] expands to the full Cartesian product.

/// Pad every input to the length of the longest one by repeating its
/// last element.
///
/// Returns one output sequence per input, all of equal length, ready to
/// be zipped. If any input is empty (there is no element to repeat) the
/// result is empty across the board.
pub fn match_long_repeat<T: Clone>(inputs: &[Vec<T>]) -> Vec<Vec<T>> {
    if inputs.is_empty() || inputs.iter().any(Vec::is_empty) {
        return inputs.iter().map(|_| Vec::new()).collect();
    }

    let longest = inputs.iter().map(Vec::len).max().unwrap_or(0);
    inputs
        .iter()
        .map(|seq| {
            let mut out = seq.clone();
            let last = out[out.len() - 1].clone();
            out.resize(longest, last);
            out
        })
        .collect()
}

/// Expand the inputs to their full Cartesian product.
///
/// Returns one output sequence per input, each of length equal to the
/// product of all input lengths. The last input varies fastest, matching
/// nested loops written outer-to-inner in argument order.
pub fn match_cross<T: Clone>(inputs: &[Vec<T>]) -> Vec<Vec<T>> {
    if inputs.is_empty() {
        return Vec::new();
    }

    let total: usize = inputs.iter().map(Vec::len).product();
    let mut outputs: Vec<Vec<T>> = inputs.iter().map(|_| Vec::with_capacity(total)).collect();
    if total == 0 {
        return outputs;
    }

    for mut index in 0..total {
        // Mixed-radix decomposition, least significant digit last.
        let mut picks = vec![0usize; inputs.len()];
        for (k, seq) in inputs.iter().enumerate().rev() {
            picks[k] = index % seq.len();
            index /= seq.len();
        }
        for (out, (seq, pick)) in outputs.iter_mut().zip(inputs.iter().zip(picks)) {
            out.push(seq[pick].clone());
        }
    }
    outputs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_repeat_pads_to_longest() {
        let matched = match_long_repeat(&[vec![1, 2, 3, 4], vec![10, 20]]);
        assert_eq!(matched[0], vec![1, 2, 3, 4]);
        assert_eq!(matched[1], vec![10, 20, 20, 20]);
    }

    #[test]
    fn test_long_repeat_keeps_prefix_intact() {
        let a = vec![1, 2, 3];
        let b = vec![7, 8, 9, 10, 11];
        let matched = match_long_repeat(&[a.clone(), b.clone()]);
        assert_eq!(matched[0].len(), 5);
        assert_eq!(matched[1].len(), 5);
        assert_eq!(&matched[0][..3], &a[..]);
        assert_eq!(&matched[1][..], &b[..]);
        assert!(matched[0][3..].iter().all(|x| *x == 3));
    }

    #[test]
    fn test_long_repeat_empty_input_yields_empty() {
        let matched = match_long_repeat(&[vec![1, 2], Vec::<i32>::new()]);
        assert_eq!(matched, vec![Vec::new(), Vec::new()]);
    }

    #[test]
    fn test_cross_count_and_order() {
        let matched = match_cross(&[vec![1, 2, 3], vec![10, 20]]);
        assert_eq!(matched[0].len(), 6);
        assert_eq!(matched[1].len(), 6);
        // Last input varies fastest.
        assert_eq!(matched[0], vec![1, 1, 2, 2, 3, 3]);
        assert_eq!(matched[1], vec![10, 20, 10, 20, 10, 20]);
    }

    #[test]
    fn test_cross_pairs_are_unique() {
        let matched = match_cross(&[vec![0, 1], vec![0, 1, 2]]);
        let pairs: Vec<(i32, i32)> = matched[0]
            .iter()
            .zip(matched[1].iter())
            .map(|(a, b)| (*a, *b))
            .collect();
        let mut deduped = pairs.clone();
        deduped.dedup();
        assert_eq!(pairs.len(), 6);
        assert_eq!(deduped.len(), 6);
    }

    #[test]
    fn test_cross_empty_input_yields_empty_product() {
        let matched = match_cross(&[vec![1, 2], Vec::<i32>::new()]);
        assert_eq!(matched, vec![Vec::new(), Vec::new()]);
    }

    #[test]
    fn test_single_input_passthrough() {
        assert_eq!(match_long_repeat(&[vec![5, 6]]), vec![vec![5, 6]]);
        assert_eq!(match_cross(&[vec![5, 6]]), vec![vec![5, 6]]);
    }
}
