//! Linear-time set algebra over ascending, duplicate-free postings lists.

use crate::DocId;
use std::cmp::Ordering;

pub fn intersect(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

pub fn union(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut out: Vec<DocId> = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        let next = match (a.get(i), b.get(j)) {
            (Some(&x), Some(&y)) if x < y => { i += 1; x }
            (Some(&x), Some(&y)) if y < x => { j += 1; y }
            (Some(&x), Some(_)) => { i += 1; j += 1; x }
            (Some(&x), None) => { i += 1; x }
            (None, Some(&y)) => { j += 1; y }
            (None, None) => break,
        };
        if out.last() != Some(&next) {
            out.push(next);
        }
    }
    out
}

/// Ids in `a` that are not in `b`.
pub fn difference(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(a.len());
    let mut j = 0;
    for &x in a {
        while j < b.len() && b[j] < x {
            j += 1;
        }
        if j < b.len() && b[j] == x {
            j += 1;
            continue;
        }
        out.push(x);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &[DocId] = &[1, 3, 5, 7, 9];
    const B: &[DocId] = &[2, 3, 4, 9, 12];

    #[test]
    fn intersect_lists() {
        assert_eq!(intersect(A, B), vec![3, 9]);
        assert_eq!(intersect(A, B), intersect(B, A));
        assert!(intersect(A, &[]).is_empty());
    }

    #[test]
    fn union_lists() {
        let u = union(A, B);
        assert_eq!(u, vec![1, 2, 3, 4, 5, 7, 9, 12]);
        assert!(u.len() >= A.len().max(B.len()));
        assert_eq!(union(&[], B), B);
    }

    #[test]
    fn difference_lists() {
        assert_eq!(difference(A, B), vec![1, 5, 7]);
        assert!(difference(A, A).is_empty());
        assert_eq!(difference(A, &[]), A);
    }

    #[test]
    fn absorption() {
        let samples: [&[DocId]; 4] = [A, B, &[], &[4, 100, 1000]];
        for a in samples {
            for b in samples {
                assert_eq!(intersect(a, &union(a, b)), a);
                assert_eq!(intersect(a, b), intersect(b, a));
            }
        }
    }
}
