use rand::seq::SliceRandom;
use rand::Rng;

/// Pick up to `count` distinct entries without replacement.
///
/// Each draw is uniform over the entries not yet taken. A list shorter than
/// `count` yields every entry; the result is never padded.
pub fn pick_distinct<T: Clone, R: Rng + ?Sized>(rng: &mut R, list: &[T], count: usize) -> Vec<T> {
    let mut remaining: Vec<&T> = list.iter().collect();
    let mut picked = Vec::with_capacity(count.min(list.len()));

    while !remaining.is_empty() && picked.len() < count {
        let idx = rng.gen_range(0..remaining.len());
        picked.push(remaining.swap_remove(idx).clone());
    }

    picked
}

pub fn pick_one<'a, T, R: Rng + ?Sized>(rng: &mut R, list: &'a [T]) -> Option<&'a T> {
    list.choose(rng)
}
