use rand::seq::SliceRandom;
use rand::{CryptoRng, Rng};

/// Randomly permute a batch in place before it is submitted to the ledger.
///
/// Uses a Fisher-Yates shuffle, so every permutation is equally likely and the order keys
/// were queued in cannot be recovered from the order they are registered in. Only pass a
/// cryptographically secure RNG.
pub fn shuffle<T, R>(batch: &mut [T], rng: &mut R)
where
    R: Rng + CryptoRng + ?Sized,
{
    batch.shuffle(rng);
}
