//! Bounded best-N selection over a single linear scan.

use crate::metric::DistanceMetric;
use std::marker::PhantomData;

/// A scored vocabulary token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'a, S> {
    pub score: S,
    pub token: &'a str,
}

/// Keeps the `n` best candidates offered so far, best first.
///
/// Always holds exactly `n` slots; slots nothing better has reached keep the
/// metric's sentinel score and an empty token. Insertion is a shift, which
/// is O(n) per offer and fine for the small `n` used in evaluation.
#[derive(Debug, Clone)]
pub struct TopN<'a, M: DistanceMetric> {
    slots: Vec<Neighbor<'a, M::Score>>,
    sentinel: M::Score,
    _metric: PhantomData<M>,
}

impl<'a, M: DistanceMetric> TopN<'a, M> {
    pub fn new(n: usize, dimension: usize) -> Self {
        let sentinel = M::worst_sentinel(dimension);
        TopN {
            slots: vec![
                Neighbor {
                    score: sentinel,
                    token: "",
                };
                n
            ],
            sentinel,
            _metric: PhantomData,
        }
    }

    pub fn reset(&mut self) {
        let sentinel = self.sentinel;
        self.slots.iter_mut().for_each(|slot| {
            *slot = Neighbor {
                score: sentinel,
                token: "",
            }
        });
    }

    pub fn offer(&mut self, score: M::Score, token: &'a str) {
        let Some(rank) = self
            .slots
            .iter()
            .position(|slot| M::is_better(score, slot.score))
        else {
            return;
        };
        self.slots.pop();
        self.slots.insert(rank, Neighbor { score, token });
    }

    pub fn results(&self) -> &[Neighbor<'a, M::Score>] {
        &self.slots
    }

    pub fn best(&self) -> Option<&Neighbor<'a, M::Score>> {
        self.slots.first()
    }

    pub fn into_results(self) -> Vec<Neighbor<'a, M::Score>> {
        self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{BitwiseHamming, ContinuousDot};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn unfilled_slots_hold_sentinels() {
        let mut top = TopN::<ContinuousDot>::new(3, 10);
        top.offer(0.5, "a");
        top.offer(-0.5, "never");
        let r = top.results();
        assert_eq!(r.len(), 3);
        assert_eq!(r[0], Neighbor { score: 0.5, token: "a" });
        assert_eq!(r[1], Neighbor { score: 0.0, token: "" });
        assert_eq!(r[2], Neighbor { score: 0.0, token: "" });
    }

    #[test]
    fn keeps_best_in_order_and_drops_worst() {
        let mut top = TopN::<BitwiseHamming>::new(2, 64);
        for (d, t) in [(30, "c"), (10, "a"), (20, "b"), (5, "z"), (64, "far")] {
            top.offer(d, t);
        }
        let tokens: Vec<_> = top.results().iter().map(|n| n.token).collect();
        assert_eq!(tokens, ["z", "a"]);
    }

    #[test]
    fn ties_keep_first_offered() {
        let mut top = TopN::<ContinuousDot>::new(1, 4);
        top.offer(0.7, "first");
        top.offer(0.7, "second");
        assert_eq!(top.best().unwrap().token, "first");
    }

    #[test]
    fn reset_restores_sentinels() {
        let mut top = TopN::<BitwiseHamming>::new(2, 12);
        top.offer(1, "x");
        top.reset();
        assert!(top.results().iter().all(|n| n.score == 12 && n.token.is_empty()));
    }

    #[test]
    fn zero_slots_accepts_nothing() {
        let mut top = TopN::<ContinuousDot>::new(0, 4);
        top.offer(1.0, "x");
        assert!(top.best().is_none());
    }

    #[test]
    fn random_offers_stay_sorted_and_bounded() {
        let mut rng = StdRng::seed_from_u64(3);
        let tokens: Vec<String> = (0..500).map(|i| format!("w{i}")).collect();
        for n in [1, 5, 30] {
            let mut top = TopN::<ContinuousDot>::new(n, 50);
            let mut offered = Vec::new();
            for token in &tokens {
                let score: f32 = rng.random_range(-1.0..1.0);
                offered.push(score);
                top.offer(score, token);
            }
            let r = top.results();
            assert_eq!(r.len(), n);
            assert!(r.windows(2).all(|w| !ContinuousDot::is_better(w[1].score, w[0].score)));

            offered.sort_by(|a, b| b.partial_cmp(a).unwrap());
            let expected: Vec<f32> = offered.into_iter().take(n).collect();
            let got: Vec<f32> = r.iter().map(|nb| nb.score).collect();
            assert_eq!(got, expected);
        }
    }
}
