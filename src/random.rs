use crate::Probability;
use rand::Rng;
use rand::rngs::SmallRng;
use rand_distr::Distribution;
use rand_distr::Gamma;

/// draw a symmetric Dirichlet(alpha) sample over k legs by
/// normalizing independent Gamma(alpha, 1) draws
pub fn dirichlet(alpha: f32, k: usize, rng: &mut SmallRng) -> Vec<Probability> {
    debug_assert!(alpha > 0.0 && k > 0);
    let gamma = Gamma::new(alpha, 1.0).expect("positive alpha");
    let mut draws = (0..k).map(|_| gamma.sample(rng)).collect::<Vec<Probability>>();
    let total = draws.iter().sum::<Probability>();
    if total > 0.0 {
        draws.iter_mut().for_each(|draw| *draw /= total);
        draws
    } else {
        // all-zero draws can happen for tiny alpha under f32 underflow
        vec![1.0 / k as Probability; k]
    }
}

/// sample an index from a cumulative distribution. entries with zero
/// probability mass are never returned.
pub fn sample_cdf(cdf: &[Probability], rng: &mut SmallRng) -> usize {
    let total = *cdf.last().expect("nonempty cdf");
    debug_assert!(total > 0.0);
    let draw = rng.random::<Probability>() * total;
    let mut index = cdf.partition_point(|&c| c <= draw);
    index = index.min(cdf.len() - 1);
    // a draw landing exactly on a boundary can point at a zero-mass
    // entry; walk back onto the bucket that actually owns the mass
    while index > 0 && cdf[index] == cdf[index - 1] {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn dirichlet_is_a_distribution() {
        let mut rng = SmallRng::seed_from_u64(7);
        let draws = dirichlet(0.2, 10, &mut rng);
        assert!(draws.len() == 10);
        assert!((draws.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(draws.iter().all(|&x| x >= 0.0));
    }

    #[test]
    fn dirichlet_is_reproducible() {
        let a = dirichlet(0.3, 5, &mut SmallRng::seed_from_u64(42));
        let b = dirichlet(0.3, 5, &mut SmallRng::seed_from_u64(42));
        assert!(a == b);
    }

    #[test]
    fn zero_mass_is_never_sampled() {
        let pdf = [0.0, 0.5, 0.0, 0.5, 0.0];
        let mut cdf = pdf.to_vec();
        for i in 1..cdf.len() {
            cdf[i] += cdf[i - 1];
        }
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..1000 {
            let index = sample_cdf(&cdf, &mut rng);
            assert!(pdf[index] > 0.0);
        }
    }

    #[test]
    fn sampling_tracks_the_masses() {
        let cdf = [0.9, 1.0];
        let mut rng = SmallRng::seed_from_u64(3);
        let heavy = (0..1000).filter(|_| sample_cdf(&cdf, &mut rng) == 0).count();
        assert!(heavy > 800);
    }
}
