// =============================================================================
// Price Moves: Random Walk with Mean Reversion
// =============================================================================
//
// One step of the simulated price process:
//   random_walk    = (u1 - 0.5) * 2 * volatility * price
//   mean_reversion = (base - price) * 0.002
//   momentum       = (u2 - 0.48) * volatility * price * 0.3
//   next           = round2(price + random_walk + mean_reversion + momentum)
//
// The momentum bias of 0.48 gives a slight persistent upward skew. The drift
// model used by the index ticker is the simpler
//   next = round2(price + price * volatility * (u1 - 0.5))
//
// All monetary values are rounded to cents when computed, half-up.
// =============================================================================

use crate::simulator::random::UniformSource;
use crate::types::MoveModel;

/// Pull toward the base price applied on every step.
pub const MEAN_REVERSION_RATE: f64 = 0.002;
/// Centre of the momentum draw. Below 0.5 on purpose.
pub const MOMENTUM_BIAS: f64 = 0.48;
/// Weight of the momentum term relative to the random walk.
pub const MOMENTUM_WEIGHT: f64 = 0.3;
/// Simulated prices never fall below one cent.
pub const MIN_PRICE: f64 = 0.01;

/// Round half-up to two decimal places.
///
/// Ties go toward positive infinity, not away from zero: -1.235 becomes
/// -1.23 where `f64::round` would give -1.24.
pub fn round2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Deviation of `price` from `base_price`, as `(change, change_percent)`.
pub fn change_from_base(price: f64, base_price: f64) -> (f64, f64) {
    let diff = price - base_price;
    let change = round2(diff);
    let change_percent = (diff / base_price * 10_000.0 + 0.5).floor() / 100.0;
    (change, change_percent)
}

/// Mean-reverting step for explicit uniform draws `u1`, `u2` in `[0, 1)`.
pub fn mean_reverting_step(price: f64, base_price: f64, volatility: f64, u1: f64, u2: f64) -> f64 {
    let random_walk = (u1 - 0.5) * 2.0 * volatility * price;
    let mean_reversion = (base_price - price) * MEAN_REVERSION_RATE;
    let momentum = (u2 - MOMENTUM_BIAS) * volatility * price * MOMENTUM_WEIGHT;

    round2(price + random_walk + mean_reversion + momentum).max(MIN_PRICE)
}

/// Drift step for an explicit uniform draw `u` in `[0, 1)`.
pub fn drift_step(price: f64, volatility: f64, u: f64) -> f64 {
    round2(price + price * volatility * (u - 0.5)).max(MIN_PRICE)
}

/// Draw from `rng` and advance `price` one step under `model`.
///
/// The mean-reverting model consumes two draws, the drift model one.
pub fn next_price<R>(model: MoveModel, price: f64, base_price: f64, volatility: f64, rng: &mut R) -> f64
where
    R: UniformSource + ?Sized,
{
    match model {
        MoveModel::MeanReverting => {
            let u1 = rng.next_uniform();
            let u2 = rng.next_uniform();
            mean_reverting_step(price, base_price, volatility, u1, u2)
        }
        MoveModel::Drift => drift_step(price, volatility, rng.next_uniform()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::random::ScriptedDraws;

    fn has_cent_precision(v: f64) -> bool {
        (v * 100.0).round() / 100.0 == v
    }

    #[test]
    fn known_draws_give_known_price() {
        // random_walk = 0.25 * 2 * 0.01 * 100 = 0.5
        // momentum    = 0.12 * 0.01 * 100 * 0.3 = 0.036
        let p = mean_reverting_step(100.0, 100.0, 0.01, 0.75, 0.6);
        assert_eq!(p, 100.54);
    }

    #[test]
    fn next_price_consumes_draws_in_order() {
        let mut draws = ScriptedDraws::new(vec![0.75, 0.6]);
        let p = next_price(MoveModel::MeanReverting, 100.0, 100.0, 0.01, &mut draws);
        assert_eq!(p, 100.54);

        // Swapped order gives a different step, so ordering matters.
        let mut swapped = ScriptedDraws::new(vec![0.6, 0.75]);
        let q = next_price(MoveModel::MeanReverting, 100.0, 100.0, 0.01, &mut swapped);
        assert_ne!(p, q);
    }

    #[test]
    fn neutral_draws_still_skew_upward() {
        // u1 = 0.5 removes the walk; u2 = 0.5 leaves 0.02 * vol * price * 0.3.
        let p = mean_reverting_step(1000.0, 1000.0, 0.01, 0.5, 0.5);
        assert_eq!(p, 1000.06);
    }

    #[test]
    fn mean_reversion_pulls_toward_base() {
        // Neutral walk, momentum cancelled by u2 = 0.48.
        let above = mean_reverting_step(110.0, 100.0, 0.01, 0.5, 0.48);
        assert_eq!(above, 109.98);
        let below = mean_reverting_step(90.0, 100.0, 0.01, 0.5, 0.48);
        assert_eq!(below, 90.02);
    }

    #[test]
    fn drift_step_matches_formula() {
        // 200 + 200 * 0.002 * 0.25 = 200.1
        assert_eq!(drift_step(200.0, 0.002, 0.75), 200.1);
        assert_eq!(drift_step(200.0, 0.002, 0.5), 200.0);
    }

    #[test]
    fn price_is_floored_at_one_cent() {
        // Worst-case draws on a tiny price with huge volatility.
        let p = mean_reverting_step(0.02, 0.02, 0.99, 0.0, 0.0);
        assert_eq!(p, MIN_PRICE);
        assert_eq!(drift_step(0.01, 0.99, 0.0), MIN_PRICE);
    }

    #[test]
    fn round2_is_half_up() {
        assert_eq!(round2(1.005_000_1), 1.01);
        assert_eq!(round2(-0.5), -0.5);
        assert_eq!(round2(-1.234), -1.23);
        assert_eq!(round2(-1.236), -1.24);
        assert_eq!(round2(2.0), 2.0);
    }

    #[test]
    fn change_is_against_base() {
        let (change, pct) = change_from_base(101.5, 100.0);
        assert_eq!(change, 1.5);
        assert_eq!(pct, 1.5);

        let (change, pct) = change_from_base(97.25, 100.0);
        assert_eq!(change, -2.75);
        assert_eq!(pct, -2.75);

        let (change, pct) = change_from_base(27.85, 27.85);
        assert_eq!(change, 0.0);
        assert_eq!(pct, 0.0);
    }

    #[test]
    fn outputs_have_cent_precision() {
        let mut draws = ScriptedDraws::new(vec![0.13, 0.91, 0.377, 0.5021, 0.999, 0.001]);
        let mut price = 5234.18;
        for _ in 0..500 {
            price = next_price(MoveModel::MeanReverting, price, 5234.18, 0.0015, &mut draws);
            assert!(has_cent_precision(price), "price {price} not at cent precision");
            let (change, pct) = change_from_base(price, 5234.18);
            assert!(has_cent_precision(change));
            assert!(has_cent_precision(pct));
        }
    }
}
