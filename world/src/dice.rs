use rand::Rng;
use ringdelve_core::DiceRoll;

/// Dice thrown to decide whether a hit on the intended target is critical.
pub(crate) const CRITICAL_ROLL: DiceRoll = DiceRoll::new(2, 6);

/// Sums `count` throws of a die with `sides` faces.
pub(crate) fn roll<R: Rng + ?Sized>(dice: DiceRoll, rng: &mut R) -> u32 {
    if dice.sides == 0 {
        return 0;
    }
    (0..dice.count).map(|_| rng.gen_range(1..=dice.sides)).sum()
}

/// Whether a critical roll came up with every die showing its top face.
pub(crate) fn is_critical<R: Rng + ?Sized>(rng: &mut R) -> bool {
    roll(CRITICAL_ROLL, rng) == CRITICAL_ROLL.max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn rolls_stay_within_dice_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let dice = DiceRoll::new(3, 4);
        for _ in 0..200 {
            let total = roll(dice, &mut rng);
            assert!((dice.min()..=dice.max()).contains(&total));
        }
    }

    #[test]
    fn faceless_dice_roll_zero() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(roll(DiceRoll::new(4, 0), &mut rng), 0);
    }

    #[test]
    fn criticals_are_rare() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let criticals = (0..3_600).filter(|_| is_critical(&mut rng)).count();
        assert!((40..=180).contains(&criticals), "{criticals}");
    }
}
