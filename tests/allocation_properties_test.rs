use fanflow::domain::account::AccountId;
use fanflow::domain::allocation::{
    FanInPolicy, FanOutPolicy, Fraction, SweepDecision, allocate_fan_in, allocate_fan_out,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

fn random_fraction(rng: &mut StdRng) -> Fraction {
    // 0.0001 ..= 1.0000
    let basis_points: i64 = rng.gen_range(1..=10_000);
    Fraction::new(Decimal::new(basis_points, 4)).unwrap()
}

#[test]
fn test_fan_out_never_exceeds_distributable() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..2_000 {
        let balance: u64 = rng.gen_range(0..50_000_000_000);
        let fraction = random_fraction(&mut rng);
        let policy = FanOutPolicy {
            fee: rng.gen_range(0..10_000),
            min_distributable: rng.gen_range(0..1_000),
        };
        let recipients: Vec<AccountId> = (0..rng.gen_range(1..40))
            .map(|i| AccountId::new(format!("r{}", i)))
            .collect();

        let Ok(allocation) = allocate_fan_out(balance, fraction, &policy, &recipients) else {
            continue;
        };

        assert!(allocation.total() <= allocation.distributable);
        assert!(allocation.distributable > policy.min_distributable);
        assert!(allocation.shares.len() <= recipients.len());
        for (index, (_, amount)) in allocation.shares.iter().enumerate() {
            if index + 1 < allocation.shares.len() {
                assert!(amount.lamports() <= allocation.per_recipient_cap);
            }
        }
    }
}

#[test]
fn test_fan_in_skips_only_non_positive_amounts() {
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..2_000 {
        let balance: u64 = rng.gen_range(0..10_000_000);
        let fraction = random_fraction(&mut rng);
        let policy = FanInPolicy {
            reserve: rng.gen_range(0..1_000_000),
            fee: rng.gen_range(0..10_000),
        };
        let transferable = i128::from(balance) - i128::from(policy.reserve) - i128::from(policy.fee);

        match allocate_fan_in(balance, fraction, &policy) {
            SweepDecision::Transfer(amount) => {
                assert!(transferable > 0);
                assert!(i128::from(amount.lamports()) <= transferable);
            }
            SweepDecision::Skip { transferable: reported } => {
                assert_eq!(reported, transferable);
                assert!(transferable <= 0 || fraction.apply(transferable as u64) == 0);
            }
        }
    }
}
