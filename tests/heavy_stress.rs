#![cfg(feature = "heavy")]
use pack_dp::{Capacity, Destination, DpSolver, Item, PackingInstance, PackingSolver};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_items(rng: &mut StdRng, n: usize) -> Vec<Item> {
    (0..n)
        .map(|i| {
            Item::new(
                format!("item{i}"),
                f64::from(rng.gen_range(1u32..10)) * 0.5,
                f64::from(rng.gen_range(1u32..20)) * 0.5,
                f64::from(rng.gen_range(0u32..500)),
            )
            .allow(Destination::Cabin)
            .allow(Destination::CheckIn)
            .allow(Destination::Movers)
        })
        .collect()
}

#[test]
fn heavy_stress_fifty_items_airline_limits() {
    let mut rng = StdRng::seed_from_u64(123);
    let instance = PackingInstance::new(
        random_items(&mut rng, 50),
        Capacity::new(7.0, 20.0),
        Capacity::new(23.0, 60.0),
        2.0,
    );
    let (plan, stats) = DpSolver::new().solve_with_stats(&instance).unwrap();
    assert_eq!(plan.assignment.len(), 50);
    assert_eq!(stats.layers, 50);
    plan.verify(&instance).unwrap();
    // Everything by movers is always feasible, so the optimum is at least that.
    let all_movers: f64 = instance
        .items
        .iter()
        .map(|it| it.movers_value(instance.movers_rate))
        .sum();
    assert!(plan.net_value >= all_movers - 1e-6);
}
