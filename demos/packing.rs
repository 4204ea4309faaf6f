//! Example: packing a small household move with the DP solver.
//!
//! Run with:
//! `cargo run --example packing`
//!
//! Cabin and check-in limits follow a typical economy ticket; anything that
//! does not fit is shipped by movers at a per-litre rate.

use pack_dp::{
    model::depreciated_value, Capacity, Destination, DpSolver, Item, PackingInstance,
    PackingSolver,
};

fn main() {
    let items = vec![
        Item::new("laptop", 2.0, 3.0, depreciated_value(1200.0, 20.0, 2))
            .allow(Destination::Cabin)
            .allow(Destination::Movers),
        Item::new("winter coat", 2.5, 12.0, 150.0)
            .allow(Destination::Cabin)
            .allow(Destination::CheckIn)
            .allow(Destination::Movers),
        Item::new("cast iron pan", 4.0, 6.0, 60.0)
            .allow(Destination::CheckIn)
            .allow(Destination::Movers),
        Item::new("books", 12.0, 20.0, 90.0)
            .allow(Destination::CheckIn)
            .allow(Destination::Movers),
        Item::new("desk chair", 9.0, 80.0, 110.0).allow(Destination::Movers),
        Item::new("camera", 1.0, 2.0, depreciated_value(800.0, 15.0, 3))
            .allow(Destination::Cabin)
            .allow(Destination::CheckIn),
    ];
    let instance = PackingInstance::new(
        items,
        Capacity::new(7.0, 20.0),
        Capacity::new(23.0, 60.0),
        0.5,
    );

    let plan = match DpSolver::new().solve(&instance) {
        Ok(plan) => plan,
        Err(err) => {
            eprintln!("no plan: {err}");
            std::process::exit(1);
        }
    };

    println!("Net value: {:.2}", plan.net_value);
    for dest in Destination::ALL {
        let names: Vec<&str> = plan
            .items_for(dest)
            .map(|i| instance.items[i].name.as_str())
            .collect();
        println!("{dest:>9}: {}", names.join(", "));
    }

    let usage = plan.physical_usage();
    println!(
        "Cabin:    {:.1} kg / {:.1} L",
        usage.cabin_weight, usage.cabin_volume
    );
    println!(
        "Check-in: {:.1} kg / {:.1} L",
        usage.checkin_weight, usage.checkin_volume
    );
}
