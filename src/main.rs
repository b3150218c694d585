use node_subnet_ipam::assignments::{read_node_assignments, register_nodes};
use node_subnet_ipam::config::{load_config, set_global_config};
use node_subnet_ipam::output::print_allocations;
use node_subnet_ipam::{allocate_rounds, LogicalSwitchManager};
use std::error::Error;

const DEFAULT_ROUNDS: usize = 2;

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    log4rs::init_file("log4rs.yml", Default::default()).expect("Error initializing log4rs");
    dotenv::dotenv().ok();
    //
    log::info!("#Start main()");

    let args: Vec<String> = std::env::args().collect();
    let assignment_file = args
        .get(1)
        .ok_or("Usage: node-subnet-ipam <assignments.json> [rounds] [config.json]")?;
    let rounds = match args.get(2) {
        Some(r) => r.parse::<usize>().map_err(|e| format!("Invalid rounds {r}: {e}"))?,
        None => DEFAULT_ROUNDS,
    };

    let config = load_config(args.get(3).map(String::as_str))?;
    set_global_config(config);

    let manager = LogicalSwitchManager::new();
    let assignments = read_node_assignments(assignment_file)?;
    let count = register_nodes(&manager, &assignments)?;
    log::info!("Registered {count} nodes");

    let rows = allocate_rounds(&manager, rounds);
    print_allocations(&rows);

    Ok(())
}
