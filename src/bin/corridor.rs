use corridor_mdp::{value_iteration, CorridorConfig, SolveConfig};

fn main() {
    let mdp = match CorridorConfig::default().build() {
        Ok(mdp) => mdp,
        Err(err) => {
            eprintln!("model construction failed: {err}");
            std::process::exit(1);
        }
    };

    let solution = value_iteration(&mdp, &SolveConfig::default());

    println!("VALUE ITERATION SOLUTION:");
    println!("----------");
    for s in 0..mdp.num_states {
        if mdp.is_terminal(s) {
            println!("s={}: V={:.6} terminal", s, solution.values[s]);
        } else {
            println!("s={}: V={:.6} pi = {}", s, solution.values[s], solution.policy[s]);
        }
    }
    println!("----------");
    println!("The Policy is:");
    let indices: Vec<usize> = solution.policy.iter().map(|a| a.index()).collect();
    println!("{indices:?}");
}
