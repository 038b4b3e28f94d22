//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - five-qubit code simulation under thermal relaxation",
        style("qecsim").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qecsim-ir        Circuit intermediate representation");
    println!("  qecsim-sim       Density-matrix simulator and noise models");
    println!("  qecsim-code      [[5,1,3]] stabilizer circuits");
    println!("  qecsim-analysis  Fidelity experiments, fits and sweeps");
    println!("  qecsim-cli       Command-line interface");
    println!();
    println!("License:    {}", style(env!("CARGO_PKG_LICENSE")).dim());
}
