use std::path::PathBuf;

use clap::Parser;
use phyctl::config::Profile;
use phyctl::{ControllerState, PhyIndex};

/// Print the call sequence each PHY selection would issue, without a flowgraph
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON profile (built-in defaults when omitted)
    profile: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    let profile = match &args.profile {
        Some(path) => match Profile::load(path) {
            Ok(profile) => profile,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        None => Profile::default(),
    };

    let state = ControllerState {
        phys: profile.phy_table(),
        channels: profile.channels,
        tuning_mode: profile.tuning_mode,
        ..Default::default()
    };

    println!("tuning mode: {}", state.tuning_mode);
    for phy in PhyIndex::ALL {
        println!("\nselect {}:", phy);
        for (step, call) in state.apply_plan(phy).iter().enumerate() {
            let body = serde_json::to_string(&call.payload).unwrap_or_default();
            println!(
                "  {:>2}. {:<28} call/{}  {}",
                step + 1,
                call.op.name(),
                call.op.call_index(),
                body
            );
        }
    }
}
