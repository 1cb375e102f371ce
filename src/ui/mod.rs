pub mod console;
pub mod progress;

use crate::controller::{ControllerState, PhyController};
use crate::error::ControllerResult;
use crate::phy::{PhyField, PhyIndex};
use crate::transport::Transport;
use progress::{ProgressManager, templates};

/// Bar id shared by the CLI and [`progress::ProgressTransport`]
pub const APPLY_BAR: &str = "apply";

pub fn print_banner() {
    println!("phyctl {}", env!("CARGO_PKG_VERSION"));
}

/// Parameter table side by side, active PHY marked with `*`
pub fn print_state(state: &ControllerState) {
    let mark = |phy: PhyIndex| if state.active_phy == phy { "*" } else { " " };
    println!(
        "mode: {}  channels: rx={} tx={}",
        state.tuning_mode, state.channels.rx, state.channels.tx
    );
    println!(
        "{:<22}{:>18}{:>18}",
        "",
        format!("{}PHY 0", mark(PhyIndex::Phy0)),
        format!("{}PHY 1", mark(PhyIndex::Phy1))
    );
    for field in PhyField::ALL {
        println!(
            "{:<22}{:>18}{:>18}",
            field.name(),
            field.get(state.phys.get(PhyIndex::Phy0)),
            field.get(state.phys.get(PhyIndex::Phy1))
        );
    }
}

/// Select `target` while drawing one bar step per remote call
pub fn select_with_progress<T: Transport>(
    controller: &mut PhyController<T>,
    progress: &ProgressManager,
    target: PhyIndex,
) -> ControllerResult<()> {
    let steps = controller.plan(target).len() as u64;
    with_bar(progress, steps, templates::APPLY, &target.to_string(), || {
        controller.select_phy(target)
    })
}

/// Switch to the inactive PHY with the same bar as [`select_with_progress`]
pub fn switch_with_progress<T: Transport>(
    controller: &mut PhyController<T>,
    progress: &ProgressManager,
) -> ControllerResult<PhyIndex> {
    let target = controller.active_phy().other();
    let steps = controller.plan(target).len() as u64;
    with_bar(progress, steps, templates::APPLY, &target.to_string(), || controller.switch())
}

/// One-call bar around an immediate frontend update
pub fn tune_with_progress<F>(progress: &ProgressManager, label: &str, send: F) -> ControllerResult<()>
where
    F: FnOnce() -> ControllerResult<()>,
{
    with_bar(progress, 1, templates::TUNE, label, send)
}

fn with_bar<R, F>(
    progress: &ProgressManager,
    steps: u64,
    template: &str,
    label: &str,
    run: F,
) -> ControllerResult<R>
where
    F: FnOnce() -> ControllerResult<R>,
{
    let _ = progress.create_bar(APPLY_BAR, steps, template, label);
    let result = run();
    let _ = match &result {
        Ok(_) => progress.finish(APPLY_BAR, &format!("{} done", label)),
        Err(e) => progress.abandon(APPLY_BAR, &e.to_string()),
    };
    result
}
