use dialoguer::{Input, Select};
use tracing::{error, info};

use super::progress::ProgressManager;
use super::{print_state, select_with_progress, switch_with_progress};
use crate::controller::PhyController;
use crate::phy::{PhyField, PhyIndex, TuningMode};
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    Select(PhyIndex),
    Switch,
    ToggleMode,
    EditParameter,
    SetChannels,
    Show,
    Quit,
}

const ACTIONS: [(Action, &str); 8] = [
    (Action::Select(PhyIndex::Phy0), "Select PHY 0"),
    (Action::Select(PhyIndex::Phy1), "Select PHY 1"),
    (Action::Switch, "Switch PHY"),
    (Action::ToggleMode, "Toggle tuning mode"),
    (Action::EditParameter, "Edit PHY parameter"),
    (Action::SetChannels, "Set rx/tx channels"),
    (Action::Show, "Show configuration"),
    (Action::Quit, "Quit"),
];

/// Interactive menu around a connected controller. Controller errors are
/// logged and the menu continues; terminal errors end the session.
pub fn run_console<T: Transport>(
    controller: &mut PhyController<T>,
    progress: &ProgressManager,
) -> Result<(), dialoguer::Error> {
    let labels: Vec<&str> = ACTIONS.iter().map(|(_, label)| *label).collect();

    loop {
        let prompt = format!(
            "{} active, {} mode",
            controller.active_phy(),
            controller.tuning_mode()
        );
        let choice = Select::new()
            .with_prompt(prompt)
            .items(&labels)
            .default(0)
            .interact()?;

        match ACTIONS[choice].0 {
            Action::Select(phy) => {
                if let Err(e) = select_with_progress(controller, progress, phy) {
                    error!("{}", e);
                }
            }
            Action::Switch => {
                if let Err(e) = switch_with_progress(controller, progress) {
                    error!("{}", e);
                }
            }
            Action::ToggleMode => {
                let mode = match controller.tuning_mode() {
                    TuningMode::Direct => TuningMode::CenterOffset,
                    TuningMode::CenterOffset => TuningMode::Direct,
                };
                controller.set_tuning_mode(mode);
                info!("Tuning mode: {} (applies on next selection)", mode);
            }
            Action::EditParameter => edit_parameter(controller)?,
            Action::SetChannels => {
                let rx: u32 = Input::new()
                    .with_prompt("rx channel")
                    .default(controller.channels().rx)
                    .interact_text()?;
                let tx: u32 = Input::new()
                    .with_prompt("tx channel")
                    .default(controller.channels().tx)
                    .interact_text()?;
                controller.set_channels(rx, tx);
            }
            Action::Show => print_state(controller.state()),
            Action::Quit => return Ok(()),
        }
    }
}

fn edit_parameter<T: Transport>(controller: &mut PhyController<T>) -> Result<(), dialoguer::Error> {
    let phy = Select::new()
        .with_prompt("PHY")
        .items(&["PHY 0", "PHY 1"])
        .default(controller.active_phy().as_usize())
        .interact()?;

    let names: Vec<&str> = PhyField::ALL.iter().map(|f| f.name()).collect();
    let field = PhyField::ALL[Select::new()
        .with_prompt("Parameter")
        .items(&names)
        .default(0)
        .interact()?];

    let current = controller
        .phy(phy)
        .map(|set| field.get(set))
        .unwrap_or_default();
    let value: f64 = Input::new()
        .with_prompt(field.name())
        .default(current)
        .interact_text()?;

    match controller.set_field(phy, field, value) {
        Ok(()) => info!("PHY {} {} = {} (applies on next selection)", phy, field, value),
        Err(e) => error!("{}", e),
    }
    Ok(())
}
