use crate::error::BackendError;
use crate::extract::extract_commands;
use crate::gate::ExecutionGate;
use crate::types::{GateOutcome, QueryContext};
use crate::ui::{self, Prompter};

/// Show a model reply, let the user pick one of its commands and pass that
/// command through the gate.
///
/// Returns `Ok(None)` when nothing was chosen, either because the reply held
/// no commands or because the user picked "don't run".
pub fn process_response(
    reply: &str,
    gate: &ExecutionGate<'_>,
    prompter: &dyn Prompter,
    ctx: &QueryContext,
) -> Result<Option<GateOutcome>, BackendError> {
    ui::print_reply(reply);

    let commands = extract_commands(reply);
    if commands.is_empty() {
        ui::print_notice("No executable commands found in the response.");
        return Ok(None);
    }

    ui::print_found(&commands);
    let Some(choice) = prompter.choose_one(&commands, "Choose a command to execute:") else {
        ui::print_notice("No command executed.");
        return Ok(None);
    };

    gate.handle(&choice, ctx).map(Some)
}
