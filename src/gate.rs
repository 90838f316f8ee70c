use crate::backend::{risk_prompt, Backend};
use crate::error::BackendError;
use crate::executor::CommandRunner;
use crate::safety::classify;
use crate::types::{GateOutcome, QueryContext, RiskTier};
use crate::ui::{self, Prompter};

pub const EXPLAIN_OPTION: &str = "Explain risks first";
pub const PROCEED_OPTION: &str = "I understand the risks, proceed anyway";
pub const CANCEL_OPTION: &str = "Cancel";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DangerChoice {
    Explain,
    Proceed,
    Cancel,
}

impl DangerChoice {
    fn from_selection(selection: Option<&str>) -> Self {
        match selection {
            Some(EXPLAIN_OPTION) => DangerChoice::Explain,
            Some(PROCEED_OPTION) => DangerChoice::Proceed,
            _ => DangerChoice::Cancel,
        }
    }
}

/// Decides whether a chosen command runs, asking the user as much as its
/// risk tier demands.
pub struct ExecutionGate<'a> {
    backend: &'a dyn Backend,
    ui: &'a dyn Prompter,
    runner: &'a dyn CommandRunner,
}

impl<'a> ExecutionGate<'a> {
    pub fn new(backend: &'a dyn Backend, ui: &'a dyn Prompter, runner: &'a dyn CommandRunner) -> Self {
        Self { backend, ui, runner }
    }

    /// Classify `command`, walk the user through that tier's confirmation
    /// steps and run it if every step was approved.
    ///
    /// Only a failed risk explanation is an error. Every "no" is
    /// `GateOutcome::Declined`.
    pub fn handle(&self, command: &str, ctx: &QueryContext) -> Result<GateOutcome, BackendError> {
        if command.trim().is_empty() {
            tracing::warn!("refusing to run an empty command");
            return Ok(GateOutcome::Declined);
        }

        let tier = classify(command);
        tracing::debug!(command, %tier, "classified");
        ui::print_command_header(command, tier);

        let approved = match tier {
            RiskTier::Safe => self
                .ui
                .confirm(&format!("Run safe command: {}?", command)),
            RiskTier::Sudo => self.ui.confirm(&format!(
                "This command requires elevated privileges: {}\nProceed?",
                command
            )),
            RiskTier::Dangerous => self.approve_dangerous(command, ctx)?,
            RiskTier::Unknown => self.ui.confirm(&format!(
                "Unknown command classification: {}\nProceed with caution?",
                command
            )),
        };

        if !approved {
            tracing::info!(command, %tier, "declined");
            return Ok(GateOutcome::Declined);
        }

        ui::print_executing(command);
        let result = self.runner.run(command);
        ui::print_execution(&result);
        tracing::info!(command, %tier, exit_code = result.exit_code, "executed");
        Ok(GateOutcome::Executed(result))
    }

    fn approve_dangerous(&self, command: &str, ctx: &QueryContext) -> Result<bool, BackendError> {
        let options = [EXPLAIN_OPTION, PROCEED_OPTION, CANCEL_OPTION].map(String::from);
        let selection = self.ui.choose_one(
            &options,
            &format!("DANGEROUS COMMAND DETECTED: {}", command),
        );

        match DangerChoice::from_selection(selection.as_deref()) {
            DangerChoice::Explain => {
                let risks =
                    self.backend
                        .query(&risk_prompt(command), &ctx.history, &ctx.system_info)?;
                ui::print_risks(&risks);
                Ok(self
                    .ui
                    .confirm("After reading the risks, do you still want to proceed?"))
            }
            DangerChoice::Proceed => Ok(self
                .ui
                .confirm("Are you sure you want to proceed with this dangerous command?")),
            DangerChoice::Cancel => Ok(false),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::*;
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx() -> QueryContext {
        QueryContext {
            history: vec!["ls".into()],
            system_info: "test host".into(),
        }
    }

    fn run(
        command: &str,
        backend: &FakeBackend,
        ui: &ScriptedUi,
        runner: &CountingRunner,
    ) -> Result<GateOutcome, BackendError> {
        ExecutionGate::new(backend, ui, runner).handle(command, &ctx())
    }

    #[test]
    fn safe_command_runs_after_single_confirm() {
        let (backend, runner) = (FakeBackend::replying(""), CountingRunner::default());
        let ui = ScriptedUi::new().confirm_with(true);

        let outcome = run("ls -la", &backend, &ui, &runner).unwrap();

        assert!(outcome.succeeded());
        assert_eq!(runner.calls.get(), 1);
        assert_eq!(*ui.confirm_messages.borrow(), vec!["Run safe command: ls -la?".to_string()]);
    }

    #[test]
    fn safe_command_declined_does_not_run() {
        let (backend, runner) = (FakeBackend::replying(""), CountingRunner::default());
        let ui = ScriptedUi::new().confirm_with(false);

        let outcome = run("ls -la", &backend, &ui, &runner).unwrap();

        assert_eq!(outcome, GateOutcome::Declined);
        assert_eq!(runner.calls.get(), 0);
    }

    #[test]
    fn sudo_command_warns_about_privileges() {
        let (backend, runner) = (FakeBackend::replying(""), CountingRunner::default());
        let ui = ScriptedUi::new().confirm_with(true);

        run("sudo apt install htop", &backend, &ui, &runner).unwrap();

        assert_eq!(runner.calls.get(), 1);
        assert!(ui.confirm_messages.borrow()[0].starts_with("This command requires elevated privileges"));
    }

    #[test]
    fn unknown_command_asks_for_caution() {
        let (backend, runner) = (FakeBackend::replying(""), CountingRunner::default());
        let ui = ScriptedUi::new().confirm_with(false);

        let outcome = run("python3 manage.py migrate", &backend, &ui, &runner).unwrap();

        assert_eq!(outcome, GateOutcome::Declined);
        assert!(ui.confirm_messages.borrow()[0].contains("Proceed with caution?"));
    }

    #[test]
    fn dangerous_cancel_never_runs() {
        let (backend, runner) = (FakeBackend::replying(""), CountingRunner::default());
        let ui = ScriptedUi::new().choose(Some(CANCEL_OPTION));

        let outcome = run("rm -rf /", &backend, &ui, &runner).unwrap();

        assert_eq!(outcome, GateOutcome::Declined);
        assert_eq!(runner.calls.get(), 0);
        assert!(ui.confirm_messages.borrow().is_empty());
        assert!(backend.prompts.borrow().is_empty());
    }

    #[test]
    fn dangerous_without_selection_never_runs() {
        let (backend, runner) = (FakeBackend::replying(""), CountingRunner::default());
        let ui = ScriptedUi::new().choose(None);

        let outcome = run("dd if=/dev/zero of=/dev/sda", &backend, &ui, &runner).unwrap();

        assert_eq!(outcome, GateOutcome::Declined);
        assert_eq!(runner.calls.get(), 0);
    }

    #[test]
    fn dangerous_offers_three_options() {
        let (backend, runner) = (FakeBackend::replying(""), CountingRunner::default());
        let ui = ScriptedUi::new().choose(None);

        run("mkfs.ext4 /dev/sdb1", &backend, &ui, &runner).unwrap();

        assert_eq!(
            ui.offered.borrow()[0],
            vec![
                EXPLAIN_OPTION.to_string(),
                PROCEED_OPTION.to_string(),
                CANCEL_OPTION.to_string()
            ]
        );
        assert_eq!(
            ui.choice_headers.borrow()[0],
            "DANGEROUS COMMAND DETECTED: mkfs.ext4 /dev/sdb1"
        );
    }

    #[test]
    fn dangerous_proceed_needs_second_confirm() {
        let (backend, runner) = (FakeBackend::replying(""), CountingRunner::default());
        let ui = ScriptedUi::new().choose(Some(PROCEED_OPTION)).confirm_with(true);

        let outcome = run("rm -rf ./build", &backend, &ui, &runner).unwrap();

        assert!(outcome.succeeded());
        assert_eq!(runner.calls.get(), 1);
        assert_eq!(
            *ui.confirm_messages.borrow(),
            vec!["Are you sure you want to proceed with this dangerous command?".to_string()]
        );
    }

    #[test]
    fn dangerous_proceed_then_no_does_not_run() {
        let (backend, runner) = (FakeBackend::replying(""), CountingRunner::default());
        let ui = ScriptedUi::new().choose(Some(PROCEED_OPTION)).confirm_with(false);

        assert_eq!(
            run("rm -rf ./build", &backend, &ui, &runner).unwrap(),
            GateOutcome::Declined
        );
        assert_eq!(runner.calls.get(), 0);
    }

    #[test]
    fn dangerous_explain_asks_backend_then_confirms() {
        let backend = FakeBackend::replying("It wipes everything.");
        let runner = CountingRunner::default();
        let ui = ScriptedUi::new().choose(Some(EXPLAIN_OPTION)).confirm_with(true);

        let outcome = run("rm -rf ./build", &backend, &ui, &runner).unwrap();

        assert!(outcome.succeeded());
        assert_eq!(backend.prompts.borrow().len(), 1);
        assert!(backend.prompts.borrow()[0].contains("'rm -rf ./build'"));
        assert_eq!(
            *ui.confirm_messages.borrow(),
            vec!["After reading the risks, do you still want to proceed?".to_string()]
        );
        assert_eq!(runner.last.borrow().as_deref(), Some("rm -rf ./build"));
    }

    #[test]
    fn dangerous_explain_then_no_does_not_run() {
        let backend = FakeBackend::replying("It wipes everything.");
        let runner = CountingRunner::default();
        let ui = ScriptedUi::new().choose(Some(EXPLAIN_OPTION)).confirm_with(false);

        assert_eq!(
            run("rm -rf ./build", &backend, &ui, &runner).unwrap(),
            GateOutcome::Declined
        );
        assert_eq!(runner.calls.get(), 0);
    }

    #[test]
    fn failed_explanation_is_an_error_and_nothing_runs() {
        let backend = FakeBackend::failing();
        let runner = CountingRunner::default();
        let ui = ScriptedUi::new().choose(Some(EXPLAIN_OPTION)).confirm_with(true);

        assert!(run("rm -rf ./build", &backend, &ui, &runner).is_err());
        assert_eq!(runner.calls.get(), 0);
    }

    #[test]
    fn empty_command_is_declined_without_prompting() {
        let (backend, runner) = (FakeBackend::replying(""), CountingRunner::default());
        let ui = ScriptedUi::new().confirm_with(true);

        assert_eq!(run("   ", &backend, &ui, &runner).unwrap(), GateOutcome::Declined);
        assert!(ui.confirm_messages.borrow().is_empty());
        assert_eq!(runner.calls.get(), 0);
    }

    #[test]
    fn failed_execution_is_distinct_from_declined() {
        struct FailingRunner;
        impl CommandRunner for FailingRunner {
            fn run(&self, _: &str) -> crate::types::ExecutionResult {
                crate::types::ExecutionResult {
                    exit_code: 127,
                    stdout: String::new(),
                    stderr: "failed to start".into(),
                }
            }
        }

        let backend = FakeBackend::replying("");
        let ui = ScriptedUi::new().confirm_with(true);
        let outcome = ExecutionGate::new(&backend, &ui, &FailingRunner)
            .handle("ls", &ctx())
            .unwrap();

        assert!(matches!(outcome, GateOutcome::Executed(ref r) if r.exit_code == 127));
        assert!(!outcome.succeeded());
    }
}
