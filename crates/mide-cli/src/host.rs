use mide_core::guard::{ExitInterceptor, ExitPathway};
use mide_core::step::Step;
use tracing::debug;

/// Exit hooks for a terminal session. A terminal has no history stack or
/// tab, so the hooks only record what a browser host would have done.
#[derive(Debug, Default)]
pub struct TerminalHost {
    pub close_prevented: bool,
    pub restored_step: Option<Step>,
    pub proceeded: Option<ExitPathway>,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExitInterceptor for TerminalHost {
    fn prevent_close(&mut self) {
        self.close_prevented = true;
    }

    fn arm_back_guard(&mut self) {
        debug!("back guard armed");
    }

    fn restore_location(&mut self, step: Step) {
        self.restored_step = Some(step);
    }

    fn proceed(&mut self, pathway: ExitPathway) {
        self.proceeded = Some(pathway);
    }
}
