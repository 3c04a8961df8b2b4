//! Command handlers.
//!
//! [`App`] wires the configured store, the subscription gate, and the
//! session together. Each handler returns the text to print.

use std::sync::Arc;

use metricspace_core::{Calculator, EventSink, PlanId, Quota, TracingSink};
use metricspace_gate::{
    BlockReason, PaymentOutcome, PaymentStatus, Session, SubscriptionGate, UserProfile,
};
use metricspace_storage::{CalculatorState, PersistenceStore};

use crate::cli::{Command, StateAction};
use crate::config::MetricspaceConfig;
use crate::error::{Error, Result};

/// Storage key prefix for locally cached user profiles.
pub const PROFILE_KEY_PREFIX: &str = "metricspace_profile_";

/// Everything a command needs.
pub struct App {
    store: Arc<PersistenceStore>,
    gate: SubscriptionGate,
    session: Session,
}

impl App {
    /// Opens the configured store and gate and starts a session.
    pub fn open(
        config: &MetricspaceConfig,
        user: Option<&str>,
        plan: Option<PlanId>,
    ) -> Result<Self> {
        let events: Arc<dyn EventSink> = Arc::new(TracingSink);
        let store = Arc::new(config.open_store(events.clone()));
        let gate = SubscriptionGate::new(store.clone())
            .with_events(events)
            .with_period(config.billing.period.policy());
        Self::with_parts(store, gate, user, plan)
    }

    /// Builds an app over an existing store and gate.
    ///
    /// Fails if `user` is blank.
    pub fn with_parts(
        store: Arc<PersistenceStore>,
        gate: SubscriptionGate,
        user: Option<&str>,
        plan: Option<PlanId>,
    ) -> Result<Self> {
        let session = start_session(&store, user, plan)?;
        Ok(Self {
            store,
            gate,
            session,
        })
    }

    /// The active session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Runs one command. `Config` is handled before an app exists.
    pub fn run(&mut self, command: Command) -> Result<String> {
        match command {
            Command::Plans => self.plans(),
            Command::Access { calculator } => Ok(self.access(&calculator)),
            Command::Limit => to_json(&self.gate.check_calculation_limit(&self.session)),
            Command::Usage => to_json(&self.gate.usage(&self.session)),
            Command::Calculate { calculator } => self.calculate(calculator),
            Command::State { action } => self.state(action),
            Command::Keys { prefix } => Ok(self.store.list_keys(&prefix).join("\n")),
            Command::Pay { plan, status } => self.pay(plan, &status),
            Command::Cancel => self.cancel(),
            Command::Config { .. } => Err(Error::config("config commands run without a session")),
        }
    }

    fn plans(&self) -> Result<String> {
        let lines: Vec<String> = self
            .gate
            .catalog()
            .plans()
            .map(|plan| {
                let marker = if plan.id == self.session.plan() { "*" } else { " " };
                let calculators = serde_json::to_string(&plan.allowed_calculators)
                    .unwrap_or_else(|_| "?".to_string());
                format!(
                    "{marker} {:<10} {:>9}/month  {calculators}",
                    plan.id.as_str(),
                    plan.calculations_per_month.to_string()
                )
            })
            .collect();
        Ok(lines.join("\n"))
    }

    fn access(&self, calculator: &str) -> String {
        if self.gate.check_access(&self.session, calculator) {
            format!("{calculator}: allowed on {}", self.session.plan())
        } else {
            format!(
                "{calculator}: not included in {}; upgrade to use it",
                self.session.plan()
            )
        }
    }

    fn calculate(&self, calculator: Calculator) -> Result<String> {
        let state = CalculatorState::load(&self.store, calculator);
        let computed = state.compute();
        // Locked calculators get the upgrade prompt even without input.
        if computed.is_none() && self.gate.check_access(&self.session, calculator.id()) {
            return Err(metricspace_core::Error::validation(format!(
                "{} needs at least one complete row; use `metricspace state set`",
                calculator.title()
            ))
            .into());
        }

        let Some(value) = self
            .gate
            .perform_calculation(&self.session, calculator.id(), || computed)
            .flatten()
        else {
            return Ok(self.upgrade_prompt(calculator));
        };

        let mut out = format!("{}: {value:.2}", calculator.title());
        let series = calculator.series(state.rows());
        if series.len() > 1 {
            let points: Vec<String> = series.iter().map(|v| format!("{v:.2}")).collect();
            out.push_str(&format!("\nper row: {}", points.join(", ")));
        }
        let status = self.gate.check_calculation_limit(&self.session);
        if let (Quota::Count(limit), Some(remaining)) = (status.limit, status.remaining) {
            out.push_str(&format!(
                "\n{} of {limit} calculations left this month",
                remaining.max(0)
            ));
        }
        Ok(out)
    }

    fn upgrade_prompt(&self, calculator: Calculator) -> String {
        match self.gate.block_reason(&self.session, calculator.id()) {
            Some(BlockReason::NoAccess) => format!(
                "{} is not included in the {} plan. Upgrade to unlock it.",
                calculator.title(),
                self.session.plan()
            ),
            _ => format!(
                "You have used all {} calculations this month on the {} plan. Upgrade for more.",
                self.gate.plan(&self.session).calculations_per_month,
                self.session.plan()
            ),
        }
    }

    fn state(&self, action: StateAction) -> Result<String> {
        match action {
            StateAction::Show { calculator } => {
                to_json(&CalculatorState::load(&self.store, calculator).rows())
            }
            StateAction::AddRow { calculator } => {
                let mut state = CalculatorState::load(&self.store, calculator);
                let index = state.add_row();
                state.save(&self.store);
                Ok(format!("Added row {index}"))
            }
            StateAction::RemoveRow { calculator, index } => {
                let mut state = CalculatorState::load(&self.store, calculator);
                if state.remove_row(index)? {
                    state.save(&self.store);
                    Ok(format!("Removed row {index}"))
                } else {
                    Ok("The last row cannot be removed".to_string())
                }
            }
            StateAction::Set {
                calculator,
                index,
                field,
                value,
            } => {
                let mut state = CalculatorState::load(&self.store, calculator);
                state.update_field(index, &field, &value)?;
                state.save(&self.store);
                Ok(format!("Set row {index} {field} = {value:?}"))
            }
            StateAction::Reset { calculator } => {
                let mut state = CalculatorState::load(&self.store, calculator);
                state.reset();
                state.save(&self.store);
                Ok(format!("Reset {}", calculator.title()))
            }
        }
    }

    fn pay(&mut self, plan: PlanId, status: &str) -> Result<String> {
        match self.session.apply_payment(plan, &PaymentStatus::parse(status))? {
            PaymentOutcome::Upgraded(plan) => {
                self.save_profile();
                Ok(format!("Payment succeeded. You are now on the {plan} plan."))
            }
            PaymentOutcome::Pending => {
                Ok("Payment is still processing; your plan has not changed yet.".to_string())
            }
        }
    }

    fn cancel(&mut self) -> Result<String> {
        self.session.cancel()?;
        self.save_profile();
        Ok(format!(
            "Subscription cancelled. You are now on the {} plan.",
            self.session.plan()
        ))
    }

    fn save_profile(&self) {
        if let Some(profile) = self.session.user() {
            self.store.write(&profile_key(&profile.id), profile);
        }
    }
}

fn profile_key(user_id: &str) -> String {
    format!("{PROFILE_KEY_PREFIX}{user_id}")
}

/// Signs in `user` using the cached profile, if any; `plan` overrides the
/// cached plan. Without a user the session is anonymous.
fn start_session(
    store: &PersistenceStore,
    user: Option<&str>,
    plan: Option<PlanId>,
) -> Result<Session> {
    let Some(user) = user else {
        if plan.is_some_and(|p| p != PlanId::Free) {
            tracing::warn!("--plan ignored: anonymous sessions are always on the free plan");
        }
        return Ok(Session::anonymous());
    };
    let user = user.trim();
    if user.is_empty() {
        return Err(metricspace_gate::Error::profile("user id is empty").into());
    }
    let mut profile = store.read(&profile_key(user), UserProfile::new(user, PlanId::Free));
    if let Some(plan) = plan {
        profile.plan = plan;
    }
    Ok(Session::login(profile))
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| metricspace_core::Error::Serialization(e).into())
}
