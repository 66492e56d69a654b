//! Panel commands: list, find and switch. None of them change records.

use std::rc::Rc;

use crate::book::show_all;
use crate::command::{CommandAction, CommandError, CommandOutcome, CommandResult, CommandState, Panel};
use crate::model::customer::Customer;
use crate::model::fields::ValidationError;
use crate::model::order::Order;
use crate::model::phone::Phone;
use crate::model::schedule::Schedule;
use crate::service::model_service::ModelService;

/// Shows every record of a panel again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListPanel(pub Panel);

impl CommandAction for ListPanel {
    fn execute(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        let panel = self.0;
        match panel {
            Panel::Customers => model.update_customer_filter(show_all()),
            Panel::Phones => model.update_phone_filter(show_all()),
            Panel::Orders => model.update_order_filter(show_all()),
            Panel::Schedules => model.update_schedule_filter(show_all()),
            Panel::ArchivedOrders => model.update_archived_order_filter(show_all()),
        }
        Ok(CommandOutcome::on(panel, format!("Listed all {panel}")))
    }

    fn undo(&mut self, _model: &mut ModelService) -> CommandResult<()> {
        Err(CommandError::InvalidState(CommandState::Created))
    }

    fn is_reversible(&self) -> bool {
        false
    }
}

/// Filters a panel to records whose name contains any keyword as a
/// whole word, ignoring case.
///
/// Orders match on their customer's name and schedules on their venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindRecords {
    panel: Panel,
    keywords: Vec<String>,
}

impl FindRecords {
    /// Splits and lowercases `keywords`; fails when none is left.
    pub fn new<I, S>(panel: Panel, keywords: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords: Vec<String> = keywords
            .into_iter()
            .flat_map(|keyword| {
                keyword
                    .as_ref()
                    .split_whitespace()
                    .map(str::to_lowercase)
                    .collect::<Vec<_>>()
            })
            .collect();
        if keywords.is_empty() {
            return Err(ValidationError::EmptyKeywords);
        }
        Ok(Self { panel, keywords })
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl CommandAction for FindRecords {
    fn execute(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        let keywords = Rc::new(self.keywords.clone());
        let shown = match self.panel {
            Panel::Customers => {
                model.update_customer_filter(Rc::new(move |customer: &Customer| {
                    matches_any(customer.name().as_str(), &keywords)
                }));
                model.filtered_customers().len()
            }
            Panel::Phones => {
                model.update_phone_filter(Rc::new(move |phone: &Phone| {
                    matches_any(phone.name().as_str(), &keywords)
                }));
                model.filtered_phones().len()
            }
            Panel::Orders => {
                model.update_order_filter(Rc::new(move |order: &Order| {
                    matches_any(order.customer().name().as_str(), &keywords)
                }));
                model.filtered_orders().len()
            }
            Panel::Schedules => {
                model.update_schedule_filter(Rc::new(move |schedule: &Schedule| {
                    matches_any(schedule.venue().as_str(), &keywords)
                }));
                model.filtered_schedules().len()
            }
            Panel::ArchivedOrders => {
                model.update_archived_order_filter(Rc::new(move |order: &Order| {
                    matches_any(order.customer().name().as_str(), &keywords)
                }));
                model.filtered_archived_orders().len()
            }
        };
        Ok(CommandOutcome::on(
            self.panel,
            format!("{shown} {} listed!", self.panel),
        ))
    }

    fn undo(&mut self, _model: &mut ModelService) -> CommandResult<()> {
        Err(CommandError::InvalidState(CommandState::Created))
    }

    fn is_reversible(&self) -> bool {
        false
    }
}

/// Moves focus to another panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchPanel(pub Panel);

impl CommandAction for SwitchPanel {
    fn execute(&mut self, _model: &mut ModelService) -> CommandResult<CommandOutcome> {
        Ok(CommandOutcome::on(
            self.0,
            format!("Switched to {} panel", self.0),
        ))
    }

    fn undo(&mut self, _model: &mut ModelService) -> CommandResult<()> {
        Err(CommandError::InvalidState(CommandState::Created))
    }

    fn is_reversible(&self) -> bool {
        false
    }
}

/// Whole-word, case-insensitive match of any lowercase keyword.
fn matches_any(sentence: &str, keywords: &[String]) -> bool {
    sentence
        .split_whitespace()
        .map(str::to_lowercase)
        .any(|word| keywords.iter().any(|keyword| *keyword == word))
}
