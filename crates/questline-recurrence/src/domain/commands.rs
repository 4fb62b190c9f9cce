//! Commands for the Recurrence context.

use questline_core::command::Command;
use uuid::Uuid;

/// Command to regenerate every recurring quest that is due.
#[derive(Debug, Clone)]
pub struct ProcessDueRecurringQuests {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

/// Command to regenerate one recurring quest, if it is due.
#[derive(Debug, Clone)]
pub struct ProcessRecurringQuest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The template quest.
    pub quest_id: Uuid,
}

impl Command for ProcessDueRecurringQuests {
    fn command_type(&self) -> &'static str {
        "recurrence.process_due_recurring_quests"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl Command for ProcessRecurringQuest {
    fn command_type(&self) -> &'static str {
        "recurrence.process_recurring_quest"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
