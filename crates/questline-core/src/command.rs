//! Command abstractions shared by the submission and recurrence contexts.
//!
//! Command types are dotted names, `<context>.<action>`, so one log query
//! can pick out every command a context handled.

use uuid::Uuid;

/// A request to change quest state. Handlers log `context`, `command_type`
/// and `correlation_id` on every span they open.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Stable dotted name, e.g. `submission.submit_challenge`.
    fn command_type(&self) -> &'static str;

    /// Correlation ID carried through every log line the command produces.
    fn correlation_id(&self) -> Uuid;

    /// The context segment of [`Command::command_type`]. A name without a
    /// dot is its own context.
    fn context(&self) -> &'static str {
        let command_type = self.command_type();
        command_type
            .split_once('.')
            .map_or(command_type, |(context, _)| context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Named(&'static str);

    impl Command for Named {
        fn command_type(&self) -> &'static str {
            self.0
        }

        fn correlation_id(&self) -> Uuid {
            Uuid::nil()
        }
    }

    #[test]
    fn test_context_is_the_segment_before_the_first_dot() {
        assert_eq!(Named("submission.submit_challenge").context(), "submission");
        assert_eq!(
            Named("recurrence.process_due.batch").context(),
            "recurrence"
        );
    }

    #[test]
    fn test_context_of_undotted_name_is_the_name() {
        assert_eq!(Named("heartbeat").context(), "heartbeat");
    }
}
