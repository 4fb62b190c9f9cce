//! Commands for the Submission Processing context.

use questline_core::command::Command;
use uuid::Uuid;

/// Command to answer a challenge.
#[derive(Debug, Clone)]
pub struct SubmitChallenge {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The challenge being answered.
    pub challenge_id: Uuid,
    /// Submitting player. Exactly one of `user_id` and `team_id` must be set.
    pub user_id: Option<Uuid>,
    /// Submitting team.
    pub team_id: Option<Uuid>,
    /// Photo or video evidence.
    pub image_url: Option<String>,
    /// Text answer.
    pub text: Option<String>,
}

impl Command for SubmitChallenge {
    fn command_type(&self) -> &'static str {
        "submission.submit_challenge"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_challenge_belongs_to_submission_context() {
        let command = SubmitChallenge {
            correlation_id: Uuid::new_v4(),
            challenge_id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            team_id: None,
            image_url: None,
            text: Some("the lighthouse".to_owned()),
        };

        assert_eq!(command.context(), "submission");
        assert_eq!(command.command_type(), "submission.submit_challenge");
    }
}
