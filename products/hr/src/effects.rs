use crate::pipeline::Pipeline;
use crate::status::{ActivityStatus, ApplicationStatus};

/// Outcome of an accepted status change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionPlan {
    pub activity_status: ActivityStatus,
    /// New application status, when the change moves it.
    pub application_status: Option<ApplicationStatus>,
}

/// Application status after an activity moves to `target`; `after` already
/// reflects the move.
pub(crate) fn after_transition(
    current: ApplicationStatus,
    target: ActivityStatus,
    after: &Pipeline,
) -> Option<ApplicationStatus> {
    if current.is_closed() {
        return None;
    }
    match target {
        ActivityStatus::Passed if after.all_passed() => Some(ApplicationStatus::Hired),
        ActivityStatus::Failed | ActivityStatus::NoShow => Some(ApplicationStatus::Rejected),
        ActivityStatus::Completed | ActivityStatus::Passed
            if current == ApplicationStatus::Submitted =>
        {
            Some(ApplicationStatus::Interviewing)
        }
        _ => None,
    }
}

/// Application status after a new activity is recorded on `before`.
pub(crate) fn after_first_activity(before: &Pipeline) -> Option<ApplicationStatus> {
    (!before.has_activities() && before.application_status() == ApplicationStatus::Submitted)
        .then_some(ApplicationStatus::Interviewing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixtures::*;

    #[test]
    fn completion_moves_submitted_to_interviewing() {
        let after = standard(
            vec![activity(1, ActivityStatus::Completed, None)],
            ApplicationStatus::Submitted,
        );
        assert_eq!(
            after_transition(ApplicationStatus::Submitted, ActivityStatus::Completed, &after),
            Some(ApplicationStatus::Interviewing)
        );
        assert_eq!(
            after_transition(ApplicationStatus::Interviewing, ActivityStatus::Completed, &after),
            None
        );
    }

    #[test]
    fn closed_applications_are_left_alone() {
        let after = standard(
            vec![activity(1, ActivityStatus::Failed, None)],
            ApplicationStatus::Hired,
        );
        for closed in [
            ApplicationStatus::Hired,
            ApplicationStatus::Rejected,
            ApplicationStatus::Withdrawn,
        ] {
            assert_eq!(after_transition(closed, ActivityStatus::Failed, &after), None);
        }
    }

    #[test]
    fn last_pass_hires() {
        let after = standard(
            vec![
                activity(1, ActivityStatus::Passed, None),
                activity(2, ActivityStatus::Passed, None),
                activity(3, ActivityStatus::Passed, None),
            ],
            ApplicationStatus::Interviewing,
        );
        assert_eq!(
            after_transition(ApplicationStatus::Interviewing, ActivityStatus::Passed, &after),
            Some(ApplicationStatus::Hired)
        );
    }

    #[test]
    fn only_the_first_activity_starts_interviewing() {
        let empty = standard(vec![], ApplicationStatus::Submitted);
        assert_eq!(after_first_activity(&empty), Some(ApplicationStatus::Interviewing));
        let started = empty.with_activity(activity(1, ActivityStatus::Scheduled, None));
        assert_eq!(after_first_activity(&started), None);
    }
}
