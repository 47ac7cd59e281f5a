use crate::error::AppResult;
use crate::page::{FollowIntent, PageSurface, TargetId};

/// The exact visual delta an optimistic action applied, recorded so a
/// failing request can invert it precisely. Rollback is the inverse applied
/// through the same surface accessors the optimistic step used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Toggle {
        target: TargetId,
        to: bool,
    },
    Counter {
        target: TargetId,
        delta: i64,
    },
    FollowIntentField {
        target: TargetId,
        from: FollowIntent,
        to: FollowIntent,
    },
    ComposeUploading {
        to: bool,
    },
    Seq(Vec<Mutation>),
}

impl Mutation {
    pub fn apply(&self, surface: &mut dyn PageSurface) -> AppResult<()> {
        match self {
            Self::Toggle { target, to } => surface.set_toggle_state(target, *to),
            Self::Counter { target, delta } => surface.adjust_counter(target, *delta),
            Self::FollowIntentField { target, to, .. } => surface.set_follow_intent(target, *to),
            Self::ComposeUploading { to } => {
                surface.set_compose_uploading(*to);
                Ok(())
            }
            Self::Seq(steps) => {
                for step in steps {
                    step.apply(surface)?;
                }
                Ok(())
            }
        }
    }

    pub fn invert(&self) -> Mutation {
        match self {
            Self::Toggle { target, to } => Self::Toggle {
                target: target.clone(),
                to: !to,
            },
            Self::Counter { target, delta } => Self::Counter {
                target: target.clone(),
                delta: -delta,
            },
            Self::FollowIntentField { target, from, to } => Self::FollowIntentField {
                target: target.clone(),
                from: *to,
                to: *from,
            },
            Self::ComposeUploading { to } => Self::ComposeUploading { to: !to },
            Self::Seq(steps) => Self::Seq(steps.iter().rev().map(Mutation::invert).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::page::{FollowIntent, MemoryPage, PageSurface, TargetId, TargetState};

    use super::Mutation;

    #[test]
    fn seq_inverts_in_reverse_order() {
        let target = TargetId::new("like-1");
        let seq = Mutation::Seq(vec![
            Mutation::Toggle {
                target: target.clone(),
                to: true,
            },
            Mutation::Counter {
                target: target.clone(),
                delta: 1,
            },
        ]);

        let inverted = seq.invert();
        assert_eq!(
            inverted,
            Mutation::Seq(vec![
                Mutation::Counter {
                    target: target.clone(),
                    delta: -1,
                },
                Mutation::Toggle { target, to: false },
            ])
        );
    }

    #[test]
    fn apply_then_inverted_apply_restores_the_surface() {
        let mut page = MemoryPage::new();
        let target = TargetId::new("follow-alice");
        page.insert_target(
            target.clone(),
            TargetState {
                follow_intent: Some(FollowIntent::Follow),
                ..TargetState::default()
            },
        );

        let mutation = Mutation::Seq(vec![
            Mutation::Toggle {
                target: target.clone(),
                to: true,
            },
            Mutation::FollowIntentField {
                target: target.clone(),
                from: FollowIntent::Follow,
                to: FollowIntent::Unfollow,
            },
        ]);

        mutation.apply(&mut page).expect("apply should succeed");
        assert!(page.toggle_state(&target).expect("target exists"));

        mutation
            .invert()
            .apply(&mut page)
            .expect("rollback should succeed");
        assert!(!page.toggle_state(&target).expect("target exists"));
        assert_eq!(
            page.follow_intent(&target).expect("intent exists"),
            FollowIntent::Follow
        );
    }
}
