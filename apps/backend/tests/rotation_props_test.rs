//! Property tests over the public services (in-memory store, manual clock).
//!
//! Properties tested:
//! - Every started round covers exactly the eligible participants
//! - At most one round is active after any sequence of owner actions
//! - A rejected action never changes the walk version

mod common;

use std::collections::BTreeSet;

use common::proptest_prelude::proptest_prelude_config;
use common::{owner, uid, Harness};
use proptest::prelude::*;
use walks_backend::domain::{Response, Uid};
use walks_backend::RotationOutcome;

#[derive(Debug, Clone)]
enum Action {
    Rotate,
    StartNext,
    Close,
    Cancel(usize),
    Wait(i64),
}

fn action(people: usize) -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => Just(Action::Rotate),
        1 => Just(Action::StartNext),
        1 => Just(Action::Close),
        1 => (0..people).prop_map(Action::Cancel),
        2 => (1i64..15).prop_map(Action::Wait),
    ]
}

fn scenario() -> impl Strategy<Value = (usize, Vec<Action>)> {
    (2usize..8).prop_flat_map(|people| (Just(people), prop::collection::vec(action(people), 1..25)))
}

fn name(i: usize) -> String {
    format!("p{i}")
}

proptest! {
    #![proptest_config(proptest_prelude_config())]

    #[test]
    fn prop_owner_actions_keep_rounds_consistent((people, actions) in scenario()) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async {
            let h = Harness::new();
            let names: Vec<String> = (0..people).map(name).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let walk_id = h.started_meetup(&refs).await;
            let mut eligible: BTreeSet<Uid> = names.iter().map(|n| uid(n)).collect();

            for action in actions {
                let version_before = h.version(walk_id).await;
                let result = match &action {
                    Action::Rotate => h.rotation.rotate(walk_id, &owner()).await.map(Some),
                    Action::StartNext => h.scheduler.start_next_round(walk_id, &owner()).await.map(Some),
                    Action::Close => h
                        .scheduler
                        .close_active_round(walk_id, &owner())
                        .await
                        .map(|_| None),
                    Action::Cancel(i) => {
                        let who = uid(&name(*i));
                        let _ = h
                            .participants
                            .respond(walk_id, &who, &who, Response::Cancel)
                            .await;
                        eligible.remove(&who);
                        Ok(None)
                    }
                    Action::Wait(mins) => {
                        h.advance(*mins);
                        Ok(None)
                    }
                };

                match result {
                    Ok(Some(RotationOutcome::Rotated(change))) => {
                        let covered: BTreeSet<Uid> = change
                            .activated
                            .pairs
                            .iter()
                            .flat_map(|p| p.user_uids.iter().cloned())
                            .collect();
                        prop_assert_eq!(&covered, &eligible);
                        let members: usize = change.activated.pairs.iter().map(|p| p.len()).sum();
                        prop_assert_eq!(members, eligible.len());
                        prop_assert!(change.activated.pairs.iter().all(|p| p.len() >= 2));
                    }
                    Ok(Some(RotationOutcome::WaitingForParticipants)) => {
                        prop_assert!(eligible.len() < 2);
                        prop_assert_eq!(h.version(walk_id).await, version_before);
                    }
                    Ok(None) => {}
                    Err(_) => {
                        prop_assert_eq!(h.version(walk_id).await, version_before);
                    }
                }

                prop_assert!(h.active_rounds(walk_id).await.len() <= 1);
            }
            Ok(())
        })?;
    }
}
