use super::*;

#[rstest]
#[case::pending_running(PodPhase::Pending, PodPhase::Running, true)]
#[case::pending_unknown(PodPhase::Pending, PodPhase::Unknown, true)]
#[case::pending_succeeded(PodPhase::Pending, PodPhase::Succeeded, false)]
#[case::running_succeeded(PodPhase::Running, PodPhase::Succeeded, true)]
#[case::running_failed(PodPhase::Running, PodPhase::Failed, true)]
#[case::running_pending(PodPhase::Running, PodPhase::Pending, false)]
#[case::running_running(PodPhase::Running, PodPhase::Running, false)]
#[case::succeeded_failed(PodPhase::Succeeded, PodPhase::Failed, false)]
#[case::failed_unknown(PodPhase::Failed, PodPhase::Unknown, true)]
#[case::unknown_running(PodPhase::Unknown, PodPhase::Running, false)]
fn test_can_transition_to(#[case] from: PodPhase, #[case] to: PodPhase, #[case] expected: bool) {
    assert_eq!(from.can_transition_to(to), expected);
}

#[rstest]
fn test_unknown_reachable_from_everything_else() {
    for phase in PodPhase::ALL.iter().filter(|p| **p != PodPhase::Unknown) {
        assert!(phase.can_transition_to(PodPhase::Unknown), "{phase} -> Unknown");
    }
    assert_is_empty!(PodPhase::Unknown.successors());
}

#[rstest]
fn test_terminal_phases() {
    let terminal: Vec<_> = PodPhase::ALL.iter().filter(|p| p.is_terminal()).collect();
    assert_eq!(terminal, vec![&PodPhase::Succeeded, &PodPhase::Failed, &PodPhase::Unknown]);
}

#[rstest]
fn test_timeline() {
    let tl = Timeline::new(100, 2);
    assert_eq!(
        tl,
        Timeline {
            scheduled: 100,
            started: 121,
            ready: 123,
            finished: 181,
            lost: 421,
        }
    );
    assert_eq!(tl.last_run(), (111, 116));
    assert_eq!(tl.condition_time(PodPhase::Running, PodConditionType::Ready), 123);
    assert_eq!(tl.condition_time(PodPhase::Failed, PodConditionType::Initialized), 100);
    assert_eq!(tl.condition_time(PodPhase::Failed, PodConditionType::ContainersReady), 181);
    assert_eq!(tl.condition_time(PodPhase::Unknown, PodConditionType::PodScheduled), 421);
}

#[rstest]
fn test_timestamp_reference() {
    let expected: DateTime<Utc> = "2023-03-07T07:48:13Z".parse().unwrap();
    assert_eq!(timestamp(REFERENCE_TS).0, expected);
    assert_eq!(Timeline::default().scheduled, REFERENCE_TS);
}
