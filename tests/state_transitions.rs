use devloop::engine::SupervisorState;

#[test]
fn idle_restart_request_proceeds() {
    let (next, proceed) = SupervisorState::Idle.on_restart_requested();
    assert_eq!(next, SupervisorState::Restarting);
    assert!(proceed);
}

#[test]
fn reentrant_restart_request_is_dropped() {
    let (next, proceed) = SupervisorState::Restarting.on_restart_requested();
    assert_eq!(next, SupervisorState::Restarting);
    assert!(!proceed);
}

#[test]
fn restart_finishes_back_to_idle() {
    assert_eq!(
        SupervisorState::Restarting.on_restart_finished(),
        SupervisorState::Idle
    );
}

#[test]
fn shutdown_is_absorbing() {
    for state in [
        SupervisorState::Idle,
        SupervisorState::Restarting,
        SupervisorState::ShuttingDown,
    ] {
        assert_eq!(
            state.on_shutdown_requested(),
            SupervisorState::ShuttingDown
        );
    }

    // Nothing restarts once shutdown began.
    let (next, proceed) = SupervisorState::ShuttingDown.on_restart_requested();
    assert_eq!(next, SupervisorState::ShuttingDown);
    assert!(!proceed);
    assert_eq!(
        SupervisorState::ShuttingDown.on_restart_finished(),
        SupervisorState::ShuttingDown
    );
}
