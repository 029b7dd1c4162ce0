use tauri_runner::engine::{classify, ActiveChild, ExitClass, RunMode, PANIC_EXIT_CODE};
use tauri_runner::exec::ExitReport;

fn dev(pid: u32, exit_on_panic: bool) -> Option<ActiveChild> {
    Some(ActiveChild {
        pid,
        generation: 1,
        mode: RunMode::Dev { exit_on_panic },
    })
}

fn build(pid: u32) -> Option<ActiveChild> {
    Some(ActiveChild {
        pid,
        generation: 1,
        mode: RunMode::Build,
    })
}

fn report(pid: u32, code: i32) -> ExitReport {
    ExitReport { pid, code }
}

#[test]
fn test_report_for_other_pid_is_stale() {
    assert_eq!(classify(report(7, 1), dev(8, true), false), ExitClass::Stale);
    assert_eq!(classify(report(7, 0), None, false), ExitClass::Stale);
}

#[test]
fn test_stale_report_cannot_complete_pending_stop() {
    assert_eq!(classify(report(7, 0), dev(8, true), true), ExitClass::Stale);
    assert!(!ExitClass::Stale.ends_child());
}

#[test]
fn test_pending_stop_wins_over_exit_code() {
    for code in [0, 1, PANIC_EXIT_CODE, -1] {
        assert_eq!(classify(report(8, code), dev(8, true), true), ExitClass::Stopped);
        assert_eq!(classify(report(8, code), build(8), true), ExitClass::Stopped);
    }
}

#[test]
fn test_zero_is_success_in_both_modes() {
    assert_eq!(classify(report(8, 0), dev(8, true), false), ExitClass::Success);
    assert_eq!(classify(report(8, 0), build(8), false), ExitClass::Success);
}

#[test]
fn test_panic_code_tolerated_only_in_dev_without_exit_on_panic() {
    assert_eq!(
        classify(report(8, PANIC_EXIT_CODE), dev(8, false), false),
        ExitClass::ToleratedCrash
    );
    assert_eq!(
        classify(report(8, PANIC_EXIT_CODE), dev(8, true), false),
        ExitClass::Failure(PANIC_EXIT_CODE)
    );
    assert_eq!(
        classify(report(8, PANIC_EXIT_CODE), build(8), false),
        ExitClass::Failure(PANIC_EXIT_CODE)
    );
}

#[test]
fn test_other_codes_fail() {
    assert_eq!(classify(report(8, 1), dev(8, false), false), ExitClass::Failure(1));
    assert_eq!(classify(report(8, -1), build(8), false), ExitClass::Failure(-1));
}
