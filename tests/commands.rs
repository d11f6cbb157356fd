use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use robovisor::{
    Command, CommandAdapter, CommandError, CommandGroup, HostCommand, HostCommandExt, Resource,
    Scheduler,
};

#[derive(Default)]
struct Calls {
    creates: AtomicU32,
    polls: AtomicU32,
    destroys: AtomicU32,
    initialize: AtomicU32,
    execute: AtomicU32,
    finished_true: AtomicU32,
    end: AtomicU32,
}

impl Calls {
    fn get(counter: &AtomicU32) -> u32 {
        counter.load(Ordering::SeqCst)
    }
}

/// Finishes on the `finish_at`-th poll (0 = never).
struct Counted {
    name: &'static str,
    finish_at: u32,
    calls: Arc<Calls>,
}

impl Command for Counted {
    fn name(&self) -> &str {
        self.name
    }
    fn on_create(&mut self) -> Result<(), CommandError> {
        self.calls.creates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
    fn poll(&mut self) -> Result<bool, CommandError> {
        let n = self.calls.polls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(self.finish_at != 0 && n >= self.finish_at)
    }
    fn on_destroy(&mut self) -> Result<(), CommandError> {
        self.calls.destroys.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Host-side spy counting protocol calls made by the scheduler.
struct Spy<H> {
    inner: H,
    calls: Arc<Calls>,
}

impl<H: HostCommand> HostCommand for Spy<H> {
    fn name(&self) -> &str {
        self.inner.name()
    }
    fn initialize(&mut self) -> Result<(), CommandError> {
        self.calls.initialize.fetch_add(1, Ordering::SeqCst);
        self.inner.initialize()
    }
    fn execute(&mut self) -> Result<(), CommandError> {
        self.calls.execute.fetch_add(1, Ordering::SeqCst);
        self.inner.execute()
    }
    fn is_finished(&mut self, tick: u64) -> Result<bool, CommandError> {
        let done = self.inner.is_finished(tick)?;
        if done {
            self.calls.finished_true.fetch_add(1, Ordering::SeqCst);
        }
        Ok(done)
    }
    fn end(&mut self, interrupted: bool) -> Result<(), CommandError> {
        self.calls.end.fetch_add(1, Ordering::SeqCst);
        self.inner.end(interrupted)
    }
    fn requirements(&self) -> &[Resource] {
        self.inner.requirements()
    }
    fn timeout(&self) -> Option<Duration> {
        self.inner.timeout()
    }
    fn is_interruptible(&self) -> bool {
        self.inner.is_interruptible()
    }
}

fn counted(name: &'static str, finish_at: u32) -> (CommandAdapter<Counted>, Arc<Calls>) {
    let calls = Arc::new(Calls::default());
    let cmd = Counted {
        name,
        finish_at,
        calls: Arc::clone(&calls),
    };
    (CommandAdapter::new(cmd), calls)
}

fn spied<H: HostCommand>(inner: H, calls: &Arc<Calls>) -> Spy<H> {
    Spy {
        inner,
        calls: Arc::clone(calls),
    }
}

#[test]
fn immediate_finish_runs_each_hook_once_and_never_executes() {
    let (cmd, calls) = counted("instant", 1);
    let mut s = Scheduler::new();
    let id = s
        .start(spied(cmd.with_timeout(Duration::ZERO), &calls))
        .unwrap();

    for _ in 0..3 {
        s.run().unwrap();
    }

    assert!(!s.is_running(id));
    assert_eq!(Calls::get(&calls.creates), 1);
    assert_eq!(Calls::get(&calls.finished_true), 1);
    assert_eq!(Calls::get(&calls.destroys), 1);
    assert_eq!(Calls::get(&calls.execute), 0);
    assert_eq!(Calls::get(&calls.polls), 1);
}

#[test]
fn poll_runs_once_per_tick_until_finished() {
    let (cmd, calls) = counted("three", 3);
    let mut s = Scheduler::new();
    s.start(spied(cmd, &calls)).unwrap();
    for _ in 0..5 {
        s.run().unwrap();
    }
    assert_eq!(Calls::get(&calls.polls), 3);
    assert_eq!(Calls::get(&calls.execute), 2);
    assert_eq!(Calls::get(&calls.destroys), 1);
}

#[tokio::test(start_paused = true)]
async fn timed_out_command_is_ended_exactly_once() {
    let (cmd, calls) = counted("stuck", 0);
    let mut s = Scheduler::new();
    let id = s
        .start(spied(cmd.with_timeout(Duration::from_millis(60)), &calls))
        .unwrap();

    for _ in 0..5 {
        s.run().unwrap();
        tokio::time::advance(Duration::from_millis(20)).await;
    }

    assert!(!s.is_running(id));
    assert_eq!(Calls::get(&calls.end), 1);
    assert_eq!(Calls::get(&calls.destroys), 1);
    assert_eq!(Calls::get(&calls.finished_true), 0);
}

#[test]
fn preempted_command_is_destroyed_once() {
    let (old, old_calls) = counted("old", 0);
    let (new, new_calls) = counted("new", 0);
    let mut s = Scheduler::new();
    let old_id = s.start(old.requires("shooter")).unwrap();
    s.run().unwrap();
    let new_id = s.start(new.requires("shooter")).unwrap();
    s.run().unwrap();

    assert!(!s.is_running(old_id));
    assert!(s.is_running(new_id));
    assert_eq!(Calls::get(&old_calls.destroys), 1);
    assert_eq!(Calls::get(&new_calls.creates), 1);

    s.cancel_all();
    assert!(s.is_empty());
    assert_eq!(Calls::get(&new_calls.destroys), 1);
    assert_eq!(Calls::get(&old_calls.destroys), 1);
}

#[test]
fn sequential_group_starts_second_after_first() {
    let (first, first_calls) = counted("first", 2);
    let (second, second_calls) = counted("second", 1);
    let mut s = Scheduler::new();
    let id = s.start(first.then(second)).unwrap();

    s.run().unwrap();
    assert_eq!(Calls::get(&second_calls.creates), 0);
    s.run().unwrap();
    assert_eq!(Calls::get(&first_calls.destroys), 1);
    assert_eq!(Calls::get(&second_calls.creates), 1);
    assert_eq!(Calls::get(&second_calls.polls), 0);
    s.run().unwrap();
    assert!(!s.is_running(id));
    assert_eq!(Calls::get(&second_calls.destroys), 1);
}

#[tokio::test(start_paused = true)]
async fn timed_child_in_sequence_hands_over_to_next() {
    let (stuck, stuck_calls) = counted("stuck", 0);
    let (next, next_calls) = counted("next", 1);
    let mut s = Scheduler::new();
    let id = s
        .start(
            CommandGroup::sequential()
                .with_timed(stuck, Duration::from_millis(50))
                .with(next),
        )
        .unwrap();

    for _ in 0..8 {
        s.run().unwrap();
        tokio::time::advance(Duration::from_millis(20)).await;
    }

    assert!(!s.is_running(id));
    assert_eq!(Calls::get(&stuck_calls.destroys), 1);
    assert_eq!(Calls::get(&next_calls.creates), 1);
    assert_eq!(Calls::get(&next_calls.polls), 1);
    assert_eq!(Calls::get(&next_calls.destroys), 1);
}

#[tokio::test(start_paused = true)]
async fn parallel_group_timeout_ends_every_child_once() {
    let (a, a_calls) = counted("a", 0);
    let (b, b_calls) = counted("b", 0);
    let group = CommandGroup::parallel()
        .with(a)
        .with(b)
        .with_timeout(Duration::from_millis(50));
    let calls = Arc::new(Calls::default());
    let mut s = Scheduler::new();
    let id = s.start(spied(group, &calls)).unwrap();

    for _ in 0..6 {
        s.run().unwrap();
        tokio::time::advance(Duration::from_millis(20)).await;
    }

    assert!(!s.is_running(id));
    assert_eq!(Calls::get(&calls.end), 1);
    assert_eq!(Calls::get(&calls.finished_true), 0);
    for child in [&a_calls, &b_calls] {
        assert_eq!(Calls::get(&child.creates), 1);
        assert_eq!(Calls::get(&child.destroys), 1);
    }
}

#[test]
fn parallel_group_finishes_when_both_finished() {
    let (fast, fast_calls) = counted("fast", 1);
    let (slow, slow_calls) = counted("slow", 3);
    let mut s = Scheduler::new();
    let id = s.start(fast.and(slow)).unwrap();

    s.run().unwrap();
    assert_eq!(Calls::get(&fast_calls.destroys), 1);
    assert!(s.is_running(id));
    s.run().unwrap();
    assert!(s.is_running(id));
    s.run().unwrap();
    assert!(!s.is_running(id));
    assert_eq!(Calls::get(&fast_calls.polls), 1);
    assert_eq!(Calls::get(&slow_calls.destroys), 1);
}

#[test]
fn cancelling_a_group_ends_unfinished_children_once() {
    let (a, a_calls) = counted("a", 1);
    let (b, b_calls) = counted("b", 0);
    let (c, c_calls) = counted("c", 0);
    let mut s = Scheduler::new();
    let id = s.start(a.then(b).then(c)).unwrap();

    s.run().unwrap();
    assert!(s.cancel(id));
    assert!(!s.cancel(id));

    assert_eq!(Calls::get(&a_calls.destroys), 1);
    assert_eq!(Calls::get(&b_calls.creates), 1);
    assert_eq!(Calls::get(&b_calls.destroys), 1);
    assert_eq!(Calls::get(&c_calls.creates), 0);
    assert_eq!(Calls::get(&c_calls.destroys), 0);
}

#[test]
fn group_requirements_conflict_with_single_commands() {
    let (a, _) = counted("a", 0);
    let (b, _) = counted("b", 0);
    let (solo, _) = counted("solo", 0);
    let mut s = Scheduler::new();
    let group = s
        .start(a.requires("drive").and(b.requires("arm")).with_timeout(Duration::ZERO))
        .unwrap();
    let solo = s.start(solo.requires("arm").non_interruptible()).unwrap();

    assert!(!s.is_running(group));
    assert!(s.is_running(solo));

    let (late, late_calls) = counted("late", 0);
    let err = s.start(late.requires("arm")).unwrap_err();
    assert_eq!(err.as_label(), "command_requirement_conflict");
    assert_eq!(Calls::get(&late_calls.creates), 0);
}

struct FailsToCreate(Arc<Calls>);

impl Command for FailsToCreate {
    fn on_create(&mut self) -> Result<(), CommandError> {
        Err(CommandError::fail("motor controller offline"))
    }
    fn poll(&mut self) -> Result<bool, CommandError> {
        self.0.polls.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }
    fn on_destroy(&mut self) -> Result<(), CommandError> {
        self.0.destroys.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn failed_create_still_destroys_once() {
    let calls = Arc::new(Calls::default());
    let mut s = Scheduler::new();
    let err = s
        .start(CommandAdapter::new(FailsToCreate(Arc::clone(&calls))))
        .unwrap_err();
    assert_eq!(err.as_label(), "command_failed");
    assert!(s.is_empty());
    s.run().unwrap();
    assert_eq!(Calls::get(&calls.polls), 0);
    assert_eq!(Calls::get(&calls.destroys), 1);
}
