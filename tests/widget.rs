use bubbletea_lapwatch::prelude::*;
use bubbletea_rs::{KeyMsg, Model as BubbleTeaModel};
use crossterm::event::{KeyCode, KeyModifiers};
use lipgloss_extras::lipgloss;

fn key(code: KeyCode) -> KeyMsg {
    KeyMsg {
        key: code,
        modifiers: KeyModifiers::NONE,
    }
}

fn press(w: &mut TimerWidget, code: KeyCode) -> bool {
    w.update(Box::new(key(code))).is_some()
}

fn type_text(w: &mut TimerWidget, text: &str) {
    for c in text.chars() {
        press(w, KeyCode::Char(c));
    }
}

fn tick(w: &mut TimerWidget) -> bool {
    let msg = w.countdown().next_tick().expect("countdown is running");
    w.update(Box::new(msg)).is_some()
}

// Fills in both settings fields from the keyboard and leaves them.
fn configure(w: &mut TimerWidget, initial: &str, step: &str) {
    press(w, KeyCode::Tab);
    type_text(w, initial);
    press(w, KeyCode::Tab);
    press(w, KeyCode::End);
    for _ in 0..w.step_field().value().len() {
        press(w, KeyCode::Backspace);
    }
    type_text(w, step);
    press(w, KeyCode::Esc);
}

#[test]
fn ten_second_run_pause_lap_reset() {
    let mut w = TimerWidget::new();
    configure(&mut w, "10", "1");
    assert_eq!(w.countdown().initial_time(), 10);
    assert_eq!(w.countdown().step(), 1);

    assert!(press(&mut w, KeyCode::Char('s')));
    for _ in 0..3 {
        assert!(tick(&mut w));
    }
    assert_eq!(w.countdown().remaining(), 7);
    assert_eq!(w.countdown().percent(), 30.0);
    assert_eq!(w.ring.percent(), 0.3);

    press(&mut w, KeyCode::Char('p'));
    assert!(!w.countdown().running());
    assert_eq!(w.countdown().remaining(), 7);

    press(&mut w, KeyCode::Char('l'));
    assert_eq!(
        w.countdown().laps(),
        &[Lap {
            index: 1,
            since_lap: 3,
            overall: 3
        }]
    );

    press(&mut w, KeyCode::Char('r'));
    assert_eq!(w.countdown().remaining(), 10);
    assert!(w.countdown().laps().is_empty());
    assert_eq!(w.ring.percent(), 0.0);
}

#[test]
fn five_seconds_in_steps_of_two_clamps_at_zero() {
    let mut w = TimerWidget::new();
    configure(&mut w, "5", "2");

    press(&mut w, KeyCode::Char(' '));
    assert!(w.countdown().running());

    tick(&mut w);
    assert_eq!(w.countdown().remaining(), 3);
    tick(&mut w);
    assert_eq!(w.countdown().remaining(), 1);

    // The final tick hands back the completion notice instead of another tick.
    assert!(tick(&mut w));
    assert_eq!(w.countdown().remaining(), 0);
    assert!(!w.countdown().running());
    assert!(w.countdown().next_tick().is_none());

    let id = w.countdown().id();
    w.update(Box::new(CompleteMsg { id }));
    assert!(w.finished());
    assert!(lipgloss::strip_ansi(&w.view()).contains("Time's up!"));

    // Nothing left to count.
    assert!(!press(&mut w, KeyCode::Char('s')));
}

#[test]
fn tick_from_an_earlier_run_is_ignored() {
    let mut w = TimerWidget::new().with_initial_time(20);
    w.start();
    let stale = w.countdown().next_tick().expect("running");
    w.pause();
    w.start();

    assert!(w.update(Box::new(stale)).is_none());
    assert_eq!(w.countdown().remaining(), 20);

    tick(&mut w);
    assert_eq!(w.countdown().remaining(), 19);
}

#[test]
fn ticks_for_another_widget_are_ignored() {
    let mut a = TimerWidget::new().with_initial_time(10);
    let mut b = TimerWidget::new().with_initial_time(10);
    a.start();
    b.start();

    let for_b = b.countdown().next_tick().expect("running");
    assert!(a.update(Box::new(for_b)).is_none());
    assert_eq!(a.countdown().remaining(), 10);
}

#[test]
fn invalid_text_keeps_last_valid_setting() {
    let mut w = TimerWidget::new().with_initial_time(42);
    w.focus_field(Focus::InitialTime);
    press(&mut w, KeyCode::Backspace);
    press(&mut w, KeyCode::Backspace);

    assert_eq!(w.initial_field().err(), Some(&InputError::Empty));
    assert_eq!(w.countdown().initial_time(), 4);
    assert_eq!(w.countdown().remaining(), 4);
}

#[test]
fn settings_are_frozen_while_running() {
    let mut w = TimerWidget::new().with_initial_time(30);
    w.start();
    assert_eq!(w.set_step(5), Err(InputError::Running));
    assert_eq!(w.set_initial_time(5), Err(InputError::Running));

    w.focus_field(Focus::Step);
    type_text(&mut w, "7");
    assert_eq!(w.step_field().value(), "1");
    assert_eq!(w.countdown().step(), 1);
}

#[test]
fn help_reflects_run_state() {
    let mut w = TimerWidget::new().with_initial_time(30);
    let stopped = lipgloss::strip_ansi(&w.view());
    assert!(stopped.contains("s start"));
    assert!(!stopped.contains("p pause"));

    w.start();
    let running = lipgloss::strip_ansi(&w.view());
    assert!(!running.contains("s start"));
    assert!(running.contains("p pause"));

    press(&mut w, KeyCode::Char('?'));
    assert!(w.help.show_all);
    assert!(lipgloss::strip_ansi(&w.view()).contains("space start/pause"));
}

#[test]
fn laps_are_listed_with_splits() {
    let mut w = TimerWidget::new().with_initial_time(100);
    w.start();
    tick(&mut w);
    tick(&mut w);
    assert!(press(&mut w, KeyCode::Char('l')));
    tick(&mut w);
    assert!(press(&mut w, KeyCode::Char('l')));

    let view = lipgloss::strip_ansi(&w.view());
    assert!(view.contains("Lap 1: 00 : 00 : 02 (+00 : 00 : 02)"));
    assert!(view.contains("Lap 2: 00 : 00 : 03 (+00 : 00 : 01)"));
}

#[test]
fn init_builds_a_stopped_widget() {
    let (w, cmd) = <TimerWidget as BubbleTeaModel>::init();
    assert!(cmd.is_none());
    assert_eq!(w.countdown().state(), State::Stopped);
    assert_eq!(w.countdown().view(), "00 : 00 : 00");
}

#[test]
fn ctrl_c_quits() {
    let mut w = TimerWidget::new();
    let cmd = w.update(Box::new(KeyMsg {
        key: KeyCode::Char('c'),
        modifiers: KeyModifiers::CONTROL,
    }));
    assert!(cmd.is_some());
}

#[derive(Debug, PartialEq)]
enum Delivered {
    Tick,
    Complete,
}

#[tokio::test]
async fn scheduled_commands_tick_every_step_then_complete() {
    use std::time::{Duration, Instant};

    let mut w = TimerWidget::new().with_initial_time(2);
    let mut cmd = w.start();
    let mut delivered = Vec::new();

    while let Some(next) = cmd.take() {
        let sent = Instant::now();
        let msg = next.await.expect("every command yields a message");
        let waited = sent.elapsed();

        if let Some(tick) = msg.downcast_ref::<TickMsg>() {
            assert_eq!(Some(tick), w.countdown().next_tick().as_ref());
            assert!(waited >= Duration::from_millis(950), "tick came after {waited:?}");
            delivered.push(Delivered::Tick);
        } else if let Some(done) = msg.downcast_ref::<CompleteMsg>() {
            assert_eq!(done.id, w.countdown().id());
            assert!(waited < Duration::from_millis(500), "completion came after {waited:?}");
            delivered.push(Delivered::Complete);
        }
        cmd = w.update(msg);
    }

    assert_eq!(
        delivered,
        vec![Delivered::Tick, Delivered::Tick, Delivered::Complete]
    );
    assert_eq!(w.countdown().remaining(), 0);
    assert!(!w.countdown().running());
    assert!(w.finished());
}
