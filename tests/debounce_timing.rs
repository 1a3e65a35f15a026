//! Debounced regeneration against a real generator and real timer threads.
//!
//! Timing margins are generous (hundreds of milliseconds against a 100 ms
//! ceiling) so these hold on a loaded CI machine.

use simple_qr::config::GeneratorConfig;
use simple_qr::debounce::{self, DebounceBounds, Debouncer, InlineDispatcher};
use simple_qr::events::Property;
use simple_qr::{Generator, GeneratorStatus};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

fn shared_generator() -> (Arc<Mutex<Generator>>, Arc<AtomicUsize>) {
    let mut generator = Generator::from_config(&GeneratorConfig::default());
    let generations = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&generations);
    generator.subscribe_to(Property::ResultUpdated, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (Arc::new(Mutex::new(generator)), generations)
}

fn regenerate(generator: &Arc<Mutex<Generator>>) -> impl FnOnce() + Send + 'static {
    let generator = Arc::clone(generator);
    move || {
        let mut generator = generator.lock().unwrap();
        generator.generate_code().unwrap();
    }
}

#[test]
fn typing_burst_generates_once_with_final_text() {
    let (generator, generations) = shared_generator();
    let debouncer = Debouncer::new(InlineDispatcher, DebounceBounds::default()).unwrap();

    for text in ["h", "he", "hel", "hell", "hello"] {
        let cost = {
            let mut g = generator.lock().unwrap();
            g.set_content(text);
            g.last_generation_cost()
        };
        debouncer.schedule(cost, regenerate(&generator));
    }
    thread::sleep(Duration::from_millis(400));

    assert_eq!(generations.load(Ordering::SeqCst), 1);
    let g = generator.lock().unwrap();
    assert_eq!(g.status(), GeneratorStatus::Valid);
    assert_eq!(g.content(), Some("hello"));
    assert!(g.last_generation_cost().is_some());
}

#[test]
fn ui_channel_runs_generation_on_ui_thread() {
    let (generator, generations) = shared_generator();
    let (dispatcher, receiver) = debounce::ui_channel();
    let debouncer = Debouncer::new(dispatcher, DebounceBounds::default()).unwrap();

    generator.lock().unwrap().set_content("from the ui");
    debouncer.schedule(None, regenerate(&generator));

    assert!(receiver.recv_timeout(Duration::from_secs(2)));
    assert_eq!(generations.load(Ordering::SeqCst), 1);
    assert!(generator.lock().unwrap().has_result());

    drop(receiver);
    drop(debouncer);
}

#[test]
fn edit_after_handoff_generates_once_with_latest_text() {
    let (generator, generations) = shared_generator();
    let (dispatcher, receiver) = debounce::ui_channel();
    let debouncer = Debouncer::new(dispatcher, DebounceBounds::default()).unwrap();

    generator.lock().unwrap().set_content("first");
    debouncer.schedule(None, regenerate(&generator));
    // first action is now parked on the ui channel
    thread::sleep(Duration::from_millis(150));
    generator.lock().unwrap().set_content("second");
    debouncer.schedule(None, regenerate(&generator));

    while debouncer.is_pending() {
        assert!(receiver.recv_timeout(Duration::from_secs(2)));
    }

    assert_eq!(generations.load(Ordering::SeqCst), 1);
    let g = generator.lock().unwrap();
    assert_eq!(g.content(), Some("second"));
    assert_eq!(g.status(), GeneratorStatus::Valid);
    drop(g);

    drop(receiver);
    drop(debouncer);
}

#[test]
fn schedule_delay_follows_last_generation_cost() {
    let debouncer = Debouncer::new(InlineDispatcher, DebounceBounds::default()).unwrap();
    assert_eq!(
        debouncer.schedule(Some(Duration::from_millis(42)), || {}),
        Duration::from_millis(42)
    );
    assert_eq!(
        debouncer.schedule(Some(Duration::from_secs(3)), || {}),
        Duration::from_millis(100)
    );
}
