//! Simulates a small request pipeline and prints the aggregate afterwards.
//!
//! Run with `cargo run --example request_pipeline -p op_journey`.

use std::thread;
use std::time::Duration;

use op_journey::{JourneySlot, Stage, Tracking};

fn main() {
    // In a real host this is constructed once at process startup, typically
    // via `Tracking::from_env()`.
    let tracking = Tracking::enabled();

    for request in 0..5_u64 {
        handle_request(&tracking, request);
    }

    let observer = tracking.observer().expect("tracking is enabled");
    println!("{}", observer.to_json());
}

fn handle_request(tracking: &Tracking, request: u64) {
    // In a real host the slot lives inside the per-request object.
    let slot = JourneySlot::new();
    slot.enable(tracking);

    {
        let _auth = slot.scoped(Stage::CheckAuthorization);
        thread::sleep(Duration::from_millis(1));
    }

    {
        let _lock = slot.scoped(Stage::AcquireDbLock);
        thread::sleep(Duration::from_millis(request % 3));
    }

    // The actual work of the request.
    thread::sleep(Duration::from_millis(2));

    {
        let _egress = slot.scoped(Stage::Egress);
        thread::sleep(Duration::from_millis(1));
    }

    // The slot drops here: the journey finalizes and reports itself.
}
