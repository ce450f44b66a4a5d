use rand::prelude::IndexedRandom;
use std::time::Duration;

/// Short randomized pause after a navigation, before reading the page.
pub fn pause_briefly() {
    let delays = [1000, 1500, 2000];
    let delay = delays.choose(&mut rand::rng()).unwrap();
    std::thread::sleep(Duration::from_millis(*delay));
}

/// Cooperative inter-candidate pause with a little jitter on top, to bound
/// the request rate against the site.
pub fn pause_between_applications(base: Duration) {
    let jitter = [0, 250, 500, 750];
    let extra = jitter.choose(&mut rand::rng()).unwrap();
    std::thread::sleep(base + Duration::from_millis(*extra));
}
