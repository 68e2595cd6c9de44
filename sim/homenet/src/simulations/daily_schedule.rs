use crate::home::Home;
use rand::Rng;
use std::time::Duration;

/// The rooms people are in from a given hour on. Hours without an entry
/// leave everyone where they are.
pub fn movements(hour: u32) -> Option<&'static [&'static str]> {
    match hour {
        6 => Some(&["bedroom", "bathroom"]),
        7 => Some(&["kitchen"]),
        8 => Some(&["living-room"]),
        12 => Some(&["kitchen"]),
        18 => Some(&["kitchen", "living-room"]),
        22 => Some(&["bedroom"]),
        _ => None,
    }
}

/// Replays a day, one simulated `hour` per hour of the clock. At each
/// movement every room is emptied and one to three people go into each of
/// the listed rooms. Only rooms whose head count changed report it.
pub fn daily_schedule<R: Rng + ?Sized>(home: &mut Home, rng: &mut R, hour: Duration) {
    let rooms: Vec<String> = home
        .simulation()
        .home()
        .room_ids()
        .map(str::to_string)
        .collect();
    for clock in 0..24 {
        home.set_hour(clock);
        if let Some(occupied) = movements(clock) {
            tracing::info!(hour = clock, ?occupied, "people moving");
            for room in &rooms {
                let people = if occupied.contains(&room.as_str()) {
                    rng.gen_range(1..=3)
                } else {
                    0
                };
                home.set_occupancy(room, people);
            }
        }
        home.advance(hour);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homenet_core::{Category, HomeConfig, SimConfig, Simulation};
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn movements_table() {
        assert_eq!(movements(7), Some(&["kitchen"][..]));
        assert_eq!(movements(18).map(<[_]>::len), Some(2));
        assert_eq!(movements(3), None);
    }

    #[test]
    fn day_ends_with_the_bedroom_occupied() {
        let sim = Simulation::new(HomeConfig::default(), SimConfig::seeded(42));
        let mut home = Home::new(sim);
        let mut rng = SmallRng::seed_from_u64(42);
        daily_schedule(&mut home, &mut rng, Duration::from_secs(10));

        assert_eq!(home.simulation().now(), Duration::from_secs(240));
        assert!(home.occupancy("bedroom") >= 1);
        assert_eq!(home.occupancy("kitchen"), 0);
        assert_eq!(home.occupancy("living-room"), 0);
        assert_eq!(home.occupancy("bathroom"), 0);
        assert_eq!(home.simulation().sink().stats().active_connection_count, 0);

        // Bedroom and bathroom at 6, kitchen at 7, living room at 8, kitchen
        // at 12, kitchen and living room at 18, bedroom at 22, and each of
        // them emptied again: at least that many connections ran.
        assert!(home.simulation().sink().recorded(Category::App) >= 2 * 8);
    }
}
