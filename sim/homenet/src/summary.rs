//! The report printed when a run finishes.

use homenet_core::{Category, Simulation};
use std::fmt::{self, Display, Write};

/// Formats a byte count as B, KB or MB.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    }
}

/// Retained and recorded counts per category, the sink's totals and the
/// IoT protocol statistics of a simulation.
pub struct Summary<'a> {
    simulation: &'a Simulation,
}

impl<'a> Summary<'a> {
    pub fn new(simulation: &'a Simulation) -> Self {
        Self { simulation }
    }
}

impl Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sink = self.simulation.sink();
        let stats = sink.stats();
        writeln!(f, "Simulated time: {:.1} s", self.simulation.now().as_secs_f64())?;
        writeln!(f, "Events: {}", stats.total_events)?;
        writeln!(f, "Active connections: {}", stats.active_connection_count)?;
        writeln!(f, "Volume: {}", format_bytes(stats.byte_volume))?;
        writeln!(f, "Packet loss: {}%", stats.packet_loss)?;

        writeln!(f, "{:<14}{:>10}{:>10}", "category", "retained", "recorded")?;
        for category in Category::ALL {
            writeln!(
                f,
                "{:<14}{:>10}{:>10}",
                category.as_str(),
                sink.len(category),
                sink.recorded(category)
            )?;
        }

        let iot = self.simulation.iot_stats();
        let mut topics = String::new();
        for (topic, count) in &iot.mqtt.topics {
            if !topics.is_empty() {
                topics.push_str(", ");
            }
            write!(topics, "{topic}={count}")?;
        }
        writeln!(
            f,
            "MQTT: {} messages, {} subscriptions [{}]",
            iot.mqtt.messages,
            iot.mqtt.subscriptions.len(),
            topics
        )?;
        writeln!(
            f,
            "CoAP: {} requests, {} responses, {} observes",
            iot.coap.requests, iot.coap.responses, iot.coap.observes
        )?;
        writeln!(
            f,
            "ZigBee: {} devices, {} messages",
            iot.zigbee.devices, iot.zigbee.messages
        )?;
        write!(f, "Z-Wave: {} messages", iot.zwave.messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn byte_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn lists_every_category() {
        let mut sim = Simulation::default();
        sim.simulate_zigbee("kitchen", "power", json!({"watts": 40}));
        let text = Summary::new(&sim).to_string();
        assert!(text.contains("Events: 1"));
        assert!(text.contains("ZigBee: 0 devices, 1 messages"));
        for category in Category::ALL {
            assert!(text.contains(category.as_str()));
        }
    }
}
