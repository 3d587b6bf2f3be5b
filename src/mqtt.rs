//! MQTT client for receiving scripts
//!
//! Connects to an MQTT broker and subscribes to a topic. Each message is a
//! script for the text animation, either plain text or JSON:
//!
//! ```json
//! {"script": "#countdown 10|Happy New Year", "replace": true}
//! ```

use crate::effects::text::{parse_script, Script};
use crate::error::FxError;
use rumqttc::{Client, Event, MqttOptions, Packet, QoS};
use serde::Deserialize;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 1883;
const DEFAULT_TOPIC: &str = "sparkmorph/script";
const CLIENT_ID: &str = "sparkmorph";

/// JSON format for incoming messages (optional)
#[derive(Debug, Deserialize)]
struct JsonMessage {
    script: String,
    /// Drop whatever is still pending instead of queueing behind it
    #[serde(default)]
    replace: bool,
}

/// Decode a payload into a script. Blank payloads are ignored.
pub fn parse_payload(payload: &[u8]) -> Option<Script> {
    let text = String::from_utf8_lossy(payload);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    // Try JSON first, fall back to plain text
    match serde_json::from_str::<JsonMessage>(text) {
        Ok(JsonMessage { script, replace: true }) => Some(Script::Commands(parse_script(&script))),
        Ok(JsonMessage { script, .. }) => Some(Script::Text(script)),
        Err(_) => Some(Script::Text(text.to_string())),
    }
}

/// MQTT client that receives messages in a background thread
pub struct MqttClient {
    receiver: Receiver<Script>,
    _thread: thread::JoinHandle<()>,
}

impl MqttClient {
    /// Connect and subscribe. Empty host or topic use the defaults.
    /// Fails immediately if the broker cannot be reached.
    pub fn new(host: &str, topic: &str) -> Result<Self, FxError> {
        let host = if host.is_empty() { DEFAULT_HOST } else { host };
        let topic = if topic.is_empty() { DEFAULT_TOPIC } else { topic };

        let mut options = MqttOptions::new(CLIENT_ID, host, DEFAULT_PORT);
        options.set_keep_alive(Duration::from_secs(30));

        let (client, mut connection) = Client::new(options, 10);

        client
            .subscribe(topic, QoS::AtMostOnce)
            .map_err(|e| FxError::Mqtt(format!("subscribe to '{}' failed: {}", topic, e)))?;

        // Poll once so an unreachable broker fails here
        match connection.iter().next() {
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                return Err(FxError::Mqtt(format!(
                    "cannot connect to {}:{}: {}",
                    host, DEFAULT_PORT, e
                )));
            }
            None => {
                return Err(FxError::Mqtt(format!(
                    "cannot connect to {}:{}: connection closed",
                    host, DEFAULT_PORT
                )));
            }
        }

        let (sender, receiver) = mpsc::channel();
        let topic_owned = topic.to_string();

        let handle = thread::spawn(move || {
            Self::message_loop(connection, sender, &topic_owned);
        });

        log::info!("mqtt connected to {}:{}, subscribed to '{}'", host, DEFAULT_PORT, topic);

        Ok(Self {
            receiver,
            _thread: handle,
        })
    }

    fn message_loop(mut connection: rumqttc::Connection, sender: Sender<Script>, topic: &str) {
        for event in connection.iter() {
            match event {
                Ok(Event::Incoming(Packet::Publish(publish))) if publish.topic == topic => {
                    let Some(script) = parse_payload(&publish.payload) else {
                        continue;
                    };
                    log::debug!("mqtt script: {:?}", script);
                    if sender.send(script).is_err() {
                        // Main thread gone
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    // rumqttc reconnects on the next poll
                    log::warn!("mqtt: {}", e);
                    thread::sleep(Duration::from_secs(1));
                }
            }
        }
    }

    /// Scripts received since the last poll, oldest first (non-blocking)
    pub fn poll(&self) -> Vec<Script> {
        self.receiver.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::text::Command;

    #[test]
    fn test_plain_payload_appends() {
        assert_eq!(
            parse_payload(b"  Hello|World \n"),
            Some(Script::Text("Hello|World".into()))
        );
    }

    #[test]
    fn test_json_payload() {
        assert_eq!(
            parse_payload(br#"{"script": "Hi"}"#),
            Some(Script::Text("Hi".into()))
        );
        assert_eq!(
            parse_payload(br##"{"script": "#countdown 2|Go", "replace": true}"##),
            Some(Script::Commands(vec![Command::Countdown(2), Command::Text("Go".into())]))
        );
    }

    #[test]
    fn test_blank_payload_ignored() {
        assert_eq!(parse_payload(b"   "), None);
    }

    #[test]
    fn test_json_without_script_is_plain_text() {
        assert_eq!(
            parse_payload(br#"{"text": "x"}"#),
            Some(Script::Text(r#"{"text": "x"}"#.into()))
        );
    }
}
