//! MIDI input ports as keytone devices, backed by midir.

use keytone_midi::{DeviceError, DeviceId, MidiDevice, NoteSink};
use midir::{MidiInput, MidiInputConnection};

const CLIENT_NAME: &str = "keytone";

/// Names of every MIDI input port currently visible.
pub fn list_ports() -> anyhow::Result<Vec<String>> {
    let midi_in = MidiInput::new(CLIENT_NAME)?;
    Ok(midi_in
        .ports()
        .iter()
        .filter_map(|port| midi_in.port_name(port).ok())
        .collect())
}

/// One device per input port whose name contains `filter` (case-insensitive).
pub fn matching_ports(filter: Option<&str>) -> anyhow::Result<Vec<MidiPortDevice>> {
    Ok(select_ports(list_ports()?, filter))
}

fn select_ports(names: Vec<String>, filter: Option<&str>) -> Vec<MidiPortDevice> {
    let filter = filter.map(str::to_lowercase);
    names
        .into_iter()
        .filter(|name| {
            filter
                .as_deref()
                .is_none_or(|f| name.to_lowercase().contains(f))
        })
        .enumerate()
        .map(|(index, name)| MidiPortDevice::new(DeviceId(index as u32), name))
        .collect()
}

/// A MIDI input port. Connecting opens the port and forwards every incoming
/// message to the router as raw bytes.
pub struct MidiPortDevice {
    id: DeviceId,
    name: String,
    connection: Option<MidiInputConnection<()>>,
}

impl MidiPortDevice {
    pub fn new(id: DeviceId, name: String) -> Self {
        Self {
            id,
            name,
            connection: None,
        }
    }
}

impl MidiDevice for MidiPortDevice {
    fn id(&self) -> DeviceId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn connect(&mut self, sink: NoteSink) -> Result<(), DeviceError> {
        let midi_in = MidiInput::new(CLIENT_NAME).map_err(|e| DeviceError::Connect {
            device: self.name.clone(),
            source: Box::new(e),
        })?;
        let port = midi_in
            .ports()
            .into_iter()
            .find(|p| midi_in.port_name(p).ok().as_deref() == Some(self.name.as_str()))
            .ok_or_else(|| DeviceError::NotFound(self.name.clone()))?;

        let connection = midi_in
            .connect(
                &port,
                "keytone-input",
                move |_timestamp_us, data, _| {
                    sink.midi_bytes(data);
                },
                (),
            )
            .map_err(|e| DeviceError::Connect {
                device: self.name.clone(),
                source: e.to_string().into(),
            })?;

        self.connection = Some(connection);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), DeviceError> {
        if let Some(connection) = self.connection.take() {
            connection.close();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        ["Midi Through Port-0", "Keystation 88 MIDI 1", "Launchkey Mini"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn no_filter_selects_all_ports() {
        let ports = select_ports(names(), None);
        assert_eq!(ports.len(), 3);
        assert_eq!(ports[2].id(), DeviceId(2));
        assert_eq!(ports[2].name(), "Launchkey Mini");
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let ports = select_ports(names(), Some("keystation"));
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].name(), "Keystation 88 MIDI 1");
        assert_eq!(ports[0].id(), DeviceId(0));
        assert!(select_ports(names(), Some("nothing")).is_empty());
    }

    #[test]
    fn disconnect_without_connection_is_ok() {
        let mut port = MidiPortDevice::new(DeviceId(7), "Test".to_string());
        assert!(port.disconnect().is_ok());
    }
}
