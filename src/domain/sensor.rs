// Sensor catalog - The fixed set of channels the dashboard knows about
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sensor {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Sensor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, unit: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit: unit.map(str::to_string),
        }
    }
}

/// Ordered catalog; the order is the order sensors appear on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorCatalog {
    sensors: Vec<Sensor>,
}

impl SensorCatalog {
    /// Builds a catalog, keeping the first entry when an id is repeated.
    pub fn new(sensors: Vec<Sensor>) -> Self {
        let mut unique: Vec<Sensor> = Vec::with_capacity(sensors.len());
        for sensor in sensors {
            if unique.iter().any(|s| s.id == sensor.id) {
                tracing::warn!(sensor = %sensor.id, "Duplicate sensor id in catalog, ignoring");
                continue;
            }
            unique.push(sensor);
        }
        Self { sensors: unique }
    }

    pub fn get(&self, id: &str) -> Option<&Sensor> {
        self.sensors.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> Vec<String> {
        self.sensors.iter().map(|s| s.id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sensor> {
        self.sensors.iter()
    }
}

impl Default for SensorCatalog {
    fn default() -> Self {
        Self::new(vec![
            Sensor::new("pressure", "Pressure", Some("bar")),
            Sensor::new("temperature", "Temperature", Some("°C")),
            Sensor::new("humidity", "Humidity", Some("%")),
            Sensor::new("env_pressure", "Ambient Pressure", Some("hPa")),
        ])
    }
}
