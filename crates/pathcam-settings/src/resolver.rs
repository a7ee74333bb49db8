//! Layered configuration resolution
//!
//! A configuration file has one `[document]` section and zero or more
//! sparse `[layer-N]` sections (1-indexed). The document section is
//! applied onto the built-in defaults; each layer resolves by applying
//! its overrides onto the resolved document value, field by field.
//! Unknown field names are fatal. Resolution is pure and idempotent:
//! the same inputs always yield identical configurations.
//!
//! Field keys accept both dash and underscore spellings (`work-speed`
//! and `work_speed` name the same field).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use toml::value::Table;
use toml::Value;

use pathcam_core::error::{ConfigError, Error, ParseError, Result};
use pathcam_core::units::{Dimension, Quantity};

use crate::config::LayerConfig;

/// Parsed configuration file: document defaults plus sparse per-layer
/// override tables
#[derive(Debug, Clone)]
pub struct RenderSettings {
    document: LayerConfig,
    layers: BTreeMap<usize, Table>,
}

impl RenderSettings {
    /// Create settings with no file: built-in defaults, no overrides
    pub fn new() -> Self {
        Self {
            document: LayerConfig::default(),
            layers: BTreeMap::new(),
        }
    }

    /// Create settings from an already-resolved document configuration
    pub fn from_document(document: LayerConfig) -> Self {
        Self {
            document,
            layers: BTreeMap::new(),
        }
    }

    /// Parse settings from TOML text
    ///
    /// Every section and field is validated here, before any command
    /// is emitted; a malformed file never produces a partial stream.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let root: Table = toml::from_str(text)
            .map_err(|e| Error::other(format!("Invalid TOML config: {}", e)))?;

        let mut document = LayerConfig::default();
        if let Some(value) = root.get("document") {
            let table = expect_table(value, "document")?;
            document = apply_table(&document, "document", table, true)?;
        }

        let mut layers = BTreeMap::new();
        for (key, value) in &root {
            if key == "document" {
                continue;
            }
            match layer_index(key) {
                Some(index) => {
                    let table = expect_table(value, key)?;
                    layers.insert(index, table.clone());
                }
                None => {
                    return Err(ConfigError::UnknownField {
                        section: "config".to_string(),
                        field: key.clone(),
                    }
                    .into())
                }
            }
        }

        let settings = Self { document, layers };

        for (&index, table) in &settings.layers {
            settings.apply_layer(index, table)?;
        }

        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// The fully-defaulted document configuration
    pub fn document(&self) -> &LayerConfig {
        &self.document
    }

    /// Number of layers carrying overrides
    pub fn override_count(&self) -> usize {
        self.layers.len()
    }

    /// Resolve the complete configuration for one layer (1-indexed)
    ///
    /// Per field: the layer override wins if present, otherwise the
    /// document value is copied.
    pub fn resolve_layer(&self, index: usize) -> Result<LayerConfig> {
        match self.layers.get(&index) {
            Some(table) => self.apply_layer(index, table),
            None => Ok(self.document.clone()),
        }
    }

    /// Resolve configurations for layers 1..=count in order
    pub fn resolve_layers(&self, count: usize) -> Result<Vec<LayerConfig>> {
        (1..=count).map(|index| self.resolve_layer(index)).collect()
    }

    fn apply_layer(&self, index: usize, table: &Table) -> Result<LayerConfig> {
        let section = format!("layer-{}", index);
        apply_table(&self.document, &section, table, false)
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::new()
    }
}

fn layer_index(key: &str) -> Option<usize> {
    key.strip_prefix("layer-")
        .and_then(|suffix| suffix.parse().ok())
        .filter(|&index| index >= 1)
}

fn expect_table<'a>(value: &'a Value, section: &str) -> Result<&'a Table> {
    value.as_table().ok_or_else(|| {
        Error::other(format!("Section [{}] must be a table", section))
    })
}

fn apply_table(
    base: &LayerConfig,
    section: &str,
    table: &Table,
    is_document: bool,
) -> Result<LayerConfig> {
    let mut config = base.clone();

    // Canonical units first, so every quantity in the table converts
    // against the units this table selects
    let is_units_key = |key: &str| {
        let field = key.replace('-', "_");
        field == "length_units" || field == "time_units"
    };

    for (key, value) in table.iter().filter(|(key, _)| is_units_key(key)) {
        apply_field(&mut config, section, key, value, is_document)?;
    }
    for (key, value) in table.iter().filter(|(key, _)| !is_units_key(key)) {
        apply_field(&mut config, section, key, value, is_document)?;
    }

    Ok(config)
}

fn apply_field(
    config: &mut LayerConfig,
    section: &str,
    key: &str,
    value: &Value,
    is_document: bool,
) -> Result<()> {
    let field = key.replace('-', "_");
    let field = field.as_str();

    match field {
        "length_units" | "time_units" if !is_document => {
            return Err(invalid(
                section,
                field,
                "only allowed in the [document] section",
            ));
        }
        "length_units" => config.length_units = enum_field(value, section, field)?,
        "time_units" => config.time_units = enum_field(value, section, field)?,

        "tool_type" => config.tool_type = enum_field(value, section, field)?,
        "rack_type" => config.rack_type = enum_field(value, section, field)?,
        "spin_mode" => config.spin_mode = enum_field(value, section, field)?,
        "tool_number" => {
            let number = integer_field(value, section, field)?;
            if number < 1 || number > u32::MAX as i64 {
                return Err(invalid(section, field, "must be >= 1"));
            }
            config.tool_number = number as u32;
        }

        "work_speed" => config.work_speed = positive_length(config, value, section, field)?,
        "plunge_speed" => config.plunge_speed = positive_length(config, value, section, field)?,
        "travel_speed" => config.travel_speed = positive_length(config, value, section, field)?,
        "retract_speed" => config.retract_speed = positive_length(config, value, section, field)?,

        "power_level" => {
            let level = float_field(value, section, field)?;
            check_range(section, field, level, 0.0, 100.0)?;
            config.power_level = level;
        }
        "spindle_rpm" => {
            let rpm = float_field(value, section, field)?;
            if rpm < 0.0 {
                return Err(invalid(section, field, "must be >= 0"));
            }
            config.spindle_rpm = rpm;
        }
        "warmup_delay" => {
            let delay = time_field(config, value, section, field)?;
            if delay < 0.0 {
                return Err(invalid(section, field, "must be >= 0"));
            }
            config.warmup_delay = delay;
        }

        "fan_type" => config.fan_type = enum_field(value, section, field)?,
        "fan_speed" => {
            let speed = integer_field(value, section, field)?;
            check_range(section, field, speed as f64, 0.0, 255.0)?;
            config.fan_speed = speed as u8;
        }
        "coolant_type" => config.coolant_type = enum_field(value, section, field)?,
        "bed_type" => config.bed_type = enum_field(value, section, field)?,
        "bed_temperature" => {
            config.bed_temperature = temperature_field(value, section, field)?;
        }
        "hotend_temperature" => {
            config.hotend_temperature = temperature_field(value, section, field)?;
        }

        "work_z" => config.work_z = length_field(config, value, section, field)?,
        "plunge_z" => config.plunge_z = length_field(config, value, section, field)?,
        "safe_z" => config.safe_z = length_field(config, value, section, field)?,
        "park_z" => config.park_z = length_field(config, value, section, field)?,

        "resolution" => config.resolution = positive_length(config, value, section, field)?,

        "retract_length" => {
            let length = length_field(config, value, section, field)?;
            if length < 0.0 {
                return Err(invalid(section, field, "must be >= 0"));
            }
            config.retract_length = length;
        }
        "filament_diameter" => {
            config.filament_diameter = positive_length(config, value, section, field)?;
        }
        "nozzle_diameter" => {
            config.nozzle_diameter = positive_length(config, value, section, field)?;
        }
        "layer_height" => {
            config.layer_height = positive_length(config, value, section, field)?;
        }
        "extrusion_multiplier" => {
            let multiplier = float_field(value, section, field)?;
            if multiplier <= 0.0 {
                return Err(invalid(section, field, "must be > 0"));
            }
            config.extrusion_multiplier = multiplier;
        }

        "height_map_path" => {
            config.height_map_path = Some(PathBuf::from(string_field(value, section, field)?));
        }
        "height_map_scale" => {
            let scale = float_field(value, section, field)?;
            if scale < 0.0 {
                return Err(invalid(section, field, "must be >= 0"));
            }
            config.height_map_scale = scale;
        }
        "height_map_tolerance" => {
            let tolerance = float_field(value, section, field)?;
            if tolerance < 0.0 {
                return Err(invalid(section, field, "must be >= 0"));
            }
            config.height_map_tolerance = tolerance;
        }

        _ => {
            return Err(ConfigError::UnknownField {
                section: section.to_string(),
                field: field.to_string(),
            }
            .into())
        }
    }

    Ok(())
}

fn invalid(section: &str, field: &str, reason: &str) -> Error {
    ConfigError::InvalidValue {
        section: section.to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

fn check_range(section: &str, field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            section: section.to_string(),
            field: field.to_string(),
            value,
            min,
            max,
        }
        .into());
    }
    Ok(())
}

fn quantity_field(
    value: &Value,
    section: &str,
    field: &str,
    dimension: Dimension,
) -> Result<Quantity> {
    let wrap = |source: ParseError| -> Error {
        ConfigError::Parse {
            section: section.to_string(),
            field: field.to_string(),
            source,
        }
        .into()
    };

    match value {
        Value::String(text) => Quantity::parse(text, dimension).map_err(wrap),
        Value::Integer(n) => Ok(Quantity::bare(*n as f64)),
        Value::Float(x) => {
            if !x.is_finite() {
                return Err(wrap(ParseError::NotFinite {
                    value: x.to_string(),
                }));
            }
            Ok(Quantity::bare(*x))
        }
        other => Err(invalid(
            section,
            field,
            &format!("expected a number or string, got {}", other.type_str()),
        )),
    }
}

fn length_field(config: &LayerConfig, value: &Value, section: &str, field: &str) -> Result<f64> {
    quantity_field(value, section, field, Dimension::Length)
        .map(|q| q.to_length(config.length_units))
}

fn positive_length(
    config: &LayerConfig,
    value: &Value,
    section: &str,
    field: &str,
) -> Result<f64> {
    let length = length_field(config, value, section, field)?;
    if length <= 0.0 {
        return Err(invalid(section, field, "must be > 0"));
    }
    Ok(length)
}

fn time_field(config: &LayerConfig, value: &Value, section: &str, field: &str) -> Result<f64> {
    quantity_field(value, section, field, Dimension::Time).map(|q| q.to_time(config.time_units))
}

fn temperature_field(value: &Value, section: &str, field: &str) -> Result<f64> {
    quantity_field(value, section, field, Dimension::Temperature).map(|q| q.to_celsius())
}

fn float_field(value: &Value, section: &str, field: &str) -> Result<f64> {
    quantity_field(value, section, field, Dimension::Dimensionless).map(|q| q.magnitude)
}

fn integer_field(value: &Value, section: &str, field: &str) -> Result<i64> {
    match value {
        Value::Integer(n) => Ok(*n),
        Value::String(text) => text.trim().parse().map_err(|_| {
            invalid(section, field, &format!("expected an integer, got `{}`", text))
        }),
        other => Err(invalid(
            section,
            field,
            &format!("expected an integer, got {}", other.type_str()),
        )),
    }
}

fn string_field(value: &Value, section: &str, field: &str) -> Result<String> {
    value.as_str().map(str::to_string).ok_or_else(|| {
        invalid(
            section,
            field,
            &format!("expected a string, got {}", value.type_str()),
        )
    })
}

fn enum_field<T>(value: &Value, section: &str, field: &str) -> Result<T>
where
    T: FromStr<Err = String>,
{
    let text = string_field(value, section, field)?;
    text.parse().map_err(|reason: String| {
        ConfigError::InvalidValue {
            section: section.to_string(),
            field: field.to_string(),
            reason,
        }
        .into()
    })
}
