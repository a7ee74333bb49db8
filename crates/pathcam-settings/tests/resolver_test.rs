use pathcam_core::error::{ConfigError, Error};
use pathcam_core::machine::{CoolantMode, RackType, ToolType};
use pathcam_core::units::LengthUnits;
use pathcam_settings::{FanMode, LayerConfig, RenderSettings};

#[test]
fn test_layer_override_wins_over_document_default() {
    let settings = RenderSettings::from_toml_str(
        r#"
        [document]
        work_speed = "500.0mm"

        [layer-1]
        work_speed = "250.0mm"
        "#,
    )
    .unwrap();

    let layer1 = settings.resolve_layer(1).unwrap();
    let layer2 = settings.resolve_layer(2).unwrap();

    assert_eq!(layer1.work_speed, 250.0);
    assert_eq!(layer2.work_speed, 500.0);
}

#[test]
fn test_unset_fields_fall_back_to_built_in_defaults() {
    let settings = RenderSettings::from_toml_str(
        r#"
        [layer-3]
        tool_type = "spindle"
        "#,
    )
    .unwrap();

    let defaults = LayerConfig::default();
    let layer3 = settings.resolve_layer(3).unwrap();

    assert_eq!(layer3.tool_type, ToolType::Spindle);
    assert_eq!(layer3.work_speed, defaults.work_speed);
    assert_eq!(layer3.safe_z, defaults.safe_z);
    assert_eq!(layer3.coolant_type, defaults.coolant_type);
}

#[test]
fn test_resolution_is_idempotent() {
    let settings = RenderSettings::from_toml_str(
        r#"
        [document]
        tool_type = "beam"
        power_level = 80
        travel_speed = "3000mm"

        [layer-2]
        power_level = 40
        coolant_type = "mist"
        "#,
    )
    .unwrap();

    let first = settings.resolve_layers(3).unwrap();
    let second = settings.resolve_layers(3).unwrap();
    assert_eq!(first, second);

    assert_eq!(first[1].power_level, 40.0);
    assert_eq!(first[1].coolant_type, CoolantMode::Mist);
    assert_eq!(first[0].power_level, 80.0);
    assert_eq!(first[2].power_level, 80.0);
}

#[test]
fn test_unknown_field_is_fatal() {
    let result = RenderSettings::from_toml_str(
        r#"
        [document]
        work_sped = "500.0mm"
        "#,
    );

    match result {
        Err(Error::Config(ConfigError::UnknownField { section, field })) => {
            assert_eq!(section, "document");
            assert_eq!(field, "work_sped");
        }
        other => panic!("expected UnknownField, got {:?}", other),
    }
}

#[test]
fn test_unknown_field_in_layer_is_fatal_at_load() {
    let result = RenderSettings::from_toml_str(
        r#"
        [layer-2]
        laser_wavelength = 455
        "#,
    );

    match result {
        Err(Error::Config(ConfigError::UnknownField { section, field })) => {
            assert_eq!(section, "layer-2");
            assert_eq!(field, "laser_wavelength");
        }
        other => panic!("expected UnknownField, got {:?}", other),
    }
}

#[test]
fn test_unknown_top_level_section_is_fatal() {
    let result = RenderSettings::from_toml_str(
        r#"
        [machine]
        name = "plotter"
        "#,
    );
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::UnknownField { .. }))
    ));
}

#[test]
fn test_dash_and_underscore_keys_are_equivalent() {
    let dashed = RenderSettings::from_toml_str(
        r#"
        [document]
        work-speed = "250.0mm"
        tool-type = "beam"
        "#,
    )
    .unwrap();

    let underscored = RenderSettings::from_toml_str(
        r#"
        [document]
        work_speed = "250.0mm"
        tool_type = "beam"
        "#,
    )
    .unwrap();

    assert_eq!(dashed.document(), underscored.document());
}

#[test]
fn test_fan_speed_range_is_validated() {
    let result = RenderSettings::from_toml_str(
        r#"
        [document]
        fan_speed = 300
        "#,
    );

    match result {
        Err(Error::Config(ConfigError::OutOfRange {
            field, value, max, ..
        })) => {
            assert_eq!(field, "fan_speed");
            assert_eq!(value, 300.0);
            assert_eq!(max, 255.0);
        }
        other => panic!("expected OutOfRange, got {:?}", other),
    }
}

#[test]
fn test_power_level_range_is_validated() {
    let result = RenderSettings::from_toml_str(
        r#"
        [layer-1]
        power_level = 150
        "#,
    );
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::OutOfRange { .. }))
    ));
}

#[test]
fn test_invalid_enum_value_reports_field() {
    let result = RenderSettings::from_toml_str(
        r#"
        [document]
        rack_type = "teleport"
        "#,
    );

    match result {
        Err(Error::Config(ConfigError::InvalidValue { field, .. })) => {
            assert_eq!(field, "rack_type");
        }
        other => panic!("expected InvalidValue, got {:?}", other),
    }
}

#[test]
fn test_malformed_quantity_reports_parse_error() {
    let result = RenderSettings::from_toml_str(
        r#"
        [document]
        work_speed = "fastmm"
        "#,
    );
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::Parse { .. }))
    ));

    let result = RenderSettings::from_toml_str(
        r#"
        [document]
        safe_z = "10kg"
        "#,
    );
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::Parse { .. }))
    ));
}

#[test]
fn test_units_are_document_only() {
    let result = RenderSettings::from_toml_str(
        r#"
        [layer-1]
        length_units = "in"
        "#,
    );
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidValue { .. }))
    ));
}

#[test]
fn test_suffixed_values_convert_to_document_units() {
    let settings = RenderSettings::from_toml_str(
        r#"
        [document]
        length_units = "mm"
        safe_z = "1in"
        work_speed = "2in"
        "#,
    )
    .unwrap();

    assert_eq!(settings.document().safe_z, 25.4);
    assert_eq!(settings.document().work_speed, 50.8);
}

#[test]
fn test_bare_numbers_are_canonical_units() {
    let settings = RenderSettings::from_toml_str(
        r#"
        [document]
        length_units = "in"
        safe_z = 2.0
        work_z = "25.4mm"
        "#,
    )
    .unwrap();

    assert_eq!(settings.document().length_units, LengthUnits::Inches);
    assert_eq!(settings.document().safe_z, 2.0);
    assert_eq!(settings.document().work_z, 1.0);
}

#[test]
fn test_temperature_suffixes() {
    let settings = RenderSettings::from_toml_str(
        r#"
        [document]
        bed_type = "heated"
        bed_temperature = "333.15K"
        hotend_temperature = "210C"
        "#,
    )
    .unwrap();

    assert!((settings.document().bed_temperature - 60.0).abs() < 1e-9);
    assert_eq!(settings.document().hotend_temperature, 210.0);
}

#[test]
fn test_scenario_a_speed_precedence() {
    let settings = RenderSettings::from_toml_str(
        r#"
        [document]
        work-speed = "500.0mm"

        [layer-1]
        work-speed = "250.0mm"
        "#,
    )
    .unwrap();

    let configs = settings.resolve_layers(2).unwrap();
    assert_eq!(configs[0].work_speed, 250.0);
    assert_eq!(configs[1].work_speed, 500.0);
}

#[test]
fn test_load_from_file() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[document]\ntool_type = \"blade\"\nrack_type = \"manual\"\n\n[layer-1]\nfan_type = \"cooling\"\n"
    )
    .unwrap();

    let settings = RenderSettings::load_from_file(file.path()).unwrap();
    assert_eq!(settings.document().tool_type, ToolType::Blade);
    assert_eq!(settings.document().rack_type, RackType::Manual);
    assert_eq!(settings.resolve_layer(1).unwrap().fan_type, FanMode::Cooling);
    assert_eq!(settings.resolve_layer(2).unwrap().fan_type, FanMode::Off);
}

#[test]
fn test_missing_file_is_io_error() {
    let result = RenderSettings::load_from_file(std::path::Path::new("/no/such/config.toml"));
    assert!(matches!(result, Err(Error::Io(_))));
}
