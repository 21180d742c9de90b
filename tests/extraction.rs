mod common;

use calcert_docx::{Metric, SensorType};
use common::{complex_field, docx, p, parse, parse_named, simple_field, table, table_with_nested};

const VNIR_HEADING: &str = "VNIR Hyperspectral Scanner Calibration Results";
const SWIR_HEADING: &str = "SWIR Hyperspectral Scanner Calibration Results";

#[test]
fn merge_field_date() {
    let res = parse(&complex_field("CAL_DATE", "2025-06-17"));
    assert_eq!(res.date_iso.as_deref(), Some("2025-06-17"));
}

#[test]
fn filename_prefix_is_last_date_source() {
    let res = parse_named(&p("Calibration Certificate"), "20250828_CalibrationCertificate_v7.docx");
    assert_eq!(res.date_iso.as_deref(), Some("2025-08-28"));

    let res = parse_named(&p("Issued 2025-01-02"), "20250828_CalibrationCertificate_v7.docx");
    assert_eq!(res.date_iso.as_deref(), Some("2025-01-02"));
}

#[test]
fn placeholder_merge_field_is_absent() {
    let res = parse(&complex_field("VNIR_RMSE_X", "«VNIR_RMSE_X»"));
    assert_eq!(res.vnir_rmse_x, None);
    assert!(res.metrics_by_type().is_empty());
}

#[test]
fn first_writer_wins() {
    let body = [
        complex_field("Calibration_Reference_ID", "CAL-001"),
        table(&[&["Reference ID", "REF-777"]]),
    ]
    .concat();
    let res = parse(&body);
    assert_eq!(res.calibration_reference_id.as_deref(), Some("CAL-001"));
}

#[test]
fn merge_field_metric_not_overwritten_by_table() {
    let body = [
        complex_field("VNIR_RMSE_X", "0.40"),
        p(VNIR_HEADING),
        table(&[&["RMSE X", "0.99"], &["RMSE Y", "0.52"]]),
    ]
    .concat();
    let res = parse(&body);
    assert_eq!(res.vnir_rmse_x, Some(0.40));
    assert_eq!(res.vnir_rmse_y, Some(0.52));
}

#[test]
fn metrics_need_an_active_section() {
    let res = parse(&table(&[&["RMSE X: 1.2"]]));
    assert!(res.metrics_by_type().is_empty());

    let body = [p(SWIR_HEADING), table(&[&["RMSE X: 1.2"]])].concat();
    let res = parse(&body);
    assert_eq!(res.swir_rmse_x, Some(1.2));
    assert_eq!(res.swir_rmse_y, None);
    assert_eq!(res.vnir_rmse_x, None);
}

#[test]
fn parsing_is_idempotent() {
    let body = [
        complex_field("CAL_DATE", "2025-06-17"),
        p(VNIR_HEADING),
        table(&[&["Model", "Nano-Hyperspec"], &["RMSE X", "0.45"], &["RMSE Y", "0.52"]]),
        table(&[&["GNSS", "SBG Quanta Micro", "A1029384"]]),
    ]
    .concat();
    let bytes = docx(&body);
    let a = calcert_docx::parse_calibration_certificate_bytes(&bytes, Some("cert.docx")).unwrap();
    let b = calcert_docx::parse_calibration_certificate_bytes(&bytes, Some("cert.docx")).unwrap();
    assert_eq!(a, b);
}

#[test]
fn vnir_section_table() {
    let body = [
        p(VNIR_HEADING),
        table(&[&["RMSE X", "0.45"], &["RMSE Y", "0.52"]]),
    ]
    .concat();
    let res = parse(&body);
    assert_eq!(res.vnir_rmse_x, Some(0.45));
    assert_eq!(res.vnir_rmse_y, Some(0.52));
    for sensor in SensorType::ALL {
        assert_eq!(res.model(sensor), None, "{sensor} model");
        assert_eq!(res.serial(sensor), None, "{sensor} SN");
        if sensor != SensorType::Vnir {
            for m in sensor.metrics() {
                assert_eq!(res.metric(sensor, *m), None, "{sensor} {m}");
            }
        }
    }
    let by_type = res.metrics_by_type();
    assert_eq!(by_type.len(), 1);
    assert_eq!(by_type[&SensorType::Vnir][&Metric::RmseY], Some(0.52));
}

#[test]
fn metric_projection_serializes_by_type() {
    let body = [
        p(VNIR_HEADING),
        table(&[&["RMSE X", "0.45"], &["RMSE Y", "0.52"]]),
    ]
    .concat();
    let res = parse(&body);
    let json = serde_json::to_value(res.metrics_by_type()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "VNIR": { "RMSE_X": 0.45, "RMSE_Y": 0.52 } })
    );
}

#[test]
fn system_row() {
    let res = parse(&table(&[&["System", "Headwall CoAligned HP", "cAHP-191"]]));
    assert_eq!(res.system_sn.as_deref(), Some("cAHP-191"));
}

#[test]
fn gnss_placeholder_filled_from_table_text() {
    let body = [
        complex_field("GNSS_SN", "<GNSS_SN>"),
        table(&[&["GNSS", "SBG Quanta Micro", "A1029384"]]),
    ]
    .concat();
    let res = parse(&body);
    assert_eq!(res.gnss_model.as_deref(), Some("SBG Quanta Micro"));
    assert_eq!(res.gnss_sn.as_deref(), Some("A1029384"));
}

#[test]
fn gnss_labelled_pairs_in_one_row() {
    let res = parse(&table(&[&[
        "GNSS/INS",
        "Model",
        "SBG Quanta Micro",
        "Serial Number",
        "A1029384",
    ]]));
    assert_eq!(res.gnss_model.as_deref(), Some("SBG Quanta Micro"));
    assert_eq!(res.gnss_sn.as_deref(), Some("A1029384"));
}

#[test]
fn gnss_context_carries_to_following_rows() {
    let res = parse(&table(&[
        &["GNSS Receiver"],
        &["Model", "Quanta Micro"],
        &["Serial Number", "00012345"],
    ]));
    assert_eq!(res.gnss_model.as_deref(), Some("Quanta Micro"));
    assert_eq!(res.gnss_sn.as_deref(), Some("00012345"));
}

#[test]
fn gnss_unlabelled_serial_after_model() {
    let res = parse(&table(&[
        &["GNSS", "Model", "Ellipse-D"],
        &["IMU", "Ellipse-D", "", "20AB-4471"],
    ]));
    assert_eq!(res.gnss_model.as_deref(), Some("Ellipse-D"));
    assert_eq!(res.gnss_sn.as_deref(), Some("20AB-4471"));
}

#[test]
fn model_and_serial_follow_section() {
    let body = [
        p("RGB Camera Calibration Results"),
        table(&[
            &["Camera Model", "Sony A7R IV"],
            &["Serial Number", "4412345"],
            &["RMSE X", "0.8 px"],
            &["RMSE Y", "0.9 px"],
            &["RMSE Z", "1.1 px"],
        ]),
        p("LiDAR Calibration Results"),
        table(&[&["Model", "Hesai XT32"], &["S/N", "HX-0091"], &["Plane Fit RMS", "0.021 m"]]),
    ]
    .concat();
    let res = parse(&body);
    assert_eq!(res.rgb_model.as_deref(), Some("Sony A7R IV"));
    assert_eq!(res.rgb_sn.as_deref(), Some("4412345"));
    assert_eq!(res.rgb_rmse_x, Some(0.8));
    assert_eq!(res.rgb_rmse_y, Some(0.9));
    assert_eq!(res.rgb_rmse_z, Some(1.1));
    assert_eq!(res.lidar_model.as_deref(), Some("Hesai XT32"));
    assert_eq!(res.lidar_sn.as_deref(), Some("HX-0091"));
    assert_eq!(res.lidar_plane_fit, Some(0.021));
    assert_eq!(res.gnss_model, None);
}

#[test]
fn general_information_rows() {
    let res = parse(&table(&[
        &["General Information", "Date", "06/17/2025"],
        &["General Information", "Sensors", "VNIR; SWIR, LiDAR"],
        &["Calibration Reference ID", "CAL-2025", "0042"],
    ]));
    assert_eq!(res.date_iso.as_deref(), Some("2025-06-17"));
    assert_eq!(res.sensor_types_calibrated, vec!["VNIR", "SWIR", "LIDAR"]);
    assert_eq!(res.calibration_reference_id.as_deref(), Some("CAL-2025_0042"));
}

#[test]
fn merge_fields_seed_everything() {
    let body = [
        simple_field("CAL_DATE", "2025/06/17"),
        complex_field("SENSOR_TYPES_CALIBRATED", "VNIR, SWIR RGB"),
        complex_field("VNIR_RMSE_X", "0.123 px"),
        complex_field("LIDAR_RMS", "0.03"),
        simple_field("System_SN", "cAHP-191"),
        complex_field("SWIR_Model", "Micro-Hyperspec SWIR 384"),
    ]
    .concat();
    let res = parse(&body);
    assert_eq!(res.date_iso.as_deref(), Some("2025-06-17"));
    assert_eq!(res.sensor_types_calibrated, vec!["VNIR", "SWIR", "RGB"]);
    assert_eq!(res.vnir_rmse_x, Some(0.123));
    assert_eq!(res.lidar_plane_fit, Some(0.03));
    assert_eq!(res.system_sn.as_deref(), Some("cAHP-191"));
    assert_eq!(res.swir_model.as_deref(), Some("Micro-Hyperspec SWIR 384"));
}

#[test]
fn heading_in_single_cell_row() {
    let res = parse(&table(&[&[SWIR_HEADING], &["RMSE X", "1.5"], &["RMSE Y", "1.7"]]));
    assert_eq!(res.swir_rmse_x, Some(1.5));
    assert_eq!(res.swir_rmse_y, Some(1.7));
}

#[test]
fn nested_table_rows_are_walked() {
    let inner = table(&[&["RMSE X", "0.4"], &["RMSE Y", "0.5"]]);
    let res = parse(&table_with_nested(VNIR_HEADING, &inner));
    assert_eq!(res.vnir_rmse_x, Some(0.4));
    assert_eq!(res.vnir_rmse_y, Some(0.5));
}

#[test]
fn header_paragraph_supplies_date() {
    let bytes = common::docx_with_header_footer(
        &p("Calibration Certificate"),
        &p("Calibration Date: 2025-03-04"),
        &p("Page 1"),
    );
    let res = calcert_docx::parse_calibration_certificate_bytes(&bytes, None).unwrap();
    assert_eq!(res.date_iso.as_deref(), Some("2025-03-04"));
}

#[test]
fn header_does_not_inherit_body_section() {
    let bytes = common::docx_with_header_footer(
        &p(VNIR_HEADING),
        &table(&[&["RMSE X", "9.9"]]),
        "",
    );
    let res = calcert_docx::parse_calibration_certificate_bytes(&bytes, None).unwrap();
    assert_eq!(res.vnir_rmse_x, None);
}

#[test]
fn hyphenated_serial_kept_verbatim() {
    let body = [
        p(VNIR_HEADING),
        table(&[&["Serial Number", "SN-10234"]]),
        p(SWIR_HEADING),
        table(&[&["Serial Number - HS-1001"]]),
    ]
    .concat();
    let res = parse(&body);
    assert_eq!(res.vnir_sn.as_deref(), Some("SN-10234"));
    assert_eq!(res.swir_sn.as_deref(), Some("HS-1001"));
}

#[test]
fn system_serial_label_inside_section() {
    let body = [
        p(VNIR_HEADING),
        table(&[&["Serial Number", "HS-1001"], &["System SN", "cAHP-191"]]),
    ]
    .concat();
    let res = parse(&body);
    assert_eq!(res.vnir_sn.as_deref(), Some("HS-1001"));
    assert_eq!(res.system_sn.as_deref(), Some("cAHP-191"));
}

#[test]
fn chassis_serial_label_in_gnss_context() {
    let res = parse(&table(&[&["GNSS Receiver"], &["Chassis SN", "cAHP-200"]]));
    assert_eq!(res.system_sn.as_deref(), Some("cAHP-200"));
    assert_eq!(res.gnss_sn, None);
}
