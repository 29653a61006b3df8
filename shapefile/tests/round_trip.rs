//! Crate-level integration tests: full dataset round trips through a
//! `tempfile`-backed directory, exercising the reader and writer drivers
//! together rather than any single module in isolation.

use shapefile::{
    from_array, from_geojson, from_wkt, to_array, to_geojson, to_wkt, AttributeValue, Coord,
    ExistingFilePolicy, GeoJsonOptions, Geometry, Measure, PolygonOutputOrientation, ReaderOptions,
    Shape, ShapefileReader, ShapefileWriter, ShapeType, WriterOptions,
};

fn polygon_with_hole() -> Geometry {
    let outer = vec![
        Coord::xy(0.0, 0.0),
        Coord::xy(0.0, 10.0),
        Coord::xy(10.0, 10.0),
        Coord::xy(10.0, 0.0),
        Coord::xy(0.0, 0.0),
    ];
    let hole = vec![
        Coord::xy(2.0, 2.0),
        Coord::xy(4.0, 2.0),
        Coord::xy(4.0, 4.0),
        Coord::xy(2.0, 4.0),
        Coord::xy(2.0, 2.0),
    ];
    Geometry::new(Shape::Polygon(vec![outer, hole]), false, false, false)
}

#[test]
fn writes_a_polygon_dataset_and_reads_it_back_with_sidecars() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("parcels");

    let mut writer = ShapefileWriter::create(&base, WriterOptions::default()).unwrap();
    writer.set_shape_type(ShapeType::Polygon).unwrap();
    writer.add_char_field("OWNER", 24).unwrap();
    writer.add_float_field("AREA", 12, 3).unwrap();
    writer.set_prj("GEOGCS[\"GCS_WGS_1984\"]");

    let mut parcel = polygon_with_hole();
    parcel.set_data("OWNER", AttributeValue::Character("Rivera".to_string()));
    parcel.set_data("AREA", AttributeValue::Numeric(96.0));
    writer.write_record(&parcel).unwrap();
    writer.close().unwrap();

    assert!(base.with_extension("prj").exists());

    let mut reader = ShapefileReader::open(&base, ReaderOptions::default()).unwrap();
    assert_eq!(reader.num_records(), 1);
    assert_eq!(reader.prj(), Some("GEOGCS[\"GCS_WGS_1984\"]"));

    let record = reader.next().unwrap().unwrap();
    assert_eq!(
        record.get_data("OWNER"),
        Some(&AttributeValue::Character("Rivera".to_string()))
    );
    match &record.shape {
        Shape::Polygon(rings) => assert_eq!(rings.len(), 2),
        other => panic!("expected a polygon, got {other:?}"),
    }
}

#[test]
fn polygon_output_orientation_rewinds_rings_on_read() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("blocks");

    let mut writer = ShapefileWriter::create(&base, WriterOptions::default()).unwrap();
    writer.set_shape_type(ShapeType::Polygon).unwrap();
    writer.write_record(&polygon_with_hole()).unwrap();
    writer.close().unwrap();

    let options = ReaderOptions {
        polygon_output_orientation: PolygonOutputOrientation::ForceCounterClockwise,
        ..ReaderOptions::default()
    };
    let mut reader = ShapefileReader::open(&base, options).unwrap();
    let record = reader.next().unwrap().unwrap();
    match &record.shape {
        Shape::Polygon(rings) => {
            // Outer ring read back counter-clockwise means its first edge's
            // signed contribution is now positive instead of the on-disk
            // clockwise convention's negative.
            let outer = &rings[0];
            let mut area = 0.0;
            for i in 0..outer.len() - 1 {
                area += outer[i].x * outer[i + 1].y - outer[i + 1].x * outer[i].y;
            }
            assert!(area > 0.0, "expected outer ring rewound counter-clockwise");
        }
        other => panic!("expected a polygon, got {other:?}"),
    }
}

#[test]
fn appends_across_two_writer_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("stations");

    let mut writer = ShapefileWriter::create(&base, WriterOptions::default()).unwrap();
    writer.set_shape_type(ShapeType::PointZ).unwrap();
    writer.add_numeric_field("ELEV", 8, 1).unwrap();
    let mut first = Geometry::new(
        Shape::Point(Coord::xyzm(1.0, 1.0, 100.0, Measure::NoData)),
        false,
        true,
        false,
    );
    first.set_data("ELEV", AttributeValue::Numeric(100.0));
    writer.write_record(&first).unwrap();
    writer.close().unwrap();

    let append_options = WriterOptions {
        existing_file_policy: ExistingFilePolicy::Append,
        ..WriterOptions::default()
    };
    let mut writer = ShapefileWriter::create(&base, append_options).unwrap();
    let mut second = Geometry::new(
        Shape::Point(Coord::xyzm(2.0, 2.0, 150.0, Measure::NoData)),
        false,
        true,
        false,
    );
    second.set_data("ELEV", AttributeValue::Numeric(150.0));
    writer.write_record(&second).unwrap();
    writer.close().unwrap();

    let mut reader = ShapefileReader::open(&base, ReaderOptions::default()).unwrap();
    assert_eq!(reader.num_records(), 2);
    let records: Vec<_> = (&mut reader).map(|r| r.unwrap()).collect();
    assert_eq!(
        records[1].get_data("ELEV"),
        Some(&AttributeValue::Numeric(150.0))
    );
}

#[test]
fn geometry_survives_wkt_geojson_and_array_round_trips() {
    let geom = polygon_with_hole();

    let wkt = to_wkt(&geom);
    let from_wkt_back = from_wkt(&wkt).unwrap();
    assert_eq!(from_wkt_back.shape, geom.shape);

    let json = to_geojson(&geom, &GeoJsonOptions::default());
    let from_json_back = from_geojson(&json).unwrap();
    assert_eq!(from_json_back.shape, geom.shape);

    let array = to_array(&geom);
    let from_array_back = from_array(&array).unwrap();
    assert_eq!(from_array_back.shape, geom.shape);
}

#[test]
fn dataset_with_memo_field_round_trips_through_dbt() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("notes");

    let mut writer = ShapefileWriter::create(&base, WriterOptions::default()).unwrap();
    writer.set_shape_type(ShapeType::Point).unwrap();
    writer.add_memo_field("NOTES").unwrap();

    let long_note = "a very long field note ".repeat(40);
    let mut g = Geometry::new(Shape::Point(Coord::xy(5.0, 5.0)), false, false, false);
    g.set_data("NOTES", AttributeValue::Memo(long_note.clone()));
    writer.write_record(&g).unwrap();
    writer.close().unwrap();

    assert!(base.with_extension("dbt").exists());

    let mut reader = ShapefileReader::open(&base, ReaderOptions::default()).unwrap();
    let record = reader.next().unwrap().unwrap();
    assert_eq!(
        record.get_data("NOTES"),
        Some(&AttributeValue::Memo(long_note))
    );
}
