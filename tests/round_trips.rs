#![allow(missing_docs)]

use asdf_astro::{
    document::{
        read_document, write_document, AsdfDocument, DocumentError, ReadOptions, WriteOptions,
    },
    values::{
        Card, Column, EarthLocation, Frame, FrameData, FrameKind, HduData, HduList, NdArray,
        Quantity, QuantityClass, Representation, RepresentationKind, SkyCoord, SpectralCoord,
        Table, Time, TimeValue, Unit,
    },
};
use asdf_astro_plugin::{
    node_map, AstroObject, ConvertError, Node, ObjectRef, TagPattern, TaggedNode, Version,
};
use asdf_astro_registry::tags::{coordinates, fits, table, time, unit};

fn write(object: impl AstroObject, version: Version) -> Result<AsdfDocument, DocumentError> {
    let options = WriteOptions {
        version: Some(version),
        config: None,
    };
    write_document(&Node::Object(ObjectRef::new(object)), &options)
}

fn read<T: AstroObject + Clone>(document: &AsdfDocument) -> Result<T, Box<dyn std::error::Error>> {
    let read = read_document(document, &ReadOptions::default())?;
    assert!(read.warnings.is_empty());
    let object = read.tree.as_object().ok_or("expected an object")?.clone();
    let value = object.downcast_ref::<T>().ok_or("unexpected type")?;
    Ok(T::clone(&value))
}

fn root_tag(document: &AsdfDocument) -> &str {
    match &document.tree {
        Node::Tagged(tagged) => &tagged.tag,
        _ => "",
    }
}

fn root_value(document: &AsdfDocument) -> &Node {
    match &document.tree {
        Node::Tagged(tagged) => &tagged.value,
        node => node,
    }
}

#[test]
fn quantity_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let quantity = Quantity::new(vec![1.0, 2.5, -3.0], Unit::parse("km / s")?);
    for version in [Version::new(1, 0, 0), Version::new(1, 5, 0), Version::new(1, 6, 0)] {
        let document = write(quantity.clone(), version)?;
        assert!(TagPattern::new(unit::QUANTITY).matches(root_tag(&document)));
        assert_eq!(read::<Quantity>(&document)?, quantity);
    }
    Ok(())
}

#[test]
fn unit_tag_selection() -> Result<(), Box<dyn std::error::Error>> {
    let document = write(Unit::parse("m / s")?, Version::new(1, 5, 0))?;
    assert_eq!(root_tag(&document), "tag:stsci.edu:asdf/unit/unit-1.0.0");
    assert_eq!(read::<Unit>(&document)?, Unit::parse("m / s")?);

    let document = write(Unit::parse("furlong / fortnight")?, Version::new(1, 5, 0))?;
    assert_eq!(root_tag(&document), "tag:astropy.org:astropy/units/unit-1.0.0");
    assert_eq!(read::<Unit>(&document)?, Unit::parse("furlong / fortnight")?);
    Ok(())
}

#[test]
fn time_bare_value() -> Result<(), Box<dyn std::error::Error>> {
    let time = Time::parse("2000-01-01T00:00:00.000")?;
    let document = write(time.clone(), Version::new(1, 5, 0))?;
    assert!(TagPattern::new(time::TIME).matches(root_tag(&document)));
    assert_eq!(root_value(&document), &Node::from("2000-01-01T00:00:00.000"));
    assert_eq!(read::<Time>(&document)?, time);

    let time = Time::new(TimeValue::Number(51544.0), "mjd").with_scale("tai");
    let document = write(time.clone(), Version::new(1, 5, 0))?;
    let node = root_value(&document).as_mapping().ok_or("expected a mapping")?;
    assert_eq!(node["format"], Node::from("mjd"));
    assert_eq!(node["scale"], Node::from("tai"));
    assert_eq!(read::<Time>(&document)?, time);
    Ok(())
}

#[test]
fn time_non_guessable_bare_value() {
    let document = AsdfDocument {
        version: Version::new(1, 5, 0),
        tree: Node::Tagged(Box::new(TaggedNode::new(
            "tag:stsci.edu:asdf/time/time-1.1.0",
            Node::Float(51544.0),
        ))),
        history: Default::default(),
    };
    assert!(matches!(
        read_document(&document, &ReadOptions::default()),
        Err(DocumentError::Read {
            source: ConvertError::InvalidNode(_),
            ..
        })
    ));
}

#[test]
fn time_location() -> Result<(), Box<dyn std::error::Error>> {
    let location = EarthLocation::from_geocentric(6378137.0, 0.0, 0.0, &Unit::parse("m")?);
    let time = Time::parse("2010-01-01 00:00:00")?.with_location(location);

    // time-1.0.0 stores plain coordinates sharing one unit
    let document = write(time.clone(), Version::new(1, 0, 0))?;
    assert_eq!(root_tag(&document), "tag:stsci.edu:asdf/time/time-1.0.0");
    let node = root_value(&document).as_mapping().ok_or("expected a mapping")?;
    let location_node = node["location"].as_mapping().ok_or("expected a mapping")?;
    assert_eq!(location_node["x"], Node::Float(6378137.0));
    assert!(location_node.contains_key("unit"));
    assert_eq!(read::<Time>(&document)?, time);

    let document = write(time.clone(), Version::new(1, 5, 0))?;
    assert_eq!(root_tag(&document), "tag:stsci.edu:asdf/time/time-1.1.0");
    let node = root_value(&document).as_mapping().ok_or("expected a mapping")?;
    let location_node = node["location"].as_mapping().ok_or("expected a mapping")?;
    assert!(matches!(location_node["x"], Node::Tagged(_)));
    assert!(!location_node.contains_key("unit"));
    assert_eq!(read::<Time>(&document)?, time);
    Ok(())
}

#[test]
fn angle_version_fallback() -> Result<(), Box<dyn std::error::Error>> {
    let angle = Quantity::angle(30.0, Unit::parse("deg")?);

    let document = write(angle.clone(), Version::new(1, 5, 0))?;
    assert!(TagPattern::new(coordinates::ANGLE).matches(root_tag(&document)));
    assert_eq!(read::<Quantity>(&document)?, angle);

    // The coordinates extension requires ASDF Standard 1.1.0
    let document = write(angle.clone(), Version::new(1, 0, 0))?;
    assert!(TagPattern::new(unit::QUANTITY).matches(root_tag(&document)));
    let quantity = read::<Quantity>(&document)?;
    assert_eq!(quantity.class, QuantityClass::Quantity);
    assert_eq!(quantity.value, angle.value);
    Ok(())
}

#[test]
fn frame_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let deg = Unit::parse("deg")?;
    let frame = Frame::new(FrameKind::Icrs).with_data(FrameData {
        lon: Quantity::longitude(10.0, deg.clone(), Quantity::angle(360.0, deg.clone())),
        lat: Quantity::latitude(-20.0, deg),
        distance: None,
    });
    let document = write(frame.clone(), Version::new(1, 5, 0))?;
    assert_eq!(root_tag(&document), "tag:astropy.org:astropy/coordinates/frames/icrs-1.1.0");
    assert_eq!(read::<Frame>(&document)?, frame);
    Ok(())
}

#[test]
fn builtin_frames_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let deg = Unit::parse("deg")?;
    for kind in FrameKind::ALL {
        let mut frame = Frame::new(kind).with_data(FrameData {
            lon: Quantity::longitude(10.0, deg.clone(), Quantity::angle(360.0, deg.clone())),
            lat: Quantity::latitude(-20.0, deg.clone()),
            distance: Some(Quantity::new(8.0, Unit::parse("kpc")?)),
        });
        if kind.attribute_names().contains(&"obstime") {
            frame.frame_attributes.insert(
                "obstime".to_string(),
                Node::Object(ObjectRef::new(Time::parse("2010-01-01T00:00:00.000")?)),
            );
        }
        let document = write(frame.clone(), Version::new(1, 5, 0))?;
        assert!(
            root_tag(&document).contains(&format!("/frames/{}-", kind.name())),
            "{kind:?} written as {}",
            root_tag(&document)
        );
        assert_eq!(read::<Frame>(&document)?, frame);
    }
    Ok(())
}

#[test]
fn skycoord_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let deg = Unit::parse("deg")?;
    let mut coord = SkyCoord::new(
        FrameKind::Fk4,
        [
            (
                "ra".to_string(),
                Quantity::longitude(
                    vec![1.0, 2.0],
                    deg.clone(),
                    Quantity::angle(360.0, deg.clone()),
                ),
            ),
            ("dec".to_string(), Quantity::latitude(vec![3.0, 4.0], deg)),
        ],
    );
    coord.frame_attributes.insert(
        "obstime".to_string(),
        Node::Object(ObjectRef::new(Time::parse("2000-01-01T12:00:00.000")?)),
    );
    let document = write(coord.clone(), Version::new(1, 5, 0))?;
    assert!(TagPattern::new(coordinates::SKYCOORD).matches(root_tag(&document)));
    let node = root_value(&document).as_mapping().ok_or("expected a mapping")?;
    assert_eq!(node["frame"], Node::from("fk4"));
    assert_eq!(node["representation_type"], Node::from("spherical"));
    assert!(matches!(node["ra"], Node::Tagged(_)));
    assert!(node.contains_key("obstime"));

    let read = read::<SkyCoord>(&document)?;
    assert!(read.frame_attributes.contains_key("obstime"));
    assert!(read.components.contains_key("dec"));
    assert_eq!(read, coord);
    Ok(())
}

#[test]
fn skycoord_unknown_frame() {
    let document = AsdfDocument {
        version: Version::new(1, 5, 0),
        tree: Node::Tagged(Box::new(TaggedNode::new(
            "tag:astropy.org:astropy/coordinates/skycoord-1.0.0",
            Node::Mapping(node_map! {
                "frame" => "altaz",
                "representation_type" => "spherical",
            }),
        ))),
        history: Default::default(),
    };
    assert!(matches!(
        read_document(&document, &ReadOptions::default()),
        Err(DocumentError::Read {
            source: ConvertError::InvalidNode(_),
            ..
        })
    ));
}

#[test]
fn representation_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let kpc = Unit::parse("kpc")?;
    let representation = Representation::new(
        RepresentationKind::Cartesian,
        vec![
            Quantity::new(1.0, kpc.clone()),
            Quantity::new(2.0, kpc.clone()),
            Quantity::new(3.0, kpc),
        ],
    )?;
    let mut document = write(representation.clone(), Version::new(1, 5, 0))?;
    assert!(TagPattern::new(coordinates::REPRESENTATION).matches(root_tag(&document)));
    let node = root_value(&document).as_mapping().ok_or("expected a mapping")?;
    assert_eq!(node["type"], Node::from("CartesianRepresentation"));
    assert_eq!(read::<Representation>(&document)?, representation);

    // a missing component
    if let Node::Tagged(tagged) = &mut document.tree {
        if let Node::Mapping(node) = &mut tagged.value {
            if let Some(Node::Mapping(components)) = node.get_mut("components") {
                components.shift_remove("z");
            }
        }
    }
    assert!(matches!(
        read_document(&document, &ReadOptions::default()),
        Err(DocumentError::Read {
            source: ConvertError::InvalidNode(_),
            ..
        })
    ));
    Ok(())
}

#[test]
fn spectralcoord_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let deg = Unit::parse("deg")?;
    let target = Frame::new(FrameKind::Icrs).with_data(FrameData {
        lon: Quantity::longitude(10.0, deg.clone(), Quantity::angle(360.0, deg.clone())),
        lat: Quantity::latitude(-20.0, deg),
        distance: None,
    });
    let coord = SpectralCoord {
        value: vec![100.0, 200.0].into(),
        unit: Unit::parse("GHz")?,
        observer: None,
        target: Some(target),
    };
    let document = write(coord.clone(), Version::new(1, 5, 0))?;
    assert!(TagPattern::new(coordinates::SPECTRALCOORD).matches(root_tag(&document)));
    let node = root_value(&document).as_mapping().ok_or("expected a mapping")?;
    assert!(!node.contains_key("observer"));
    assert!(matches!(node["target"], Node::Tagged(_)));
    assert_eq!(read::<SpectralCoord>(&document)?, coord);
    Ok(())
}

#[test]
fn table_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let table = Table::new(vec![
        Column::new("a", Node::from_f64s(&[1.0, 2.0, 3.0])).with_unit(Unit::parse("m")?),
        Column::new("b", Node::from_strs(["x", "y", "z"])),
    ]);
    let document = write(table.clone(), Version::new(1, 5, 0))?;
    assert!(TagPattern::new(table::ASTROPY_TABLE).matches(root_tag(&document)));
    let read_table = read::<Table>(&document)?;
    assert_eq!(read_table.colnames(), ["a", "b"]);
    assert_eq!(read_table, table);
    Ok(())
}

#[test]
fn fits_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let mut hdu_list = HduList::default();
    hdu_list.push(
        vec![
            Card::new("SIMPLE", true, "conforms to FITS standard"),
            Card::new("BITPIX", 8_i64, ""),
        ],
        None,
    );
    hdu_list.push(
        vec![Card::new("EXTNAME", "SCI", "")],
        Some(HduData::Image(NdArray::from_vec(vec![1.0, 2.0, 3.0]))),
    );
    hdu_list.push(
        vec![Card::new("EXTNAME", "CAT", "")],
        Some(HduData::Table(Table::new(vec![Column::new(
            "flux",
            Node::from_f64s(&[0.5, 0.25]),
        )]))),
    );
    let document = write(hdu_list.clone(), Version::new(1, 5, 0))?;
    assert!(TagPattern::new(fits::ASTROPY_FITS).matches(root_tag(&document)));
    assert_eq!(read::<HduList>(&document)?, hdu_list);
    Ok(())
}

#[test]
fn shared_values_keep_identity() -> Result<(), Box<dyn std::error::Error>> {
    let shared = ObjectRef::new(Quantity::new(1.0, Unit::parse("s")?));
    let tree = Node::Mapping(node_map! {
        "first" => shared.clone(),
        "values" => vec![Node::Object(shared.clone()), Node::from(2.0)],
    });
    let document = write_document(&tree, &WriteOptions::default())?;
    let node = document.tree.as_mapping().ok_or("expected a mapping")?;
    assert_eq!(
        node["values"].as_sequence().ok_or("expected a sequence")?[0],
        Node::Alias("id001".to_string())
    );

    let read = read_document(&document, &ReadOptions::default())?;
    let tree = read.tree.as_mapping().ok_or("expected a mapping")?;
    let first = tree["first"].as_object().ok_or("expected an object")?;
    let again = tree["values"].as_sequence().ok_or("expected a sequence")?[0]
        .as_object()
        .ok_or("expected an object")?;
    assert!(first.ptr_eq(again));
    assert!(!first.ptr_eq(&shared));
    Ok(())
}
