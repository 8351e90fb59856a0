#![allow(missing_docs)]

use asdf_astro::{
    document::{
        read_document, write_document, AsdfDocument, DocumentError, ReadOptions, WriteOptions,
    },
    registry::{standard::SUPPORTED_VERSIONS, tags::transform},
    values::{
        transform::model_types, BoundingBox, CompoundBoundingBox, InputKey, Model,
        ModelBoundingBox, ModelKind, NdArray, Operator, Order, SelectorArgument, Unit,
    },
};
use asdf_astro_plugin::{
    node_map, ConvertError, Node, ObjectRef, Tag, TagPattern, TaggedNode, Version,
};

fn write_model(model: &ObjectRef, version: Version) -> Result<AsdfDocument, DocumentError> {
    let options = WriteOptions {
        version: Some(version),
        config: None,
    };
    write_document(&Node::Mapping(node_map! { "model" => model.clone() }), &options)
}

fn read_model(document: &AsdfDocument) -> Result<ObjectRef, Box<dyn std::error::Error>> {
    let read = read_document(document, &ReadOptions::default())?;
    let tree = read.tree.as_mapping().ok_or("expected a mapping")?;
    Ok(tree["model"].as_object().ok_or("expected a model")?.clone())
}

fn model_node(document: &AsdfDocument) -> Result<&TaggedNode, Box<dyn std::error::Error>> {
    match &document.tree.as_mapping().ok_or("expected a mapping")?["model"] {
        Node::Tagged(tagged) => Ok(tagged),
        _ => Err("expected a tagged node".into()),
    }
}

#[test]
fn compound_round_trips() -> Result<(), Box<dyn std::error::Error>> {
    let operators = [
        (Operator::Add, transform::ADD),
        (Operator::Subtract, transform::SUBTRACT),
        (Operator::Multiply, transform::MULTIPLY),
        (Operator::Divide, transform::DIVIDE),
        (Operator::Power, transform::POWER),
        (Operator::Compose, transform::COMPOSE),
        (Operator::Concatenate, transform::CONCATENATE),
    ];
    for (operator, tag) in operators {
        let model = ObjectRef::new(Model::compound(
            operator,
            ObjectRef::new(Model::shift(1.0)),
            ObjectRef::new(Model::scale(2.0)),
        )?);
        let document = write_model(&model, Version::new(1, 5, 0))?;
        assert!(TagPattern::new(tag).matches(&model_node(&document)?.tag));
        assert_eq!(read_model(&document)?, model, "{operator}");
    }
    Ok(())
}

#[test]
fn fix_inputs_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let model = ObjectRef::new(Model::fix_inputs(
        ObjectRef::new(Model::rotation2d(30.0)),
        vec![(InputKey::Name("x".to_string()), 1.5)],
    )?);
    let document = write_model(&model, Version::new(1, 5, 0))?;
    assert!(TagPattern::new(transform::FIX_INPUTS).matches(&model_node(&document)?.tag));
    let read = read_model(&document)?;
    assert_eq!(read, model);
    assert_eq!(read.downcast_ref::<Model>().ok_or("expected a model")?.inputs(), ["y"]);
    Ok(())
}

#[test]
fn mutual_inverse() -> Result<(), Box<dyn std::error::Error>> {
    let forward = ObjectRef::new(Model::shift(1.0));
    let backward = ObjectRef::new(Model::shift(-1.0));
    forward
        .downcast_mut::<Model>()
        .ok_or("expected a model")?
        .set_inverse(Some(backward.clone()))?;
    backward
        .downcast_mut::<Model>()
        .ok_or("expected a model")?
        .set_inverse(Some(forward.clone()))?;

    let document = write_model(&forward, Version::new(1, 5, 0))?;
    let node = model_node(&document)?;
    assert_eq!(node.anchor.as_deref(), Some("id001"));
    let mapping = node.value.as_mapping().ok_or("expected a mapping")?;
    let Node::Tagged(inverse) = &mapping["inverse"] else {
        return Err("expected a tagged inverse".into());
    };
    assert_eq!(inverse.anchor, None);
    assert_eq!(
        inverse.value.as_mapping().ok_or("expected a mapping")?["inverse"],
        Node::Alias("id001".to_string())
    );

    let read = read_model(&document)?;
    let read_backward = read
        .downcast_ref::<Model>()
        .ok_or("expected a model")?
        .inverse()
        .ok_or("expected an inverse")?
        .clone();
    let read_forward = read_backward
        .downcast_ref::<Model>()
        .ok_or("expected a model")?
        .inverse()
        .ok_or("expected an inverse")?
        .clone();
    assert!(read_forward.ptr_eq(&read));
    assert_eq!(
        read_backward
            .downcast_ref::<Model>()
            .ok_or("expected a model")?
            .parameter("offset")
            .and_then(|offset| offset.value.as_scalar()),
        Some(-1.0)
    );
    Ok(())
}

#[test]
fn inverse_of_component_is_outer_compound() -> Result<(), Box<dyn std::error::Error>> {
    let shift = ObjectRef::new(Model::shift(1.0));
    let model = ObjectRef::new(Model::compound(
        Operator::Compose,
        shift.clone(),
        ObjectRef::new(Model::scale(2.0)),
    )?);
    shift
        .downcast_mut::<Model>()
        .ok_or("expected a model")?
        .set_inverse(Some(model.clone()))?;

    let document = write_model(&model, Version::new(1, 5, 0))?;
    let node = model_node(&document)?;
    assert_eq!(node.anchor.as_deref(), Some("id001"));
    let forward = node.value.as_mapping().ok_or("expected a mapping")?["forward"]
        .as_sequence()
        .ok_or("expected a sequence")?;
    let Node::Tagged(left) = &forward[0] else {
        return Err("expected a tagged operand".into());
    };
    assert_eq!(
        left.value.as_mapping().ok_or("expected a mapping")?["inverse"],
        Node::Alias("id001".to_string())
    );

    let read = read_model(&document)?;
    let kind = read
        .downcast_ref::<Model>()
        .ok_or("expected a model")?
        .kind()
        .clone();
    let ModelKind::Compound { left, .. } = kind else {
        return Err("expected a compound model".into());
    };
    let inverse = left
        .downcast_ref::<Model>()
        .ok_or("expected a model")?
        .inverse()
        .ok_or("expected an inverse")?
        .clone();
    assert!(inverse.ptr_eq(&read));

    let mut compose = TaggedNode::new(
        "tag:stsci.edu:asdf/transform/compose-1.2.0",
        Node::Mapping(node_map! {
            "forward" => Node::Sequence(vec![
                TaggedNode::new(
                    "tag:stsci.edu:asdf/transform/shift-1.2.0",
                    Node::Mapping(node_map! {
                        "offset" => 1.0,
                        "inverse" => Node::Alias("id001".to_string()),
                    }),
                )
                .into(),
                TaggedNode::new(
                    "tag:stsci.edu:asdf/transform/scale-1.2.0",
                    Node::Mapping(node_map! { "factor" => 2.0 }),
                )
                .into(),
            ]),
        }),
    );
    compose.anchor = Some("id001".to_string());
    let document = AsdfDocument {
        version: Version::new(1, 5, 0),
        tree: Node::Mapping(node_map! { "model" => compose }),
        history: Default::default(),
    };
    let read = read_model(&document)?;
    assert_eq!(read, model);
    let kind = read
        .downcast_ref::<Model>()
        .ok_or("expected a model")?
        .kind()
        .clone();
    let ModelKind::Compound { left, .. } = kind else {
        return Err("expected a compound model".into());
    };
    let inverse = left
        .downcast_ref::<Model>()
        .ok_or("expected a model")?
        .inverse()
        .ok_or("expected an inverse")?
        .clone();
    assert!(inverse.ptr_eq(&read));
    Ok(())
}

#[test]
fn inverse_must_be_a_model() {
    let document = AsdfDocument {
        version: Version::new(1, 5, 0),
        tree: Node::Mapping(node_map! {
            "model" => TaggedNode::new(
                "tag:stsci.edu:asdf/transform/shift-1.2.0",
                Node::Mapping(node_map! {
                    "offset" => 1.0,
                    "inverse" => TaggedNode::new(
                        "tag:stsci.edu:asdf/unit/quantity-1.1.0",
                        Node::Mapping(node_map! { "value" => 2.0, "unit" => "m" }),
                    ),
                }),
            ),
        }),
        history: Default::default(),
    };
    assert!(matches!(
        read_document(&document, &ReadOptions::default()),
        Err(DocumentError::DeferredConstruction { path, .. }) if path == "/model"
    ));
}

#[test]
fn constant_dimensions() -> Result<(), Box<dyn std::error::Error>> {
    let const2d = ObjectRef::new(Model::const2d(4.0));
    match write_model(&const2d, Version::new(1, 3, 0)) {
        Err(DocumentError::Write { source, .. }) => assert!(source.is_type_error()),
        other => return Err(format!("expected a write error, got {other:?}").into()),
    }

    let document = write_model(&const2d, Version::new(1, 5, 0))?;
    let node = model_node(&document)?;
    assert_eq!(node.tag, "tag:stsci.edu:asdf/transform/constant-1.4.0");
    assert_eq!(node.value.as_mapping().ok_or("expected a mapping")?["dimensions"], Node::Int(2));
    assert_eq!(read_model(&document)?, const2d);

    let const1d = ObjectRef::new(Model::const1d(5.0));
    let document = write_model(&const1d, Version::new(1, 0, 0))?;
    let node = model_node(&document)?;
    assert_eq!(node.tag, "tag:stsci.edu:asdf/transform/constant-1.0.0");
    let node = node.value.as_mapping().ok_or("expected a mapping")?;
    assert_eq!(node["value"], Node::Float(5.0));
    assert!(!node.contains_key("dimensions"));
    assert_eq!(read_model(&document)?, const1d);
    assert!(write_model(&const2d, Version::new(1, 0, 0)).is_err());
    Ok(())
}

fn tag_for(model: &ObjectRef, version: Version) -> Result<String, String> {
    let document = write_model(model, version).map_err(|err| err.to_string())?;
    let tag = model_node(&document).map_err(|err| err.to_string())?.tag.clone();
    Ok(tag)
}

#[test]
fn concurrent_writers() {
    let expected: Vec<_> = SUPPORTED_VERSIONS
        .iter()
        .map(|version| tag_for(&ObjectRef::new(Model::shift(1.0)), *version))
        .collect();
    let handles: Vec<_> = SUPPORTED_VERSIONS
        .iter()
        .rev()
        .map(|version| {
            let version = *version;
            std::thread::spawn(move || tag_for(&ObjectRef::new(Model::shift(1.0)), version))
        })
        .collect();
    let mut tags: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("writer thread panicked"))
        .collect();
    tags.reverse();
    assert_eq!(tags, expected);
}

#[test]
fn shift_tag_versions() -> Result<(), Box<dyn std::error::Error>> {
    let shift = ObjectRef::new(Model::shift(3.0));
    let mut previous: Option<Version> = None;
    for version in SUPPORTED_VERSIONS {
        let document = write_model(&shift, *version)?;
        let tag = Tag::parse(&model_node(&document)?.tag)?;
        assert!(TagPattern::new(transform::SHIFT).matches(tag.as_str()));
        if let Some(previous) = previous {
            assert!(tag.version() >= previous, "{version}");
        }
        previous = Some(tag.version());
        assert_eq!(read_model(&document)?, shift);
    }
    assert_eq!(previous, Some(Version::new(1, 2, 0)));
    Ok(())
}

#[test]
fn rotation_round_trips() -> Result<(), Box<dyn std::error::Error>> {
    let mut sky = Model::sky_rotation(&model_types::ROTATE_NATIVE2CELESTIAL, 5.6, -72.1, 180.0);
    sky.set_inverse(Some(ObjectRef::new(Model::sky_rotation(
        &model_types::ROTATE_CELESTIAL2NATIVE,
        5.6,
        -72.1,
        180.0,
    ))))?;
    let models = [
        (ObjectRef::new(sky), transform::ROTATE3D),
        (
            ObjectRef::new(Model::euler_angle_rotation(1.0, 2.0, 3.0, "zxz")?),
            transform::ROTATE3D,
        ),
        (
            ObjectRef::new(Model::rotation_sequence(
                &model_types::ROTATION_SEQUENCE3D,
                vec![1.0, 2.0, 3.0],
                "zyx",
            )?),
            transform::ROTATE_SEQUENCE_3D,
        ),
    ];
    for (model, pattern) in models {
        let document = write_model(&model, Version::new(1, 5, 0))?;
        assert!(TagPattern::new(pattern).matches(&model_node(&document)?.tag));
        assert_eq!(read_model(&document)?, model);
    }

    let document = write_model(
        &ObjectRef::new(Model::euler_angle_rotation(1.0, 2.0, 3.0, "zxz")?),
        Version::new(1, 5, 0),
    )?;
    let node = model_node(&document)?
        .value
        .as_mapping()
        .ok_or("expected a mapping")?;
    assert_eq!(node["direction"], Node::from("zxz"));
    assert_eq!(node["psi"], Node::Float(3.0));
    Ok(())
}

#[test]
fn tabular_spline_and_ufunc_round_trips() -> Result<(), Box<dyn std::error::Error>> {
    let tabular = Model::tabular(
        vec![
            NdArray::from_vec(vec![0.0, 1.0]),
            NdArray::from_vec(vec![0.0, 1.0, 2.0]),
        ],
        NdArray::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])?,
    )?;
    let spline = Model::spline1d(
        vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
        vec![1.0, 2.0, 3.0, 4.0, 0.0, 0.0, 0.0, 0.0],
        3,
    );
    let hypot = Model::from_type_key("astropy.modeling.math_functions.HypotUfunc")?;
    let models = [
        (tabular, transform::TABULAR),
        (spline, transform::SPLINE1D),
        (hypot, transform::MATH_FUNCTIONS),
    ];
    for (model, pattern) in models {
        let model = ObjectRef::new(model);
        let document = write_model(&model, Version::new(1, 6, 0))?;
        assert!(TagPattern::new(pattern).matches(&model_node(&document)?.tag));
        assert_eq!(read_model(&document)?, model);
    }
    Ok(())
}

#[test]
fn bounding_box_forms() -> Result<(), Box<dyn std::error::Error>> {
    let mut model = Model::rotation2d(10.0);
    model.set_bounding_box(Some(BoundingBox::Model(ModelBoundingBox::new([
        ("x", (0.0, 1.0)),
        ("y", (2.0, 3.0)),
    ]))))?;
    let model = ObjectRef::new(model);

    // Before ASDF Standard 1.6.0 the bounding box is written inline, in C order
    let document = write_model(&model, Version::new(1, 5, 0))?;
    let node = model_node(&document)?.value.as_mapping().ok_or("expected a mapping")?;
    assert_eq!(
        node["bounding_box"],
        Node::Sequence(vec![Node::from_f64s(&[2.0, 3.0]), Node::from_f64s(&[0.0, 1.0])])
    );
    assert_eq!(read_model(&document)?, model);

    let document = write_model(&model, Version::new(1, 6, 0))?;
    let node = model_node(&document)?.value.as_mapping().ok_or("expected a mapping")?;
    let Node::Tagged(bounding_box) = &node["bounding_box"] else {
        return Err("expected a tagged bounding box".into());
    };
    assert!(TagPattern::new(transform::BOUNDING_BOX).matches(&bounding_box.tag));
    assert_eq!(read_model(&document)?, model);
    Ok(())
}

#[test]
fn compound_bounding_box_versions() -> Result<(), Box<dyn std::error::Error>> {
    let mut model = Model::rotation2d(10.0);
    model.set_bounding_box(Some(BoundingBox::Compound(CompoundBoundingBox {
        selector_args: vec![SelectorArgument {
            argument: "x".to_string(),
            ignore: true,
        }],
        bounding_boxes: vec![
            (
                vec![Node::Float(0.0)],
                ModelBoundingBox {
                    ignored: vec!["x".to_string()],
                    ..ModelBoundingBox::new([("y", (-1.0, 1.0))])
                },
            ),
            (
                vec![Node::Float(1.0)],
                ModelBoundingBox {
                    ignored: vec!["x".to_string()],
                    ..ModelBoundingBox::new([("y", (-2.0, 2.0))])
                },
            ),
        ],
        ignored: Vec::new(),
        order: Order::C,
    })))?;
    let model = ObjectRef::new(model);

    match write_model(&model, Version::new(1, 5, 0)) {
        Err(DocumentError::Write {
            type_key,
            version,
            source: ConvertError::TypeNotSerializable { .. },
        }) => {
            assert_eq!(type_key, "astropy.modeling.bounding_box.CompoundBoundingBox");
            assert_eq!(version, Version::new(1, 5, 0));
        }
        other => return Err(format!("expected a write error, got {other:?}").into()),
    }

    let document = write_model(&model, Version::new(1, 6, 0))?;
    assert_eq!(read_model(&document)?, model);
    Ok(())
}

#[test]
fn parameter_units_and_constraints() -> Result<(), Box<dyn std::error::Error>> {
    let mut model = Model::gaussian1d(1.0, 0.0, 2.0).with_name("line");
    if let Some(mean) = model.parameter_mut("mean") {
        mean.unit = Some(Unit::parse("Angstrom")?);
        mean.fixed = true;
    }
    if let Some(stddev) = model.parameter_mut("stddev") {
        stddev.bounds = (Some(0.0), None);
    }
    let model = ObjectRef::new(model);
    let document = write_model(&model, Version::new(1, 5, 0))?;
    let node = model_node(&document)?.value.as_mapping().ok_or("expected a mapping")?;
    assert_eq!(node["name"], Node::from("line"));
    assert!(matches!(node["mean"], Node::Tagged(_)));
    assert_eq!(node["fixed"], Node::Mapping(node_map! { "mean" => true }));
    assert_eq!(
        node["bounds"],
        Node::Mapping(node_map! { "stddev" => vec![Node::Float(0.0), Node::Null] })
    );
    assert_eq!(read_model(&document)?, model);
    Ok(())
}
