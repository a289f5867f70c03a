#![allow(dead_code)]

use ndarray::{ArrayD, IxDyn};
use onnx_importer::proto::onnx::{tensor_shape_proto, type_proto};
use onnx_importer::proto::{
    AttributeProto, AttributeType, DimensionValue, GraphProto, ModelProto, NodeProto, OperatorSetIdProto,
    TensorProto, TensorShapeProto, TypeProto, TypeValue, ValueInfoProto,
};
use onnx_importer::{import_onnx_model_with_options, ImportOptions, Result};

pub fn make_node(op_type: &str, inputs: &[&str], outputs: &[&str], attributes: Vec<AttributeProto>) -> NodeProto {
    NodeProto {
        op_type: op_type.to_string(),
        name: format!("{}_node", op_type.to_lowercase()),
        input: inputs.iter().map(|s| s.to_string()).collect(),
        output: outputs.iter().map(|s| s.to_string()).collect(),
        attribute: attributes,
        ..Default::default()
    }
}

pub fn float_attr(name: &str, value: f32) -> AttributeProto {
    AttributeProto {
        name: name.to_string(),
        r#type: AttributeType::Float as i32,
        f: value,
        ..Default::default()
    }
}

pub fn int_attr(name: &str, value: i64) -> AttributeProto {
    AttributeProto {
        name: name.to_string(),
        r#type: AttributeType::Int as i32,
        i: value,
        ..Default::default()
    }
}

pub fn ints_attr(name: &str, values: &[i64]) -> AttributeProto {
    AttributeProto {
        name: name.to_string(),
        r#type: AttributeType::Ints as i32,
        ints: values.to_vec(),
        ..Default::default()
    }
}

pub fn tensor_attr(name: &str, tensor: TensorProto) -> AttributeProto {
    AttributeProto {
        name: name.to_string(),
        r#type: AttributeType::Tensor as i32,
        t: Some(tensor),
        ..Default::default()
    }
}

pub fn float_tensor(name: &str, dims: &[usize], values: &[f32]) -> TensorProto {
    TensorProto {
        name: name.to_string(),
        data_type: 1,
        dims: dims.iter().map(|&d| d as i64).collect(),
        float_data: values.to_vec(),
        ..Default::default()
    }
}

pub fn int64_tensor(name: &str, values: &[i64]) -> TensorProto {
    TensorProto {
        name: name.to_string(),
        data_type: 7,
        dims: vec![values.len() as i64],
        int64_data: values.to_vec(),
        ..Default::default()
    }
}

pub fn value_info(name: &str, dims: &[usize]) -> ValueInfoProto {
    ValueInfoProto {
        name: name.to_string(),
        r#type: Some(TypeProto {
            value: Some(TypeValue::TensorType(type_proto::Tensor {
                elem_type: 1,
                shape: Some(TensorShapeProto {
                    dim: dims
                        .iter()
                        .map(|&d| tensor_shape_proto::Dimension {
                            value: Some(DimensionValue::DimValue(d as i64)),
                            ..Default::default()
                        })
                        .collect(),
                }),
            })),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Model over `nodes` declaring the default-domain opset `opset`
pub fn make_model(
    nodes: Vec<NodeProto>,
    inputs: Vec<ValueInfoProto>,
    outputs: Vec<ValueInfoProto>,
    initializers: Vec<TensorProto>,
    opset: i64,
) -> ModelProto {
    ModelProto {
        ir_version: 3,
        producer_name: "onnx-importer-tests".to_string(),
        opset_import: vec![OperatorSetIdProto {
            domain: String::new(),
            version: opset,
        }],
        graph: Some(GraphProto {
            name: "test_graph".to_string(),
            node: nodes,
            input: inputs,
            output: outputs,
            initializer: initializers,
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn array(shape: &[usize], values: &[f32]) -> ArrayD<f32> {
    ArrayD::from_shape_vec(IxDyn(shape), values.to_vec()).expect("shape matches values")
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Import `model` and evaluate its first output on `args`
pub fn run_model(model: &ModelProto, options: &ImportOptions, args: &[ArrayD<f32>]) -> Result<ArrayD<f32>> {
    init_logging();
    let imported = import_onnx_model_with_options(model, options)?;
    let name = imported.outputs[0].name.clone();
    let computation = imported.computation(&name)?;
    computation.call(args)
}

/// Import and evaluate a single-input single-output node
pub fn import_and_compute(op_type: &str, data: &ArrayD<f32>, attributes: Vec<AttributeProto>) -> ArrayD<f32> {
    let shape = data.shape().to_vec();
    let node = make_node(op_type, &["X"], &["Y"], attributes);
    let model = make_model(vec![node], vec![value_info("X", &shape)], vec![value_info("Y", &shape)], vec![], 6);
    run_model(&model, &ImportOptions::default(), &[data.clone()]).expect("import and compute")
}

pub fn assert_allclose(actual: &ArrayD<f32>, expected: &ArrayD<f32>) {
    assert_eq!(actual.shape(), expected.shape(), "shape mismatch");
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert!(
            (a - e).abs() <= 1e-6 + 1e-5 * e.abs(),
            "values differ: {} vs {}\nactual: {:?}\nexpected: {:?}",
            a,
            e,
            actual,
            expected
        );
    }
}
