use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{ArrayD, IxDyn};
use prost::Message;
use rand::prelude::*;

use onnx_importer::import_onnx_bytes;
use onnx_importer::proto::onnx::{tensor_shape_proto, type_proto};
use onnx_importer::proto::{
    AttributeProto, AttributeType, DimensionValue, GraphProto, ModelProto, NodeProto, OperatorSetIdProto,
    TensorProto, TensorShapeProto, TypeProto, TypeValue, ValueInfoProto,
};

// =====================================================================
// Model construction
// =====================================================================

fn value_info(name: &str, dims: &[usize]) -> ValueInfoProto {
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

fn random_tensor(rng: &mut StdRng, name: &str, dims: &[usize]) -> TensorProto {
    let count = dims.iter().product();
    TensorProto {
        name: name.to_string(),
        data_type: 1,
        dims: dims.iter().map(|&d| d as i64).collect(),
        float_data: (0..count).map(|_| rng.gen_range(-1.0..1.0)).collect(),
        ..Default::default()
    }
}

fn node(op_type: &str, inputs: &[&str], output: &str, attribute: Vec<AttributeProto>) -> NodeProto {
    NodeProto {
        op_type: op_type.to_string(),
        name: output.to_string(),
        input: inputs.iter().map(|s| s.to_string()).collect(),
        output: vec![output.to_string()],
        attribute,
        ..Default::default()
    }
}

/// Two-layer perceptron: Softmax(Gemm(Relu(Gemm(X))))
fn mlp_model(batch: usize, width: usize) -> ModelProto {
    let mut rng = StdRng::seed_from_u64(42);
    let trans_b = AttributeProto {
        name: "transB".to_string(),
        r#type: AttributeType::Int as i32,
        i: 1,
        ..Default::default()
    };

    ModelProto {
        ir_version: 3,
        opset_import: vec![OperatorSetIdProto {
            domain: String::new(),
            version: 9,
        }],
        graph: Some(GraphProto {
            name: "mlp".to_string(),
            node: vec![
                node("Gemm", &["X", "W1", "B1"], "H", vec![trans_b.clone()]),
                node("Relu", &["H"], "A", vec![]),
                node("Gemm", &["A", "W2", "B2"], "L", vec![trans_b]),
                node("Softmax", &["L"], "Y", vec![]),
            ],
            input: vec![value_info("X", &[batch, width])],
            output: vec![value_info("Y", &[batch, 10])],
            initializer: vec![
                random_tensor(&mut rng, "W1", &[width, width]),
                random_tensor(&mut rng, "B1", &[width]),
                random_tensor(&mut rng, "W2", &[10, width]),
                random_tensor(&mut rng, "B2", &[10]),
            ],
            ..Default::default()
        }),
        ..Default::default()
    }
}

// =====================================================================
// Criterion Benchmark Functions
// =====================================================================

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("onnx_import");

    for &width in &[16usize, 64, 256] {
        let bytes = mlp_model(8, width).encode_to_vec();

        group.bench_with_input(BenchmarkId::new("import", width), &bytes, |b, bytes| {
            b.iter(|| import_onnx_bytes(black_box(bytes)).expect("import"));
        });

        let imported = import_onnx_bytes(&bytes).expect("import");
        let computation = imported.computation("Y").expect("computation");
        let mut rng = StdRng::seed_from_u64(7);
        let input = ArrayD::from_shape_fn(IxDyn(&[8, width]), |_| rng.gen_range(-1.0f32..1.0));

        group.bench_with_input(BenchmarkId::new("compute", width), &input, |b, input| {
            b.iter(|| computation.call(std::slice::from_ref(black_box(input))).expect("compute"));
        });
    }

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
