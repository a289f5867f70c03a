use half::{bf16, f16};
use ndarray::{ArrayD, IxDyn};
use num_traits::AsPrimitive;

use crate::error::{Error, Result};
use crate::model::DataType;
use crate::proto::{DataLocation, TensorProto};

/// Decode a TensorProto into an `f32` array.
///
/// Values come from `raw_data` (little-endian) when present, otherwise from the
/// typed field ONNX assigns to the element type.
pub fn tensor_to_array(tensor: &TensorProto) -> Result<ArrayD<f32>> {
    if tensor.data_location() == DataLocation::External {
        return Err(Error::UnsupportedFeature(format!(
            "Tensor {} uses external data",
            tensor.name
        )));
    }

    let shape = tensor.dims.iter()
        .map(|&d| {
            usize::try_from(d).map_err(|_| {
                Error::InvalidModel(format!("Tensor {} has negative dimension {}", tensor.name, d))
            })
        })
        .collect::<Result<Vec<usize>>>()?;

    let data_type = DataType::from_proto(tensor.data_type);
    let values = if tensor.raw_data.is_empty() {
        decode_typed_fields(tensor, data_type)?
    } else {
        decode_raw_data(tensor, data_type)?
    };

    let expected: usize = shape.iter().product();
    if values.len() != expected {
        return Err(Error::InvalidModel(format!(
            "Tensor {} has {} values but shape {:?} needs {}",
            tensor.name,
            values.len(),
            shape,
            expected
        )));
    }

    Ok(ArrayD::from_shape_vec(IxDyn(&shape), values)?)
}

fn cast_all<T: AsPrimitive<f32>>(values: &[T]) -> Vec<f32> {
    values.iter().map(|v| v.as_()).collect()
}

fn unsupported(tensor: &TensorProto, data_type: DataType) -> Error {
    Error::UnsupportedFeature(format!(
        "Tensor {} has unsupported element type {:?}",
        tensor.name, data_type
    ))
}

fn decode_typed_fields(tensor: &TensorProto, data_type: DataType) -> Result<Vec<f32>> {
    match data_type {
        DataType::Float => Ok(tensor.float_data.clone()),
        DataType::Double => Ok(cast_all(&tensor.double_data)),
        DataType::Int64 => Ok(cast_all(&tensor.int64_data)),
        DataType::Uint32 | DataType::Uint64 => Ok(cast_all(&tensor.uint64_data)),
        DataType::Int32 | DataType::Int16 | DataType::Int8 | DataType::Uint16 | DataType::Uint8
        | DataType::Bool => Ok(cast_all(&tensor.int32_data)),
        // Half precision values are stored as their bit patterns in int32_data
        DataType::Float16 => Ok(tensor.int32_data.iter()
            .map(|&bits| f16::from_bits(bits as u16).to_f32())
            .collect()),
        DataType::BFloat16 => Ok(tensor.int32_data.iter()
            .map(|&bits| bf16::from_bits(bits as u16).to_f32())
            .collect()),
        other => Err(unsupported(tensor, other)),
    }
}

fn decode_raw_data(tensor: &TensorProto, data_type: DataType) -> Result<Vec<f32>> {
    let raw = &tensor.raw_data;

    fn chunks<const N: usize, T>(raw: &[u8], convert: impl Fn([u8; N]) -> T) -> Option<Vec<T>> {
        if raw.len() % N != 0 {
            return None;
        }
        Some(raw.chunks_exact(N)
            .map(|chunk| {
                let mut bytes = [0u8; N];
                bytes.copy_from_slice(chunk);
                convert(bytes)
            })
            .collect())
    }

    let values = match data_type {
        DataType::Float => chunks(raw, f32::from_le_bytes),
        DataType::Double => chunks(raw, |b: [u8; 8]| f64::from_le_bytes(b) as f32),
        DataType::Int64 => chunks(raw, |b: [u8; 8]| i64::from_le_bytes(b) as f32),
        DataType::Uint64 => chunks(raw, |b: [u8; 8]| u64::from_le_bytes(b) as f32),
        DataType::Int32 => chunks(raw, |b: [u8; 4]| i32::from_le_bytes(b) as f32),
        DataType::Uint32 => chunks(raw, |b: [u8; 4]| u32::from_le_bytes(b) as f32),
        DataType::Int16 => chunks(raw, |b: [u8; 2]| i16::from_le_bytes(b) as f32),
        DataType::Uint16 => chunks(raw, |b: [u8; 2]| u16::from_le_bytes(b) as f32),
        DataType::Float16 => chunks(raw, |b: [u8; 2]| f16::from_le_bytes(b).to_f32()),
        DataType::BFloat16 => chunks(raw, |b: [u8; 2]| bf16::from_le_bytes(b).to_f32()),
        DataType::Int8 => Some(raw.iter().map(|&b| b as i8 as f32).collect()),
        DataType::Uint8 | DataType::Bool => Some(raw.iter().map(|&b| b as f32).collect()),
        other => return Err(unsupported(tensor, other)),
    };

    values.ok_or_else(|| {
        Error::InvalidModel(format!(
            "Tensor {} raw data length {} is not a multiple of the {:?} element size",
            tensor.name,
            raw.len(),
            data_type
        ))
    })
}
