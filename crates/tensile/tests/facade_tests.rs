//! Integration tests for the tensor facade.
//! Run with: cargo test -p tensile

use ndarray::{arr1, arr2, Array, ArrayD, IxDyn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tensile::functional;
use tensile::registry::{lookup, KernelKey, Op, OperandTag};
use tensile::{
    ConcreteKind, DenseArray, ElementKind, ExportView, Indexed, Nested, RawBuffer, Scalar,
    StorageType, Tensor, TensorError,
};

fn assert_close(a: &[f32], b: &[f32], tol: f32) {
    assert_eq!(a.len(), b.len(), "length mismatch: {} vs {}", a.len(), b.len());
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        assert!(
            (x - y).abs() < tol,
            "element {} differs: {} vs {} (tol={})",
            i, x, y, tol
        );
    }
}

fn f32_values(t: &Tensor) -> Vec<f32> {
    match t.export_view().unwrap() {
        ExportView::F32(v) => v.iter().copied().collect(),
        ExportView::I32(_) => panic!("expected a float32 tensor, got {t:?}"),
    }
}

fn i32_values(t: &Tensor) -> Vec<i32> {
    match t.export_view().unwrap() {
        ExportView::I32(v) => v.iter().copied().collect(),
        ExportView::F32(_) => panic!("expected an int32 tensor, got {t:?}"),
    }
}

fn random_dims(rng: &mut StdRng, rank: usize) -> Vec<usize> {
    (0..rank).map(|_| rng.gen_range(1..=4)).collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_scenario_nested_int_literal() {
    let t = Tensor::from_data(vec![vec![1i32, 2], vec![3, 4]]).unwrap();
    assert_eq!(t.shape(), &[2, 2]);
    assert_eq!(t.dtype(), ElementKind::Int32);
    assert_eq!(t.index([0, 1]).unwrap(), Indexed::Scalar(Scalar::Int32(2)));
}

#[test]
fn test_scenario_scalar_add() {
    let t = Tensor::from_data(vec![1.0f64, 2.0, 3.0]).unwrap();
    assert_eq!(t.dtype(), ElementKind::Float32);
    let out = t.add(1.0f64).unwrap();
    assert_close(&f32_values(&out), &[2.0, 3.0, 4.0], 1e-6);
}

#[test]
fn test_scenario_zeros_reshape() {
    let t = Tensor::zeros(&[2, 3]).unwrap();
    let r = t.reshape(&[6]).unwrap();
    assert_eq!(r.shape(), &[6]);
    assert_eq!(r.to_string(), "Tensor((6,))");
    assert!(f32_values(&r).iter().all(|&v| v == 0.0));
}

#[test]
fn test_scenario_no_data_no_shape() {
    assert!(matches!(
        Tensor::new(None, None),
        Err(TensorError::InvalidConstruction(_))
    ));
}

#[test]
fn test_scenario_mixed_rank_add() {
    let v = Tensor::zeros(&[2]).unwrap();
    let t3 = Tensor::zeros(&[2, 2, 2]).unwrap();
    assert_eq!(
        v.add(&t3),
        Err(TensorError::UnknownOperation("add_vectorf_tensor3f".into()))
    );
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_every_rank_and_kind() {
    let mut rng = StdRng::seed_from_u64(7);
    for rank in 1..=4 {
        for _ in 0..5 {
            let dims = random_dims(&mut rng, rank);
            let numel: usize = dims.iter().product();

            let ints: Vec<i32> = (0..numel).map(|_| rng.gen_range(-100..100)).collect();
            let a = ArrayD::from_shape_vec(IxDyn(&dims), ints).unwrap();
            let t = Tensor::from_data(a).unwrap();
            assert_eq!(t.rank(), rank);
            assert_eq!(t.dtype(), ElementKind::Int32);
            assert_eq!(t.shape(), dims.as_slice());

            let floats: Vec<f32> = (0..numel).map(|_| rng.gen::<f32>()).collect();
            let a = ArrayD::from_shape_vec(IxDyn(&dims), floats).unwrap();
            let t = Tensor::from_data(a).unwrap();
            assert_eq!(t.rank(), rank);
            assert_eq!(t.dtype(), ElementKind::Float32);
        }
    }
}

#[test]
fn test_downcast_matches_narrow_buffer() {
    let mut rng = StdRng::seed_from_u64(11);
    let narrow: Vec<i32> = (0..12).map(|_| rng.gen_range(-1000..1000)).collect();
    let wide: Vec<i64> = narrow.iter().map(|&v| v as i64).collect();

    let a = Tensor::from_data(ArrayD::from_shape_vec(IxDyn(&[3, 4]), narrow).unwrap()).unwrap();
    let b = Tensor::from_data(ArrayD::from_shape_vec(IxDyn(&[3, 4]), wide).unwrap()).unwrap();

    assert_eq!(a.shape(), b.shape());
    assert_eq!(b.dtype(), ElementKind::Int32);
    assert_eq!(i32_values(&a), i32_values(&b));
}

#[test]
fn test_float64_downcast() {
    let t = Tensor::from_data(arr2(&[[0.25f64, 0.5], [1.0, 2.0]])).unwrap();
    assert_eq!(t.kind(), ConcreteKind::MATRIX_F);
    assert_close(&f32_values(&t), &[0.25, 0.5, 1.0, 2.0], 1e-7);
}

#[test]
fn test_export_round_trip() {
    let src = arr2(&[[1.5f32, -2.0, 3.25], [0.0, 8.0, -1.0]]).into_dyn();
    let t = Tensor::from_data(src.clone()).unwrap();
    let view = t.export_view().unwrap();
    assert_eq!(view.as_f32().unwrap(), &src.view());

    let src = arr1(&[4i32, 5, 6]).into_dyn();
    let t = Tensor::from_data(src.clone()).unwrap();
    assert_eq!(t.to_dense().unwrap(), DenseArray::I32(src));
}

#[test]
fn test_unsupported_storage() {
    for storage in [StorageType::U8, StorageType::I16, StorageType::F16, StorageType::Bool] {
        let bytes = vec![0u8; storage.element_size() * 4];
        let raw = RawBuffer::new(storage, &[2, 2], bytes);
        assert!(matches!(
            Tensor::from_data(raw),
            Err(TensorError::UnsupportedElementType(_))
        ));
    }
}

#[test]
fn test_raw_float64_buffer() {
    let values = [1.0f64, 2.0, 3.0, 4.0];
    let bytes = bytemuck::cast_slice::<f64, u8>(&values).to_vec();
    let t = Tensor::from_data(RawBuffer::new(StorageType::F64, &[2, 2], bytes)).unwrap();
    assert_eq!(t.kind(), ConcreteKind::MATRIX_F);
    assert_close(&f32_values(&t), &[1.0, 2.0, 3.0, 4.0], 1e-7);
}

#[test]
fn test_dense_rank_out_of_range() {
    let deep = Array::from_elem(IxDyn(&[1, 2, 1, 2, 1]), 0.0f32);
    assert_eq!(
        Tensor::from_data(deep),
        Err(TensorError::UnsupportedRank { rank: 5 })
    );
}

#[test]
fn test_ragged_literal_rejected() {
    let ragged = Nested::from(vec![vec![1i32, 2, 3], vec![4, 5]]);
    assert!(matches!(
        Tensor::from_data(ragged),
        Err(TensorError::UnsupportedElementType(_))
    ));
}

#[test]
fn test_bare_scalar_is_length_one_vector() {
    let t = Tensor::from_data(3.5f32).unwrap();
    assert_eq!(t.kind(), ConcreteKind::VECTOR_F);
    assert_eq!(t.shape(), &[1]);
    assert_eq!(t.index(0).unwrap(), Indexed::Scalar(Scalar::Float32(3.5)));
}

#[test]
fn test_explicit_shape_overrides_data() {
    let data = vec![vec![1i32, 2], vec![3, 4]];
    let t = Tensor::new(Some(data.into()), Some(&[3])).unwrap();
    assert_eq!(t.kind(), ConcreteKind::VECTOR_F);
    assert_eq!(f32_values(&t), vec![0.0; 3]);
}

#[test]
fn test_instance_passthrough() {
    let t = Tensor::from_data(vec![vec![1i32, 2], vec![3, 4]]).unwrap();
    let inst = t.clone().into_instance();
    let u = Tensor::from_data(inst).unwrap();
    assert_eq!(u, t);
}

// ============================================================================
// Reshape / transpose
// ============================================================================

#[test]
fn test_reshape_preserves_elements() {
    let t = Tensor::from_data(vec![vec![1i32, 2, 3], vec![4, 5, 6]]).unwrap();
    let r = t.reshape(&[3, 2]).unwrap();
    assert_eq!(r.numel(), t.numel());
    assert_eq!(i32_values(&r), i32_values(&t));

    let r = t.reshape(&[-1, 3, 1]).unwrap();
    assert_eq!(r.shape(), &[2, 3, 1]);
    assert_eq!(r.kind(), ConcreteKind::TENSOR3_I);
}

#[test]
fn test_reshape_overflowing_target_leaves_no_tensor() {
    let t = Tensor::zeros(&[2, 3]).unwrap();
    for target in [[1i64 << 40, 1 << 40], [0x6DB6_DB6D_B6DB_6DB7, 42]] {
        assert!(matches!(
            t.reshape(&target),
            Err(TensorError::ReshapeSizeMismatch { numel: 6, .. })
        ));
    }
}

#[test]
fn test_reshape_mismatch() {
    let t = Tensor::zeros(&[2, 3]).unwrap();
    assert!(matches!(
        t.reshape(&[4, 2]),
        Err(TensorError::ReshapeSizeMismatch { numel: 6, .. })
    ));
    // -1 keeps the first axis (2), so 2 * 6 != 6
    assert!(matches!(
        t.reshape(&[-1, 6]),
        Err(TensorError::ReshapeSizeMismatch { .. })
    ));
    assert!(matches!(
        t.reshape(&[6, -1]),
        Err(TensorError::ReshapeSizeMismatch { .. })
    ));
}

#[test]
fn test_transpose() {
    let t = Tensor::from_data(vec![vec![1.0f32, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
    let r = t.transpose().unwrap();
    assert_eq!(r.shape(), &[3, 2]);
    assert_close(&f32_values(&r), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0], 1e-7);

    let v = Tensor::from_data(vec![1i32, 2]).unwrap();
    assert_eq!(v.transpose().unwrap(), v);
}

// ============================================================================
// Indexing
// ============================================================================

#[test]
fn test_matrix_index_rules() {
    let t = Tensor::from_data(vec![vec![1.0f32, 2.0], vec![3.0, 4.0]]).unwrap();
    assert_eq!(t.index([1, 0]).unwrap(), Indexed::Scalar(Scalar::Float32(3.0)));
    assert_eq!(
        t.index([1]),
        Err(TensorError::IndexArityMismatch { rank: 2, got: 1 })
    );
    assert_eq!(
        t.index(1),
        Err(TensorError::IndexArityMismatch { rank: 2, got: 1 })
    );
    assert_eq!(
        t.index([0, 0, 0]),
        Err(TensorError::IndexArityMismatch { rank: 2, got: 3 })
    );
    assert_eq!(
        t.index([0, 2]),
        Err(TensorError::IndexOutOfBounds { axis: 1, index: 2, size: 2 })
    );
}

#[test]
fn test_partial_index_tensor4() {
    let data: Vec<f32> = (0..24).map(|v| v as f32).collect();
    let a = ArrayD::from_shape_vec(IxDyn(&[2, 3, 2, 2]), data).unwrap();
    let t = Tensor::from_data(a).unwrap();

    let sub = t.index([1]).unwrap().tensor().unwrap();
    assert_eq!(sub.kind(), ConcreteKind::TENSOR3_F);
    assert_eq!(sub.shape(), &[3, 2, 2]);

    let row = t.index([1, 2, 0]).unwrap().tensor().unwrap();
    assert_eq!(row.shape(), &[2]);
    assert_close(&f32_values(&row), &[20.0, 21.0], 1e-7);

    assert_eq!(t.index([1, 2, 1, 1]).unwrap().scalar(), Some(Scalar::Float32(23.0)));
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_scalar_ops_keep_shape() {
    let mut rng = StdRng::seed_from_u64(3);
    for rank in 1..=4 {
        let dims = random_dims(&mut rng, rank);
        let numel: usize = dims.iter().product();
        let values: Vec<f32> = (0..numel).map(|_| rng.gen_range(-10.0..10.0)).collect();
        let t = Tensor::from_data(ArrayD::from_shape_vec(IxDyn(&dims), values.clone()).unwrap())
            .unwrap();

        let added = t.add(2.5f32).unwrap();
        assert_eq!(added.shape(), t.shape());
        let expected: Vec<f32> = values.iter().map(|v| v + 2.5).collect();
        assert_close(&f32_values(&added), &expected, 1e-5);

        let scaled = (3i32 * &t).unwrap();
        assert_eq!(scaled.shape(), t.shape());
        let expected: Vec<f32> = values.iter().map(|v| v * 3.0).collect();
        assert_close(&f32_values(&scaled), &expected, 1e-4);
    }
}

#[test]
fn test_int_tensor_rejects_float_scalar() {
    let t = Tensor::from_data(vec![1i32, 2]).unwrap();
    assert_eq!(
        t.multiply(0.5f32),
        Err(TensorError::UnknownOperation("multiply_vectori_f".into()))
    );
    let doubled = t.multiply(2i32).unwrap();
    assert_eq!(i32_values(&doubled), vec![2, 4]);
}

#[test]
fn test_tensor_ops_and_operators() {
    let a = Tensor::from_data(vec![vec![1i32, 2], vec![3, 4]]).unwrap();
    let b = Tensor::from_data(vec![vec![10i32, 20], vec![30, 40]]).unwrap();
    assert_eq!(i32_values(&(&a + &b).unwrap()), vec![11, 22, 33, 44]);
    assert_eq!(i32_values(&(&a * &b).unwrap()), vec![10, 40, 90, 160]);

    let c = Tensor::zeros(&[3, 3]).unwrap();
    assert!(matches!(
        a.add(&c),
        Err(TensorError::UnknownOperation(_))
    ));
    let d = Tensor::from_data(vec![vec![1i32, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]).unwrap();
    assert_eq!(
        a.add(&d),
        Err(TensorError::DimensionMismatch {
            lhs: vec![2, 2],
            rhs: vec![3, 3],
        })
    );
}

#[test]
fn test_row_bias_add() {
    let m = Tensor::zeros(&[2, 3]).unwrap();
    let bias = Tensor::from_data(vec![1.0f32, 2.0, 3.0]).unwrap();
    let out = m.add(&bias).unwrap();
    assert_close(&f32_values(&out), &[1.0, 2.0, 3.0, 1.0, 2.0, 3.0], 1e-7);
    assert!(matches!(
        m.multiply(&bias),
        Err(TensorError::UnknownOperation(_))
    ));
}

#[test]
fn test_matmul() {
    let a = Tensor::from_data(vec![vec![1.0f32, 2.0], vec![3.0, 4.0]]).unwrap();
    let b = Tensor::from_data(vec![vec![5.0f32, 6.0], vec![7.0, 8.0]]).unwrap();
    let c = a.matmul(&b).unwrap();
    assert_close(&f32_values(&c), &[19.0, 22.0, 43.0, 50.0], 1e-5);

    let v = Tensor::from_data(vec![1.0f32, 1.0]).unwrap();
    assert_close(&f32_values(&a.matmul(&v).unwrap()), &[3.0, 7.0], 1e-6);

    let bad = Tensor::zeros(&[3, 3]).unwrap();
    assert!(matches!(
        a.matmul(&bad),
        Err(TensorError::DimensionMismatch { .. })
    ));

    let ints = Tensor::from_data(vec![vec![1i32, 0], vec![0, 1]]).unwrap();
    assert!(matches!(
        a.matmul(&ints),
        Err(TensorError::IncompatibleDtype { .. })
    ));
}

// ============================================================================
// Helpers
// ============================================================================

#[test]
fn test_log_exp_pow() {
    let t = Tensor::from_data(vec![1.0f32, 2.0, 4.0]).unwrap();
    let l = functional::log(&t).unwrap();
    assert_close(&f32_values(&l), &[0.0, 2f32.ln(), 4f32.ln()], 1e-6);
    let e = functional::exp(&l).unwrap();
    assert_close(&f32_values(&e), &[1.0, 2.0, 4.0], 1e-5);
    let p = functional::pow(&t, 3).unwrap();
    assert_close(&f32_values(&p), &[1.0, 8.0, 64.0], 1e-5);
}

#[test]
fn test_sum_and_argmax() {
    let t = Tensor::from_data(vec![vec![1i32, 9, 3], vec![7, 2, 7]]).unwrap();
    let s = functional::sum(&t, 0).unwrap();
    assert_eq!(i32_values(&s), vec![8, 11, 10]);
    let s = functional::sum(&t, 1).unwrap();
    assert_eq!(i32_values(&s), vec![13, 16]);
    assert_eq!(
        functional::sum(&t, 2),
        Err(TensorError::InvalidAxis { axis: 2, rank: 2 })
    );

    let a = functional::argmax(&t).unwrap();
    assert_eq!(a.dtype(), ElementKind::Int32);
    assert_eq!(i32_values(&a), vec![1, 0]);
}

#[test]
fn test_flatten() {
    let t = Tensor::zeros(&[2, 2, 3, 1]).unwrap();
    let f = functional::flatten(&t, true).unwrap();
    assert_eq!(f.shape(), &[2, 6]);
    assert!(matches!(
        functional::flatten(&t, false),
        Err(TensorError::NotImplemented(_))
    ));
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_registry_probe() {
    let key = KernelKey::binary(
        Op::Add,
        OperandTag::Array(ConcreteKind::MATRIX_F),
        OperandTag::Array(ConcreteKind::VECTOR_F),
    );
    assert_eq!(key.identifier(), "add_matrixf_vectorf");
    assert!(lookup(&key).is_some());

    let key = KernelKey::binary(
        Op::Add,
        OperandTag::Array(ConcreteKind::VECTOR_F),
        OperandTag::Array(ConcreteKind::TENSOR3_F),
    );
    assert!(lookup(&key).is_none());
}
